//! Error types for the ledger-report library.
//!
//! Only the collaborators around the metrics engine are fallible: loading
//! ledgers, reading configuration, caching or fetching exchange rates and
//! writing reports. The engine and the period partitioner are total.

use std::path::PathBuf;

/// All errors that can occur when loading ledgers or producing reports.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// A file could not be read or written.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// Path of the file that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// CSV input was malformed or the CSV writer failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The ledger is missing one or more required columns.
    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// The ledger has neither a `ref_currency_amount` nor an `amount` column.
    #[error("neither 'ref_currency_amount' nor 'amount' column found")]
    MissingAmountColumn,

    /// The input file extension is not supported.
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// A spreadsheet workbook could not be opened or read.
    #[error("cannot read workbook {}: {source}", .path.display())]
    Workbook {
        /// Path of the workbook.
        path: PathBuf,
        /// Underlying spreadsheet error.
        source: calamine::Error,
    },

    /// A spreadsheet workbook has no worksheet to read.
    #[error("workbook {} has no worksheets", .0.display())]
    EmptyWorkbook(PathBuf),

    /// A row carries a date that cannot be parsed.
    #[error("invalid date {value:?} in data row {row}")]
    InvalidDate {
        /// 1-based data row index (header excluded).
        row: usize,
        /// Raw cell contents.
        value: String,
    },

    /// A row has an empty category.
    #[error("missing category in data row {row}")]
    MissingCategory {
        /// 1-based data row index (header excluded).
        row: usize,
    },

    /// Configuration values are inconsistent.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// HTTP transport error while fetching exchange rates.
    #[cfg(feature = "rates")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The exchange-rate service returned a non-success response.
    #[error("rate API error (HTTP {status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body or error description.
        message: String,
    },
}

impl LedgerError {
    /// Wraps an I/O error together with the path it occurred on.
    #[inline]
    #[must_use]
    pub fn io<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, LedgerError>;
