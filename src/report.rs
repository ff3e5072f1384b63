//! Report generation.
//!
//! Generators consume a [`ReportData`] bundle (all-time, monthly and yearly
//! metrics plus presentation settings) and write one output file each:
//!
//! - [`HtmlReport`] renders a self-contained HTML page with inline SVG
//!   charts.
//! - [`CsvReport`] exports the all-time category totals.

mod charts;
mod csv;
mod html;

use core::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};

use crate::analyzer::AnalysisResults;
use crate::config::{AnalysisConfig, ReportConfig};
use crate::error::{LedgerError, Result};

pub use self::csv::CsvReport;
pub use self::html::HtmlReport;

/// Timestamp layout used when the configured one is invalid.
const FALLBACK_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Everything a report generator needs.
#[derive(Debug, Clone)]
pub struct ReportData<'data> {
    /// All-time, monthly and yearly metrics.
    pub results: &'data AnalysisResults,
    /// Category labels and chart thresholds.
    pub analysis: &'data AnalysisConfig,
    /// Currency and timestamp settings.
    pub report: &'data ReportConfig,
    /// Moment the report was generated.
    pub generated_at: NaiveDateTime,
    /// Name of the input ledger, shown in the report header.
    pub source: Option<String>,
}

impl<'data> ReportData<'data> {
    /// Bundles `results` with the given settings, stamped with the current
    /// local time.
    #[inline]
    #[must_use]
    pub fn new(
        results: &'data AnalysisResults,
        analysis: &'data AnalysisConfig,
        report: &'data ReportConfig,
    ) -> Self {
        Self {
            results,
            analysis,
            report,
            generated_at: Local::now().naive_local(),
            source: None,
        }
    }

    /// Sets the input ledger name shown in the header.
    #[inline]
    #[must_use]
    pub fn with_source<S: Into<String>>(mut self, source: S) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Overrides the generation timestamp.
    #[inline]
    #[must_use]
    pub const fn with_generated_at(mut self, generated_at: NaiveDateTime) -> Self {
        self.generated_at = generated_at;
        self
    }

    /// Generation timestamp formatted with the configured pattern.
    #[inline]
    #[must_use]
    pub fn generated_label(&self) -> String {
        let mut label = String::new();
        if write!(label, "{}", self.generated_at.format(&self.report.date_format)).is_err() {
            tracing::warn!(format = %self.report.date_format, "invalid date format, using ISO");
            label = self.generated_at.format(FALLBACK_DATE_FORMAT).to_string();
        }
        label
    }
}

/// A report output format.
pub trait ReportGenerator {
    /// Renders `data` into `output` and returns the path written.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    fn generate(&self, data: &ReportData<'_>, output: &Path) -> Result<PathBuf>;
}

/// Escapes text for inclusion in HTML or SVG markup.
pub(crate) fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Creates the directory that will hold `path`.
fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|err| LedgerError::io(dir, err))?;
    }
    Ok(())
}

/// Writes `contents` to `path`, creating parent directories.
fn write_output(path: &Path, contents: &str) -> Result<()> {
    ensure_parent(path)?;
    fs::write(path, contents).map_err(|err| LedgerError::io(path, err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::FinancialAnalyzer;
    use crate::models::{NaiveDate, Transaction};

    /// A small analysed ledger spanning two months and two years.
    pub(super) fn sample_results() -> AnalysisResults {
        let day = |year, month, dom| NaiveDate::from_ymd_opt(year, month, dom).unwrap();
        let rows = vec![
            Transaction::on(day(2024, 12, 20), "Salary", 3000.0),
            Transaction::on(day(2024, 12, 21), "Food & Drinks", -450.0),
            Transaction::on(day(2025, 1, 2), "Salary", 3100.0),
            Transaction::on(day(2025, 1, 3), "Charity", -300.0),
            Transaction::on(day(2025, 1, 4), "Loan, interests", -800.0),
            Transaction::on(day(2025, 1, 9), "Lending, renting", 200.0),
            Transaction::on(day(2025, 1, 11), "Rent", -1200.0),
            Transaction::on(day(2025, 1, 12), "<script>", -5.0),
        ];
        FinancialAnalyzer::new(rows, AnalysisConfig::default()).report_data()
    }

    #[test]
    fn escape_html_replaces_markup() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn generated_label_uses_configured_format() {
        let results = sample_results();
        let analysis = AnalysisConfig::default();
        let report = ReportConfig::default();
        let stamp = NaiveDate::from_ymd_opt(2025, 2, 1)
            .unwrap()
            .and_hms_opt(9, 5, 0)
            .unwrap();
        let data = ReportData::new(&results, &analysis, &report).with_generated_at(stamp);
        assert_eq!(data.generated_label(), "2025-02-01 at 09:05:00");

        let broken = ReportConfig {
            date_format: "%Q".to_owned(),
            ..ReportConfig::default()
        };
        let fallback = ReportData::new(&results, &analysis, &broken).with_generated_at(stamp);
        assert_eq!(fallback.generated_label(), "2025-02-01 09:05:00");
    }

    #[test]
    fn write_output_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("report.txt");
        write_output(&path, "hello").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello");
    }
}
