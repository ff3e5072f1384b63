//! Aggregated metrics and reports for personal-finance transaction ledgers.
//!
//! The core is a pure metrics engine: [`engine::compute_metrics`] turns a
//! slice of signed [`models::Transaction`]s into a [`models::MetricsRecord`]
//! with per-category totals, loan netting, a charity share and a simplified
//! three-way spending split. [`partition`] applies the engine to calendar
//! months, quarters or years, and [`views`] reshapes the results for
//! presentation.
//!
//! Around the core sit the fallible collaborators:
//!
//! - [`loader`] reads CSV files and spreadsheet workbooks into cleaned
//!   transactions.
//! - [`currency`] formats amounts and resolves exchange rates (cached on
//!   disk, fetched over HTTP with the `rates` feature).
//! - [`analyzer`] filters a loaded ledger and runs the engine over it.
//! - [`report`] writes HTML and CSV reports.
//! - [`config`] loads the JSON settings file.
//!
//! # Example
//!
//! ```
//! use ledger_report::config::AnalysisConfig;
//! use ledger_report::engine::compute_metrics;
//! use ledger_report::models::{NaiveDate, Transaction};
//!
//! let day = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
//! let ledger = [
//!     Transaction::on(day, "Salary", 2000.0),
//!     Transaction::on(day, "Loan, interests", -500.0),
//!     Transaction::on(day, "Lending, renting", 200.0),
//! ];
//! let metrics = compute_metrics(&ledger, &AnalysisConfig::default());
//! assert_eq!(metrics.total_income(), 2000.0);
//! assert_eq!(metrics.outstanding_lending(), 300.0);
//! assert_eq!(metrics.total_spending(), 300.0);
//! ```

extern crate alloc;

pub mod analyzer;
pub mod config;
pub mod currency;
pub mod engine;
pub mod error;
pub mod loader;
pub mod models;
pub mod partition;
pub mod report;
pub mod views;
