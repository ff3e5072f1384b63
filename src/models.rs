//! Data models for ledger analysis.
//!
//! This module contains the cleaned [`Transaction`] row, the
//! [`CategoryTotals`] mapping, the [`MetricsRecord`] produced by the engine,
//! calendar [`Granularity`] / [`PeriodKey`] types and the reshaped views
//! consumed by report collaborators.

mod category_totals;
mod metrics;
mod period;
mod transaction;
mod views;

pub use category_totals::CategoryTotals;
pub use metrics::{LendingPosition, MetricsRecord, RawTotals, SimplifiedSpending};
pub use period::{Granularity, ParseGranularityError, PeriodKey};
pub use transaction::{DEFAULT_DESCRIPTION, Transaction};
pub use views::{
    CategoryAmount, CharityAnalysis, CharityShare, LendingSummary, TrendPoint, TrendSeries,
};

pub use chrono::{NaiveDate, NaiveDateTime};
