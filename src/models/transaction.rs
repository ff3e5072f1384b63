//! Transaction model.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Placeholder used when a ledger row carries no description.
pub const DEFAULT_DESCRIPTION: &str = "No description";

/// One cleaned ledger entry.
///
/// The sign of `amount` carries the cash-flow direction: negative values are
/// expenses, positive values are income and zero contributes to neither.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Calendar timestamp of the entry.
    pub date: NaiveDateTime,
    /// Free-text category label (case-preserved).
    pub category: String,
    /// Signed amount in the ledger's base currency.
    pub amount: f64,
    /// Free-text description.
    #[serde(default = "default_description")]
    pub description: String,
}

/// Serde default for [`Transaction::description`].
fn default_description() -> String {
    DEFAULT_DESCRIPTION.to_owned()
}

impl Transaction {
    /// Creates a transaction with the placeholder description.
    #[inline]
    #[must_use]
    pub fn new<C: Into<String>>(date: NaiveDateTime, category: C, amount: f64) -> Self {
        Self {
            date,
            category: category.into(),
            amount,
            description: default_description(),
        }
    }

    /// Creates a transaction dated at midnight of the given day.
    #[inline]
    #[must_use]
    pub fn on<C: Into<String>>(day: NaiveDate, category: C, amount: f64) -> Self {
        Self::new(day.and_time(NaiveTime::MIN), category, amount)
    }

    /// Replaces the description.
    #[inline]
    #[must_use]
    pub fn with_description<D: Into<String>>(mut self, description: D) -> Self {
        self.description = description.into();
        self
    }

    /// Returns `true` for money going out (`amount < 0`).
    #[inline]
    #[must_use]
    pub fn is_expense(&self) -> bool {
        self.amount < 0.0_f64
    }

    /// Returns `true` for money coming in (`amount > 0`).
    #[inline]
    #[must_use]
    pub fn is_income(&self) -> bool {
        self.amount > 0.0_f64
    }

    /// Calendar day of the entry.
    #[inline]
    #[must_use]
    pub fn day(&self) -> NaiveDate {
        self.date.date()
    }
}
