//! Reshaped views over partitioned metrics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{LendingPosition, PeriodKey};

/// One category with its aggregated amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAmount {
    /// Category label.
    pub category: String,
    /// Aggregated amount.
    pub amount: f64,
}

/// Income, spending and balance of one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// Period the figures belong to.
    pub period: PeriodKey,
    /// Adjusted income.
    pub income: f64,
    /// Adjusted spending.
    pub spending: f64,
    /// Income minus spending.
    pub balance: f64,
}

/// Chronologically ordered trend of per-period totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendSeries {
    /// Points in period-key order.
    pub points: Vec<TrendPoint>,
}

impl TrendSeries {
    /// Period labels in order.
    #[inline]
    #[must_use]
    pub fn periods(&self) -> Vec<&str> {
        self.points.iter().map(|point| point.period.as_str()).collect()
    }

    /// Income values in order.
    #[inline]
    #[must_use]
    pub fn income(&self) -> Vec<f64> {
        self.points.iter().map(|point| point.income).collect()
    }

    /// Spending values in order.
    #[inline]
    #[must_use]
    pub fn spending(&self) -> Vec<f64> {
        self.points.iter().map(|point| point.spending).collect()
    }

    /// Balance values in order.
    #[inline]
    #[must_use]
    pub fn balance(&self) -> Vec<f64> {
        self.points.iter().map(|point| point.balance).collect()
    }

    /// Returns `true` if the series has no points.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Lending figures for the whole ledger and for each period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LendingSummary {
    /// All-time position.
    pub overall: LendingPosition,
    /// Position computed independently per period.
    pub by_period: BTreeMap<PeriodKey, LendingPosition>,
}

/// Charity spending of one period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CharityShare {
    /// Raw charity expenses.
    pub charity_amount: f64,
    /// Share of the period's adjusted spending, in percent.
    pub percentage_of_spending: f64,
}

/// Charity spending for the whole ledger and for each period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CharityAnalysis {
    /// All-time charity expenses.
    pub total_charity: f64,
    /// All-time share of adjusted spending, in percent.
    pub percentage_of_spending: f64,
    /// Per-period breakdown.
    pub by_period: BTreeMap<PeriodKey, CharityShare>,
}
