//! Metrics record produced by the engine.

use serde::{Deserialize, Serialize};

use super::CategoryTotals;

/// Three-way split of adjusted spending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimplifiedSpending {
    /// Spending in the charity bucket.
    pub charity: f64,
    /// Spending in the lending bucket (loan and lending categories).
    pub lending: f64,
    /// Everything else.
    pub normal: f64,
}

impl SimplifiedSpending {
    /// Sum of the three buckets.
    #[inline]
    #[must_use]
    pub fn total(&self) -> f64 {
        self.charity + self.lending + self.normal
    }
}

/// Loan disbursement/repayment figures after netting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LendingPosition {
    /// Raw loan expense (money lent out, interest paid).
    pub total_lending: f64,
    /// Raw repayment income.
    pub repaid_lending: f64,
    /// Unpaid remainder, counted as spending (`max(0, lent - repaid)`).
    pub outstanding_lending: f64,
    /// Repayments exceeding what was lent (`max(0, repaid - lent)`).
    pub excess_repayment: f64,
}

impl LendingPosition {
    /// Signed net position: positive while money is still owed.
    #[inline]
    #[must_use]
    pub fn net(&self) -> f64 {
        self.outstanding_lending - self.excess_repayment
    }
}

/// Unadjusted aggregates kept for auditing the lending adjustment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTotals {
    /// Sum of all expense magnitudes.
    pub total_spending_raw: f64,
    /// Sum of all income.
    pub total_income_raw: f64,
    /// Expense magnitudes per category before netting.
    pub spending_by_category_raw: CategoryTotals,
    /// Income per category before dropping repayments.
    pub income_by_category_raw: CategoryTotals,
}

/// Derived metrics for one subset of transactions.
///
/// Built only by [`crate::engine::compute_metrics`]; totals always equal
/// the sums of their category maps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    /// Expense magnitudes per category after the lending adjustment.
    pub(crate) spending_by_category: CategoryTotals,
    /// Income per category without the repayment category.
    pub(crate) income_by_category: CategoryTotals,
    /// Sum of `spending_by_category`.
    pub(crate) total_spending: f64,
    /// Sum of `income_by_category`.
    pub(crate) total_income: f64,
    /// `total_income - total_spending`.
    pub(crate) net_balance: f64,
    /// Raw charity expenses.
    pub(crate) charity_spending: f64,
    /// `total_spending - charity_spending`.
    pub(crate) spending_excluding_charity: f64,
    /// Charity share of total spending, in percent.
    pub(crate) charity_percentage: f64,
    /// Charity / lending / normal split.
    pub(crate) simplified_spending: SimplifiedSpending,
    /// Loan netting figures.
    #[serde(flatten)]
    pub(crate) lending: LendingPosition,
    /// Number of rows in the subset.
    pub(crate) transaction_count: usize,
    /// Mean signed amount over all rows.
    pub(crate) avg_transaction: f64,
    /// Unadjusted totals.
    pub(crate) raw_totals: RawTotals,
}

impl MetricsRecord {
    /// Expense magnitudes per category after the lending adjustment.
    #[inline]
    #[must_use]
    pub const fn spending_by_category(&self) -> &CategoryTotals {
        &self.spending_by_category
    }

    /// Income per category, repayment category excluded.
    #[inline]
    #[must_use]
    pub const fn income_by_category(&self) -> &CategoryTotals {
        &self.income_by_category
    }

    /// Adjusted total spending.
    #[inline]
    #[must_use]
    pub const fn total_spending(&self) -> f64 {
        self.total_spending
    }

    /// Adjusted total income.
    #[inline]
    #[must_use]
    pub const fn total_income(&self) -> f64 {
        self.total_income
    }

    /// Income minus spending.
    #[inline]
    #[must_use]
    pub const fn net_balance(&self) -> f64 {
        self.net_balance
    }

    /// Raw charity expenses.
    #[inline]
    #[must_use]
    pub const fn charity_spending(&self) -> f64 {
        self.charity_spending
    }

    /// Adjusted spending minus charity.
    #[inline]
    #[must_use]
    pub const fn spending_excluding_charity(&self) -> f64 {
        self.spending_excluding_charity
    }

    /// Charity share of adjusted spending in percent (0 when nothing was spent).
    #[inline]
    #[must_use]
    pub const fn charity_percentage(&self) -> f64 {
        self.charity_percentage
    }

    /// Charity / lending / normal split of adjusted spending.
    #[inline]
    #[must_use]
    pub const fn simplified_spending(&self) -> SimplifiedSpending {
        self.simplified_spending
    }

    /// All lending figures at once.
    #[inline]
    #[must_use]
    pub const fn lending(&self) -> LendingPosition {
        self.lending
    }

    /// Raw loan expense.
    #[inline]
    #[must_use]
    pub const fn total_lending(&self) -> f64 {
        self.lending.total_lending
    }

    /// Raw repayment income.
    #[inline]
    #[must_use]
    pub const fn repaid_lending(&self) -> f64 {
        self.lending.repaid_lending
    }

    /// Unpaid lending counted as spending.
    #[inline]
    #[must_use]
    pub const fn outstanding_lending(&self) -> f64 {
        self.lending.outstanding_lending
    }

    /// Repayments beyond the amount lent.
    #[inline]
    #[must_use]
    pub const fn excess_repayment(&self) -> f64 {
        self.lending.excess_repayment
    }

    /// Number of transactions aggregated.
    #[inline]
    #[must_use]
    pub const fn transaction_count(&self) -> usize {
        self.transaction_count
    }

    /// Mean signed amount (0 for an empty subset).
    #[inline]
    #[must_use]
    pub const fn avg_transaction(&self) -> f64 {
        self.avg_transaction
    }

    /// Unadjusted totals and category maps.
    #[inline]
    #[must_use]
    pub const fn raw_totals(&self) -> &RawTotals {
        &self.raw_totals
    }
}
