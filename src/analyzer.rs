//! High-level analysis facade.
//!
//! [`FinancialAnalyzer`] owns a cleaned ledger and its [`AnalysisConfig`]
//! and exposes the all-time, per-period and reshaped views that report
//! generators consume. [`TransactionFilter`] narrows a ledger before
//! analysis.

use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::engine::compute_metrics;
use crate::models::{
    CategoryAmount, CharityAnalysis, Granularity, LendingSummary, MetricsRecord, NaiveDate,
    Transaction, TrendSeries,
};
use crate::partition::{PeriodMetrics, partition_and_compute};
use crate::views;

/// Composable filter applied to a ledger before analysis.
///
/// All set criteria must hold for a transaction to pass.
///
/// # Examples
///
/// ```
/// use ledger_report::analyzer::TransactionFilter;
/// use ledger_report::models::NaiveDate;
///
/// let filter = TransactionFilter::new()
///     .date_range(
///         NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
///         NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
///     )
///     .category("Food")
///     .amount_range(10.0, 500.0);
/// ```
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TransactionFilter {
    /// Start date (inclusive).
    pub date_from: Option<NaiveDate>,
    /// End date (inclusive).
    pub date_to: Option<NaiveDate>,
    /// Exact category label.
    pub category: Option<String>,
    /// Minimum absolute amount (inclusive).
    pub min_amount: Option<f64>,
    /// Maximum absolute amount (inclusive).
    pub max_amount: Option<f64>,
}

impl TransactionFilter {
    /// Creates an empty filter that matches all transactions.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts to transactions on or after `from`.
    #[inline]
    #[must_use]
    pub const fn since(mut self, from: NaiveDate) -> Self {
        self.date_from = Some(from);
        self
    }

    /// Restricts to transactions on or before `to`.
    #[inline]
    #[must_use]
    pub const fn until(mut self, to: NaiveDate) -> Self {
        self.date_to = Some(to);
        self
    }

    /// Restricts to transactions within the given date range (inclusive).
    #[inline]
    #[must_use]
    pub const fn date_range(self, from: NaiveDate, to: NaiveDate) -> Self {
        self.since(from).until(to)
    }

    /// Restricts to transactions with exactly this category.
    #[inline]
    #[must_use]
    pub fn category<T: Into<String>>(mut self, category: T) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Restricts to transactions whose absolute amount lies in `[min, max]`.
    #[inline]
    #[must_use]
    pub const fn amount_range(mut self, min: f64, max: f64) -> Self {
        self.min_amount = Some(min);
        self.max_amount = Some(max);
        self
    }

    /// Returns `true` if no criterion is set.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.date_from.is_none()
            && self.date_to.is_none()
            && self.category.is_none()
            && self.min_amount.is_none()
            && self.max_amount.is_none()
    }

    /// Returns `true` if the transaction satisfies all set criteria.
    #[inline]
    #[must_use]
    pub fn matches(&self, tx: &Transaction) -> bool {
        self.matches_date(tx) && self.matches_category(tx) && self.matches_amount(tx)
    }

    /// Checks date range criteria.
    fn matches_date(&self, tx: &Transaction) -> bool {
        let day = tx.day();
        self.date_from.is_none_or(|from| day >= from) && self.date_to.is_none_or(|to| day <= to)
    }

    /// Checks category criteria.
    fn matches_category(&self, tx: &Transaction) -> bool {
        self.category
            .as_deref()
            .is_none_or(|category| tx.category == category)
    }

    /// Checks amount range criteria.
    fn matches_amount(&self, tx: &Transaction) -> bool {
        let magnitude = tx.amount.abs();
        self.min_amount.is_none_or(|min| magnitude >= min)
            && self.max_amount.is_none_or(|max| magnitude <= max)
    }
}

/// All-time, monthly and yearly metrics computed in one pass for reports.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResults {
    /// Record over the entire ledger.
    pub all_time: MetricsRecord,
    /// One record per calendar month.
    pub monthly: PeriodMetrics,
    /// One record per calendar year.
    pub yearly: PeriodMetrics,
    /// First and last transaction day, if any.
    pub date_span: Option<(NaiveDate, NaiveDate)>,
}

/// Analysis facade over one cleaned ledger.
#[derive(Debug, Clone)]
pub struct FinancialAnalyzer {
    /// Cleaned transactions.
    transactions: Vec<Transaction>,
    /// Category labels used by every computation.
    config: AnalysisConfig,
}

impl FinancialAnalyzer {
    /// Creates an analyzer over `transactions`.
    #[inline]
    #[must_use]
    pub const fn new(transactions: Vec<Transaction>, config: AnalysisConfig) -> Self {
        Self {
            transactions,
            config,
        }
    }

    /// Transactions under analysis.
    #[inline]
    #[must_use]
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Configuration used by every computation.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Returns a new analyzer over the transactions matching `filter`.
    #[inline]
    #[must_use]
    pub fn filtered(&self, filter: &TransactionFilter) -> Self {
        let transactions: Vec<Transaction> = self
            .transactions
            .iter()
            .filter(|tx| filter.matches(tx))
            .cloned()
            .collect();
        tracing::debug!(
            kept = transactions.len(),
            total = self.transactions.len(),
            "applied transaction filter"
        );
        Self::new(transactions, self.config.clone())
    }

    /// First and last transaction day, or `None` for an empty ledger.
    #[inline]
    #[must_use]
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.transactions.iter().map(Transaction::day).min()?;
        let last = self.transactions.iter().map(Transaction::day).max()?;
        Some((first, last))
    }

    /// Metrics over the entire ledger.
    #[inline]
    #[must_use]
    pub fn analyze_all_time(&self) -> MetricsRecord {
        compute_metrics(&self.transactions, &self.config)
    }

    /// Metrics per calendar period.
    #[inline]
    #[must_use]
    pub fn analyze_by_period(&self, granularity: Granularity) -> PeriodMetrics {
        partition_and_compute(&self.transactions, granularity, &self.config)
    }

    /// The `n` largest all-time spending categories.
    #[inline]
    #[must_use]
    pub fn top_spending_categories(&self, n: usize) -> Vec<CategoryAmount> {
        views::top_categories(&self.analyze_all_time(), n)
    }

    /// Income, spending and balance per period.
    #[inline]
    #[must_use]
    pub fn trend(&self, granularity: Granularity) -> TrendSeries {
        views::trend_series(&self.analyze_by_period(granularity))
    }

    /// Income, spending and balance per month.
    #[inline]
    #[must_use]
    pub fn monthly_summary(&self) -> TrendSeries {
        self.trend(Granularity::Month)
    }

    /// All-time and monthly lending positions.
    #[inline]
    #[must_use]
    pub fn lending_summary(&self) -> LendingSummary {
        views::lending_summary(
            &self.analyze_all_time(),
            &self.analyze_by_period(Granularity::Month),
        )
    }

    /// All-time and monthly charity spending.
    #[inline]
    #[must_use]
    pub fn charity_analysis(&self) -> CharityAnalysis {
        views::charity_analysis(
            &self.analyze_all_time(),
            &self.analyze_by_period(Granularity::Month),
        )
    }

    /// Headline all-time figures.
    #[inline]
    #[must_use]
    pub fn quick_summary(&self) -> MetricsRecord {
        self.analyze_all_time()
    }

    /// Bundles the all-time, monthly and yearly records for report generators.
    #[inline]
    #[must_use]
    #[tracing::instrument(skip_all, fields(rows = self.transactions.len()))]
    pub fn report_data(&self) -> AnalysisResults {
        AnalysisResults {
            all_time: self.analyze_all_time(),
            monthly: self.analyze_by_period(Granularity::Month),
            yearly: self.analyze_by_period(Granularity::Year),
            date_span: self.date_span(),
        }
    }
}
