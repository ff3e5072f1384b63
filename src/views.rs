//! Secondary views over computed metrics.
//!
//! Every function here only reshapes existing [`MetricsRecord`]s; no
//! aggregation is repeated.

use crate::engine::percent_of;
use crate::models::{
    CategoryAmount, CharityAnalysis, CharityShare, LendingSummary, MetricsRecord, TrendPoint,
    TrendSeries,
};
use crate::partition::PeriodMetrics;

/// Returns the `n` largest spending categories of `record`.
///
/// Sorted by descending amount; equal amounts are ordered by name.
#[inline]
#[must_use]
pub fn top_categories(record: &MetricsRecord, n: usize) -> Vec<CategoryAmount> {
    record
        .spending_by_category()
        .sorted_desc()
        .into_iter()
        .take(n)
        .map(|(category, amount)| CategoryAmount { category, amount })
        .collect()
}

/// Builds the income / spending / balance series in period order.
#[inline]
#[must_use]
pub fn trend_series(periods: &PeriodMetrics) -> TrendSeries {
    TrendSeries {
        points: periods
            .iter()
            .map(|(period, record)| TrendPoint {
                period: period.clone(),
                income: record.total_income(),
                spending: record.total_spending(),
                balance: record.net_balance(),
            })
            .collect(),
    }
}

/// Collects the lending position of the whole ledger and of each period.
#[inline]
#[must_use]
pub fn lending_summary(all_time: &MetricsRecord, periods: &PeriodMetrics) -> LendingSummary {
    LendingSummary {
        overall: all_time.lending(),
        by_period: periods
            .iter()
            .map(|(period, record)| (period.clone(), record.lending()))
            .collect(),
    }
}

/// Collects charity spending of the whole ledger and of each period.
#[inline]
#[must_use]
pub fn charity_analysis(all_time: &MetricsRecord, periods: &PeriodMetrics) -> CharityAnalysis {
    CharityAnalysis {
        total_charity: all_time.charity_spending(),
        percentage_of_spending: percent_of(all_time.charity_spending(), all_time.total_spending()),
        by_period: periods
            .iter()
            .map(|(period, record)| {
                let share = CharityShare {
                    charity_amount: record.charity_spending(),
                    percentage_of_spending: record.charity_percentage(),
                };
                (period.clone(), share)
            })
            .collect(),
    }
}
