//! Period partitioner.
//!
//! Groups transactions by calendar month, quarter or year and runs the
//! metrics engine once per group. Groups are closed computations: nothing
//! carries from one period into the next.

use std::collections::BTreeMap;

use crate::config::AnalysisConfig;
use crate::engine::compute_metrics;
use crate::models::{Granularity, MetricsRecord, PeriodKey, Transaction};

/// Metrics records keyed by period, iterated in chronological order.
pub type PeriodMetrics = BTreeMap<PeriodKey, MetricsRecord>;

/// Splits `transactions` into calendar groups.
///
/// Every returned group holds at least one transaction; row order inside a
/// group follows the input.
#[inline]
#[must_use]
pub fn partition_transactions(
    transactions: &[Transaction],
    granularity: Granularity,
) -> BTreeMap<PeriodKey, Vec<Transaction>> {
    let mut groups: BTreeMap<PeriodKey, Vec<Transaction>> = BTreeMap::new();
    for tx in transactions {
        groups
            .entry(granularity.key_for(tx.day()))
            .or_default()
            .push(tx.clone());
    }
    groups
}

/// Computes one [`MetricsRecord`] per calendar period.
///
/// An empty ledger produces an empty map.
#[inline]
#[must_use]
#[tracing::instrument(skip_all, fields(granularity = %granularity, rows = transactions.len()))]
pub fn partition_and_compute(
    transactions: &[Transaction],
    granularity: Granularity,
    config: &AnalysisConfig,
) -> PeriodMetrics {
    let periods: PeriodMetrics = partition_transactions(transactions, granularity)
        .into_iter()
        .map(|(key, group)| {
            let record = compute_metrics(&group, config);
            (key, record)
        })
        .collect();
    tracing::debug!(periods = periods.len(), "partitioned ledger");
    periods
}
