//! Metrics engine.
//!
//! [`compute_metrics`] turns a subset of cleaned transactions into a
//! [`MetricsRecord`]: raw per-category aggregation, loan/repayment netting,
//! the charity split and the simplified three-way bucket view. It is a pure
//! function of its inputs; the category labels it depends on arrive in an
//! explicit [`AnalysisConfig`].
//!
//! # Lending netting
//!
//! Money lent out is recorded as an expense in the loan category and money
//! paid back as income in the repayment category. Summing both as ordinary
//! cash flows would inflate income and spending alike, so the engine
//! collapses them into one net position:
//!
//! - `net = loan_expense - repayment_income`
//! - `net > 0`: only the unpaid remainder stays in the spending map.
//! - `net <= 0`: the loan category leaves the spending map; any surplus is
//!   reported as `excess_repayment`.
//! - The repayment category is always removed from the income map.
//!
//! The unadjusted maps are kept in [`RawTotals`].

use crate::config::AnalysisConfig;
use crate::models::{
    CategoryTotals, LendingPosition, MetricsRecord, RawTotals, SimplifiedSpending, Transaction,
};

/// Computes the metrics record for `transactions`.
///
/// Never fails: missing categories read as zero, an empty slice yields an
/// all-zero record, and percentages with a zero denominator are zero.
///
/// # Examples
///
/// ```
/// use ledger_report::config::AnalysisConfig;
/// use ledger_report::engine::compute_metrics;
/// use ledger_report::models::{NaiveDate, Transaction};
///
/// let day = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
/// let ledger = vec![
///     Transaction::on(day, "Loan, interests", -500.0),
///     Transaction::on(day, "Lending, renting", 200.0),
/// ];
/// let record = compute_metrics(&ledger, &AnalysisConfig::default());
/// assert_eq!(record.outstanding_lending(), 300.0);
/// assert_eq!(record.spending_by_category().get_or_zero("Loan, interests"), 300.0);
/// ```
#[inline]
#[must_use]
#[tracing::instrument(skip_all, fields(rows = transactions.len()))]
pub fn compute_metrics(transactions: &[Transaction], config: &AnalysisConfig) -> MetricsRecord {
    let spending_raw = fold_by_category(transactions, Transaction::is_expense, f64::abs);
    let income_raw = fold_by_category(transactions, Transaction::is_income, |amount| amount);

    let lending = net_lending(
        spending_raw.get_or_zero(&config.loan_category),
        income_raw.get_or_zero(&config.repayment_category),
    );

    let mut spending = spending_raw.clone();
    if lending.outstanding_lending > 0.0_f64 {
        spending.set(&config.loan_category, lending.outstanding_lending);
    } else {
        let _settled = spending.remove(&config.loan_category);
    }

    let mut income = income_raw.clone();
    let _repaid = income.remove(&config.repayment_category);

    let total_spending = spending.total();
    let total_income = income.total();
    let charity_spending = spending_raw.get_or_zero(&config.charity_category);
    let simplified_spending = simplify_spending(&spending, config);

    tracing::debug!(
        total_spending,
        total_income,
        outstanding = lending.outstanding_lending,
        excess = lending.excess_repayment,
        "computed metrics"
    );

    MetricsRecord {
        total_spending,
        total_income,
        net_balance: total_income - total_spending,
        charity_spending,
        spending_excluding_charity: total_spending - charity_spending,
        charity_percentage: percent_of(charity_spending, total_spending),
        simplified_spending,
        lending,
        transaction_count: transactions.len(),
        avg_transaction: mean(transactions.iter().map(|tx| tx.amount)),
        raw_totals: RawTotals {
            total_spending_raw: spending_raw.total(),
            total_income_raw: income_raw.total(),
            spending_by_category_raw: spending_raw,
            income_by_category_raw: income_raw,
        },
        spending_by_category: spending,
        income_by_category: income,
    }
}

/// Nets a loan expense against its repayments.
///
/// Exactly one of `outstanding_lending` / `excess_repayment` is non-zero
/// unless both flows are equal.
#[inline]
#[must_use]
pub fn net_lending(loan_expense: f64, loan_income: f64) -> LendingPosition {
    let net = loan_expense - loan_income;
    LendingPosition {
        total_lending: loan_expense,
        repaid_lending: loan_income,
        outstanding_lending: if net > 0.0_f64 { net } else { 0.0_f64 },
        excess_repayment: if net < 0.0_f64 { -net } else { 0.0_f64 },
    }
}

/// Assigns every adjusted spending category to exactly one bucket.
///
/// Charity membership is checked first, then lending; everything else is
/// normal spending.
#[inline]
#[must_use]
pub fn simplify_spending(spending: &CategoryTotals, config: &AnalysisConfig) -> SimplifiedSpending {
    spending
        .iter()
        .fold(SimplifiedSpending::default(), |mut split, (category, amount)| {
            if config.is_charity_bucket(category) {
                split.charity += amount;
            } else if config.is_lending_bucket(category) {
                split.lending += amount;
            } else {
                split.normal += amount;
            }
            split
        })
}

/// Returns `part / whole * 100`, or zero when `whole` is not positive.
#[inline]
#[must_use]
pub fn percent_of(part: f64, whole: f64) -> f64 {
    if whole > 0.0_f64 && whole.is_finite() {
        part / whole * 100.0_f64
    } else {
        0.0_f64
    }
}

/// Sums `magnitude(amount)` per category over the rows matching `include`.
fn fold_by_category<P, M>(transactions: &[Transaction], include: P, magnitude: M) -> CategoryTotals
where
    P: Fn(&Transaction) -> bool,
    M: Fn(f64) -> f64,
{
    transactions
        .iter()
        .filter(|tx| include(tx))
        .fold(CategoryTotals::new(), |mut totals, tx| {
            totals.add(&tx.category, magnitude(tx.amount));
            totals
        })
}

/// Arithmetic mean, zero for an empty sequence.
fn mean<I: Iterator<Item = f64>>(values: I) -> f64 {
    let (sum, count) = values.fold((0.0_f64, 0.0_f64), |(sum, count), value| {
        (sum + value, count + 1.0_f64)
    });
    if count > 0.0_f64 { sum / count } else { 0.0_f64 }
}
