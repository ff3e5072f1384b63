//! Flat CSV export of the all-time category totals.

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::{ReportData, ReportGenerator, ensure_parent};
use crate::error::{LedgerError, Result};

/// Row type for category spending.
const SPENDING: &str = "Spending";
/// Row type for category income.
const INCOME: &str = "Income";
/// Row type for the closing totals.
const TOTAL: &str = "Total";

/// One exported line.
#[derive(Debug, Serialize)]
struct Row<'row> {
    /// Spending, Income or Total.
    #[serde(rename = "Type")]
    kind: &'static str,
    /// Category name or total label.
    #[serde(rename = "Category")]
    category: &'row str,
    /// Amount with two decimals.
    #[serde(rename = "Amount")]
    amount: String,
}

impl<'row> Row<'row> {
    /// Builds a row, rounding the amount to cents.
    fn new(kind: &'static str, category: &'row str, amount: f64) -> Self {
        Self {
            kind,
            category,
            amount: format!("{amount:.2}"),
        }
    }
}

/// Writes `Type,Category,Amount` rows: every spending category, every
/// income category, then total income, total spending and net balance.
///
/// Categories are listed alphabetically within their block.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvReport;

impl ReportGenerator for CsvReport {
    #[inline]
    #[tracing::instrument(skip_all, fields(output = %output.display()))]
    fn generate(&self, data: &ReportData<'_>, output: &Path) -> Result<PathBuf> {
        let record = &data.results.all_time;
        let spending = record
            .spending_by_category()
            .iter()
            .map(|(category, amount)| Row::new(SPENDING, category, amount));
        let income = record
            .income_by_category()
            .iter()
            .map(|(category, amount)| Row::new(INCOME, category, amount));
        let totals = [
            Row::new(TOTAL, "Total Income", record.total_income()),
            Row::new(TOTAL, "Total Spending", record.total_spending()),
            Row::new(TOTAL, "Net Balance", record.net_balance()),
        ];

        ensure_parent(output)?;
        let file = File::create(output).map_err(|err| LedgerError::io(output, err))?;
        let mut writer = csv::Writer::from_writer(file);
        let mut rows = 0_usize;
        for row in spending.chain(income).chain(totals) {
            writer.serialize(row)?;
            rows += 1;
        }
        writer.flush().map_err(|err| LedgerError::io(output, err))?;

        tracing::debug!(rows, "wrote CSV report");
        Ok(output.to_path_buf())
    }
}
