//! Ledger loading from CSV files and spreadsheet workbooks.
//!
//! Turns a CSV export or the first worksheet of a workbook into cleaned
//! [`Transaction`]s. Headers are matched case-insensitively, the amount is
//! read from `ref_currency_amount` when present (already in the base
//! currency) or from `amount` otherwise, and rows whose amount cannot be
//! parsed are dropped and counted.

use alloc::borrow::Cow;
use core::fmt;
use std::ffi::OsStr;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use calamine::{Data, DataType, Range, Reader};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::currency::{RateTable, detect_currency, strip_currency_markers};
use crate::error::{LedgerError, Result};
use crate::models::{DEFAULT_DESCRIPTION, Transaction};

/// Columns every ledger must have.
const REQUIRED_COLUMNS: [&str; 2] = ["date", "category"];

/// Accepted timestamp layouts, tried in order.
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Accepted calendar-date layouts, tried in order.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Workbook extensions read through `calamine`.
const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Column the amounts were read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountSource {
    /// `ref_currency_amount`, already expressed in the base currency.
    RefCurrencyAmount,
    /// `amount`, possibly decorated with currency markers.
    Amount,
}

impl AmountSource {
    /// Header name of the column.
    #[inline]
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::RefCurrencyAmount => "ref_currency_amount",
            Self::Amount => "amount",
        }
    }
}

impl fmt::Display for AmountSource {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Result of loading one ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedLedger {
    /// Cleaned transactions in file order.
    pub transactions: Vec<Transaction>,
    /// Rows dropped because their amount could not be parsed.
    pub dropped_rows: usize,
    /// Rows whose amount was converted into the base currency.
    pub converted_rows: usize,
    /// Column the amounts were read from.
    pub amount_source: AmountSource,
}

/// Positions of the recognised columns in the header row.
#[derive(Debug)]
struct ColumnMap {
    /// `date` column.
    date: usize,
    /// `category` column.
    category: usize,
    /// Amount column and where it came from.
    amount: (usize, AmountSource),
    /// Optional `description` column.
    description: Option<usize>,
    /// Optional `currency` column.
    currency: Option<usize>,
}

impl ColumnMap {
    /// Resolves column positions from raw header cells.
    fn from_headers<I, S>(cells: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let headers: Vec<String> = cells
            .into_iter()
            .map(|header| header.as_ref().trim().to_lowercase())
            .collect();
        Self::resolve(&headers)
    }

    /// Resolves column positions from normalised header names.
    fn resolve(headers: &[String]) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|header| header == name);

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|&&name| find(name).is_none())
            .map(|&name| name.to_owned())
            .collect();
        let (Some(date), Some(category)) = (find("date"), find("category")) else {
            return Err(LedgerError::MissingColumns(missing));
        };

        let amount = find(AmountSource::RefCurrencyAmount.column())
            .map(|idx| (idx, AmountSource::RefCurrencyAmount))
            .or_else(|| find(AmountSource::Amount.column()).map(|idx| (idx, AmountSource::Amount)))
            .ok_or(LedgerError::MissingAmountColumn)?;

        Ok(Self {
            date,
            category,
            amount,
            description: find("description"),
            currency: find("currency"),
        })
    }
}

/// Cell access shared by CSV records and workbook rows.
trait LedgerRow {
    /// Text of the cell at `col`, empty when the cell is absent.
    fn text(&self, col: usize) -> Cow<'_, str>;

    /// Timestamp of the cell at `col`, if it holds a recognisable date.
    fn date(&self, col: usize) -> Option<NaiveDateTime>;
}

impl LedgerRow for csv::StringRecord {
    fn text(&self, col: usize) -> Cow<'_, str> {
        Cow::Borrowed(self.get(col).unwrap_or_default())
    }

    fn date(&self, col: usize) -> Option<NaiveDateTime> {
        parse_date(self.get(col)?)
    }
}

impl LedgerRow for [Data] {
    fn text(&self, col: usize) -> Cow<'_, str> {
        match self.get(col) {
            Some(cell) if !cell.is_empty() => cell
                .get_string()
                .map_or_else(|| Cow::Owned(cell.to_string()), Cow::Borrowed),
            Some(_) | None => Cow::Borrowed(""),
        }
    }

    fn date(&self, col: usize) -> Option<NaiveDateTime> {
        let cell = self.get(col)?;
        match cell.get_string() {
            Some(text) => parse_date(text),
            // Native date cells and Excel serial numbers.
            None => cell
                .as_datetime()
                .or_else(|| cell.as_string().and_then(|text| parse_date(&text))),
        }
    }
}

/// Loader for CSV ledgers and spreadsheet workbooks.
///
/// # Examples
///
/// ```
/// use ledger_report::loader::LedgerLoader;
///
/// let csv = "Date,Category,Amount,Description\n2025-03-01,Food,-$12.50,Lunch\n";
/// let ledger = LedgerLoader::new().load_reader(csv.as_bytes()).unwrap();
/// assert_eq!(ledger.transactions.len(), 1);
/// assert_eq!(ledger.transactions[0].amount, -12.5);
/// ```
#[derive(Debug, Default, Clone)]
pub struct LedgerLoader {
    /// Rates used to convert foreign `amount` values, if any.
    rates: Option<RateTable>,
}

impl LedgerLoader {
    /// Creates a loader without currency conversion.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Converts amounts marked with a foreign currency into `rates.base`.
    ///
    /// Only applies to the `amount` column; `ref_currency_amount` is
    /// already in the base currency.
    #[inline]
    #[must_use]
    pub fn with_rates(mut self, rates: RateTable) -> Self {
        self.rates = Some(rates);
        self
    }

    /// Loads a ledger file, choosing the reader by extension.
    ///
    /// `.csv` files go through [`LedgerLoader::load_reader`]; `.xlsx`,
    /// `.xlsm`, `.xlsb`, `.xls` and `.ods` through
    /// [`LedgerLoader::load_workbook`].
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::UnsupportedFormat`] for any other extension,
    /// [`LedgerError::Io`] if a CSV file cannot be opened, and any error of
    /// the selected reader.
    #[inline]
    #[tracing::instrument(skip_all, fields(path = %path.display()))]
    pub fn load_path(&self, path: &Path) -> Result<LoadedLedger> {
        let extension = path
            .extension()
            .and_then(OsStr::to_str)
            .map(str::to_lowercase)
            .unwrap_or_default();
        if WORKBOOK_EXTENSIONS.contains(&extension.as_str()) {
            return self.load_workbook(path);
        }
        if extension != "csv" {
            return Err(LedgerError::UnsupportedFormat(format!(".{extension}")));
        }
        let file = File::open(path).map_err(|err| LedgerError::io(path, err))?;
        self.load_reader(file)
    }

    /// Loads a ledger from any CSV source with a header row.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::MissingColumns`] or
    /// [`LedgerError::MissingAmountColumn`] for an incomplete header,
    /// [`LedgerError::InvalidDate`] for an unparseable date,
    /// [`LedgerError::MissingCategory`] for an empty category and
    /// [`LedgerError::Csv`] for malformed CSV.
    #[inline]
    pub fn load_reader<R: Read>(&self, reader: R) -> Result<LoadedLedger> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let columns = ColumnMap::from_headers(rdr.headers()?)?;
        let mut ledger = LoadedLedger::empty(columns.amount.1);
        for (idx, result) in rdr.records().enumerate() {
            let record = result?;
            self.ingest(&columns, idx.saturating_add(1), &record, &mut ledger)?;
        }
        Ok(ledger.finish())
    }

    /// Loads the first worksheet of a spreadsheet workbook.
    ///
    /// The first row holds the headers. Date cells may be text, native
    /// date cells or Excel serial numbers. Entirely empty rows are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Workbook`] if the file cannot be opened as a
    /// workbook, [`LedgerError::EmptyWorkbook`] if it has no worksheet, and
    /// the same row errors as [`LedgerLoader::load_reader`].
    #[inline]
    #[tracing::instrument(skip_all, fields(path = %path.display()))]
    pub fn load_workbook(&self, path: &Path) -> Result<LoadedLedger> {
        let workbook_error = |source: calamine::Error| LedgerError::Workbook {
            path: path.to_path_buf(),
            source,
        };
        let mut workbook = calamine::open_workbook_auto(path).map_err(workbook_error)?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| LedgerError::EmptyWorkbook(path.to_path_buf()))?
            .map_err(workbook_error)?;
        self.load_range(&range)
    }

    /// Runs the row pipeline over a worksheet range whose first row holds
    /// the headers.
    fn load_range(&self, range: &Range<Data>) -> Result<LoadedLedger> {
        let mut rows = range.rows();
        let headers: Vec<String> = rows
            .next()
            .map(|header| header.iter().map(ToString::to_string).collect())
            .unwrap_or_default();
        let columns = ColumnMap::from_headers(&headers)?;
        let mut ledger = LoadedLedger::empty(columns.amount.1);
        for (idx, row) in rows.enumerate() {
            if row.iter().all(DataType::is_empty) {
                continue;
            }
            self.ingest(&columns, idx.saturating_add(1), row, &mut ledger)?;
        }
        Ok(ledger.finish())
    }

    /// Cleans one data row and appends it to `ledger`.
    fn ingest<R: LedgerRow + ?Sized>(
        &self,
        columns: &ColumnMap,
        row: usize,
        cells: &R,
        ledger: &mut LoadedLedger,
    ) -> Result<()> {
        let date = cells
            .date(columns.date)
            .ok_or_else(|| LedgerError::InvalidDate {
                row,
                value: cells.text(columns.date).into_owned(),
            })?;

        let category = cells.text(columns.category);
        if category.trim().is_empty() {
            return Err(LedgerError::MissingCategory { row });
        }

        let (amount_col, amount_source) = columns.amount;
        let raw_amount = cells.text(amount_col);
        let Some(parsed) = parse_amount(&raw_amount) else {
            tracing::trace!(row, value = %raw_amount, "dropping row with invalid amount");
            ledger.dropped_rows = ledger.dropped_rows.saturating_add(1);
            return Ok(());
        };

        let convertible = self
            .rates
            .as_ref()
            .filter(|_| amount_source == AmountSource::Amount);
        let amount = match convertible {
            Some(rates) => {
                let marker = columns
                    .currency
                    .map(|col| cells.text(col))
                    .filter(|code| !code.is_empty());
                let currency = marker.as_deref().map_or_else(
                    || detect_currency(&raw_amount, &rates.base).to_owned(),
                    str::to_uppercase,
                );
                if currency == rates.base {
                    parsed
                } else {
                    ledger.converted_rows = ledger.converted_rows.saturating_add(1);
                    rates.to_base(parsed, &currency)
                }
            }
            None => parsed,
        };

        let description = columns
            .description
            .map(|col| cells.text(col))
            .filter(|text| !text.is_empty());

        ledger.transactions.push(
            Transaction::new(date, category, amount)
                .with_description(description.as_deref().unwrap_or(DEFAULT_DESCRIPTION)),
        );
        Ok(())
    }
}

impl LoadedLedger {
    /// An empty ledger reading amounts from `amount_source`.
    const fn empty(amount_source: AmountSource) -> Self {
        Self {
            transactions: Vec::new(),
            dropped_rows: 0,
            converted_rows: 0,
            amount_source,
        }
    }

    /// Logs the load outcome and returns the ledger.
    fn finish(self) -> Self {
        if self.dropped_rows > 0 {
            tracing::warn!(dropped_rows = self.dropped_rows, "removed rows with invalid amounts");
        }
        if self.converted_rows > 0 {
            tracing::info!(
                converted_rows = self.converted_rows,
                "converted foreign-currency amounts"
            );
        }
        tracing::debug!(
            rows = self.transactions.len(),
            amount_source = %self.amount_source,
            "loaded ledger"
        );
        self
    }
}

/// Parses a date or timestamp cell; date-only values become midnight.
fn parse_date(text: &str) -> Option<NaiveDateTime> {
    let value = text.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
                .map(|day| day.and_time(NaiveTime::MIN))
        })
}

/// Parses an amount cell after stripping currency markers.
fn parse_amount(text: &str) -> Option<f64> {
    strip_currency_markers(text)
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::fs;

    use rust_xlsxwriter::{Format, Workbook, XlsxError};

    use super::*;

    /// Tolerance for amount comparisons.
    const EPS: f64 = 1e-9;

    /// Loads `csv` with default options.
    fn load(csv: &str) -> Result<LoadedLedger> {
        LedgerLoader::new().load_reader(csv.as_bytes())
    }

    /// Builds a worksheet range from rows of cells; the first row is the header.
    fn sheet(rows: &[Vec<Data>]) -> Range<Data> {
        let height = u32::try_from(rows.len()).unwrap();
        let width = u32::try_from(rows.iter().map(Vec::len).max().unwrap_or(1)).unwrap();
        let mut range = Range::new((0, 0), (height - 1, width - 1));
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                let pos = (u32::try_from(r).unwrap(), u32::try_from(c).unwrap());
                range.set_value(pos, cell.clone());
            }
        }
        range
    }

    /// Text cell.
    fn text(value: &str) -> Data {
        Data::String(value.to_owned())
    }

    /// Writes a ledger workbook mixing text dates, a date-formatted cell and
    /// a bare Excel serial number.
    fn write_workbook(path: &Path) -> core::result::Result<(), XlsxError> {
        let mut workbook = Workbook::new();
        let date_format = Format::new().set_num_format("yyyy-mm-dd");
        let sheet = workbook.add_worksheet();
        _ = sheet.write_string(0, 0, "Date")?;
        _ = sheet.write_string(0, 1, "Category")?;
        _ = sheet.write_string(0, 2, "Amount")?;
        _ = sheet.write_string(0, 3, "Description")?;

        _ = sheet.write_string(1, 0, "2025-03-01")?;
        _ = sheet.write_string(1, 1, "Food")?;
        _ = sheet.write_number(1, 2, -12.5_f64)?;
        _ = sheet.write_string(1, 3, "Lunch")?;

        _ = sheet.write_number_with_format(2, 0, 45717.0_f64, &date_format)?;
        _ = sheet.write_string(2, 1, "Salary")?;
        _ = sheet.write_string(2, 2, "$1,500.00")?;

        _ = sheet.write_number(3, 0, 45718.0_f64)?;
        _ = sheet.write_string(3, 1, "Charity")?;
        _ = sheet.write_number(3, 2, -40.0_f64)?;

        _ = sheet.write_string(4, 0, "2025-03-03")?;
        _ = sheet.write_string(4, 1, "Food")?;
        _ = sheet.write_string(4, 2, "n/a")?;
        workbook.save(path)
    }

    #[test]
    fn headers_are_case_insensitive() {
        let ledger = load(" DATE ,Category,AMOUNT\n2025-01-02,Food,-5\n").unwrap();
        assert_eq!(ledger.transactions.len(), 1);
        assert_eq!(ledger.amount_source, AmountSource::Amount);
        assert_eq!(ledger.transactions[0].category, "Food");
    }

    #[test]
    fn ref_currency_amount_wins() {
        let csv = "date,category,amount,ref_currency_amount\n2025-01-02,Food,-5 USD,-250\n";
        let ledger = load(csv).unwrap();
        assert_eq!(ledger.amount_source, AmountSource::RefCurrencyAmount);
        assert!((ledger.transactions[0].amount + 250.0).abs() < EPS);
    }

    #[test]
    fn missing_required_columns_are_listed() {
        let err = load("when,amount\n2025-01-02,5\n").unwrap_err();
        match err {
            LedgerError::MissingColumns(columns) => assert_eq!(columns, ["date", "category"]),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn missing_amount_column() {
        let err = load("date,category,value\n2025-01-02,Food,5\n").unwrap_err();
        assert!(matches!(err, LedgerError::MissingAmountColumn));
    }

    #[test]
    fn amounts_are_cleaned() {
        let csv = "date,category,amount\n\
                   2025-01-02,Salary,\"$1,500.00\"\n\
                   2025-01-03,Food,-\u{20ac}20\n\
                   2025-01-04,Rent,\"-2,000 EGP\"\n\
                   2025-01-05,Misc,\u{a3}3.5\n";
        let amounts: Vec<f64> = load(csv)
            .unwrap()
            .transactions
            .iter()
            .map(|tx| tx.amount)
            .collect();
        assert_eq!(amounts.len(), 4);
        assert!((amounts[0] - 1500.0).abs() < EPS);
        assert!((amounts[1] + 20.0).abs() < EPS);
        assert!((amounts[2] + 2000.0).abs() < EPS);
        assert!((amounts[3] - 3.5).abs() < EPS);
    }

    #[test]
    fn invalid_amounts_are_dropped() {
        let csv = "date,category,amount\n\
                   2025-01-02,Food,-5\n\
                   2025-01-03,Food,n/a\n\
                   2025-01-04,Food,\n\
                   2025-01-05,Food,NaN\n";
        let ledger = load(csv).unwrap();
        assert_eq!(ledger.transactions.len(), 1);
        assert_eq!(ledger.dropped_rows, 3);
    }

    #[test]
    fn date_layouts() {
        let csv = "date,category,amount\n\
                   2025-03-01,A,1\n\
                   2025-03-01 14:30:00,B,1\n\
                   2025-03-01T14:30:00,C,1\n\
                   2025/03/01,D,1\n\
                   03/01/2025,E,1\n";
        let ledger = load(csv).unwrap();
        let expected = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        assert!(ledger.transactions.iter().all(|tx| tx.day() == expected));
        assert_eq!(ledger.transactions[1].date.format("%H:%M").to_string(), "14:30");
    }

    #[test]
    fn invalid_date_reports_row() {
        let csv = "date,category,amount\n2025-03-01,A,1\nyesterday,B,1\n";
        match load(csv).unwrap_err() {
            LedgerError::InvalidDate { row, value } => {
                assert_eq!(row, 2);
                assert_eq!(value, "yesterday");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn missing_description_is_filled() {
        let csv = "date,category,amount,description\n\
                   2025-01-02,Food,-5,\n\
                   2025-01-03,Food,-6,Dinner\n";
        let ledger = load(csv).unwrap();
        assert_eq!(ledger.transactions[0].description, DEFAULT_DESCRIPTION);
        assert_eq!(ledger.transactions[1].description, "Dinner");

        let without_column = load("date,category,amount\n2025-01-02,Food,-5\n").unwrap();
        assert_eq!(without_column.transactions[0].description, DEFAULT_DESCRIPTION);
    }

    #[test]
    fn foreign_amounts_are_converted() {
        let rates = RateTable::new(
            "EGP",
            BTreeMap::from([("EGP".to_owned(), 1.0), ("USD".to_owned(), 0.02)]),
            None,
        );
        let csv = "date,category,amount\n\
                   2025-01-02,Food,-10 USD\n\
                   2025-01-03,Food,-100\n";
        let ledger = LedgerLoader::new()
            .with_rates(rates)
            .load_reader(csv.as_bytes())
            .unwrap();
        assert_eq!(ledger.converted_rows, 1);
        assert!((ledger.transactions[0].amount + 500.0).abs() < EPS);
        assert!((ledger.transactions[1].amount + 100.0).abs() < EPS);
    }

    #[test]
    fn currency_column_drives_conversion() {
        let rates = RateTable::new("EGP", BTreeMap::from([("EUR".to_owned(), 0.02)]), None);
        let csv = "date,category,amount,currency\n2025-01-02,Food,-10,eur\n";
        let ledger = LedgerLoader::new()
            .with_rates(rates)
            .load_reader(csv.as_bytes())
            .unwrap();
        assert!((ledger.transactions[0].amount + 500.0).abs() < EPS);
    }

    #[test]
    fn load_path_reads_csv_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.CSV");
        fs::write(&path, "date,category,amount\n2025-01-02,Food,-5\n").unwrap();
        let ledger = LedgerLoader::new().load_path(&path).unwrap();
        assert_eq!(ledger.transactions.len(), 1);
    }

    #[test]
    fn load_path_rejects_other_formats() {
        let dir = tempfile::tempdir().unwrap();
        let err = LedgerLoader::new()
            .load_path(&dir.path().join("ledger.txt"))
            .unwrap_err();
        assert!(matches!(err, LedgerError::UnsupportedFormat(_)));
        assert!(err.to_string().contains(".txt"));
    }

    #[test]
    fn empty_category_is_rejected_with_row() {
        let csv = "date,category,amount\n2025-03-01,Food,-5\n2025-03-02,,-7\n";
        match load(csv).unwrap_err() {
            LedgerError::MissingCategory { row } => assert_eq!(row, 2),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn load_path_reads_xlsx_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.xlsx");
        write_workbook(&path).unwrap();

        let ledger = LedgerLoader::new().load_path(&path).unwrap();
        assert_eq!(ledger.amount_source, AmountSource::Amount);
        assert_eq!(ledger.dropped_rows, 1);
        assert_eq!(ledger.transactions.len(), 3);

        let days: Vec<NaiveDate> = ledger.transactions.iter().map(Transaction::day).collect();
        assert_eq!(
            days,
            [
                NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 3, 2).unwrap(),
            ]
        );
        let amounts: Vec<f64> = ledger.transactions.iter().map(|tx| tx.amount).collect();
        assert!((amounts[0] + 12.5).abs() < EPS);
        assert!((amounts[1] - 1500.0).abs() < EPS);
        assert!((amounts[2] + 40.0).abs() < EPS);
        assert_eq!(ledger.transactions[0].description, "Lunch");
        assert_eq!(ledger.transactions[1].description, DEFAULT_DESCRIPTION);
    }

    #[test]
    fn worksheet_cells_feed_the_row_pipeline() {
        let range = sheet(&[
            vec![text(" DATE "), text("Category"), text("Amount"), text("Currency")],
            vec![
                Data::DateTimeIso("2025-03-01T10:00:00".to_owned()),
                text("Food"),
                Data::Float(-10.0),
                Data::Empty,
            ],
            vec![Data::Empty, Data::Empty, Data::Empty, Data::Empty],
            vec![Data::Int(45717), text("Rent"), Data::Int(-200), Data::Empty],
            vec![text("2025/03/02"), text("Gift"), Data::Float(-5.0), text("usd")],
        ]);
        let rates = RateTable::new("EGP", BTreeMap::from([("USD".to_owned(), 0.02)]), None);
        let ledger = LedgerLoader::new().with_rates(rates).load_range(&range).unwrap();

        assert_eq!(ledger.transactions.len(), 3);
        assert_eq!(ledger.converted_rows, 1);
        let first = &ledger.transactions[0];
        assert_eq!(first.date.format("%Y-%m-%d %H:%M").to_string(), "2025-03-01 10:00");
        assert_eq!(first.category, "Food");
        assert_eq!(ledger.transactions[1].day(), NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        assert!((ledger.transactions[1].amount + 200.0).abs() < EPS);
        assert!((ledger.transactions[2].amount + 250.0).abs() < EPS);
    }

    #[test]
    fn worksheet_row_errors_are_indexed() {
        let missing_category = sheet(&[
            vec![text("Date"), text("Category"), text("Amount")],
            vec![text("2025-03-01"), Data::Empty, Data::Float(-1.0)],
        ]);
        let err = LedgerLoader::new().load_range(&missing_category).unwrap_err();
        assert!(matches!(err, LedgerError::MissingCategory { row: 1 }));

        let bad_date = sheet(&[
            vec![text("Date"), text("Category"), text("Amount")],
            vec![Data::Bool(true), text("Food"), Data::Float(-1.0)],
        ]);
        let err_date = LedgerLoader::new().load_range(&bad_date).unwrap_err();
        assert!(matches!(err_date, LedgerError::InvalidDate { row: 1, .. }));
    }

    #[test]
    fn worksheet_without_required_headers() {
        let range = sheet(&[vec![text("When"), text("Amount")]]);
        let err = LedgerLoader::new().load_range(&range).unwrap_err();
        assert!(matches!(err, LedgerError::MissingColumns(_)));
    }

    #[test]
    fn unreadable_workbook_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.xlsx");
        fs::write(&path, "not a zip archive").unwrap();
        let err = LedgerLoader::new().load_path(&path).unwrap_err();
        assert!(matches!(err, LedgerError::Workbook { .. }));
        assert!(err.to_string().contains("broken.xlsx"));

        let missing = LedgerLoader::new()
            .load_path(&dir.path().join("absent.xls"))
            .unwrap_err();
        assert!(matches!(missing, LedgerError::Workbook { .. }));
    }

    #[test]
    fn load_path_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = LedgerLoader::new()
            .load_path(&dir.path().join("absent.csv"))
            .unwrap_err();
        assert!(matches!(err, LedgerError::Io { .. }));
    }
}
