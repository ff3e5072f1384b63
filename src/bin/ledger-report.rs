//! Command-line front end: summaries, period breakdowns and reports for a
//! CSV or spreadsheet transaction ledger.

use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::process::{self, ExitCode};

use clap::{Args, Parser, Subcommand};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, Table};
use indicatif::{ProgressBar, ProgressStyle};
use ledger_report::analyzer::{FinancialAnalyzer, TransactionFilter};
use ledger_report::config::Settings;
use ledger_report::currency::{CurrencyConverter, RateCache, RateClient, format_amount};
use ledger_report::loader::{LedgerLoader, LoadedLedger};
use ledger_report::models::{Granularity, MetricsRecord, NaiveDate};
use ledger_report::partition::PeriodMetrics;
use ledger_report::report::{CsvReport, HtmlReport, ReportData, ReportGenerator};
use owo_colors::OwoColorize;

/// Environment variable overriding the settings file location.
const CONFIG_ENV: &str = "LEDGER_REPORT_CONFIG";

/// Output path stem used when `report --output` is not given.
const DEFAULT_REPORT_BASE: &str = "financial_analysis";

/// Ledger metrics: totals, lending netting, charity share and reports.
#[derive(Debug, Parser)]
#[command(name = "ledger-report", version, about)]
struct Cli {
    /// Settings file (JSON). Defaults to $LEDGER_REPORT_CONFIG or the
    /// platform config directory.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Headline metrics for the whole ledger.
    Summary(LedgerArgs),
    /// Metrics per calendar period.
    Periods {
        /// Ledger input and filters.
        #[command(flatten)]
        ledger: LedgerArgs,
        /// Period size.
        #[arg(long, value_enum, default_value_t = Granularity::Month)]
        by: Granularity,
    },
    /// Largest spending categories.
    Top {
        /// Ledger input and filters.
        #[command(flatten)]
        ledger: LedgerArgs,
        /// Number of categories (default from settings).
        #[arg(short, long)]
        n: Option<usize>,
    },
    /// Money lent, repaid and still outstanding, per month.
    Lending(LedgerArgs),
    /// Charitable giving and its share of spending, per month.
    Charity(LedgerArgs),
    /// Write HTML and CSV reports.
    Report(ReportArgs),
    /// Show or refresh exchange rates.
    Rates {
        /// Fetch fresh rates even if the cache is valid.
        #[arg(long)]
        refresh: bool,
    },
}

/// Ledger file plus row filters shared by the analysis subcommands.
#[derive(Debug, Args)]
struct LedgerArgs {
    /// CSV or workbook (.xlsx, .xls, .ods) ledger with date, category and
    /// amount columns.
    #[arg(value_name = "FILE")]
    file: PathBuf,
    /// First day to include (YYYY-MM-DD).
    #[arg(long, value_parser = parse_date)]
    from: Option<NaiveDate>,
    /// Last day to include (YYYY-MM-DD).
    #[arg(long, value_parser = parse_date)]
    to: Option<NaiveDate>,
    /// Only rows of this category.
    #[arg(long)]
    category: Option<String>,
    /// Convert foreign-currency amounts to the base currency.
    #[arg(long)]
    convert: bool,
}

/// Arguments for the `report` subcommand.
#[derive(Debug, Args)]
struct ReportArgs {
    /// Ledger input and filters.
    #[command(flatten)]
    ledger: LedgerArgs,
    /// Output path without extension.
    #[arg(long, value_name = "BASE")]
    output: Option<PathBuf>,
    /// Only write the HTML report.
    #[arg(long, conflicts_with = "csv_only")]
    html_only: bool,
    /// Only write the CSV export.
    #[arg(long)]
    csv_only: bool,
    /// Open the HTML report in the default browser once written.
    #[arg(long, conflicts_with = "csv_only")]
    open: bool,
}

/// Parses a date string in `YYYY-MM-DD` format for clap.
fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|err| format!("{err}"))
}

/// Prints `context: err` with a red prefix and returns a failure code.
fn fail<E: core::fmt::Display>(context: &str, err: E) -> io::Result<ExitCode> {
    writeln!(
        io::stderr().lock(),
        "{} {context}: {err}",
        "error:".red().bold()
    )?;
    Ok(ExitCode::FAILURE)
}

/// Settings from `--config`, `$LEDGER_REPORT_CONFIG` or the default path.
fn load_settings(explicit: Option<PathBuf>) -> ledger_report::error::Result<Settings> {
    match explicit.or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from)) {
        Some(path) => Settings::load(&path),
        None => Settings::load_default(),
    }
}

/// Converter backed by the default cache and the public rate API.
fn make_converter(settings: &Settings) -> ledger_report::error::Result<CurrencyConverter> {
    let mut converter = CurrencyConverter::new(settings.report.base_currency.clone())
        .with_client(RateClient::builder().build()?);
    if let Some(cache) = RateCache::open_default() {
        converter = converter.with_cache(cache);
    }
    Ok(converter)
}

/// Builds the row filter described by the CLI flags.
fn build_filter(args: &LedgerArgs) -> TransactionFilter {
    let mut filter = TransactionFilter::new();
    if let Some(from) = args.from {
        filter = filter.since(from);
    }
    if let Some(to) = args.to {
        filter = filter.until(to);
    }
    if let Some(category) = args.category.as_deref() {
        filter = filter.category(category);
    }
    filter
}

/// Loads the ledger and applies the filters.
fn load_analyzer(
    args: &LedgerArgs,
    settings: &Settings,
) -> ledger_report::error::Result<(FinancialAnalyzer, LoadedLedger)> {
    let mut loader = LedgerLoader::new();
    if args.convert {
        loader = loader.with_rates(make_converter(settings)?.rates());
    }
    let mut ledger = loader.load_path(&args.file)?;
    let transactions = core::mem::take(&mut ledger.transactions);

    let analyzer = FinancialAnalyzer::new(transactions, settings.analysis.clone());
    let filter = build_filter(args);
    if filter.is_empty() {
        return Ok((analyzer, ledger));
    }
    Ok((analyzer.filtered(&filter), ledger))
}

/// Runs the CLI, returning an appropriate exit code.
fn run() -> io::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let _dotenv = dotenvy::dotenv();

    let cli = Cli::parse();

    let settings = match load_settings(cli.config) {
        Ok(settings) => settings,
        Err(err) => return fail("failed to load settings", err),
    };

    dispatch(&settings, cli.command)
}

/// Dispatches to the appropriate subcommand handler.
fn dispatch(settings: &Settings, command: Command) -> io::Result<ExitCode> {
    let currency = settings.report.base_currency.as_str();
    match command {
        Command::Summary(args) => with_ledger(settings, &args, |analyzer| {
            print_summary(&analyzer.quick_summary(), currency)
        }),
        Command::Periods { ledger, by } => with_ledger(settings, &ledger, |analyzer| {
            print_periods(&analyzer.analyze_by_period(by), by, currency)
        }),
        Command::Top { ledger, n } => with_ledger(settings, &ledger, |analyzer| {
            print_top(analyzer, n.unwrap_or(settings.report.top_categories), currency)
        }),
        Command::Lending(args) => {
            with_ledger(settings, &args, |analyzer| print_lending(analyzer, currency))
        }
        Command::Charity(args) => {
            with_ledger(settings, &args, |analyzer| print_charity(analyzer, currency))
        }
        Command::Report(args) => with_ledger(settings, &args.ledger, |analyzer| {
            cmd_report(analyzer, settings, &args)
        }),
        Command::Rates { refresh } => cmd_rates(settings, refresh),
    }
}

/// Loads the ledger named by `args` and hands the analyzer to `body`.
fn with_ledger<F>(settings: &Settings, args: &LedgerArgs, body: F) -> io::Result<ExitCode>
where
    F: FnOnce(&FinancialAnalyzer) -> io::Result<ExitCode>,
{
    let (analyzer, ledger) = match load_analyzer(args, settings) {
        Ok(loaded) => loaded,
        Err(err) => return fail("failed to load ledger", err),
    };
    print_load_notes(&ledger, analyzer.transactions().len())?;
    body(&analyzer)
}

/// Executes the `report` subcommand: writes the HTML and/or CSV files.
fn cmd_report(
    analyzer: &FinancialAnalyzer,
    settings: &Settings,
    args: &ReportArgs,
) -> io::Result<ExitCode> {
    let spinner = make_spinner("Generating reports...");
    let results = analyzer.report_data();
    let data = ReportData::new(&results, &settings.analysis, &settings.report)
        .with_source(args.ledger.file.display().to_string());
    let base = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_REPORT_BASE));

    let mut generators: Vec<(&dyn ReportGenerator, &str)> = Vec::new();
    if !args.csv_only {
        generators.push((&HtmlReport, "html"));
    }
    if !args.html_only {
        generators.push((&CsvReport, "csv"));
    }

    let mut written = Vec::new();
    for (generator, extension) in generators {
        match generator.generate(&data, &base.with_extension(extension)) {
            Ok(path) => written.push(path),
            Err(err) => {
                spinner.finish_and_clear();
                return fail("report generation failed", err);
            }
        }
    }
    spinner.finish_and_clear();

    let mut out = io::stdout().lock();
    writeln!(out, "{}", "Reports written".green().bold())?;
    for path in &written {
        writeln!(out, "  {}", path.display())?;
    }

    let html = written
        .iter()
        .filter(|_| args.open)
        .find(|path| path.extension().is_some_and(|ext| ext == "html"));
    if let Some(Err(err)) = html.map(|path| open_in_browser(path)) {
        return fail("could not open the report", err);
    }
    Ok(ExitCode::SUCCESS)
}

/// Command that opens `path` with the platform's default handler.
#[cfg(target_os = "macos")]
fn opener(path: &Path) -> process::Command {
    let mut command = process::Command::new("open");
    _ = command.arg(path);
    command
}

/// Command that opens `path` with the platform's default handler.
#[cfg(target_os = "windows")]
fn opener(path: &Path) -> process::Command {
    let mut command = process::Command::new("cmd");
    _ = command.args(["/C", "start", ""]).arg(path);
    command
}

/// Command that opens `path` with the platform's default handler.
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn opener(path: &Path) -> process::Command {
    let mut command = process::Command::new("xdg-open");
    _ = command.arg(path);
    command
}

/// Launches the default browser on `path` without waiting for it.
fn open_in_browser(path: &Path) -> io::Result<()> {
    tracing::debug!(path = %path.display(), "opening report");
    let _child = opener(path).spawn()?;
    Ok(())
}

/// Executes the `rates` subcommand: shows the rate cache state.
fn cmd_rates(settings: &Settings, refresh: bool) -> io::Result<ExitCode> {
    let converter = match make_converter(settings) {
        Ok(converter) => converter,
        Err(err) => return fail("failed to build rate client", err),
    };

    if refresh {
        let spinner = make_spinner("Fetching exchange rates...");
        let fetched = converter.refresh();
        spinner.finish_and_clear();
        if let Err(err) = fetched {
            return fail("rate refresh failed", err);
        }
    }

    let summary = converter.summary();
    let mut table = new_table(&["Setting", "Value"]);
    let updated = summary
        .last_updated
        .map_or_else(|| "built-in fallback".to_owned(), |at| at.to_rfc3339());
    let rows = [
        ("Base currency", summary.base_currency.clone()),
        ("Last updated", updated),
        ("Cache valid", summary.cache_valid.to_string()),
        ("Available rates", summary.available_rates.to_string()),
        ("Supported", summary.supported_currencies.join(", ")),
    ];
    for (name, value) in rows {
        _ = table.add_row(vec![Cell::new(name), Cell::new(value)]);
    }

    let mut out = io::stdout().lock();
    writeln!(out, "{}", "Exchange Rates".green().bold())?;
    writeln!(out)?;
    writeln!(out, "{table}")?;
    Ok(ExitCode::SUCCESS)
}

// ── Output formatting ────────────────────────────────────────────────

/// Creates a table with cyan headers.
fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(
        headers
            .iter()
            .map(|&title| Cell::new(title).fg(Color::Cyan))
            .collect::<Vec<_>>(),
    );
    table
}

/// A money cell coloured by sign.
fn money_cell(value: f64, currency: &str) -> Cell {
    let cell = Cell::new(format_amount(value, currency));
    if value > 0.0_f64 {
        cell.fg(Color::Green)
    } else if value < 0.0_f64 {
        cell.fg(Color::Red)
    } else {
        cell.fg(Color::DarkGrey)
    }
}

/// Reports dropped or converted rows and the number kept by the filters.
fn print_load_notes(ledger: &LoadedLedger, kept: usize) -> io::Result<()> {
    let mut out = io::stdout().lock();
    writeln!(
        out,
        "{}",
        format_args!("Loaded {kept} rows using '{}'", ledger.amount_source).dimmed()
    )?;
    if ledger.dropped_rows > 0 {
        writeln!(
            out,
            "{} skipped {} rows with unreadable amounts",
            "warning:".yellow().bold(),
            ledger.dropped_rows
        )?;
    }
    if ledger.converted_rows > 0 {
        writeln!(
            out,
            "{}",
            format_args!("Converted {} rows to the base currency", ledger.converted_rows).dimmed()
        )?;
    }
    writeln!(out)?;
    Ok(())
}

/// Prints the headline metrics.
fn print_summary(record: &MetricsRecord, currency: &str) -> io::Result<ExitCode> {
    let mut out = io::stdout().lock();
    if record.transaction_count() == 0 {
        writeln!(out, "{}", "No transactions found.".dimmed())?;
        return Ok(ExitCode::SUCCESS);
    }

    let mut table = new_table(&["Metric", "Value"]);
    let split = record.simplified_spending();
    let rows = [
        ("Total income", money_cell(record.total_income(), currency)),
        ("Total spending", money_cell(-record.total_spending(), currency)),
        ("Net balance", money_cell(record.net_balance(), currency)),
        ("Average transaction", money_cell(record.avg_transaction(), currency)),
        ("Charity", money_cell(-record.charity_spending(), currency)),
        (
            "Spending without charity",
            money_cell(-record.spending_excluding_charity(), currency),
        ),
        ("Outstanding lending", money_cell(-record.outstanding_lending(), currency)),
        ("Excess repayment", money_cell(record.excess_repayment(), currency)),
        ("Normal spending", money_cell(-split.normal, currency)),
        ("Lending spending", money_cell(-split.lending, currency)),
        ("Charity spending", money_cell(-split.charity, currency)),
    ];
    _ = table.add_row(vec![
        Cell::new("Transactions"),
        Cell::new(record.transaction_count()),
    ]);
    for (name, cell) in rows {
        _ = table.add_row(vec![Cell::new(name), cell]);
    }
    _ = table.add_row(vec![
        Cell::new("Charity share"),
        Cell::new(format!("{:.1}%", record.charity_percentage())),
    ]);

    writeln!(out, "{}", "Summary".green().bold())?;
    writeln!(out)?;
    writeln!(out, "{table}")?;
    Ok(ExitCode::SUCCESS)
}

/// Prints one row per period.
fn print_periods(
    periods: &PeriodMetrics,
    granularity: Granularity,
    currency: &str,
) -> io::Result<ExitCode> {
    let mut out = io::stdout().lock();
    if periods.is_empty() {
        writeln!(out, "{}", "No transactions found.".dimmed())?;
        return Ok(ExitCode::SUCCESS);
    }

    let mut table = new_table(&["Period", "Rows", "Income", "Spending", "Net", "Charity"]);
    for (period, record) in periods {
        _ = table.add_row(vec![
            Cell::new(period),
            Cell::new(record.transaction_count()),
            money_cell(record.total_income(), currency),
            money_cell(-record.total_spending(), currency),
            money_cell(record.net_balance(), currency),
            money_cell(-record.charity_spending(), currency),
        ]);
    }

    writeln!(
        out,
        "{} {}",
        format_args!("By {granularity}").green().bold(),
        format_args!("({})", periods.len()).dimmed()
    )?;
    writeln!(out)?;
    writeln!(out, "{table}")?;
    Ok(ExitCode::SUCCESS)
}

/// Prints the largest spending categories with their share.
fn print_top(analyzer: &FinancialAnalyzer, n: usize, currency: &str) -> io::Result<ExitCode> {
    let mut out = io::stdout().lock();
    let top = analyzer.top_spending_categories(n);
    if top.is_empty() {
        writeln!(out, "{}", "No spending found.".dimmed())?;
        return Ok(ExitCode::SUCCESS);
    }

    let total = analyzer.quick_summary().total_spending();
    let mut table = new_table(&["#", "Category", "Amount", "Share"]);
    for (rank, entry) in top.iter().enumerate() {
        let share = ledger_report::engine::percent_of(entry.amount, total);
        _ = table.add_row(vec![
            Cell::new(rank + 1),
            Cell::new(&entry.category),
            Cell::new(format_amount(entry.amount, currency)),
            Cell::new(format!("{share:.1}%")),
        ]);
    }

    writeln!(
        out,
        "{} {}",
        "Top Spending Categories".green().bold(),
        format_args!("({})", top.len()).dimmed()
    )?;
    writeln!(out)?;
    writeln!(out, "{table}")?;
    Ok(ExitCode::SUCCESS)
}

/// Prints lending positions per month and overall.
fn print_lending(analyzer: &FinancialAnalyzer, currency: &str) -> io::Result<ExitCode> {
    let summary = analyzer.lending_summary();
    let mut table = new_table(&["Period", "Lent", "Repaid", "Outstanding", "Excess"]);
    let months = summary
        .by_period
        .iter()
        .map(|(period, position)| (period.to_string(), position));
    for (label, position) in months.chain([("Overall".to_owned(), &summary.overall)]) {
        _ = table.add_row(vec![
            Cell::new(label),
            Cell::new(format_amount(position.total_lending, currency)),
            Cell::new(format_amount(position.repaid_lending, currency)),
            money_cell(-position.outstanding_lending, currency),
            money_cell(position.excess_repayment, currency),
        ]);
    }

    let mut out = io::stdout().lock();
    writeln!(out, "{}", "Lending Summary".green().bold())?;
    writeln!(out)?;
    writeln!(out, "{table}")?;
    Ok(ExitCode::SUCCESS)
}

/// Prints charity giving per month and overall.
fn print_charity(analyzer: &FinancialAnalyzer, currency: &str) -> io::Result<ExitCode> {
    let analysis = analyzer.charity_analysis();
    let mut table = new_table(&["Period", "Charity", "% of spending"]);
    for (period, share) in &analysis.by_period {
        _ = table.add_row(vec![
            Cell::new(period),
            Cell::new(format_amount(share.charity_amount, currency)),
            Cell::new(format!("{:.1}%", share.percentage_of_spending)),
        ]);
    }
    _ = table.add_row(vec![
        Cell::new("Overall"),
        Cell::new(format_amount(analysis.total_charity, currency)),
        Cell::new(format!("{:.1}%", analysis.percentage_of_spending)),
    ]);

    let mut out = io::stdout().lock();
    writeln!(out, "{}", "Charity Analysis".green().bold())?;
    writeln!(out)?;
    writeln!(out, "{table}")?;
    Ok(ExitCode::SUCCESS)
}

/// Creates a spinner with the given message.
fn make_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_owned());
    spinner.enable_steady_tick(core::time::Duration::from_millis(80));
    spinner
}

/// Entry point.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            // stderr itself may be the failing stream.
            let _ignored = writeln!(io::stderr(), "fatal I/O error: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use clap::CommandFactory as _;
    use ledger_report::config::AnalysisConfig;
    use ledger_report::models::Transaction;

    use super::*;

    /// Sample ledger with salary, rent, charity and a partly repaid loan.
    const SAMPLE_CSV: &str = "\
date,category,amount,description
2025-01-02,Salary,3000,January pay
2025-01-05,Rent,-1200,
2025-01-09,Charity,-150,Donation
2025-01-15,\"Loan, interests\",-500,Lent to a friend
2025-02-02,Salary,3000,February pay
2025-02-10,\"Lending, renting\",200,Partial repayment
2025-02-11,Groceries,-320.5,
";

    /// Writes the sample ledger into `dir` and returns its path.
    fn sample_file(dir: &Path) -> PathBuf {
        let path = dir.join("ledger.csv");
        fs::write(&path, SAMPLE_CSV).unwrap();
        path
    }

    /// Ledger arguments without filters.
    fn ledger_args(file: PathBuf) -> LedgerArgs {
        LedgerArgs {
            file,
            from: None,
            to: None,
            category: None,
            convert: false,
        }
    }

    /// Analyzer over a few hand-built rows.
    fn analyzer() -> FinancialAnalyzer {
        let day = |month, dom| NaiveDate::from_ymd_opt(2025, month, dom).unwrap();
        FinancialAnalyzer::new(
            vec![
                Transaction::on(day(1, 2), "Salary", 3000.0),
                Transaction::on(day(1, 5), "Rent", -1200.0),
                Transaction::on(day(1, 9), "Charity", -150.0),
                Transaction::on(day(1, 15), "Loan, interests", -500.0),
                Transaction::on(day(2, 10), "Lending, renting", 200.0),
            ],
            AnalysisConfig::default(),
        )
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_periods_subcommand() {
        let cli = Cli::try_parse_from(["ledger-report", "periods", "in.csv", "--by", "year"]).unwrap();
        match cli.command {
            Command::Periods { ledger, by } => {
                assert_eq!(ledger.file, PathBuf::from("in.csv"));
                assert_eq!(by, Granularity::Year);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn report_flags_conflict() {
        let parsed = Cli::try_parse_from([
            "ledger-report",
            "report",
            "in.csv",
            "--html-only",
            "--csv-only",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn report_open_flag() {
        let cli = Cli::try_parse_from(["ledger-report", "report", "in.xlsx", "--open"]).unwrap();
        match cli.command {
            Command::Report(args) => {
                assert!(args.open);
                assert_eq!(args.ledger.file, PathBuf::from("in.xlsx"));
            }
            other => panic!("unexpected command {other:?}"),
        }
        let without_html =
            Cli::try_parse_from(["ledger-report", "report", "in.csv", "--open", "--csv-only"]);
        assert!(without_html.is_err());
    }

    #[test]
    fn opener_targets_report_path() {
        let command = opener(Path::new("out/analysis.html"));
        let last = command.get_args().last();
        assert_eq!(last, Some(std::ffi::OsStr::new("out/analysis.html")));
    }

    #[test]
    fn parse_date_valid() {
        let date = parse_date("2025-03-15").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 3, 15).unwrap());
    }

    #[test]
    fn parse_date_invalid() {
        assert!(parse_date("15/03/2025").is_err());
    }

    #[test]
    fn build_filter_no_args() {
        let filter = build_filter(&ledger_args(PathBuf::from("x.csv")));
        assert!(filter.is_empty());
    }

    #[test]
    fn build_filter_with_range_and_category() {
        let mut args = ledger_args(PathBuf::from("x.csv"));
        args.from = NaiveDate::from_ymd_opt(2025, 1, 1);
        args.to = NaiveDate::from_ymd_opt(2025, 1, 31);
        args.category = Some("Rent".to_owned());
        let filter = build_filter(&args);
        assert_eq!(filter.date_from, args.from);
        assert_eq!(filter.date_to, args.to);
        assert_eq!(filter.category.as_deref(), Some("Rent"));
    }

    #[test]
    fn load_analyzer_applies_filters() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = ledger_args(sample_file(dir.path()));
        let settings = Settings::default();

        let (all, ledger) = load_analyzer(&args, &settings).unwrap();
        assert_eq!(all.transactions().len(), 7);
        assert_eq!(ledger.dropped_rows, 0);

        args.from = NaiveDate::from_ymd_opt(2025, 2, 1);
        let (february, _) = load_analyzer(&args, &settings).unwrap();
        assert_eq!(february.transactions().len(), 3);
    }

    #[test]
    fn load_analyzer_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let args = ledger_args(dir.path().join("missing.csv"));
        assert!(load_analyzer(&args, &Settings::default()).is_err());
    }

    #[test]
    fn load_settings_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"report": {"base_currency": "USD"}}"#).unwrap();
        let settings = load_settings(Some(path)).unwrap();
        assert_eq!(settings.report.base_currency, "USD");
        assert_eq!(settings.analysis, AnalysisConfig::default());
    }

    #[test]
    fn print_tables_succeed() {
        let analyzer = analyzer();
        assert_eq!(
            print_summary(&analyzer.quick_summary(), "EGP").unwrap(),
            ExitCode::SUCCESS
        );
        assert_eq!(
            print_summary(&MetricsRecord::default(), "EGP").unwrap(),
            ExitCode::SUCCESS
        );
        let periods = analyzer.analyze_by_period(Granularity::Month);
        assert_eq!(
            print_periods(&periods, Granularity::Month, "EGP").unwrap(),
            ExitCode::SUCCESS
        );
        assert_eq!(print_top(&analyzer, 3, "EGP").unwrap(), ExitCode::SUCCESS);
        assert_eq!(print_lending(&analyzer, "EGP").unwrap(), ExitCode::SUCCESS);
        assert_eq!(print_charity(&analyzer, "EGP").unwrap(), ExitCode::SUCCESS);
    }

    #[test]
    fn money_cell_formats_amount() {
        let cell = money_cell(-1234.5, "USD");
        assert_eq!(cell.content(), "-$1,234.50");
    }

    #[test]
    fn report_writes_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let args = ReportArgs {
            ledger: ledger_args(sample_file(dir.path())),
            output: Some(dir.path().join("out").join("analysis")),
            html_only: false,
            csv_only: false,
            open: false,
        };
        let settings = Settings::default();
        let (analyzer, _) = load_analyzer(&args.ledger, &settings).unwrap();

        let code = cmd_report(&analyzer, &settings, &args).unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
        let html = dir.path().join("out").join("analysis.html");
        let csv = dir.path().join("out").join("analysis.csv");
        assert!(html.exists());
        assert!(csv.exists());
        let text = fs::read_to_string(&csv).unwrap();
        assert!(text.starts_with("Type,Category,Amount"));
    }

    #[test]
    fn report_csv_only_skips_html() {
        let dir = tempfile::tempdir().unwrap();
        let args = ReportArgs {
            ledger: ledger_args(sample_file(dir.path())),
            output: Some(dir.path().join("only")),
            html_only: false,
            csv_only: true,
            open: false,
        };
        let settings = Settings::default();
        let (analyzer, _) = load_analyzer(&args.ledger, &settings).unwrap();

        let code = cmd_report(&analyzer, &settings, &args).unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
        assert!(dir.path().join("only.csv").exists());
        assert!(!dir.path().join("only.html").exists());
    }

    #[test]
    fn make_spinner_creates_spinner() {
        let spinner = make_spinner("Working...");
        spinner.finish_and_clear();
    }
}
