//! Self-contained HTML report with inline SVG charts.

use std::path::{Path, PathBuf};

use super::charts::{
    self, BALANCE_COLOR, CATEGORY_COLOR, CHARITY_COLOR, INCOME_COLOR, NORMAL_COLOR,
    SPENDING_COLOR, Series, TOTAL_COLOR,
};
use super::{ReportData, ReportGenerator, escape_html, write_output};
use crate::currency::format_amount;
use crate::error::Result;
use crate::models::{CategoryTotals, MetricsRecord};
use crate::partition::PeriodMetrics;
use crate::views;

/// Page stylesheet.
const STYLE: &str = "
body { font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; margin: 0; padding: 20px; background: #f5f7fa; color: #333; }
.container { max-width: 1200px; margin: 0 auto; }
.header { text-align: center; background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: white; padding: 30px; border-radius: 10px; margin-bottom: 20px; }
.header p { margin: 4px 0; opacity: 0.9; }
.navigation { text-align: center; margin-bottom: 25px; }
.nav-button { display: inline-block; padding: 10px 20px; margin: 4px; background: #667eea; color: white; border-radius: 20px; text-decoration: none; }
.section { margin-bottom: 40px; }
.section-title { border-bottom: 3px solid #667eea; margin-bottom: 20px; }
.summary-cards { display: grid; grid-template-columns: repeat(auto-fit, minmax(220px, 1fr)); gap: 20px; margin-bottom: 25px; }
.card, .details, .chart { background: white; padding: 20px; border-radius: 10px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); }
.card { text-align: center; }
.card h3 { margin: 0 0 10px; font-size: 1em; color: #555; }
.amount { font-size: 1.5em; font-weight: bold; }
.positive { color: #27ae60; }
.negative { color: #e74c3c; }
.details { margin-bottom: 20px; }
.chart { margin: 20px 0; text-align: center; }
.chart-svg { width: 100%; height: auto; max-height: 480px; }
.chart-title { font-size: 16px; font-weight: bold; fill: #333; }
.tick, .legend, .value { font-size: 11px; fill: #555; }
.grid { stroke: #e0e0e0; stroke-width: 1; }
.period-grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(350px, 1fr)); gap: 25px; }
.period-card { background: white; border-radius: 10px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); overflow: hidden; }
.period-header { background: linear-gradient(135deg, #a8edea 0%, #fed6e3 100%); padding: 15px; font-weight: bold; text-align: center; }
.period-content { padding: 20px; }
.period-summary { display: grid; grid-template-columns: repeat(auto-fit, minmax(120px, 1fr)); gap: 10px; margin-bottom: 15px; }
.mini-card { background: #f8f9fa; padding: 10px; border-radius: 5px; text-align: center; }
.mini-amount { font-weight: bold; font-size: 0.9em; }
.category-list { display: grid; grid-template-columns: repeat(auto-fit, minmax(200px, 1fr)); gap: 10px; }
.category-item { display: flex; justify-content: space-between; padding: 8px; background: #f8f9fa; border-radius: 5px; }
.generated-time { text-align: center; color: #666; font-style: italic; margin-top: 30px; }
";

/// Renders the full analysis as a single HTML page.
///
/// Sections: overview cards with lending, charity and simplified-split
/// panels, monthly and yearly period cards, and a detailed section with
/// all-time charts and category tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlReport;

impl HtmlReport {
    /// Renders the page without writing it.
    #[inline]
    #[must_use]
    pub fn render(&self, data: &ReportData<'_>) -> String {
        let page = Page { data };
        [
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
             <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
             <title>Financial Analysis Report</title>\n<style>"
                .to_owned(),
            STYLE.to_owned(),
            "</style>\n</head>\n<body>\n<div class=\"container\">\n".to_owned(),
            page.header(),
            NAVIGATION.to_owned(),
            page.overview(),
            page.period_section("monthly", "Monthly Reports", &data.results.monthly),
            page.period_section("yearly", "Yearly Reports", &data.results.yearly),
            page.detailed(),
            format!(
                "<p class=\"generated-time\">Report generated on {}</p>\n</div>\n</body>\n</html>\n",
                escape_html(&data.generated_label())
            ),
        ]
        .concat()
    }
}

impl ReportGenerator for HtmlReport {
    #[inline]
    #[tracing::instrument(skip_all, fields(output = %output.display()))]
    fn generate(&self, data: &ReportData<'_>, output: &Path) -> Result<PathBuf> {
        let html = self.render(data);
        write_output(output, &html)?;
        tracing::debug!(bytes = html.len(), "wrote HTML report");
        Ok(output.to_path_buf())
    }
}

/// Rendering context shared by the page sections.
struct Page<'page, 'data> {
    /// Report inputs.
    data: &'page ReportData<'data>,
}

/// CSS class for a signed amount.
const fn sign_class(value: f64) -> &'static str {
    if value >= 0.0_f64 { "positive" } else { "negative" }
}

/// Links to the page sections.
const NAVIGATION: &str = "<div class=\"navigation\">\
     <a href=\"#overview\" class=\"nav-button\">Overview</a>\
     <a href=\"#monthly\" class=\"nav-button\">Monthly Reports</a>\
     <a href=\"#yearly\" class=\"nav-button\">Yearly Reports</a>\
     <a href=\"#detailed\" class=\"nav-button\">Detailed Analysis</a>\
     </div>\n";

/// Wraps an optional SVG in a chart panel.
fn chart_block(svg: Option<String>) -> String {
    svg.map(|markup| format!("<div class=\"chart\">{markup}</div>\n"))
        .unwrap_or_default()
}

impl Page<'_, '_> {
    /// Formats `value` in the report currency.
    fn money(&self, value: f64) -> String {
        escape_html(&format_amount(value, &self.data.report.base_currency))
    }

    /// A headline metric card.
    fn card(&self, title: &str, value: f64, class: &str, hint: Option<&str>) -> String {
        let note = hint
            .map(|text| format!("<small>{}</small>", escape_html(text)))
            .unwrap_or_default();
        format!(
            "<div class=\"card\"><h3>{title}</h3><div class=\"amount {class}\">{}</div>{note}</div>\n",
            self.money(value)
        )
    }

    /// A compact metric inside a period card.
    fn mini_card(&self, title: &str, value: f64, class: &str) -> String {
        format!(
            "<div class=\"mini-card\"><div>{title}</div><div class=\"mini-amount {class}\">{}</div></div>",
            self.money(value)
        )
    }

    /// Category list items sorted by descending amount.
    fn category_items<I: IntoIterator<Item = (String, f64)>>(&self, items: I) -> String {
        let rows: String = items
            .into_iter()
            .map(|(category, amount)| {
                format!(
                    "<div class=\"category-item\"><span>{}</span><strong>{}</strong></div>",
                    escape_html(&category),
                    self.money(amount)
                )
            })
            .collect();
        format!("<div class=\"category-list\">{rows}</div>\n")
    }

    /// Title banner with the input name and covered dates.
    fn header(&self) -> String {
        let source = self
            .data
            .source
            .as_deref()
            .map(|name| format!("<p>Source: {}</p>", escape_html(name)))
            .unwrap_or_default();
        let span = self
            .data
            .results
            .date_span
            .map(|(first, last)| format!("<p>Covering {first} to {last}</p>"))
            .unwrap_or_default();
        format!(
            "<div class=\"header\"><h1>Comprehensive Financial Analysis Report</h1>\
             <p>Complete overview with monthly and yearly breakdowns</p>{source}{span}</div>\n"
        )
    }

    /// Headline cards plus the lending, charity and split panels.
    fn overview(&self) -> String {
        let all = &self.data.results.all_time;
        let charity_note = format!("{:.1}% of spending", all.charity_percentage());
        let cards = [
            self.card("Total Income", all.total_income(), "positive", Some("Excludes loan repayments")),
            self.card("Total Spending", all.total_spending(), "negative", Some("Adjusted for lending")),
            self.card("Net Balance", all.net_balance(), sign_class(all.net_balance()), None),
            self.card("Avg Transaction", all.avg_transaction(), "", None),
            self.card("Charity Spending", all.charity_spending(), "negative", Some(charity_note.as_str())),
            self.card("Spending (No Charity)", all.spending_excluding_charity(), "negative", None),
        ]
        .concat();

        [
            "<div id=\"overview\" class=\"section\"><div class=\"section-title\"><h2>Financial Overview</h2></div>\n".to_owned(),
            format!("<div class=\"summary-cards\">{cards}</div>\n"),
            self.lending_panel(),
            self.charity_panel(),
            self.split_panel(all),
            chart_block(charts::bar_chart(
                "Income vs Spending",
                &[
                    ("Income".to_owned(), all.total_income(), INCOME_COLOR),
                    ("Spending".to_owned(), all.total_spending(), SPENDING_COLOR),
                    ("Net Balance".to_owned(), all.net_balance(), BALANCE_COLOR),
                ],
            )),
            chart_block(charts::pie_chart(
                "Spending by Category",
                &all.spending_by_category().sorted_desc(),
                self.data.analysis.small_category_threshold,
            )),
            "</div>\n".to_owned(),
        ]
        .concat()
    }

    /// Loan netting figures, overall and for months with open positions.
    fn lending_panel(&self) -> String {
        let summary = views::lending_summary(&self.data.results.all_time, &self.data.results.monthly);
        let overall = summary.overall;
        let active: String = summary
            .by_period
            .iter()
            .filter(|&(_, position)| position.total_lending > 0.0_f64 || position.repaid_lending > 0.0_f64)
            .map(|(period, position)| {
                format!(
                    "<div class=\"category-item\"><span>{period}</span><span>lent {} / repaid {}</span></div>",
                    self.money(position.total_lending),
                    self.money(position.repaid_lending)
                )
            })
            .collect();
        let months = if active.is_empty() {
            String::new()
        } else {
            format!("<h4>By month</h4><div class=\"category-list\">{active}</div>")
        };
        format!(
            "<div class=\"details\"><h3>Lending Summary</h3><div class=\"summary-cards\">{}{}{}{}</div>{months}</div>\n",
            self.card("Total Lent", overall.total_lending, "", None),
            self.card("Repaid", overall.repaid_lending, "positive", None),
            self.card("Outstanding", overall.outstanding_lending, "negative", None),
            self.card("Excess Repayment", overall.excess_repayment, "positive", None),
        )
    }

    /// Charity totals and per-month giving.
    fn charity_panel(&self) -> String {
        let analysis =
            views::charity_analysis(&self.data.results.all_time, &self.data.results.monthly);
        let months: String = analysis
            .by_period
            .iter()
            .filter(|&(_, share)| share.charity_amount > 0.0_f64)
            .map(|(period, share)| {
                format!(
                    "<div class=\"category-item\"><span>{period}</span><span>{} ({:.1}%)</span></div>",
                    self.money(share.charity_amount),
                    share.percentage_of_spending
                )
            })
            .collect();
        format!(
            "<div class=\"details\"><h3>Charity Analysis</h3>\
             <p>Total given: <strong>{}</strong> ({:.1}% of spending)</p>\
             <div class=\"category-list\">{months}</div></div>\n",
            self.money(analysis.total_charity),
            analysis.percentage_of_spending
        )
    }

    /// Charity, lending and normal spending split.
    fn split_panel(&self, record: &MetricsRecord) -> String {
        let split = record.simplified_spending();
        format!(
            "<div class=\"details\"><h3>Simplified Spending</h3>{}</div>\n",
            self.category_items([
                ("Normal".to_owned(), split.normal),
                ("Charity".to_owned(), split.charity),
                ("Lending".to_owned(), split.lending),
            ])
        )
    }

    /// One card per period, newest first.
    fn period_section(&self, id: &str, title: &str, periods: &PeriodMetrics) -> String {
        let cards: String = periods
            .iter()
            .rev()
            .map(|(period, record)| self.period_card(period.as_str(), record))
            .collect();
        let body = if cards.is_empty() {
            "<p>No transactions in this range.</p>".to_owned()
        } else {
            format!("<div class=\"period-grid\">{cards}</div>")
        };
        format!(
            "<div id=\"{id}\" class=\"section\"><div class=\"section-title\"><h2>{title}</h2></div>{body}</div>\n"
        )
    }

    /// Metrics, pie chart and top categories for one period.
    fn period_card(&self, period: &str, record: &MetricsRecord) -> String {
        let mut minis = vec![
            self.mini_card("Income", record.total_income(), "positive"),
            self.mini_card("Spending", record.total_spending(), "negative"),
            self.mini_card("Net", record.net_balance(), sign_class(record.net_balance())),
        ];
        if record.outstanding_lending() > 0.0_f64 {
            minis.push(self.mini_card("Outstanding Lending", record.outstanding_lending(), "negative"));
        }
        if record.excess_repayment() > 0.0_f64 {
            minis.push(self.mini_card("Excess Repayment", record.excess_repayment(), "positive"));
        }
        let top = views::top_categories(record, self.data.report.top_categories)
            .into_iter()
            .map(|entry| (entry.category, entry.amount));
        let pie = charts::pie_chart(
            &format!("Spending {period}"),
            &record.spending_by_category().sorted_desc(),
            self.data.analysis.small_category_threshold,
        );
        format!(
            "<div class=\"period-card\"><div class=\"period-header\">{period} ({} transactions)</div>\
             <div class=\"period-content\"><div class=\"period-summary\">{}</div>{}{}{}</div></div>\n",
            record.transaction_count(),
            minis.concat(),
            chart_block(pie),
            self.category_items(top),
            self.split_panel(record),
        )
    }

    /// All-time charts and full category tables.
    fn detailed(&self) -> String {
        let results = self.data.results;
        let limit = self.data.analysis.max_categories_display;
        let top_spending: Vec<(String, f64)> = results
            .all_time
            .spending_by_category()
            .sorted_desc()
            .into_iter()
            .take(limit)
            .collect();
        let top_income: Vec<(String, f64)> = results
            .all_time
            .income_by_category()
            .sorted_desc()
            .into_iter()
            .take(limit)
            .collect();

        let trend = views::trend_series(&results.monthly);
        let months: Vec<String> = trend.periods().into_iter().map(str::to_owned).collect();
        let trend_chart = charts::line_chart(
            "Monthly Trend",
            &months,
            &[
                Series { name: "Income", color: INCOME_COLOR, values: trend.income() },
                Series { name: "Spending", color: SPENDING_COLOR, values: trend.spending() },
                Series { name: "Net", color: BALANCE_COLOR, values: trend.balance() },
            ],
        );

        let years: Vec<String> = results.yearly.keys().map(ToString::to_string).collect();
        let yearly_totals = charts::grouped_bar_chart(
            "Yearly Income vs Spending",
            &years,
            &[
                Series {
                    name: "Income",
                    color: INCOME_COLOR,
                    values: results.yearly.values().map(MetricsRecord::total_income).collect(),
                },
                Series {
                    name: "Spending",
                    color: SPENDING_COLOR,
                    values: results.yearly.values().map(MetricsRecord::total_spending).collect(),
                },
            ],
        );

        [
            "<div id=\"detailed\" class=\"section\"><div class=\"section-title\"><h2>Detailed Analysis</h2></div>\n".to_owned(),
            chart_block(trend_chart),
            chart_block(yearly_totals),
            chart_block(charts::horizontal_bar_chart("Top Spending Categories", &top_spending, CATEGORY_COLOR)),
            chart_block(charts::horizontal_bar_chart("Top Income Sources", &top_income, INCOME_COLOR)),
            spending_kinds(&months, results.monthly.values(), "Monthly"),
            spending_kinds(&years, results.yearly.values(), "Yearly"),
            self.category_table("All Spending Categories", results.all_time.spending_by_category()),
            self.category_table("All Income Categories", results.all_time.income_by_category()),
            "</div>\n".to_owned(),
        ]
        .concat()
    }

    /// Every category in `totals` as a list panel.
    fn category_table(&self, title: &str, totals: &CategoryTotals) -> String {
        format!(
            "<div class=\"details\"><h3>{title}</h3>{}</div>\n",
            self.category_items(totals.sorted_desc())
        )
    }
}

/// Normal, charity and total spending bars for each period.
fn spending_kinds<'rec, I>(labels: &[String], records: I, scope: &str) -> String
where
    I: Iterator<Item = &'rec MetricsRecord> + Clone,
{
    let series = |values: Vec<f64>, title: &str, color: &'static str| {
        chart_block(charts::series_bar_chart(
            &format!("{scope} {title}"),
            labels,
            &values,
            color,
        ))
    };
    [
        series(
            records.clone().map(MetricsRecord::spending_excluding_charity).collect(),
            "Normal Spending",
            NORMAL_COLOR,
        ),
        series(
            records.clone().map(MetricsRecord::charity_spending).collect(),
            "Charity Spending",
            CHARITY_COLOR,
        ),
        series(
            records.map(MetricsRecord::total_spending).collect(),
            "Total Spending",
            TOTAL_COLOR,
        ),
    ]
    .concat()
}
