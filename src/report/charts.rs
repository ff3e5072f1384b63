//! Inline SVG charts.
//!
//! Every renderer returns `None` when there is nothing to draw, so callers
//! can skip the chart block entirely.
#![allow(
    clippy::suboptimal_flops,
    reason = "SVG coordinates read better as plain arithmetic than as mul_add chains"
)]

use core::f64::consts::{FRAC_PI_2, PI, TAU};

use super::escape_html;

/// Slice colours, cycled.
const PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// Income series colour.
pub(crate) const INCOME_COLOR: &str = "#27ae60";
/// Spending series colour.
pub(crate) const SPENDING_COLOR: &str = "#e74c3c";
/// Net balance series colour.
pub(crate) const BALANCE_COLOR: &str = "#2980b9";
/// Normal spending bars.
pub(crate) const NORMAL_COLOR: &str = "#3498db";
/// Charity spending bars.
pub(crate) const CHARITY_COLOR: &str = "#c0392b";
/// Total spending bars.
pub(crate) const TOTAL_COLOR: &str = "#9b59b6";
/// Category breakdown bars.
pub(crate) const CATEGORY_COLOR: &str = "#34495e";

/// Width of cartesian charts.
const WIDTH: f64 = 640.0;
/// Height of cartesian charts.
const HEIGHT: f64 = 320.0;
/// Space for the title.
const TOP: f64 = 44.0;
/// Space for rotated x labels.
const BOTTOM: f64 = 64.0;
/// Space for y tick labels.
const LEFT: f64 = 64.0;
/// Right padding.
const RIGHT: f64 = 16.0;
/// Number of horizontal grid lines.
const GRID_LINES: u32 = 4;

/// Label of the slice collecting small categories.
pub(crate) const OTHERS_LABEL: &str = "Others";

/// One named series of values aligned with the chart labels.
#[derive(Debug, Clone)]
pub(crate) struct Series<'name> {
    /// Legend label.
    pub(crate) name: &'name str,
    /// Stroke / fill colour.
    pub(crate) color: &'static str,
    /// One value per label.
    pub(crate) values: Vec<f64>,
}

/// Converts a count to `f64` for layout arithmetic.
fn as_f64(count: usize) -> f64 {
    u32::try_from(count).map_or(f64::from(u32::MAX), f64::from)
}

/// Formats a chart value label without decimals.
fn short_value(value: f64) -> String {
    format!("{value:.0}")
}

/// Opening `<svg>` tag and centred title.
fn svg_open(title: &str, width: f64, height: f64) -> String {
    let label = escape_html(title);
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {width:.0} {height:.0}\" \
         class=\"chart-svg\" role=\"img\" aria-label=\"{label}\">\
         <text x=\"{:.1}\" y=\"24\" text-anchor=\"middle\" class=\"chart-title\">{label}</text>",
        width / 2.0_f64
    )
}

/// Linear mapping from values to vertical pixel positions.
#[derive(Debug, Clone, Copy)]
struct Scale {
    /// Smallest value shown (never above zero).
    low: f64,
    /// Largest value shown (never below zero).
    high: f64,
}

impl Scale {
    /// Builds a scale covering `values` and zero.
    fn covering<I: IntoIterator<Item = f64>>(values: I) -> Self {
        let (low, high) = values
            .into_iter()
            .filter(|value| value.is_finite())
            .fold((0.0_f64, 0.0_f64), |(low, high), value| {
                (low.min(value), high.max(value))
            });
        if high - low > f64::EPSILON {
            Self { low, high }
        } else {
            Self {
                low,
                high: low + 1.0_f64,
            }
        }
    }

    /// Vertical position of `value` inside the plot area.
    fn y(self, value: f64) -> f64 {
        let plot = HEIGHT - TOP - BOTTOM;
        HEIGHT - BOTTOM - (value - self.low) / (self.high - self.low) * plot
    }

    /// Grid lines with their value labels.
    fn grid(self) -> String {
        (0..=GRID_LINES)
            .map(|step| {
                let value =
                    self.low + (self.high - self.low) * f64::from(step) / f64::from(GRID_LINES);
                let y = self.y(value);
                format!(
                    "<line x1=\"{LEFT}\" y1=\"{y:.1}\" x2=\"{:.1}\" y2=\"{y:.1}\" class=\"grid\"/>\
                     <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\" class=\"tick\">{}</text>",
                    WIDTH - RIGHT,
                    LEFT - 6.0_f64,
                    y + 4.0_f64,
                    short_value(value)
                )
            })
            .collect()
    }
}

/// Rotated x-axis labels centred in each band.
fn x_labels(labels: &[String], band: f64) -> String {
    labels
        .iter()
        .enumerate()
        .map(|(idx, label)| {
            let x = LEFT + band * (as_f64(idx) + 0.5_f64);
            let y = HEIGHT - BOTTOM + 14.0_f64;
            format!(
                "<text x=\"{x:.1}\" y=\"{y:.1}\" text-anchor=\"end\" \
                 transform=\"rotate(-40 {x:.1} {y:.1})\" class=\"tick\">{}</text>",
                escape_html(label)
            )
        })
        .collect()
}

/// Legend entries laid out left to right under the title.
fn legend(series: &[Series<'_>]) -> String {
    series
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let x = LEFT + as_f64(idx) * 130.0_f64;
            format!(
                "<rect x=\"{x:.1}\" y=\"30\" width=\"10\" height=\"10\" fill=\"{}\"/>\
                 <text x=\"{:.1}\" y=\"39\" class=\"legend\">{}</text>",
                entry.color,
                x + 14.0_f64,
                escape_html(entry.name)
            )
        })
        .collect()
}

/// Splits `data` into the slices drawn on a pie chart.
///
/// Slices whose share of the total is at most `threshold` are merged into
/// a trailing "Others" slice. Remaining slices are ordered by descending
/// value. Non-positive totals yield no slices.
pub(crate) fn fold_small_slices(data: &[(String, f64)], threshold: f64) -> Vec<(String, f64)> {
    let total: f64 = data.iter().map(|&(_, value)| value).sum();
    if total <= 0.0_f64 {
        return Vec::new();
    }
    let mut kept: Vec<(String, f64)> = data
        .iter()
        .filter(|&&(_, value)| value / total > threshold)
        .cloned()
        .collect();
    kept.sort_by(|left, right| right.1.total_cmp(&left.1).then_with(|| left.0.cmp(&right.0)));
    let others: f64 = data
        .iter()
        .map(|&(_, value)| value)
        .filter(|value| value / total <= threshold)
        .sum();
    if others > 0.0_f64 {
        kept.push((OTHERS_LABEL.to_owned(), others));
    }
    kept
}

/// Pie chart with small categories folded into "Others".
pub(crate) fn pie_chart(title: &str, data: &[(String, f64)], threshold: f64) -> Option<String> {
    let slices = fold_small_slices(data, threshold);
    let total: f64 = slices.iter().map(|&(_, value)| value).sum();
    if slices.is_empty() || total <= 0.0_f64 {
        return None;
    }

    let (cx, cy, radius) = (150.0_f64, 170.0_f64, 120.0_f64);
    let height = (as_f64(slices.len()) * 20.0_f64 + 60.0_f64).max(320.0_f64);
    let mut parts = vec![svg_open(title, 560.0_f64, height)];
    let mut angle = -FRAC_PI_2;

    for (idx, (slice, color)) in slices.iter().zip(PALETTE.iter().cycle()).enumerate() {
        let share = slice.1 / total;
        let sweep = share * TAU;
        if share >= 0.9999_f64 {
            parts.push(format!(
                "<circle cx=\"{cx}\" cy=\"{cy}\" r=\"{radius}\" fill=\"{color}\"/>"
            ));
        } else {
            let end = angle + sweep;
            let large_arc = u8::from(sweep > PI);
            parts.push(format!(
                "<path d=\"M {cx:.1} {cy:.1} L {:.2} {:.2} A {radius:.1} {radius:.1} 0 {large_arc} 1 {:.2} {:.2} Z\" \
                 fill=\"{color}\" stroke=\"#fff\"/>",
                cx + radius * angle.cos(),
                cy + radius * angle.sin(),
                cx + radius * end.cos(),
                cy + radius * end.sin(),
            ));
            angle = end;
        }
        let legend_y = 60.0_f64 + as_f64(idx) * 20.0_f64;
        parts.push(format!(
            "<rect x=\"300\" y=\"{:.1}\" width=\"12\" height=\"12\" fill=\"{color}\"/>\
             <text x=\"318\" y=\"{legend_y:.1}\" class=\"legend\">{} ({:.1}%)</text>",
            legend_y - 10.0_f64,
            escape_html(&slice.0),
            share * 100.0_f64
        ));
    }
    parts.push("</svg>".to_owned());
    Some(parts.concat())
}

/// Vertical bar chart with one colour per bar.
///
/// Returns `None` when every bar is zero.
pub(crate) fn bar_chart(title: &str, bars: &[(String, f64, &str)]) -> Option<String> {
    if bars.iter().all(|&(_, value, _)| value.abs() < f64::EPSILON) {
        return None;
    }
    let scale = Scale::covering(bars.iter().map(|&(_, value, _)| value));
    let band = (WIDTH - LEFT - RIGHT) / as_f64(bars.len());
    let labels: Vec<String> = bars.iter().map(|bar| bar.0.clone()).collect();

    let mut parts = vec![svg_open(title, WIDTH, HEIGHT), scale.grid()];
    for (idx, &(_, value, color)) in bars.iter().enumerate() {
        let x = LEFT + band * as_f64(idx) + band * 0.15_f64;
        let (top, bottom) = (scale.y(value.max(0.0_f64)), scale.y(value.min(0.0_f64)));
        parts.push(format!(
            "<rect x=\"{x:.1}\" y=\"{top:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"{color}\" opacity=\"0.8\"/>\
             <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" class=\"value\">{}</text>",
            band * 0.7_f64,
            bottom - top,
            x + band * 0.35_f64,
            top - 4.0_f64,
            short_value(value)
        ));
    }
    parts.push(x_labels(&labels, band));
    parts.push("</svg>".to_owned());
    Some(parts.concat())
}

/// Single-colour vertical bars, one per label.
pub(crate) fn series_bar_chart(
    title: &str,
    labels: &[String],
    values: &[f64],
    color: &'static str,
) -> Option<String> {
    let bars: Vec<(String, f64, &str)> = labels
        .iter()
        .zip(values)
        .map(|(label, &value)| (label.clone(), value, color))
        .collect();
    bar_chart(title, &bars)
}

/// Bars grouped per label, one bar per series.
pub(crate) fn grouped_bar_chart(
    title: &str,
    labels: &[String],
    series: &[Series<'_>],
) -> Option<String> {
    if labels.is_empty() || series.is_empty() {
        return None;
    }
    let scale = Scale::covering(series.iter().flat_map(|entry| entry.values.iter().copied()));
    let band = (WIDTH - LEFT - RIGHT) / as_f64(labels.len());
    let bar_width = band * 0.8_f64 / as_f64(series.len());

    let mut parts = vec![svg_open(title, WIDTH, HEIGHT), scale.grid(), legend(series)];
    for (slot, entry) in series.iter().enumerate() {
        for (idx, &value) in entry.values.iter().enumerate().take(labels.len()) {
            let x = LEFT + band * as_f64(idx) + band * 0.1_f64 + bar_width * as_f64(slot);
            let (top, bottom) = (scale.y(value.max(0.0_f64)), scale.y(value.min(0.0_f64)));
            parts.push(format!(
                "<rect x=\"{x:.1}\" y=\"{top:.1}\" width=\"{bar_width:.1}\" height=\"{:.1}\" \
                 fill=\"{}\" opacity=\"0.8\"/>",
                bottom - top,
                entry.color
            ));
        }
    }
    parts.push(x_labels(labels, band));
    parts.push("</svg>".to_owned());
    Some(parts.concat())
}

/// Line chart with markers, one line per series.
pub(crate) fn line_chart(title: &str, labels: &[String], series: &[Series<'_>]) -> Option<String> {
    if labels.is_empty() || series.is_empty() {
        return None;
    }
    let scale = Scale::covering(series.iter().flat_map(|entry| entry.values.iter().copied()));
    let band = (WIDTH - LEFT - RIGHT) / as_f64(labels.len());

    let mut parts = vec![svg_open(title, WIDTH, HEIGHT), scale.grid(), legend(series)];
    for entry in series {
        let points: Vec<(f64, f64)> = entry
            .values
            .iter()
            .take(labels.len())
            .enumerate()
            .map(|(idx, &value)| (LEFT + band * (as_f64(idx) + 0.5_f64), scale.y(value)))
            .collect();
        let path = points
            .iter()
            .map(|&(x, y)| format!("{x:.1},{y:.1}"))
            .collect::<Vec<_>>()
            .join(" ");
        parts.push(format!(
            "<polyline points=\"{path}\" fill=\"none\" stroke=\"{}\" stroke-width=\"2\"/>",
            entry.color
        ));
        parts.extend(points.iter().map(|&(x, y)| {
            format!(
                "<circle cx=\"{x:.1}\" cy=\"{y:.1}\" r=\"3\" fill=\"{}\"/>",
                entry.color
            )
        }));
    }
    parts.push(x_labels(labels, band));
    parts.push("</svg>".to_owned());
    Some(parts.concat())
}

/// Horizontal bars sorted as given, with value labels.
pub(crate) fn horizontal_bar_chart(
    title: &str,
    data: &[(String, f64)],
    color: &'static str,
) -> Option<String> {
    if data.is_empty() {
        return None;
    }
    let (label_width, row_height) = (170.0_f64, 24.0_f64);
    let height = TOP + as_f64(data.len()) * row_height + 16.0_f64;
    let max = data
        .iter()
        .map(|&(_, value)| value.abs())
        .fold(0.0_f64, f64::max)
        .max(f64::EPSILON);
    let plot = WIDTH - label_width - 90.0_f64;

    let mut parts = vec![svg_open(title, WIDTH, height)];
    for (idx, row) in data.iter().enumerate() {
        let (label, value) = (&row.0, row.1);
        let y = TOP + as_f64(idx) * row_height;
        let length = value.abs() / max * plot;
        parts.push(format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\" class=\"tick\">{}</text>\
             <rect x=\"{label_width:.1}\" y=\"{:.1}\" width=\"{length:.1}\" height=\"{:.1}\" fill=\"{color}\" opacity=\"0.8\"/>\
             <text x=\"{:.1}\" y=\"{:.1}\" class=\"value\">{}</text>",
            label_width - 6.0_f64,
            y + 15.0_f64,
            escape_html(label),
            y + 3.0_f64,
            row_height - 6.0_f64,
            label_width + length + 4.0_f64,
            y + 15.0_f64,
            short_value(value)
        ));
    }
    parts.push("</svg>".to_owned());
    Some(parts.concat())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds owned label/value pairs.
    fn pairs(items: &[(&str, f64)]) -> Vec<(String, f64)> {
        items
            .iter()
            .map(|&(label, value)| (label.to_owned(), value))
            .collect()
    }

    #[test]
    fn small_slices_fold_into_others() {
        let data = pairs(&[("Rent", 900.0), ("Food", 90.0), ("Gum", 5.0), ("Stamps", 5.0)]);
        let slices = fold_small_slices(&data, 0.02);
        let labels: Vec<&str> = slices.iter().map(|slice| slice.0.as_str()).collect();
        assert_eq!(labels, ["Rent", "Food", "Others"]);
        assert!((slices[2].1 - 10.0).abs() < 1e-9);
    }

    #[test]
    fn no_others_when_nothing_is_small() {
        let data = pairs(&[("A", 50.0), ("B", 50.0)]);
        let slices = fold_small_slices(&data, 0.02);
        assert_eq!(slices.len(), 2);
        assert!(slices.iter().all(|slice| slice.0 != OTHERS_LABEL));
    }

    #[test]
    fn empty_or_zero_data_has_no_pie() {
        assert!(pie_chart("Empty", &[], 0.02).is_none());
        assert!(pie_chart("Zero", &pairs(&[("A", 0.0)]), 0.02).is_none());
    }

    #[test]
    fn pie_escapes_labels() {
        let svg = pie_chart("Spending", &pairs(&[("<b>", 10.0), ("Tea & Co", 10.0)]), 0.02).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("&lt;b&gt;"));
        assert!(svg.contains("Tea &amp; Co"));
        assert!(svg.contains("50.0%"));
        assert_eq!(svg.matches("<path").count(), 2);
    }

    #[test]
    fn single_slice_is_a_circle() {
        let svg = pie_chart("One", &pairs(&[("Only", 42.0)]), 0.02).unwrap();
        assert!(svg.contains("<circle"));
        assert!(!svg.contains("<path"));
    }

    #[test]
    fn bar_chart_draws_each_bar() {
        let bars = vec![
            ("Income".to_owned(), 100.0, INCOME_COLOR),
            ("Spending".to_owned(), 40.0, SPENDING_COLOR),
            ("Net".to_owned(), -20.0, BALANCE_COLOR),
        ];
        let svg = bar_chart("Overview", &bars).unwrap();
        assert_eq!(svg.matches("<rect").count(), 3);
        assert!(svg.contains(">-20<"));
        assert!(bar_chart("Nothing", &[]).is_none());
        let flat = vec![("Zero".to_owned(), 0.0, NORMAL_COLOR)];
        assert!(bar_chart("Flat", &flat).is_none());
    }

    #[test]
    fn line_chart_has_one_polyline_per_series() {
        let labels = vec!["2025-01".to_owned(), "2025-02".to_owned()];
        let series = [
            Series {
                name: "Income",
                color: INCOME_COLOR,
                values: vec![10.0, 20.0],
            },
            Series {
                name: "Spending",
                color: SPENDING_COLOR,
                values: vec![5.0, 25.0],
            },
        ];
        let svg = line_chart("Trend", &labels, &series).unwrap();
        assert_eq!(svg.matches("<polyline").count(), 2);
        assert!(svg.contains("2025-02"));
        assert!(line_chart("Trend", &[], &series).is_none());
    }

    #[test]
    fn grouped_bars_per_label_and_series() {
        let labels = vec!["2024".to_owned(), "2025".to_owned()];
        let series = [
            Series {
                name: "Income",
                color: INCOME_COLOR,
                values: vec![1.0, 2.0],
            },
            Series {
                name: "Spending",
                color: SPENDING_COLOR,
                values: vec![3.0, 4.0],
            },
        ];
        let svg = grouped_bar_chart("Years", &labels, &series).unwrap();
        // Two legend swatches plus four bars.
        assert_eq!(svg.matches("<rect").count(), 6);
    }

    #[test]
    fn horizontal_bars_keep_order() {
        let data = pairs(&[("Rent", 900.0), ("Food", 300.0)]);
        let svg = horizontal_bar_chart("Top", &data, CATEGORY_COLOR).unwrap();
        let rent = svg.find("Rent").unwrap();
        let food = svg.find("Food").unwrap();
        assert!(rent < food);
        assert!(horizontal_bar_chart("Top", &[], CATEGORY_COLOR).is_none());
    }

    #[test]
    fn scale_handles_flat_data() {
        let scale = Scale::covering([0.0, 0.0]);
        assert!(scale.y(0.0).is_finite());
        let mixed = Scale::covering([-10.0, 30.0]);
        assert!(mixed.y(30.0) < mixed.y(0.0));
        assert!(mixed.y(-10.0) > mixed.y(0.0));
    }
}
