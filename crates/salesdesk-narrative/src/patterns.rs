//! Deterministic pattern analysis used when no model narrative is available.

use salesdesk_core::format::{group_thousands, title_case};
use salesdesk_core::DataTable;

use crate::stats::{present, ColumnStats};

pub const NO_DATA: &str = "No data available for analysis.";
pub const NO_PATTERNS: &str = "Data analyzed successfully but no significant patterns detected";

/// Percentage change beyond which a column counts as trending.
const TREND_THRESHOLD_PCT: f64 = 10.0;
/// Columns whose std exceeds this share of the mean are flagged volatile.
const VOLATILITY_RATIO: f64 = 0.5;

/// Insight fragments for `table`, in column order followed by whole-table
/// notes. Never empty.
#[must_use]
pub fn analyze_patterns(table: &DataTable, context: Option<&str>) -> Vec<String> {
    let mut fragments = Vec::new();

    for (name, cells) in table.numeric_columns() {
        let values = present(cells);
        let Some(stats) = ColumnStats::compute(&values) else {
            continue;
        };
        let label = title_case(name);

        if values.len() > 1 {
            fragments.push(trend_fragment(&label, &values));
        }
        if stats.std.is_some_and(|std| std > stats.mean * VOLATILITY_RATIO) {
            fragments.push(format!(
                "{label}: High volatility (Range: {} - {})",
                group_thousands(stats.min, 0),
                group_thousands(stats.max, 0)
            ));
        }
    }

    if let Some(margin) = average_margin_pct(table) {
        fragments.push(format!("Average gross margin: {margin:.1}%"));
    }

    if let Some(roi) = table
        .numeric("roi")
        .and_then(|cells| ColumnStats::compute(&present(cells)))
    {
        fragments.push(format!("Average ROI: {:.2}x", roi.mean));
    }

    if let Some(context) = context.map(str::trim).filter(|c| !c.is_empty()) {
        fragments.push(format!("Contextual notes: {context}"));
    }

    if fragments.is_empty() {
        fragments.push(NO_PATTERNS.to_string());
    }
    fragments
}

/// Join fragments with `. ` so the result ends in exactly one period.
#[must_use]
pub fn render_insight(fragments: &[String]) -> String {
    let trimmed: Vec<&str> = fragments
        .iter()
        .map(|f| f.trim().trim_end_matches('.'))
        .filter(|f| !f.is_empty())
        .collect();
    format!("{}.", trimmed.join(". "))
}

/// Compare the mean of the first half of `values` with the rest.
#[allow(clippy::cast_precision_loss)]
fn trend_fragment(label: &str, values: &[f64]) -> String {
    let (head, tail) = values.split_at(values.len() / 2);
    let first = head.iter().sum::<f64>() / head.len() as f64;
    let second = tail.iter().sum::<f64>() / tail.len() as f64;

    let change_pct = if first.abs() < f64::EPSILON {
        0.0
    } else {
        (second - first) / first * 100.0
    };
    let direction = if change_pct > TREND_THRESHOLD_PCT {
        "Increasing"
    } else if change_pct < -TREND_THRESHOLD_PCT {
        "Decreasing"
    } else {
        "Stable"
    };

    format!(
        "{label}: {direction} trend ({change_pct:+.1}%) from {} to {}",
        group_thousands(first, 0),
        group_thousands(second, 0)
    )
}

/// Mean of `(revenue - cogs) / revenue` as a percentage over rows where both
/// are present and revenue is non-zero.
#[allow(clippy::cast_precision_loss)]
fn average_margin_pct(table: &DataTable) -> Option<f64> {
    let revenue = table.numeric("revenue")?;
    let cogs = table.numeric("cogs")?;
    let margins: Vec<f64> = revenue
        .iter()
        .zip(cogs)
        .filter_map(|(r, c)| match (r, c) {
            (Some(r), Some(c)) if r.abs() >= f64::EPSILON => Some((r - c) / r * 100.0),
            _ => None,
        })
        .collect();
    if margins.is_empty() {
        return None;
    }
    Some(margins.iter().sum::<f64>() / margins.len() as f64)
}
