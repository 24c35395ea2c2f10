//! Descriptive statistics over numeric table columns.

use std::fmt::Write as _;

use salesdesk_core::DataTable;

/// Summary of one numeric column with null cells dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStats {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; `None` with fewer than two values.
    pub std: Option<f64>,
    pub min: f64,
    pub max: f64,
}

impl ColumnStats {
    /// Returns `None` when no cell holds a value.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn compute(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;
        let std = (count > 1).then(|| {
            let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (count - 1) as f64).sqrt()
        });
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(Self {
            count,
            mean,
            std,
            min,
            max,
        })
    }
}

/// Non-null cells in row order.
#[must_use]
pub fn present(cells: &[Option<f64>]) -> Vec<f64> {
    cells.iter().flatten().copied().collect()
}

/// One line per numeric column, used as the statistics block of a prompt.
#[must_use]
pub fn describe(table: &DataTable) -> String {
    let mut out = String::new();
    for (name, cells) in table.numeric_columns() {
        let Some(stats) = ColumnStats::compute(&present(cells)) else {
            let _ = writeln!(out, "{name}: count=0");
            continue;
        };
        let std = stats
            .std
            .map_or_else(|| "n/a".to_string(), |s| format!("{s:.2}"));
        let _ = writeln!(
            out,
            "{name}: count={} mean={:.2} std={std} min={:.2} max={:.2}",
            stats.count, stats.mean, stats.min, stats.max
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn computes_sample_statistics() {
        let stats = ColumnStats::compute(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(stats.count, 8);
        assert!((stats.mean - 5.0).abs() < 1e-12);
        assert!((stats.std.unwrap() - 2.138_089_935_299_395).abs() < 1e-9);
        assert!((stats.min - 2.0).abs() < f64::EPSILON);
        assert!((stats.max - 9.0).abs() < f64::EPSILON);
    }

    #[test]
    fn single_value_has_no_std() {
        let stats = ColumnStats::compute(&[3.0]).unwrap();
        assert!(stats.std.is_none());
        assert!(ColumnStats::compute(&[]).is_none());
    }

    #[test]
    fn present_drops_nulls() {
        assert_eq!(present(&[Some(1.0), None, Some(3.0)]), vec![1.0, 3.0]);
    }

    #[test]
    fn describe_lists_numeric_columns_only() {
        let table = DataTable::new()
            .with_text("month", vec![Some("2024-01".into()), Some("2024-02".into())])
            .with_numeric("revenue", vec![Some(100.0), Some(300.0)])
            .with_numeric("roi", vec![None, None]);
        let text = describe(&table);
        assert!(text.contains("revenue: count=2 mean=200.00"));
        assert!(text.contains("roi: count=0"));
        assert!(!text.contains("month"));
    }
}
