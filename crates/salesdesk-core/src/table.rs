//! Column-oriented tabular results handed to the narrative layer.

use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::types::MonthlyMetric;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "values", rename_all = "snake_case")]
pub enum ColumnValues {
    Numeric(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

impl ColumnValues {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Numeric(v) => v.len(),
            ColumnValues::Text(v) => v.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn cell(&self, row: usize) -> String {
        match self {
            ColumnValues::Numeric(v) => v
                .get(row)
                .copied()
                .flatten()
                .map(|x| x.to_string())
                .unwrap_or_default(),
            ColumnValues::Text(v) => v.get(row).cloned().flatten().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub values: ColumnValues,
}

/// An ordered set of named columns. Columns shorter than the longest one are
/// treated as null-padded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataTable {
    pub columns: Vec<Column>,
}

impl DataTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_numeric(mut self, name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        self.columns.push(Column {
            name: name.into(),
            values: ColumnValues::Numeric(values),
        });
        self
    }

    #[must_use]
    pub fn with_text(mut self, name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        self.columns.push(Column {
            name: name.into(),
            values: ColumnValues::Text(values),
        });
        self
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.columns
            .iter()
            .map(|c| c.values.len())
            .max()
            .unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Numeric columns in declaration order.
    pub fn numeric_columns(&self) -> impl Iterator<Item = (&str, &[Option<f64>])> {
        self.columns.iter().filter_map(|c| match &c.values {
            ColumnValues::Numeric(v) => Some((c.name.as_str(), v.as_slice())),
            ColumnValues::Text(_) => None,
        })
    }

    /// Cells of a numeric column, or `None` if the column is missing or textual.
    #[must_use]
    pub fn numeric(&self, name: &str) -> Option<&[Option<f64>]> {
        match &self.column(name)?.values {
            ColumnValues::Numeric(v) => Some(v.as_slice()),
            ColumnValues::Text(_) => None,
        }
    }

    /// Render the header plus the first `max_rows` rows as CSV.
    #[must_use]
    pub fn to_csv(&self, max_rows: usize) -> String {
        let mut out = String::new();
        let header: Vec<String> = self.columns.iter().map(|c| csv_escape(&c.name)).collect();
        out.push_str(&header.join(","));
        out.push('\n');

        for row in 0..self.row_count().min(max_rows) {
            let cells: Vec<String> = self
                .columns
                .iter()
                .map(|c| csv_escape(&c.values.cell(row)))
                .collect();
            out.push_str(&cells.join(","));
            out.push('\n');
        }
        out
    }
}

impl From<&[MonthlyMetric]> for DataTable {
    fn from(rows: &[MonthlyMetric]) -> Self {
        let months = rows
            .iter()
            .map(|r| Some(r.month.format("%Y-%m-%d").to_string()))
            .collect();
        DataTable::new()
            .with_text("month", months)
            .with_numeric("revenue", rows.iter().map(|r| r.revenue.to_f64()).collect())
            .with_numeric("cogs", rows.iter().map(|r| r.cogs.to_f64()).collect())
            .with_numeric(
                "gross_margin",
                rows.iter().map(|r| r.gross_margin.to_f64()).collect(),
            )
            .with_numeric(
                "roi",
                rows.iter()
                    .map(|r| r.roi.and_then(|roi| roi.to_f64()))
                    .collect(),
            )
    }
}

fn csv_escape(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::*;

    fn metric(month: u32, revenue: i64, cogs: i64, roi: Option<Decimal>) -> MonthlyMetric {
        MonthlyMetric {
            month: NaiveDate::from_ymd_opt(2024, month, 1).unwrap(),
            revenue: Decimal::new(revenue, 0),
            cogs: Decimal::new(cogs, 0),
            gross_margin: Decimal::new(revenue - cogs, 0),
            roi,
        }
    }

    #[test]
    fn empty_table_has_no_rows() {
        assert!(DataTable::new().is_empty());
        assert!(DataTable::new().with_numeric("revenue", vec![]).is_empty());
    }

    #[test]
    fn from_monthly_metrics_builds_expected_columns() {
        let rows = vec![
            metric(1, 1000, 0, None),
            metric(2, 1000, 500, Some(Decimal::ONE)),
        ];
        let table = DataTable::from(rows.as_slice());
        let names: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["month", "revenue", "cogs", "gross_margin", "roi"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.numeric("roi").unwrap(), &[None, Some(1.0)]);
        assert!(table.numeric("month").is_none());
    }

    #[test]
    fn csv_respects_row_limit_and_escapes() {
        let table = DataTable::new()
            .with_text(
                "name",
                vec![Some("Tailspin, Inc".to_string()), Some("Wingtip".to_string())],
            )
            .with_numeric("revenue", vec![Some(10.5), None]);
        assert_eq!(table.to_csv(1), "name,revenue\n\"Tailspin, Inc\",10.5\n");
        assert_eq!(
            table.to_csv(10),
            "name,revenue\n\"Tailspin, Inc\",10.5\nWingtip,\n"
        );
    }
}
