//! Revenue and cost-of-goods-sold join into monthly gross margin and ROI.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use salesdesk_core::{month_start, DateWindow, MonthlyMetric};

use crate::error::AnalyticsError;
use crate::source::{CogsRow, RevenueRow, SalesSource};

/// Outer-join revenue and COGS on month.
///
/// A month missing from either series counts as zero there. Duplicate months
/// within a series are summed. `roi` is only present when `cogs` is positive,
/// and months where revenue, cogs and margin are all zero are dropped.
#[must_use]
pub fn aggregate_monthly(revenue: &[RevenueRow], cogs: &[CogsRow]) -> Vec<MonthlyMetric> {
    let mut joined: BTreeMap<NaiveDate, (Decimal, Decimal)> = BTreeMap::new();
    for row in revenue {
        joined.entry(month_start(row.month)).or_default().0 += row.revenue;
    }
    for row in cogs {
        joined.entry(month_start(row.month)).or_default().1 += row.cogs;
    }

    joined
        .into_iter()
        .filter_map(|(month, (revenue, cogs))| {
            let gross_margin = revenue - cogs;
            if revenue.is_zero() && cogs.is_zero() && gross_margin.is_zero() {
                return None;
            }
            let roi = if cogs > Decimal::ZERO {
                gross_margin.checked_div(cogs)
            } else {
                None
            };
            Some(MonthlyMetric {
                month,
                revenue,
                cogs,
                gross_margin,
                roi,
            })
        })
        .collect()
}

/// Fetch both series for `window` and join them.
///
/// # Errors
///
/// Returns [`AnalyticsError::Source`] if either query fails, or
/// [`AnalyticsError::DataUnavailable`] if the join is empty.
pub async fn compute_roi<S: SalesSource>(
    source: &S,
    window: &DateWindow,
) -> Result<Vec<MonthlyMetric>, AnalyticsError> {
    let revenue = source.monthly_revenue(window).await?;
    let cogs = source.monthly_cogs(window).await?;
    let metrics = aggregate_monthly(&revenue, &cogs);

    tracing::debug!(
        revenue_rows = revenue.len(),
        cogs_rows = cogs.len(),
        months = metrics.len(),
        "aggregated monthly ROI"
    );

    if metrics.is_empty() {
        return Err(AnalyticsError::DataUnavailable(format!(
            "no revenue or cost rows between {} and {}",
            window.start, window.end
        )));
    }
    Ok(metrics)
}

#[cfg(test)]
mod tests {
    use crate::source::InMemorySource;

    use super::*;

    fn ymd(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    fn rev(month: NaiveDate, v: i64) -> RevenueRow {
        RevenueRow {
            month,
            revenue: Decimal::from(v),
        }
    }

    fn cost(month: NaiveDate, v: i64) -> CogsRow {
        CogsRow {
            month,
            cogs: Decimal::from(v),
        }
    }

    #[test]
    fn roi_absent_when_cogs_zero() {
        let metrics = aggregate_monthly(
            &[rev(ymd(2024, 1), 1000), rev(ymd(2024, 2), 1000)],
            &[cost(ymd(2024, 1), 0), cost(ymd(2024, 2), 500)],
        );
        assert_eq!(metrics.len(), 2);
        assert_eq!(metrics[0].gross_margin, Decimal::from(1000));
        assert_eq!(metrics[0].roi, None);
        assert_eq!(metrics[1].gross_margin, Decimal::from(500));
        assert_eq!(metrics[1].roi, Some(Decimal::ONE));
    }

    #[test]
    fn outer_join_fills_missing_side_with_zero() {
        let metrics = aggregate_monthly(&[rev(ymd(2024, 3), 200)], &[cost(ymd(2024, 1), 50)]);
        assert_eq!(metrics.len(), 2);
        assert_eq!(metrics[0].month, ymd(2024, 1));
        assert_eq!(metrics[0].revenue, Decimal::ZERO);
        assert_eq!(metrics[0].gross_margin, Decimal::from(-50));
        assert_eq!(metrics[0].roi, Some(Decimal::from(-1)));
        assert_eq!(metrics[1].cogs, Decimal::ZERO);
        assert_eq!(metrics[1].roi, None);
    }

    #[test]
    fn all_zero_months_are_dropped() {
        let metrics = aggregate_monthly(
            &[rev(ymd(2024, 1), 0), rev(ymd(2024, 2), 10)],
            &[cost(ymd(2024, 1), 0)],
        );
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].month, ymd(2024, 2));
    }

    #[test]
    fn duplicate_months_are_summed() {
        let metrics = aggregate_monthly(
            &[rev(ymd(2024, 1), 300), rev(ymd(2024, 1), 200)],
            &[cost(ymd(2024, 1), 100), cost(ymd(2024, 1), 150)],
        );
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].revenue, Decimal::from(500));
        assert_eq!(metrics[0].cogs, Decimal::from(250));
        assert_eq!(metrics[0].roi, Some(Decimal::ONE));
    }

    #[test]
    fn margin_is_exact_decimal_difference() {
        let metrics = aggregate_monthly(
            &[RevenueRow {
                month: ymd(2024, 1),
                revenue: Decimal::new(10_010, 2),
            }],
            &[CogsRow {
                month: ymd(2024, 1),
                cogs: Decimal::new(3_337, 2),
            }],
        );
        assert_eq!(metrics[0].gross_margin, Decimal::new(6_673, 2));
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(aggregate_monthly(&[], &[]).is_empty());
    }

    #[tokio::test]
    async fn compute_roi_reports_empty_window() {
        let source = InMemorySource::default();
        let window = DateWindow::metrics_default();
        let err = compute_roi(&source, &window).await.unwrap_err();
        assert!(matches!(err, AnalyticsError::DataUnavailable(_)));
    }

    #[tokio::test]
    async fn compute_roi_joins_source_series() {
        let source = InMemorySource {
            revenue: vec![rev(ymd(2015, 6), 400)],
            cogs: vec![cost(ymd(2015, 6), 100)],
            ..InMemorySource::default()
        };
        let metrics = compute_roi(&source, &DateWindow::metrics_default())
            .await
            .unwrap();
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].roi, Some(Decimal::from(3)));
    }
}
