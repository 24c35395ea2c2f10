//! Ranked sales reports: top customers, top products, salesperson
//! performance, and revenue by delivery location.

use rust_decimal::Decimal;
use salesdesk_core::DateWindow;
use serde::{Deserialize, Serialize};

use crate::error::AnalyticsError;
use crate::source::SalesSource;

/// Countries whose cities appear in the location report.
pub const REPORTED_COUNTRIES: [&str; 2] = ["United States", "United States of America"];

/// Label for revenue booked without a salesperson.
pub const UNKNOWN_SALESPERSON: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopCustomer {
    pub customer_id: i64,
    pub customer_name: String,
    pub total_revenue: Decimal,
    /// Distinct invoices.
    pub order_count: i64,
    /// Mean invoice-line value, 2 dp.
    pub avg_order_value: Decimal,
    pub total_profit: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopProduct {
    pub product_id: i64,
    pub product_name: String,
    pub brand: Option<String>,
    pub total_units: i64,
    pub total_revenue: Decimal,
    pub total_profit: Decimal,
    /// `None` when the product booked no revenue.
    pub profit_margin_pct: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalespersonPerformance {
    pub salesperson: String,
    pub total_invoices: i64,
    pub total_revenue: Decimal,
    pub total_profit: Decimal,
    pub avg_line_value: Decimal,
    pub profit_margin_pct: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationSales {
    pub city: String,
    pub state: String,
    pub country: String,
    pub total_revenue: Decimal,
    pub invoice_count: i64,
    pub unique_customers: i64,
}

/// `profit / revenue` as a percentage rounded to 2 dp; `None` for zero revenue.
#[must_use]
pub fn profit_margin_pct(profit: Decimal, revenue: Decimal) -> Option<Decimal> {
    profit
        .checked_div(revenue)
        .map(|ratio| (ratio * Decimal::ONE_HUNDRED).round_dp(2))
}

/// Customers ranked by revenue in `window`, at most `limit`.
///
/// # Errors
///
/// Returns [`AnalyticsError::Source`] if the query fails, or
/// [`AnalyticsError::DataUnavailable`] if nothing was invoiced in the window.
pub async fn top_customers<S: SalesSource>(
    source: &S,
    window: &DateWindow,
    limit: usize,
) -> Result<Vec<TopCustomer>, AnalyticsError> {
    let rows = source.top_customers(window, limit).await?;
    non_empty(rows, "top customers", window)
}

/// Products ranked by units sold in `window`, at most `limit`.
///
/// # Errors
///
/// Returns [`AnalyticsError::Source`] if the query fails, or
/// [`AnalyticsError::DataUnavailable`] if nothing was sold in the window.
pub async fn top_products<S: SalesSource>(
    source: &S,
    window: &DateWindow,
    limit: usize,
) -> Result<Vec<TopProduct>, AnalyticsError> {
    let rows = source.top_products(window, limit).await?;
    non_empty(rows, "top products", window)
}

/// Revenue and profit per salesperson in `window`, highest revenue first.
///
/// # Errors
///
/// Returns [`AnalyticsError::Source`] if the query fails, or
/// [`AnalyticsError::DataUnavailable`] if nothing was invoiced in the window.
pub async fn salesperson_performance<S: SalesSource>(
    source: &S,
    window: &DateWindow,
) -> Result<Vec<SalespersonPerformance>, AnalyticsError> {
    let rows = source.salesperson_performance(window).await?;
    non_empty(rows, "salesperson performance", window)
}

/// Revenue by customer delivery city, at most `limit` cities.
///
/// # Errors
///
/// Returns [`AnalyticsError::Source`] if the query fails, or
/// [`AnalyticsError::DataUnavailable`] if no located customer bought in the
/// window.
pub async fn sales_by_location<S: SalesSource>(
    source: &S,
    window: &DateWindow,
    limit: usize,
) -> Result<Vec<LocationSales>, AnalyticsError> {
    let rows = source.sales_by_location(window, limit).await?;
    non_empty(rows, "sales by location", window)
}

fn non_empty<T>(rows: Vec<T>, report: &str, window: &DateWindow) -> Result<Vec<T>, AnalyticsError> {
    if rows.is_empty() {
        return Err(AnalyticsError::DataUnavailable(format!(
            "no {report} between {} and {}",
            window.start, window.end
        )));
    }
    tracing::debug!(report, rows = rows.len(), "report computed");
    Ok(rows)
}
