use salesdesk_core::{CustomerSnapshot, DateWindow};

use crate::error::AnalyticsError;
use crate::source::SalesSource;

const SEARCH_LIMIT: usize = 5;
const TOP_PRODUCT_LIMIT: usize = 5;

/// Resolve `name_term` to the best-matching customer and assemble their
/// snapshot for `window`.
///
/// A customer with no purchases in the window still gets a snapshot, with
/// zeroed metrics and empty series.
///
/// # Errors
///
/// Returns [`AnalyticsError::NotFound`] when no customer name contains the
/// term, or [`AnalyticsError::Source`] when a query fails.
pub async fn build_customer_snapshot<S: SalesSource>(
    source: &S,
    name_term: &str,
    window: &DateWindow,
) -> Result<CustomerSnapshot, AnalyticsError> {
    let candidates = source.find_customers(name_term, SEARCH_LIMIT).await?;
    let Some(record) = candidates.into_iter().next() else {
        return Err(AnalyticsError::NotFound(format!(
            "no customer matching '{}'",
            name_term.trim()
        )));
    };

    let metrics = source
        .customer_metrics(record.id, window)
        .await?
        .unwrap_or_default();
    let monthly = source.customer_monthly_sales(record.id, window).await?;
    let top_products = source
        .customer_top_products(record.id, window, TOP_PRODUCT_LIMIT)
        .await?;

    tracing::debug!(
        customer_id = record.id,
        months = monthly.len(),
        products = top_products.len(),
        "customer snapshot built"
    );

    Ok(CustomerSnapshot {
        id: record.id,
        name: record.name,
        category: record.category,
        phone: record.phone,
        website: record.website,
        credit_limit: record.credit_limit,
        location: record.location,
        metrics,
        monthly,
        top_products,
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use salesdesk_core::CustomerLocation;

    use super::*;
    use crate::source::{CustomerRecord, InMemorySource, InvoiceLine};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn fixture() -> InMemorySource {
        let lines = (0..7)
            .map(|i| InvoiceLine {
                invoice_id: 100 + i,
                order_id: 200 + i,
                customer_id: 1,
                salesperson: None,
                invoice_date: ymd(2016, 1 + u32::try_from(i % 3).unwrap(), 10),
                product_id: i,
                product_name: format!("Product {i}"),
                quantity: 1,
                extended_price: Decimal::from(10 * (i + 1)),
                line_profit: Decimal::from(i + 1),
            })
            .collect();
        InMemorySource {
            customers: vec![CustomerRecord {
                id: 1,
                name: "Wingtip Toys (Sylvanite, MT)".to_string(),
                category: Some("Novelty Shop".to_string()),
                phone: Some("(406) 555-0100".to_string()),
                website: None,
                credit_limit: Some(Decimal::from(2500)),
                location: CustomerLocation {
                    city: Some("Sylvanite".to_string()),
                    state: Some("Montana".to_string()),
                    country: Some("United States".to_string()),
                },
            }],
            invoice_lines: lines,
            ..InMemorySource::default()
        }
    }

    #[tokio::test]
    async fn snapshot_collects_metrics_series_and_top_five() {
        let snapshot = build_customer_snapshot(&fixture(), "wingtip", &DateWindow::metrics_default())
            .await
            .unwrap();

        assert_eq!(snapshot.id, 1);
        assert_eq!(snapshot.metrics.invoices, 7);
        assert_eq!(snapshot.metrics.revenue, Decimal::from(280));
        assert_eq!(snapshot.monthly.len(), 3);
        assert_eq!(snapshot.top_products.len(), 5);
        assert_eq!(snapshot.top_products[0].name, "Product 6");
        assert_eq!(snapshot.location.state.as_deref(), Some("Montana"));
    }

    #[tokio::test]
    async fn snapshot_outside_window_has_zeroed_metrics() {
        let window = DateWindow::new(ymd(2020, 1, 1), ymd(2020, 12, 31));
        let snapshot = build_customer_snapshot(&fixture(), "Wingtip", &window)
            .await
            .unwrap();
        assert_eq!(snapshot.metrics.revenue, Decimal::ZERO);
        assert!(snapshot.monthly.is_empty());
        assert!(snapshot.top_products.is_empty());
    }

    #[tokio::test]
    async fn unknown_customer_is_not_found() {
        let err = build_customer_snapshot(&fixture(), "Contoso", &DateWindow::metrics_default())
            .await
            .unwrap_err();
        assert!(matches!(err, AnalyticsError::NotFound(_)));
    }
}
