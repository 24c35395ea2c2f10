//! The tabular data source boundary and an in-memory implementation.
//!
//! Production deployments back [`SalesSource`] with warehouse queries. The
//! in-memory source is loaded from a JSON fixture and serves the CLI and
//! tests; its aggregation mirrors the warehouse queries (group by calendar
//! month, sum line amounts, count distinct invoices).

use std::collections::{BTreeMap, HashMap, HashSet};
use std::future::Future;
use std::path::Path;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use salesdesk_core::{
    month_start, CustomerLocation, CustomerMetrics, CustomerMonth, CustomerProduct, DateWindow,
    ProductRef,
};
use serde::{Deserialize, Serialize};

use crate::error::SourceError;
use crate::reports::{
    profit_margin_pct, LocationSales, SalespersonPerformance, TopCustomer, TopProduct,
    REPORTED_COUNTRIES, UNKNOWN_SALESPERSON,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueRow {
    pub month: NaiveDate,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CogsRow {
    pub month: NaiveDate,
    pub cogs: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductUnitsRow {
    pub month: NaiveDate,
    pub product_id: i64,
    pub product_name: String,
    pub units: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub credit_limit: Option<Decimal>,
    #[serde(default)]
    pub location: CustomerLocation,
}

/// A stock item from the product catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
}

/// One invoice line, the grain customer, product, and salesperson figures
/// are computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLine {
    pub invoice_id: i64,
    pub order_id: i64,
    pub customer_id: i64,
    #[serde(default)]
    pub salesperson: Option<String>,
    pub invoice_date: NaiveDate,
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub extended_price: Decimal,
    pub line_profit: Decimal,
}

/// Per-customer spend and purchase frequency within a window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerTotals {
    pub customer_id: i64,
    pub customer_name: String,
    pub total_spent: Decimal,
    pub purchase_count: i64,
    pub avg_order_value: Decimal,
}

/// Read access to the sales warehouse.
///
/// Every series is returned ordered by month ascending.
pub trait SalesSource: Send + Sync {
    fn monthly_revenue(
        &self,
        window: &DateWindow,
    ) -> impl Future<Output = Result<Vec<RevenueRow>, SourceError>> + Send;

    fn monthly_cogs(
        &self,
        window: &DateWindow,
    ) -> impl Future<Output = Result<Vec<CogsRow>, SourceError>> + Send;

    fn product_monthly_units(
        &self,
        product_id: i64,
        window: &DateWindow,
    ) -> impl Future<Output = Result<Vec<ProductUnitsRow>, SourceError>> + Send;

    /// The product with the highest unit volume in the window, if any.
    fn top_product_by_units(
        &self,
        window: &DateWindow,
    ) -> impl Future<Output = Result<Option<ProductRef>, SourceError>> + Send;

    /// Customers whose name contains `term`, best match first.
    fn find_customers(
        &self,
        term: &str,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<CustomerRecord>, SourceError>> + Send;

    fn customer_metrics(
        &self,
        customer_id: i64,
        window: &DateWindow,
    ) -> impl Future<Output = Result<Option<CustomerMetrics>, SourceError>> + Send;

    fn customer_monthly_sales(
        &self,
        customer_id: i64,
        window: &DateWindow,
    ) -> impl Future<Output = Result<Vec<CustomerMonth>, SourceError>> + Send;

    /// Products bought by the customer, highest revenue first.
    fn customer_top_products(
        &self,
        customer_id: i64,
        window: &DateWindow,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<CustomerProduct>, SourceError>> + Send;

    fn customer_totals(
        &self,
        window: &DateWindow,
    ) -> impl Future<Output = Result<Vec<CustomerTotals>, SourceError>> + Send;

    /// Catalog products whose name contains `term`, ordered by name.
    fn find_products(
        &self,
        term: &str,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<ProductRef>, SourceError>> + Send;

    /// Customers by revenue, highest first.
    fn top_customers(
        &self,
        window: &DateWindow,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<TopCustomer>, SourceError>> + Send;

    /// Products by units sold, highest first.
    fn top_products(
        &self,
        window: &DateWindow,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<TopProduct>, SourceError>> + Send;

    /// One row per salesperson (unassigned lines grouped as `Unknown`),
    /// highest revenue first.
    fn salesperson_performance(
        &self,
        window: &DateWindow,
    ) -> impl Future<Output = Result<Vec<SalespersonPerformance>, SourceError>> + Send;

    /// Revenue by customer delivery city, highest first.
    fn sales_by_location(
        &self,
        window: &DateWindow,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<LocationSales>, SourceError>> + Send;
}

/// Fixture-backed source. Field names match the JSON fixture layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemorySource {
    #[serde(default)]
    pub revenue: Vec<RevenueRow>,
    #[serde(default)]
    pub cogs: Vec<CogsRow>,
    #[serde(default)]
    pub product_units: Vec<ProductUnitsRow>,
    #[serde(default)]
    pub products: Vec<ProductRecord>,
    #[serde(default)]
    pub customers: Vec<CustomerRecord>,
    #[serde(default)]
    pub invoice_lines: Vec<InvoiceLine>,
}

impl InMemorySource {
    /// Load a fixture from disk.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Io`] if the file cannot be read or
    /// [`SourceError::Deserialize`] if it is not a valid fixture.
    pub fn from_json_file(path: &Path) -> Result<Self, SourceError> {
        let raw = std::fs::read_to_string(path).map_err(|e| SourceError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_json_str(&raw, &path.display().to_string())
    }

    /// Parse a fixture from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Deserialize`] if the JSON does not match the
    /// fixture layout.
    pub fn from_json_str(raw: &str, context: &str) -> Result<Self, SourceError> {
        serde_json::from_str(raw).map_err(|e| SourceError::Deserialize {
            context: context.to_string(),
            source: e,
        })
    }

    fn lines_in<'a>(&'a self, window: &'a DateWindow) -> impl Iterator<Item = &'a InvoiceLine> + 'a {
        self.invoice_lines
            .iter()
            .filter(move |l| window.contains(l.invoice_date))
    }

    fn customer_name(&self, customer_id: i64) -> String {
        self.customers
            .iter()
            .find(|c| c.id == customer_id)
            .map_or_else(|| format!("Customer {customer_id}"), |c| c.name.clone())
    }

    fn lines_for<'a>(
        &'a self,
        customer_id: i64,
        window: &'a DateWindow,
    ) -> impl Iterator<Item = &'a InvoiceLine> + 'a {
        self.invoice_lines
            .iter()
            .filter(move |l| l.customer_id == customer_id && window.contains(l.invoice_date))
    }
}

/// Month rows are first-of-month dates, so a month overlaps the window when
/// it starts on or before the window end and is not before the window's month.
fn month_in_window(window: &DateWindow, month: NaiveDate) -> bool {
    let month = month_start(month);
    month_start(window.start) <= month && month <= window.end
}

impl SalesSource for InMemorySource {
    async fn monthly_revenue(&self, window: &DateWindow) -> Result<Vec<RevenueRow>, SourceError> {
        let mut by_month: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
        for row in self.revenue.iter().filter(|r| month_in_window(window, r.month)) {
            *by_month.entry(month_start(row.month)).or_default() += row.revenue;
        }
        Ok(by_month
            .into_iter()
            .map(|(month, revenue)| RevenueRow { month, revenue })
            .collect())
    }

    async fn monthly_cogs(&self, window: &DateWindow) -> Result<Vec<CogsRow>, SourceError> {
        let mut by_month: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
        for row in self.cogs.iter().filter(|r| month_in_window(window, r.month)) {
            *by_month.entry(month_start(row.month)).or_default() += row.cogs;
        }
        Ok(by_month
            .into_iter()
            .map(|(month, cogs)| CogsRow { month, cogs })
            .collect())
    }

    async fn product_monthly_units(
        &self,
        product_id: i64,
        window: &DateWindow,
    ) -> Result<Vec<ProductUnitsRow>, SourceError> {
        let mut by_month: BTreeMap<NaiveDate, ProductUnitsRow> = BTreeMap::new();
        for row in self
            .product_units
            .iter()
            .filter(|r| r.product_id == product_id && month_in_window(window, r.month))
        {
            let month = month_start(row.month);
            by_month
                .entry(month)
                .and_modify(|existing| existing.units += row.units)
                .or_insert_with(|| ProductUnitsRow {
                    month,
                    ..row.clone()
                });
        }
        Ok(by_month.into_values().collect())
    }

    async fn top_product_by_units(
        &self,
        window: &DateWindow,
    ) -> Result<Option<ProductRef>, SourceError> {
        let mut totals: BTreeMap<i64, (String, i64)> = BTreeMap::new();
        for row in self
            .product_units
            .iter()
            .filter(|r| month_in_window(window, r.month))
        {
            totals
                .entry(row.product_id)
                .or_insert_with(|| (row.product_name.clone(), 0))
                .1 += row.units;
        }
        // BTreeMap iteration is id-ascending, so ties resolve to the lowest id.
        let top = totals
            .into_iter()
            .fold(None::<(i64, String, i64)>, |best, (id, (name, units))| match best {
                Some((_, _, best_units)) if best_units >= units => best,
                _ => Some((id, name, units)),
            });
        Ok(top.map(|(id, name, _)| ProductRef { id, name }))
    }

    async fn find_customers(
        &self,
        term: &str,
        limit: usize,
    ) -> Result<Vec<CustomerRecord>, SourceError> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        let mut matches: Vec<&CustomerRecord> = self
            .customers
            .iter()
            .filter(|c| c.name.to_lowercase().contains(&needle))
            .collect();
        matches.sort_by_key(|c| (c.name.to_lowercase() != needle, c.name.len()));
        Ok(matches.into_iter().take(limit).cloned().collect())
    }

    async fn customer_metrics(
        &self,
        customer_id: i64,
        window: &DateWindow,
    ) -> Result<Option<CustomerMetrics>, SourceError> {
        let lines: Vec<&InvoiceLine> = self.lines_for(customer_id, window).collect();
        if lines.is_empty() {
            return Ok(None);
        }

        let revenue: Decimal = lines.iter().map(|l| l.extended_price).sum();
        let profit: Decimal = lines.iter().map(|l| l.line_profit).sum();
        let invoices = lines.iter().map(|l| l.invoice_id).collect::<HashSet<_>>();
        let orders = lines.iter().map(|l| l.order_id).collect::<HashSet<_>>();
        let avg_line_value = (revenue / Decimal::from(lines.len())).round_dp(2);

        Ok(Some(CustomerMetrics {
            revenue,
            profit,
            invoices: i64::try_from(invoices.len()).unwrap_or(i64::MAX),
            orders: i64::try_from(orders.len()).unwrap_or(i64::MAX),
            avg_line_value,
            first_purchase: lines.iter().map(|l| l.invoice_date).min(),
            last_purchase: lines.iter().map(|l| l.invoice_date).max(),
        }))
    }

    async fn customer_monthly_sales(
        &self,
        customer_id: i64,
        window: &DateWindow,
    ) -> Result<Vec<CustomerMonth>, SourceError> {
        let mut by_month: BTreeMap<NaiveDate, (Decimal, Decimal)> = BTreeMap::new();
        for line in self.lines_for(customer_id, window) {
            let entry = by_month.entry(month_start(line.invoice_date)).or_default();
            entry.0 += line.extended_price;
            entry.1 += line.line_profit;
        }
        Ok(by_month
            .into_iter()
            .map(|(month, (revenue, profit))| CustomerMonth {
                month,
                revenue,
                profit,
            })
            .collect())
    }

    async fn customer_top_products(
        &self,
        customer_id: i64,
        window: &DateWindow,
        limit: usize,
    ) -> Result<Vec<CustomerProduct>, SourceError> {
        let mut by_product: HashMap<&str, CustomerProduct> = HashMap::new();
        for line in self.lines_for(customer_id, window) {
            let entry = by_product
                .entry(line.product_name.as_str())
                .or_insert_with(|| CustomerProduct {
                    name: line.product_name.clone(),
                    units: 0,
                    revenue: Decimal::ZERO,
                    profit: Decimal::ZERO,
                });
            entry.units += line.quantity;
            entry.revenue += line.extended_price;
            entry.profit += line.line_profit;
        }
        let mut products: Vec<CustomerProduct> = by_product.into_values().collect();
        products.sort_by(|a, b| b.revenue.cmp(&a.revenue).then_with(|| a.name.cmp(&b.name)));
        products.truncate(limit);
        Ok(products)
    }

    async fn customer_totals(&self, window: &DateWindow) -> Result<Vec<CustomerTotals>, SourceError> {
        let mut grouped: BTreeMap<i64, LineTotals> = BTreeMap::new();
        for line in self.lines_in(window) {
            grouped.entry(line.customer_id).or_default().add(line);
        }

        Ok(grouped
            .into_iter()
            .map(|(customer_id, totals)| CustomerTotals {
                customer_id,
                customer_name: self.customer_name(customer_id),
                total_spent: totals.revenue,
                purchase_count: totals.invoice_count(),
                avg_order_value: totals.avg_line_value(),
            })
            .collect())
    }

    async fn find_products(&self, term: &str, limit: usize) -> Result<Vec<ProductRef>, SourceError> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        let mut matches: Vec<&ProductRecord> = self
            .products
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .collect();
        matches.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(matches
            .into_iter()
            .take(limit)
            .map(|p| ProductRef {
                id: p.id,
                name: p.name.clone(),
            })
            .collect())
    }

    async fn top_customers(
        &self,
        window: &DateWindow,
        limit: usize,
    ) -> Result<Vec<TopCustomer>, SourceError> {
        let mut grouped: HashMap<i64, LineTotals> = HashMap::new();
        for line in self.lines_in(window) {
            grouped.entry(line.customer_id).or_default().add(line);
        }

        let mut rows: Vec<TopCustomer> = grouped
            .into_iter()
            .map(|(customer_id, totals)| TopCustomer {
                customer_id,
                customer_name: self.customer_name(customer_id),
                total_revenue: totals.revenue,
                order_count: totals.invoice_count(),
                avg_order_value: totals.avg_line_value(),
                total_profit: totals.profit.round_dp(2),
            })
            .collect();
        rows.sort_by(|a, b| {
            b.total_revenue
                .cmp(&a.total_revenue)
                .then_with(|| a.customer_id.cmp(&b.customer_id))
        });
        rows.truncate(limit);
        Ok(rows)
    }

    async fn top_products(
        &self,
        window: &DateWindow,
        limit: usize,
    ) -> Result<Vec<TopProduct>, SourceError> {
        let mut grouped: HashMap<i64, (&str, LineTotals)> = HashMap::new();
        for line in self.lines_in(window) {
            grouped
                .entry(line.product_id)
                .or_insert_with(|| (line.product_name.as_str(), LineTotals::default()))
                .1
                .add(line);
        }

        let mut rows: Vec<TopProduct> = grouped
            .into_iter()
            .map(|(product_id, (line_name, totals))| {
                let catalog = self.products.iter().find(|p| p.id == product_id);
                TopProduct {
                    product_id,
                    product_name: catalog.map_or(line_name, |p| p.name.as_str()).to_string(),
                    brand: catalog.and_then(|p| p.brand.clone()),
                    total_units: totals.units,
                    total_revenue: totals.revenue.round_dp(2),
                    total_profit: totals.profit.round_dp(2),
                    profit_margin_pct: profit_margin_pct(totals.profit, totals.revenue),
                }
            })
            .collect();
        rows.sort_by(|a, b| {
            b.total_units
                .cmp(&a.total_units)
                .then_with(|| a.product_id.cmp(&b.product_id))
        });
        rows.truncate(limit);
        Ok(rows)
    }

    async fn salesperson_performance(
        &self,
        window: &DateWindow,
    ) -> Result<Vec<SalespersonPerformance>, SourceError> {
        let mut grouped: HashMap<&str, LineTotals> = HashMap::new();
        for line in self.lines_in(window) {
            let name = line
                .salesperson
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .unwrap_or(UNKNOWN_SALESPERSON);
            grouped.entry(name).or_default().add(line);
        }

        let mut rows: Vec<SalespersonPerformance> = grouped
            .into_iter()
            .map(|(name, totals)| SalespersonPerformance {
                salesperson: name.to_string(),
                total_invoices: totals.invoice_count(),
                total_revenue: totals.revenue.round_dp(2),
                total_profit: totals.profit.round_dp(2),
                avg_line_value: totals.avg_line_value(),
                profit_margin_pct: profit_margin_pct(totals.profit, totals.revenue),
            })
            .collect();
        rows.sort_by(|a, b| {
            b.total_revenue
                .cmp(&a.total_revenue)
                .then_with(|| a.salesperson.cmp(&b.salesperson))
        });
        Ok(rows)
    }

    async fn sales_by_location(
        &self,
        window: &DateWindow,
        limit: usize,
    ) -> Result<Vec<LocationSales>, SourceError> {
        let located: HashMap<i64, (&str, &str, &str)> = self
            .customers
            .iter()
            .filter_map(|c| {
                let loc = &c.location;
                match (loc.city.as_deref(), loc.state.as_deref(), loc.country.as_deref()) {
                    (Some(city), Some(state), Some(country))
                        if REPORTED_COUNTRIES.contains(&country) =>
                    {
                        Some((c.id, (city, state, country)))
                    }
                    _ => None,
                }
            })
            .collect();

        let mut grouped: HashMap<(&str, &str, &str), (LineTotals, HashSet<i64>)> = HashMap::new();
        for line in self.lines_in(window) {
            let Some(place) = located.get(&line.customer_id) else {
                continue;
            };
            let entry = grouped.entry(*place).or_default();
            entry.0.add(line);
            entry.1.insert(line.customer_id);
        }

        let mut rows: Vec<LocationSales> = grouped
            .into_iter()
            .map(|((city, state, country), (totals, customers))| LocationSales {
                city: city.to_string(),
                state: state.to_string(),
                country: country.to_string(),
                total_revenue: totals.revenue,
                invoice_count: totals.invoice_count(),
                unique_customers: i64::try_from(customers.len()).unwrap_or(i64::MAX),
            })
            .collect();
        rows.sort_by(|a, b| {
            b.total_revenue
                .cmp(&a.total_revenue)
                .then_with(|| a.city.cmp(&b.city))
        });
        rows.truncate(limit);
        Ok(rows)
    }
}

/// Running sums over a group of invoice lines.
#[derive(Debug, Default)]
struct LineTotals {
    revenue: Decimal,
    profit: Decimal,
    units: i64,
    lines: usize,
    invoices: HashSet<i64>,
}

impl LineTotals {
    fn add(&mut self, line: &InvoiceLine) {
        self.revenue += line.extended_price;
        self.profit += line.line_profit;
        self.units += line.quantity;
        self.lines += 1;
        self.invoices.insert(line.invoice_id);
    }

    fn invoice_count(&self) -> i64 {
        i64::try_from(self.invoices.len()).unwrap_or(i64::MAX)
    }

    fn avg_line_value(&self) -> Decimal {
        (self.revenue / Decimal::from(self.lines.max(1))).round_dp(2)
    }
}

#[cfg(test)]
#[path = "source_test.rs"]
mod tests;
