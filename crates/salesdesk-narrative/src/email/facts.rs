use chrono::NaiveDate;
use rust_decimal::Decimal;
use salesdesk_core::format::format_currency;
use salesdesk_core::CustomerSnapshot;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MONEY: &str = "$0.00";
pub const DEFAULT_IDENT: &str = "N/A";
pub const DEFAULT_COUNT: &str = "0";
pub const DEFAULT_PRODUCTS: &str = "our latest products";
pub const DEFAULT_SEASON: &str = "this season";

/// Structured facts an email may reference. Every field is optional and
/// renders as a fixed placeholder when absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailFacts {
    pub company_name: Option<String>,
    pub invoice_number: Option<String>,
    pub amount_due: Option<Decimal>,
    pub due_date: Option<NaiveDate>,
    pub days_overdue: Option<i64>,
    pub order_number: Option<String>,
    pub order_total: Option<Decimal>,
    pub order_date: Option<NaiveDate>,
    pub item_count: Option<i64>,
    pub products: Vec<String>,
    pub season: Option<String>,
    pub discount_code: Option<String>,
    pub total_spent: Option<Decimal>,
    pub order_count: Option<i64>,
    pub last_purchase: Option<NaiveDate>,
}

impl EmailFacts {
    /// Relationship facts drawn from a customer snapshot: lifetime spend,
    /// order count, last purchase, and top product names.
    #[must_use]
    pub fn from_snapshot(snapshot: &CustomerSnapshot) -> Self {
        Self {
            company_name: Some(snapshot.name.clone()),
            total_spent: Some(snapshot.metrics.revenue),
            order_count: Some(snapshot.metrics.orders),
            last_purchase: snapshot.metrics.last_purchase,
            products: snapshot.top_products.iter().map(|p| p.name.clone()).collect(),
            ..Self::default()
        }
    }

    pub(crate) fn company(&self) -> String {
        text(self.company_name.as_deref())
    }

    pub(crate) fn invoice(&self) -> String {
        text(self.invoice_number.as_deref())
    }

    pub(crate) fn amount_due(&self) -> String {
        money(self.amount_due)
    }

    pub(crate) fn due_date(&self) -> String {
        date(self.due_date)
    }

    pub(crate) fn days_overdue(&self) -> String {
        count(self.days_overdue)
    }

    pub(crate) fn order(&self) -> String {
        text(self.order_number.as_deref())
    }

    pub(crate) fn order_total(&self) -> String {
        money(self.order_total)
    }

    pub(crate) fn order_date(&self) -> String {
        date(self.order_date)
    }

    pub(crate) fn item_count(&self) -> String {
        count(self.item_count)
    }

    pub(crate) fn products(&self) -> String {
        let names: Vec<&str> = self
            .products
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .collect();
        if names.is_empty() {
            DEFAULT_PRODUCTS.to_string()
        } else {
            names.join(", ")
        }
    }

    pub(crate) fn season(&self) -> String {
        self.season
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map_or_else(|| DEFAULT_SEASON.to_string(), str::to_string)
    }

    pub(crate) fn discount_code(&self) -> String {
        text(self.discount_code.as_deref())
    }

    pub(crate) fn total_spent(&self) -> String {
        money(self.total_spent)
    }

    pub(crate) fn order_count(&self) -> String {
        count(self.order_count)
    }

    pub(crate) fn last_purchase(&self) -> String {
        date(self.last_purchase)
    }

    /// `label: value` lines for every field, used in model briefs.
    pub(crate) fn brief_lines(&self) -> Vec<String> {
        vec![
            format!("Company: {}", self.company()),
            format!("Invoice number: {}", self.invoice()),
            format!("Amount due: {}", self.amount_due()),
            format!("Due date: {}", self.due_date()),
            format!("Days overdue: {}", self.days_overdue()),
            format!("Order number: {}", self.order()),
            format!("Order total: {}", self.order_total()),
            format!("Order date: {}", self.order_date()),
            format!("Items: {}", self.item_count()),
            format!("Products: {}", self.products()),
            format!("Season: {}", self.season()),
            format!("Discount code: {}", self.discount_code()),
            format!("Lifetime spend: {}", self.total_spent()),
            format!("Orders to date: {}", self.order_count()),
            format!("Last purchase: {}", self.last_purchase()),
        ]
    }
}

fn text(value: Option<&str>) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map_or_else(|| DEFAULT_IDENT.to_string(), str::to_string)
}

fn money(value: Option<Decimal>) -> String {
    value.map_or_else(|| DEFAULT_MONEY.to_string(), format_currency)
}

fn date(value: Option<NaiveDate>) -> String {
    value.map_or_else(
        || DEFAULT_IDENT.to_string(),
        |d| d.format("%B %-d, %Y").to_string(),
    )
}

fn count(value: Option<i64>) -> String {
    value.map_or_else(|| DEFAULT_COUNT.to_string(), |n| n.to_string())
}
