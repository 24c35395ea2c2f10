use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::window::DateWindow;

/// One month of the revenue / cost-of-goods-sold join.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyMetric {
    /// First day of the calendar month.
    pub month: NaiveDate,
    pub revenue: Decimal,
    pub cogs: Decimal,
    /// Always `revenue - cogs`.
    pub gross_margin: Decimal,
    /// `gross_margin / cogs`; `None` when `cogs` is not positive.
    pub roi: Option<Decimal>,
}

/// Units sold (or forecast) for a single month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitPoint {
    pub month: NaiveDate,
    pub units: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRef {
    pub id: i64,
    pub name: String,
}

/// Which path produced the forecast values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastMethod {
    Statistical,
    Llm,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDemandSeries {
    pub product_id: i64,
    pub product_name: String,
    pub window: DateWindow,
    pub history: Vec<UnitPoint>,
    pub forecast: Vec<UnitPoint>,
    pub explanation: String,
    pub method: ForecastMethod,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerLocation {
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

/// Lifetime totals for one customer within the requested window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerMetrics {
    pub revenue: Decimal,
    pub profit: Decimal,
    pub invoices: i64,
    pub orders: i64,
    pub avg_line_value: Decimal,
    pub first_purchase: Option<NaiveDate>,
    pub last_purchase: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerMonth {
    pub month: NaiveDate,
    pub revenue: Decimal,
    pub profit: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerProduct {
    pub name: String,
    pub units: i64,
    pub revenue: Decimal,
    pub profit: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerSnapshot {
    pub id: i64,
    pub name: String,
    pub category: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub credit_limit: Option<Decimal>,
    pub location: CustomerLocation,
    pub metrics: CustomerMetrics,
    pub monthly: Vec<CustomerMonth>,
    /// At most five entries, highest revenue first.
    pub top_products: Vec<CustomerProduct>,
}

/// Whether generated text came from the remote model or the local fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationSource {
    Llm,
    Fallback,
}

impl GenerationSource {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            GenerationSource::Llm => "llm",
            GenerationSource::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeResult {
    pub insight: String,
    pub highlights: Vec<String>,
    pub generated_by: GenerationSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailDraft {
    pub subject: String,
    pub preview_text: String,
    /// HTML body.
    pub body: String,
    pub generated_by: GenerationSource,
}
