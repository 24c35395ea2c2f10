//! Customer value tiers from spend and purchase frequency.

use std::fmt;

use rust_decimal::Decimal;
use salesdesk_core::DateWindow;
use serde::{Deserialize, Serialize};

use crate::error::AnalyticsError;
use crate::source::{CustomerTotals, SalesSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CustomerSegment {
    #[serde(rename = "VIP")]
    Vip,
    #[serde(rename = "High Value")]
    HighValue,
    #[serde(rename = "Regular")]
    Regular,
    #[serde(rename = "At Risk")]
    AtRisk,
}

impl CustomerSegment {
    /// Thresholds are strict: spend and count must exceed the tier minimums.
    #[must_use]
    pub fn classify(total_spent: Decimal, purchase_count: i64) -> Self {
        if total_spent > Decimal::from(500_000) && purchase_count > 50 {
            Self::Vip
        } else if total_spent > Decimal::from(250_000) && purchase_count > 25 {
            Self::HighValue
        } else if total_spent > Decimal::from(50_000) {
            Self::Regular
        } else {
            Self::AtRisk
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Vip => "VIP",
            Self::HighValue => "High Value",
            Self::Regular => "Regular",
            Self::AtRisk => "At Risk",
        }
    }
}

impl fmt::Display for CustomerSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentedCustomer {
    #[serde(flatten)]
    pub totals: CustomerTotals,
    pub segment: CustomerSegment,
}

/// Segment counts alongside the classified customers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentReport {
    pub vip: usize,
    pub high_value: usize,
    pub regular: usize,
    pub at_risk: usize,
    pub customers: Vec<SegmentedCustomer>,
}

impl SegmentReport {
    #[must_use]
    pub fn from_customers(customers: Vec<SegmentedCustomer>) -> Self {
        let mut report = Self::default();
        for customer in &customers {
            match customer.segment {
                CustomerSegment::Vip => report.vip += 1,
                CustomerSegment::HighValue => report.high_value += 1,
                CustomerSegment::Regular => report.regular += 1,
                CustomerSegment::AtRisk => report.at_risk += 1,
            }
        }
        report.customers = customers;
        report
    }
}

/// Classify each customer, highest spend first.
#[must_use]
pub fn segment_customers(totals: Vec<CustomerTotals>) -> Vec<SegmentedCustomer> {
    let mut segmented: Vec<SegmentedCustomer> = totals
        .into_iter()
        .map(|totals| SegmentedCustomer {
            segment: CustomerSegment::classify(totals.total_spent, totals.purchase_count),
            totals,
        })
        .collect();
    segmented.sort_by(|a, b| {
        b.totals
            .total_spent
            .cmp(&a.totals.total_spent)
            .then_with(|| a.totals.customer_id.cmp(&b.totals.customer_id))
    });
    segmented
}

/// Segment every customer with purchases in `window`.
///
/// # Errors
///
/// Returns [`AnalyticsError::Source`] if the query fails, or
/// [`AnalyticsError::DataUnavailable`] if nobody purchased in the window.
pub async fn customer_segmentation<S: SalesSource>(
    source: &S,
    window: &DateWindow,
) -> Result<SegmentReport, AnalyticsError> {
    let totals = source.customer_totals(window).await?;
    if totals.is_empty() {
        return Err(AnalyticsError::DataUnavailable(format!(
            "no customer purchases between {} and {}",
            window.start, window.end
        )));
    }
    let report = SegmentReport::from_customers(segment_customers(totals));
    tracing::debug!(
        customers = report.customers.len(),
        vip = report.vip,
        at_risk = report.at_risk,
        "customers segmented"
    );
    Ok(report)
}
