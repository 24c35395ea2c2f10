//! Derived sales metrics: the revenue/COGS join, per-product demand
//! forecasts, ranked sales reports, customer segmentation, and customer
//! snapshots.
//!
//! All I/O goes through the [`SalesSource`] trait; the warehouse query layer
//! lives outside this crate.

pub mod aggregate;
pub mod customer;
pub mod demand;
pub mod error;
pub mod forecast;
pub mod reports;
pub mod segment;
pub mod source;

pub use aggregate::{aggregate_monthly, compute_roi};
pub use customer::build_customer_snapshot;
pub use demand::DemandForecaster;
pub use error::{AnalyticsError, SourceError};
pub use forecast::{clamp_horizon, forecast_units, StatisticalForecast, TrendLine};
pub use reports::{
    sales_by_location, salesperson_performance, top_customers, top_products, LocationSales,
    SalespersonPerformance, TopCustomer, TopProduct,
};
pub use segment::{
    customer_segmentation, segment_customers, CustomerSegment, SegmentReport, SegmentedCustomer,
};
pub use source::{
    CogsRow, CustomerRecord, CustomerTotals, InMemorySource, InvoiceLine, ProductRecord,
    ProductUnitsRow, RevenueRow, SalesSource,
};
