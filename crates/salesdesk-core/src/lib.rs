//! Shared domain types, tabular data, formatting helpers, and configuration
//! for the salesdesk workspace.

pub mod app_config;
pub mod config;
pub mod format;
pub mod table;
pub mod types;
pub mod window;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use table::{Column, ColumnValues, DataTable};
pub use types::{
    CustomerLocation, CustomerMetrics, CustomerMonth, CustomerProduct, CustomerSnapshot,
    EmailDraft, ForecastMethod, GenerationSource, MonthlyMetric, NarrativeResult,
    ProductDemandSeries, ProductRef, UnitPoint,
};
pub use window::{add_months, month_start, DateWindow};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
