use thiserror::Error;

/// Failures reading from the tabular data source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors surfaced to callers of the metric and forecast operations.
///
/// Unlike text generation, these have no local substitute.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// The source returned nothing for the requested window.
    #[error("no data available: {0}")]
    DataUnavailable(String),

    /// A specific product or customer could not be resolved.
    #[error("not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Source(#[from] SourceError),
}
