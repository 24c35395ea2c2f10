use thiserror::Error;

/// Failures from the remote text-generation path.
///
/// None of these reach end callers: the fallback chain logs them and moves on
/// to the next strategy.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("text generation returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("text generation returned no content")]
    EmptyResponse,

    #[error("malformed model output: {0}")]
    MalformedResponse(String),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed remote forecast: {0}")]
    MalformedForecast(String),

    #[error("invalid base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}
