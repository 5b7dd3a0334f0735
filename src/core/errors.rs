use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("API error: {code} - {message}")]
    ApiError { code: i32, message: String },

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Connection rejected with status {status}: {body}")]
    ConnectionRejected { status: u16, body: String },

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Malformed envelope: {0}")]
    EnvelopeError(String),

    #[error("Payload decode failed for {method}: {message}")]
    PayloadError { method: String, message: String },

    #[error("Configuration error: {0}")]
    ConfigError(#[from] crate::core::config::ConfigError),

    #[error("Other error: {0}")]
    Other(String),
}

impl ExchangeError {
    /// Whether this error ends the stream read loop.
    ///
    /// Envelope and payload decode failures are reported per frame and the
    /// loop keeps reading; transport-level failures are reported once and the
    /// loop exits.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::NetworkError(_) | Self::ConnectionRejected { .. }
        )
    }
}
