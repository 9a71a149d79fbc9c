//! Generation client error types.

use thiserror::Error;

pub type GenAiResult<T> = Result<T, GenAiError>;

#[derive(Debug, Error)]
pub enum GenAiError {
    #[error("No API credential configured")]
    MissingCredential,

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Generation failed: {0}")]
    OperationFailed(String),

    #[error("Generation failed: No output URI.")]
    NoOutput,

    #[error("Generation cancelled")]
    Cancelled,

    #[error("Generation did not finish after {0} status checks")]
    PollLimitExceeded(u32),

    /// Transport failure. The wrapped error never carries the request URL.
    #[error("Network error communicating with generation service")]
    Network(#[source] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for GenAiError {
    fn from(e: reqwest::Error) -> Self {
        let e = e.without_url();
        if e.is_decode() {
            Self::InvalidResponse(e.to_string())
        } else {
            Self::Network(e)
        }
    }
}

impl GenAiError {
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Classify a non-success HTTP response.
    ///
    /// Google APIs wrap failures as `{"error": {"code", "message", "status"}}`;
    /// the inner message is surfaced when present, otherwise the raw body.
    pub fn from_http_status(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| {
                v.get("error")
                    .and_then(|e| e.get("message"))
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| {
                let body = body.trim();
                if body.is_empty() {
                    format!("Generation service returned HTTP {}", status)
                } else {
                    body.to_string()
                }
            });

        Self::Api { status, message }
    }

    /// Whether a retry could plausibly succeed. Informational only; the
    /// workflow never retries on its own.
    pub fn is_retryable(&self) -> bool {
        match self {
            GenAiError::Network(_) => true,
            GenAiError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
