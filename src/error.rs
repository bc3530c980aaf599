use reqwest::StatusCode;

use crate::PreparedRequest;

/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// Request path is not root-relative.
    #[error("request path must start with '/': {path:?}")]
    InvalidPath { path: String },
    /// Request body or query parameters could not be serialized.
    #[error("encode error: {0}")]
    Encode(String),
    /// Terminal failure after the retry policy gave up.
    #[error("{0}")]
    Rejected(Box<ErrorResult>),
    /// Response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),
}

impl HttpError {
    /// Returns the normalized failure when this is a rejected request.
    pub fn as_rejected(&self) -> Option<&ErrorResult> {
        match self {
            Self::Rejected(result) => Some(result),
            _ => None,
        }
    }
}

/// Normalized failure surfaced to callers on terminal rejection.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ErrorResult {
    /// Human-readable summary with retry count, base URL, path and upstream
    /// error message.
    pub message: String,
    /// The request that failed, as it was last dispatched.
    pub config: PreparedRequest,
    /// Number of retries performed before giving up.
    pub retries: u32,
    /// Underlying failure of the last attempt.
    #[source]
    pub error: Failure,
}

/// Failure of a single attempt.
#[derive(Debug, thiserror::Error)]
pub enum Failure {
    /// Network or request execution error from `reqwest`.
    #[error("transport error: {0}")]
    Transport(reqwest::Error),
    /// Non-success HTTP status code with raw response body.
    #[error("http error {status}: {body}")]
    Status { status: StatusCode, body: String },
}

impl Failure {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Transport(err) => err.status(),
            Self::Status { status, .. } => Some(*status),
        }
    }

    /// Upstream error text: the JSON body's `message` field when present,
    /// otherwise the raw failure message.
    pub fn upstream_message(&self) -> String {
        match self {
            Self::Transport(err) => err.to_string(),
            Self::Status { status, body } => serde_json::from_str::<serde_json::Value>(body)
                .ok()
                .and_then(|value| {
                    value
                        .get("message")
                        .and_then(|message| message.as_str())
                        .map(str::to_owned)
                })
                .unwrap_or_else(|| {
                    format!(
                        "Request failed with status code {}",
                        status.as_u16()
                    )
                }),
        }
    }
}
