//! Error types for the remote knowledge-base API.
//!
//! Every call through [`crate::api::RagApi`] returns a [`ClientError`].
//! The view layer turns errors into notices using [`ClientError::detail`],
//! which yields the server-provided `detail` string when there is one and
//! the transport error message otherwise.

use reqwest::StatusCode;
use thiserror::Error;

/// Result type for API and resource-client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Rejected locally before any request was sent.
    #[error("{0}")]
    Validation(String),

    /// The server answered with a non-success status.
    #[error("{detail}")]
    Api { status: StatusCode, detail: String },

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A success response whose body could not be decoded.
    #[error("invalid response: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Build an [`ClientError::Api`] from a status and raw response body.
    ///
    /// Error bodies are expected to look like `{"detail": "..."}`. When the
    /// body carries no string detail, the message falls back to the generic
    /// `Request failed with status code N`.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let detail = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string))
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| format!("Request failed with status code {}", status.as_u16()));
        Self::Api { status, detail }
    }

    /// Human-readable text for notices.
    pub fn detail(&self) -> String {
        self.to_string()
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status(),
            _ => None,
        }
    }
}
