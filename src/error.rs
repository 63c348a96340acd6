//! Error types for the remote client and run orchestration.

use cipherscope_core::ValidationError;

/// Failure below HTTP semantics: connecting, writing, reading or framing.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The base URL is not `http://host[:port][/prefix]`.
    #[error("Invalid base URL {url}: {reason}")]
    InvalidUrl { url: String, reason: &'static str },

    /// Socket-level failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The response could not be parsed as HTTP/1.1.
    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// Failure of one typed remote call.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Local validation failed; nothing was sent.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Non-2xx response. `message` is the body's `error` field when present.
    #[error("HTTP {status}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Status { status: u16, message: Option<String> },

    /// A 2xx response whose body is not JSON.
    #[error("Response body is not JSON: {0}")]
    Decode(#[from] serde_json::Error),

    /// The call did not settle within the configured timeout.
    #[error("Request timed out")]
    Timeout,
}

impl ClientError {
    /// Message to show the user: the service's own `error` string when it
    /// sent one, otherwise the operation's fixed fallback.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ClientError::Status {
                message: Some(message),
                ..
            } => message.clone(),
            ClientError::Invalid(err) => err.to_string(),
            ClientError::Timeout => format!("{fallback}: request timed out"),
            _ => fallback.to_string(),
        }
    }
}

/// Outcome of a rejected or failed orchestrated run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RunError {
    /// Another run is pending on this panel.
    #[error("A run is already in progress")]
    Busy,

    /// Local validation failed; nothing was sent.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// The remote call failed; the message is what the panel displays.
    #[error("{0}")]
    Failed(String),

    /// A newer run or a shutdown invalidated this one before it settled.
    #[error("Run superseded")]
    Superseded,
}

impl RunError {
    /// The message a panel displays, if this error is user-facing.
    pub fn display_message(&self) -> Option<String> {
        match self {
            RunError::Invalid(e) => Some(e.to_string()),
            RunError::Failed(m) => Some(m.clone()),
            RunError::Busy | RunError::Superseded => None,
        }
    }
}
