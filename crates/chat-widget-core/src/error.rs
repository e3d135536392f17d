//! Error types for the core library.

use thiserror::Error;

pub use reqwest::StatusCode;

/// A failed send cycle.
///
/// Every variant ends the cycle the same way for the user (the fallback
/// message); the distinction only matters for the diagnostic log.
#[derive(Error, Debug)]
pub enum ChatError {
    /// Connection, TLS or timeout failure while talking to the backend
    #[error("chat request failed: transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Backend answered outside the 2xx range
    #[error("chat request failed: backend returned status {0}")]
    Status(StatusCode),

    /// Body was not JSON or lacked a string `response` field
    #[error("chat request failed: malformed response: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Cycle was cancelled before the backend answered
    #[error("chat request failed: cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, ChatError>;
