//! History provider error types

use thiserror::Error;

/// Errors that can occur when fetching state history
#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("History provider unavailable")]
    Unavailable,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Request timeout")]
    Timeout,

    #[error("Invalid response body: {0}")]
    Decode(String),
}

impl HistoryError {
    /// Classify a transport error the same way for every call site
    pub(crate) fn from_transport(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            HistoryError::Timeout
        } else if e.is_connect() {
            HistoryError::Unavailable
        } else {
            HistoryError::Request(e)
        }
    }
}

/// Result type alias for history operations
pub type HistoryResult<T> = Result<T, HistoryError>;
