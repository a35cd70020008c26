use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Conditions the analytics pipeline recovers from on its own.
///
/// None of these ever escapes [`crate::analyze`] as a failure; they are
/// attached to the report so callers can render a placeholder state.
#[derive(Debug, Error, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalyticsError {
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("Samples collapse to {value}; range widened to keep bin width positive")]
    DegenerateRange { value: f64 },

    #[error("No valid samples remain ({discarded} entries discarded)")]
    EmptyDataset { discarded: usize },

    #[error("Risk ratio is undefined: expected value is zero or the quotient is not finite")]
    UndefinedRatio,
}

impl AnalyticsError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput { reason: reason.into() }
    }
}

/// Error types for Voltwise service operations
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoltwiseError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("HTTP {0}: {1}")]
    HttpError(u16, String),

    #[error("Bin count must be between 1 and {0}")]
    InvalidBins(usize),

    #[error("Message exceeds maximum size of {0} bytes")]
    MessageTooLarge(usize),

    #[error("Message must not be empty")]
    EmptyMessage,

    #[error("Malformed response body: {0}")]
    Decode(String),
}

/// JSON error envelope returned by the server for all error responses
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Result type for Voltwise service operations
pub type Result<T> = std::result::Result<T, VoltwiseError>;
