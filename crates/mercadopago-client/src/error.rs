//! Payment Error Types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, PaymentError>;

/// Fixed message surfaced when a caller asks for a method other than PIX or boleto
pub const UNSUPPORTED_METHOD_MESSAGE: &str = "unsupported payment method";

/// Payment-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PaymentError {
    /// Network, DNS or timeout failure before a response arrived
    #[error("Transport error: {0}")]
    Transport(String),

    /// Provider answered with an `error` or `message` field
    #[error("Provider error: {message}")]
    Provider { message: String },

    /// Provider answered with a non-success HTTP status
    #[error("HTTP {status} from payment API")]
    Http { status: u16, body: String },

    /// Requested payment method is neither PIX nor boleto
    #[error("Unsupported payment method: {0}")]
    UnsupportedMethod(String),

    /// Expected response field was absent
    #[error("Missing field in provider response: {0}")]
    MissingField(String),

    /// Response body was not the JSON we expected
    #[error("Decode error: {0}")]
    Decode(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request rejected locally before reaching the network
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl PaymentError {
    /// Check if this error is retryable
    ///
    /// Retrying a creation is only safe through the same `PaymentAttempt`,
    /// so the provider sees the same idempotency key.
    pub const fn is_retryable(&self) -> bool {
        match self {
            PaymentError::Transport(_) => true,
            PaymentError::Http { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Get user-friendly message
    pub const fn user_message(&self) -> &str {
        match self {
            PaymentError::Transport(_) => "Could not reach the payment provider. Please try again.",
            PaymentError::Provider { .. } | PaymentError::Http { .. } => {
                "The payment provider rejected the request."
            }
            PaymentError::UnsupportedMethod(_) => "This payment method is not supported.",
            PaymentError::Config(_) => "Service configuration error.",
            _ => "An error occurred processing your payment.",
        }
    }

    /// Convert into the uniform error shape handed back to callers
    pub fn to_error_result(&self) -> ErrorResult {
        match self {
            PaymentError::Transport(message) => ErrorResult::new(message.clone()),
            PaymentError::Provider { message } => ErrorResult::new(message.clone()),
            PaymentError::Http { status, body } => ErrorResult {
                error: format!("API error: HTTP {status}"),
                response: Some(body.clone()),
            },
            PaymentError::UnsupportedMethod(_) => ErrorResult::new(UNSUPPORTED_METHOD_MESSAGE),
            other => ErrorResult::new(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for PaymentError {
    fn from(err: serde_json::Error) -> Self {
        PaymentError::Decode(err.to_string())
    }
}

/// Uniform error result: `{ "error": ..., "response": ... }`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResult {
    pub error: String,

    /// Raw provider body, attached when it helps diagnosis
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
}

impl ErrorResult {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            response: None,
        }
    }
}
