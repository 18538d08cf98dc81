//! Commerce backend API client.
//!
//! # Architecture
//!
//! - Plain JSON-over-HTTP via `reqwest`; the backend is the source of truth
//! - Tenant id and access token are explicit parameters, not session cookies
//! - Category and product lists are cached in-memory via `moka` (5-minute
//!   TTL); cart endpoints are never cached

mod cache;
mod client;
pub mod types;

pub use client::BackendClient;
pub use types::{AddToCartRequest, CartPayload, RemoveFromCartRequest, UpdateCartRequest};

use thiserror::Error;

/// Errors that can occur when talking to the commerce backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Transport-level HTTP failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body could not be parsed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Business-rule rejection: requested quantity exceeds availability.
    #[error("Insufficient stock: {0}")]
    Stock(String),

    /// Any other non-success response from the backend.
    #[error("Backend error ({status}): {message}")]
    Api { status: u16, message: String },
}

impl BackendError {
    /// Whether this error is a stock rejection rather than a failure.
    #[must_use]
    pub const fn is_stock(&self) -> bool {
        matches!(self, Self::Stock(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_error_display() {
        let err = BackendError::NotFound("product P1".to_string());
        assert_eq!(err.to_string(), "Not found: product P1");

        let err = BackendError::Api {
            status: 502,
            message: "upstream down".to_string(),
        };
        assert_eq!(err.to_string(), "Backend error (502): upstream down");
    }

    #[test]
    fn stock_errors_are_distinguishable() {
        assert!(BackendError::Stock("only 2 left".to_string()).is_stock());
        assert!(
            !BackendError::Api {
                status: 500,
                message: String::new()
            }
            .is_stock()
        );
    }
}
