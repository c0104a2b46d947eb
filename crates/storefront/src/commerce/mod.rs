//! Remote commerce API client.
//!
//! # Architecture
//!
//! - The commerce API is the source of truth - NO local persistence, direct
//!   REST calls under the `/api` base path
//! - In-memory caching via `moka` for catalog responses (5 minute TTL)
//! - Mutations are never cached; the cart and orders are always fetched fresh
//!
//! # Clients
//!
//! - [`CommerceClient`] - shared, unauthenticated client for public catalog
//!   data (products, bestsellers)
//! - [`CommerceSession`] - per-request client bound to a session bearer
//!   token, for cart, order, and account operations

mod cache;
mod client;
pub mod types;

pub use client::{CommerceClient, CommerceSession};
pub use types::*;

use axum::http::StatusCode;
use thiserror::Error;

/// Errors that can occur when calling the commerce API.
#[derive(Debug, Error)]
pub enum CommerceError {
    /// HTTP request failed (network error or timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned a non-success status with a message.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by the API.
        status: StatusCode,
        /// Error message from the response body, if any.
        message: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Session credentials were missing or rejected.
    #[error("Unauthorized")]
    Unauthorized,

    /// Rate limited by the commerce API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commerce_error_display() {
        let err = CommerceError::NotFound("product-123".to_string());
        assert_eq!(err.to_string(), "Not found: product-123");
    }

    #[test]
    fn test_api_error_display() {
        let err = CommerceError::Api {
            status: StatusCode::BAD_REQUEST,
            message: "size is required".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "API error (400 Bad Request): size is required"
        );
    }

    #[test]
    fn test_rate_limited_error() {
        let err = CommerceError::RateLimited(60);
        assert_eq!(err.to_string(), "Rate limited, retry after 60 seconds");
    }
}
