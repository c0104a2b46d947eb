//! Application error type and HTTP response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::addresses::AddressBookError;
use crate::cart::CartError;
use crate::checkout::CheckoutError;
use crate::commerce::CommerceError;

/// Top-level application error.
///
/// Each variant maps to an HTTP status; unexpected failures are reported
/// to Sentry before the response is built.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Commerce API error: {0}")]
    Commerce(#[from] CommerceError),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error(transparent)]
    Address(#[from] AddressBookError),

    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Commerce(e) => commerce_status(e),
            Self::Cart(e) => match e {
                CartError::InvalidQuantity => StatusCode::BAD_REQUEST,
                CartError::FetchFailed(inner)
                | CartError::AddFailed(inner)
                | CartError::UpdateFailed(inner)
                | CartError::RemoveFailed(inner)
                | CartError::ClearFailed(inner) => commerce_status(inner),
            },
            Self::Checkout(e) => match e {
                CheckoutError::AddressRequired
                | CheckoutError::PaymentMethodRequired
                | CheckoutError::UnknownPaymentMethod(_)
                | CheckoutError::EmptyCart
                | CheckoutError::InvalidAddress(_) => StatusCode::UNPROCESSABLE_ENTITY,
                CheckoutError::AlreadySubmitting | CheckoutError::NotAwaitingVerification => {
                    StatusCode::CONFLICT
                }
                CheckoutError::SubmissionFailed(inner) => commerce_status(inner),
                CheckoutError::VerificationFailed(_) => StatusCode::PAYMENT_REQUIRED,
            },
            Self::Address(e) => match e {
                AddressBookError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
                AddressBookError::NotFound => StatusCode::NOT_FOUND,
            },
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Session(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message. Upstream details stay in the logs.
    fn public_message(&self) -> String {
        match self {
            Self::Commerce(e) => match e {
                CommerceError::Unauthorized => "Please log in to continue".to_owned(),
                CommerceError::NotFound(_) => "Not found".to_owned(),
                CommerceError::RateLimited(secs) => {
                    format!("Too many requests, retry after {secs} seconds")
                }
                CommerceError::Api { message, .. } => message.clone(),
                CommerceError::Http(_) | CommerceError::Parse(_) => {
                    "The store is temporarily unavailable".to_owned()
                }
            },
            Self::Internal(_) | Self::Session(_) => "Internal server error".to_owned(),
            other => other.to_string(),
        }
    }

    fn is_unexpected(&self) -> bool {
        matches!(
            self,
            Self::Internal(_)
                | Self::Session(_)
                | Self::Commerce(CommerceError::Http(_) | CommerceError::Parse(_))
        )
    }
}

/// Upstream failures surface as 502, never as our own 500.
fn commerce_status(e: &CommerceError) -> StatusCode {
    match e {
        CommerceError::Unauthorized => StatusCode::UNAUTHORIZED,
        CommerceError::NotFound(_) => StatusCode::NOT_FOUND,
        CommerceError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
        CommerceError::Api { .. } | CommerceError::Http(_) | CommerceError::Parse(_) => {
            StatusCode::BAD_GATEWAY
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if self.is_unexpected() {
            tracing::error!(error = %self, status = %status, "Unexpected application error");
            sentry::capture_error(&self);
        } else {
            tracing::debug!(error = %self, status = %status, "Request failed");
        }

        let body = Json(json!({ "message": self.public_message() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_invalid_quantity_is_400() {
        let err = AppError::from(CartError::InvalidQuantity);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_checkout_validation_is_422() {
        let err = AppError::from(CheckoutError::AddressRequired);
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_reentrant_checkout_is_409() {
        let err = AppError::from(CheckoutError::AlreadySubmitting);
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_verification_failure_is_402() {
        let err = AppError::from(CheckoutError::VerificationFailed(
            CommerceError::Unauthorized,
        ));
        assert_eq!(err.status_code(), StatusCode::PAYMENT_REQUIRED);
    }

    #[test]
    fn test_upstream_unauthorized_maps_through() {
        let err = AppError::from(CartError::FetchFailed(CommerceError::Unauthorized));
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_upstream_failure_is_502_not_500() {
        let err = AppError::from(CommerceError::NotFound("x".into()));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        let err = AppError::from(CartError::AddFailed(CommerceError::Api {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "boom".into(),
        }));
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_internal_message_is_masked() {
        let err = AppError::Internal("secret detail".into());
        assert_eq!(err.public_message(), "Internal server error");
    }
}
