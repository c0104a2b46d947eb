//! Checkout orchestration.
//!
//! Drives a single order submission through its payment-provider-specific
//! flow. The stage is a serialisable state machine persisted in the
//! session, so a Stripe redirect or a Razorpay widget round trip can
//! resume where it left off.

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use marigold_core::{Address, AddressError, OrderId, PaymentMethod};

use crate::commerce::types::{
    OrderPayload, OrderResponse, RazorpayCallback, RazorpayOrderResponse, StripeOrderResponse,
};
use crate::commerce::{CommerceError, CommerceSession};

/// The remote side of a [`CheckoutOrchestrator`].
pub trait OrderBackend {
    /// Create an order to be paid through Stripe hosted checkout.
    fn create_stripe_order(
        &self,
        payload: &OrderPayload,
    ) -> impl Future<Output = Result<StripeOrderResponse, CommerceError>> + Send;
    /// Create an order to be paid through the Razorpay widget.
    fn create_razorpay_order(
        &self,
        payload: &OrderPayload,
    ) -> impl Future<Output = Result<RazorpayOrderResponse, CommerceError>> + Send;
    /// Create a cash-on-delivery order.
    fn create_cod_order(
        &self,
        payload: &OrderPayload,
    ) -> impl Future<Output = Result<OrderResponse, CommerceError>> + Send;
    /// Forward a Razorpay completion callback for signature verification.
    fn verify_razorpay(
        &self,
        callback: &RazorpayCallback,
    ) -> impl Future<Output = Result<(), CommerceError>> + Send;
}

impl OrderBackend for CommerceSession {
    async fn create_stripe_order(
        &self,
        payload: &OrderPayload,
    ) -> Result<StripeOrderResponse, CommerceError> {
        Self::create_stripe_order(self, payload).await
    }

    async fn create_razorpay_order(
        &self,
        payload: &OrderPayload,
    ) -> Result<RazorpayOrderResponse, CommerceError> {
        Self::create_razorpay_order(self, payload).await
    }

    async fn create_cod_order(&self, payload: &OrderPayload) -> Result<OrderResponse, CommerceError> {
        Self::create_cod_order(self, payload).await
    }

    async fn verify_razorpay(&self, callback: &RazorpayCallback) -> Result<(), CommerceError> {
        Self::verify_razorpay(self, callback).await
    }
}

impl<B: OrderBackend + Send + Sync> OrderBackend for std::sync::Arc<B> {
    async fn create_stripe_order(
        &self,
        payload: &OrderPayload,
    ) -> Result<StripeOrderResponse, CommerceError> {
        (**self).create_stripe_order(payload).await
    }

    async fn create_razorpay_order(
        &self,
        payload: &OrderPayload,
    ) -> Result<RazorpayOrderResponse, CommerceError> {
        (**self).create_razorpay_order(payload).await
    }

    async fn create_cod_order(&self, payload: &OrderPayload) -> Result<OrderResponse, CommerceError> {
        (**self).create_cod_order(payload).await
    }

    async fn verify_razorpay(&self, callback: &RazorpayCallback) -> Result<(), CommerceError> {
        (**self).verify_razorpay(callback).await
    }
}

/// Where a checkout currently stands. Serialised into the session between
/// requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum CheckoutStage {
    /// Nothing in flight.
    #[default]
    Idle,
    /// An order submission is in flight.
    Submitting,
    /// Stripe order created; the shopper is being sent to hosted checkout.
    Redirecting { session_id: String },
    /// Razorpay order created; waiting for the widget's completion callback.
    AwaitingProviderCallback {
        provider_order_id: String,
        order_id: OrderId,
    },
    /// Payment settled, order confirmed.
    Completed { order_id: OrderId },
    /// Submission failed; safe to retry.
    Failed { reason: String },
}

/// Checkout failures.
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("A delivery address is required")]
    AddressRequired,
    #[error("A payment method is required")]
    PaymentMethodRequired,
    #[error("Unknown payment method: {0}")]
    UnknownPaymentMethod(String),
    #[error("Cannot place an order with an empty cart")]
    EmptyCart,
    #[error("An order submission is already in progress")]
    AlreadySubmitting,
    #[error("No payment is awaiting verification")]
    NotAwaitingVerification,
    #[error("Invalid delivery address: {0}")]
    InvalidAddress(#[from] AddressError),
    #[error("Order submission failed")]
    SubmissionFailed(#[source] CommerceError),
    #[error("Payment verification failed")]
    VerificationFailed(#[source] CommerceError),
}

/// What the route layer should do next after a successful submission.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutOutcome {
    /// Send the shopper to Stripe hosted checkout.
    RedirectToStripe { session_id: String },
    /// Open the Razorpay widget and wait for its callback.
    AwaitRazorpay {
        provider_order_id: String,
        order_id: OrderId,
        amount: rust_decimal::Decimal,
    },
    /// Payment settled synchronously (cash on delivery).
    Completed { order_id: OrderId },
}

/// A checkout submission request, already reduced to validated inputs.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub address: Address,
    pub payment_method: PaymentMethod,
    pub lines: Vec<crate::commerce::types::OrderLine>,
    pub total_amount: rust_decimal::Decimal,
}

/// A validated order submission, ready to send to the backend.
///
/// Produced by [`CheckoutOrchestrator::begin`]; holding one means the
/// orchestrator has entered [`CheckoutStage::Submitting`].
#[derive(Debug)]
pub struct PreparedSubmission {
    payload: OrderPayload,
}

/// Drives one checkout attempt against an [`OrderBackend`].
pub struct CheckoutOrchestrator<B> {
    backend: B,
    stage: CheckoutStage,
}

impl<B: OrderBackend> CheckoutOrchestrator<B> {
    /// Start a fresh checkout.
    pub const fn new(backend: B) -> Self {
        Self {
            backend,
            stage: CheckoutStage::Idle,
        }
    }

    /// Resume from a stage persisted in the session.
    pub const fn resume(backend: B, stage: CheckoutStage) -> Self {
        Self { backend, stage }
    }

    /// Current stage, for persisting back into the session.
    #[must_use]
    pub const fn stage(&self) -> &CheckoutStage {
        &self.stage
    }

    /// Validate a submission and enter [`CheckoutStage::Submitting`].
    ///
    /// No backend call happens here. The caller persists the stage first,
    /// so an overlapping submission resumed from it is rejected, and only
    /// then hands the prepared submission to [`Self::dispatch`].
    ///
    /// # Errors
    ///
    /// Validation failures leave the stage untouched and never reach the
    /// backend; [`CheckoutError::AlreadySubmitting`] rejects a re-entrant
    /// submission.
    pub fn begin(&mut self, request: CheckoutRequest) -> Result<PreparedSubmission, CheckoutError> {
        if self.stage == CheckoutStage::Submitting {
            return Err(CheckoutError::AlreadySubmitting);
        }

        request.address.validate()?;
        if request.lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let payload = OrderPayload {
            products: request.lines,
            total_amount: request.total_amount,
            address: request.address,
            payment_method: request.payment_method,
        };

        self.stage = CheckoutStage::Submitting;
        Ok(PreparedSubmission { payload })
    }

    /// Create the order through the provider-specific backend call and
    /// advance the stage. On backend failure the stage returns to
    /// [`CheckoutStage::Idle`] so the shopper can retry.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::SubmissionFailed`] when the backend
    /// rejects the order.
    #[instrument(skip(self, prepared), fields(payment_method = %prepared.payload.payment_method))]
    pub async fn dispatch(
        &mut self,
        prepared: PreparedSubmission,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        let payload = prepared.payload;

        let result = match payload.payment_method {
            PaymentMethod::Stripe => self.submit_stripe(&payload).await,
            PaymentMethod::Razorpay => self.submit_razorpay(&payload).await,
            PaymentMethod::CashOnDelivery => self.submit_cod(&payload).await,
        };

        match result {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                warn!(error = %e, "Order submission failed");
                self.stage = CheckoutStage::Idle;
                Err(CheckoutError::SubmissionFailed(e))
            }
        }
    }

    /// Submit an order in one step: [`Self::begin`] then [`Self::dispatch`].
    ///
    /// Callers that persist the stage between requests should use the two
    /// phases directly so the submitting stage is observable.
    ///
    /// # Errors
    ///
    /// See [`Self::begin`] and [`Self::dispatch`].
    pub async fn submit(&mut self, request: CheckoutRequest) -> Result<CheckoutOutcome, CheckoutError> {
        let prepared = self.begin(request)?;
        self.dispatch(prepared).await
    }

    async fn submit_stripe(&mut self, payload: &OrderPayload) -> Result<CheckoutOutcome, CommerceError> {
        let response = self.backend.create_stripe_order(payload).await?;
        info!(session_id = %response.session_id, "Stripe checkout session created");
        self.stage = CheckoutStage::Redirecting {
            session_id: response.session_id.clone(),
        };
        Ok(CheckoutOutcome::RedirectToStripe {
            session_id: response.session_id,
        })
    }

    async fn submit_razorpay(
        &mut self,
        payload: &OrderPayload,
    ) -> Result<CheckoutOutcome, CommerceError> {
        let response = self.backend.create_razorpay_order(payload).await?;
        info!(provider_order_id = %response.order_id, "Razorpay order created");
        self.stage = CheckoutStage::AwaitingProviderCallback {
            provider_order_id: response.order_id.clone(),
            order_id: response.order.id.clone(),
        };
        Ok(CheckoutOutcome::AwaitRazorpay {
            provider_order_id: response.order_id,
            order_id: response.order.id,
            amount: response.total_amount,
        })
    }

    async fn submit_cod(&mut self, payload: &OrderPayload) -> Result<CheckoutOutcome, CommerceError> {
        let response = self.backend.create_cod_order(payload).await?;
        info!(order_id = %response.order.id, "Cash-on-delivery order placed");
        self.stage = CheckoutStage::Completed {
            order_id: response.order.id.clone(),
        };
        Ok(CheckoutOutcome::Completed {
            order_id: response.order.id,
        })
    }

    /// Confirm a Razorpay payment from the widget's completion callback.
    ///
    /// Only valid in [`CheckoutStage::AwaitingProviderCallback`]. On
    /// verification failure the stage is kept so the shopper can retry the
    /// widget.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::NotAwaitingVerification`] out of stage and
    /// [`CheckoutError::VerificationFailed`] when the API rejects the
    /// signature.
    #[instrument(skip(self, callback), fields(order_id = %callback.order_id))]
    pub async fn confirm_razorpay(
        &mut self,
        callback: &RazorpayCallback,
    ) -> Result<OrderId, CheckoutError> {
        let CheckoutStage::AwaitingProviderCallback { order_id, .. } = &self.stage else {
            return Err(CheckoutError::NotAwaitingVerification);
        };
        let order_id = order_id.clone();

        match self.backend.verify_razorpay(callback).await {
            Ok(()) => {
                info!(order_id = %order_id, "Razorpay payment verified");
                self.stage = CheckoutStage::Completed {
                    order_id: order_id.clone(),
                };
                Ok(order_id)
            }
            Err(e) => {
                // Keep the stage: the shopper can retry the widget.
                warn!(error = %e, "Razorpay verification failed");
                Err(CheckoutError::VerificationFailed(e))
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_serialisation_is_tagged() {
        let stage = CheckoutStage::Redirecting {
            session_id: "cs_123".into(),
        };
        let json = serde_json::to_value(&stage).unwrap();
        assert_eq!(json["stage"], "redirecting");
        assert_eq!(json["session_id"], "cs_123");
    }

    #[test]
    fn test_stage_round_trip() {
        let stage = CheckoutStage::AwaitingProviderCallback {
            provider_order_id: "rzp_1".into(),
            order_id: OrderId::from("o1"),
        };
        let json = serde_json::to_string(&stage).unwrap();
        let back: CheckoutStage = serde_json::from_str(&json).unwrap();
        assert_eq!(stage, back);
    }

    #[test]
    fn test_default_stage_is_idle() {
        assert_eq!(CheckoutStage::default(), CheckoutStage::Idle);
    }
}
