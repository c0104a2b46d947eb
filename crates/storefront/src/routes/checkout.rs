//! Checkout route handlers.
//!
//! The checkout stage lives in the session between requests, so the
//! Stripe redirect round trip and the Razorpay widget callback each pick
//! up the orchestrator where the previous request left it.

use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use marigold_core::{Address, AddressId, OrderId, PaymentMethod};

use crate::addresses::AddressBook;
use crate::cart::{CartStore, calculate, order_lines};
use crate::checkout::{
    CheckoutError, CheckoutOrchestrator, CheckoutOutcome, CheckoutRequest, CheckoutStage,
};
use crate::commerce::types::RazorpayCallback;
use crate::error::AppError;
use crate::middleware::AuthSession;
use crate::models::session::session_keys;
use crate::state::AppState;

/// Body of `POST /checkout/place-order`.
#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    /// Address book entry to deliver to; defaults to the selected address.
    pub address_id: Option<AddressId>,
    /// Payment method wire value (`stripe`, `razorpay`, `cash_on_delivery`).
    pub payment_method: Option<String>,
}

/// Body of `POST /checkout/razorpay/confirm`: the widget's completion
/// payload. The order and user ids are taken from the session, not the
/// client.
#[derive(Debug, Deserialize)]
pub struct RazorpayConfirmRequest {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
}

/// Query of `GET /checkout/stripe/return`.
#[derive(Debug, Deserialize)]
pub struct StripeReturnQuery {
    pub order_id: OrderId,
    /// `"true"` when Stripe reported success on the return URL.
    pub success: String,
}

async fn load_stage(auth: &AuthSession) -> Result<CheckoutStage, AppError> {
    Ok(auth
        .session
        .get::<CheckoutStage>(session_keys::CHECKOUT_STAGE)
        .await?
        .unwrap_or_default())
}

async fn store_stage(auth: &AuthSession, stage: &CheckoutStage) -> Result<(), AppError> {
    auth.session
        .insert(session_keys::CHECKOUT_STAGE, stage)
        .await?;
    Ok(())
}

/// Resolve the delivery address for an order from the session address
/// book: an explicit `address_id` wins, otherwise the book's selection.
fn resolve_address(book: &AddressBook, requested: Option<&AddressId>) -> Result<Address, CheckoutError> {
    match requested {
        Some(id) => book.get(id),
        None => book.selected(),
    }
    .map(|saved| saved.address.clone())
    .ok_or(CheckoutError::AddressRequired)
}

/// Parse the payment method wire value from the request body.
fn resolve_payment_method(raw: Option<&str>) -> Result<PaymentMethod, CheckoutError> {
    raw.ok_or(CheckoutError::PaymentMethodRequired)?
        .parse::<PaymentMethod>()
        .map_err(|e| CheckoutError::UnknownPaymentMethod(e.0))
}

/// `POST /checkout/place-order`.
#[instrument(skip(state, auth, body), fields(user_id = %auth.user.id))]
pub async fn place_order(
    State(state): State<AppState>,
    auth: AuthSession,
    Json(body): Json<PlaceOrderRequest>,
) -> Result<Json<Value>, AppError> {
    let book: AddressBook = auth
        .session
        .get(session_keys::ADDRESS_BOOK)
        .await?
        .unwrap_or_default();

    let address = resolve_address(&book, body.address_id.as_ref())?;
    let payment_method = resolve_payment_method(body.payment_method.as_deref())?;

    // Price the cart fresh; the quoted total and the submitted total come
    // from the same snapshot.
    let commerce = state.commerce().session(auth.token.clone());
    let store = CartStore::new(commerce.clone());
    let cart = store.refresh().await?;
    let catalog = state.commerce().fetch_products().await?;
    let lines = order_lines(&cart, &catalog);
    let totals = calculate(&cart, &catalog);

    let stage = load_stage(&auth).await?;
    let mut orchestrator = CheckoutOrchestrator::resume(commerce.clone(), stage);

    let prepared = orchestrator.begin(CheckoutRequest {
        address,
        payment_method,
        lines,
        total_amount: totals.total,
    })?;
    // Persist the submitting stage before the backend call, so an
    // overlapping submission from the same session is rejected instead of
    // creating a second order.
    store_stage(&auth, orchestrator.stage()).await?;

    let outcome = orchestrator.dispatch(prepared).await;
    store_stage(&auth, orchestrator.stage()).await?;
    let outcome = outcome?;

    match outcome {
        CheckoutOutcome::RedirectToStripe { session_id } => Ok(Json(json!({
            "status": "redirect",
            "session_id": session_id,
            "publishable_key": state.config().payments.stripe_publishable_key,
        }))),
        CheckoutOutcome::AwaitRazorpay {
            provider_order_id,
            order_id,
            amount,
        } => Ok(Json(json!({
            "status": "awaiting_payment",
            "provider_order_id": provider_order_id,
            "order_id": order_id,
            "amount": amount,
            "key_id": state.config().payments.razorpay_key_id,
        }))),
        CheckoutOutcome::Completed { order_id } => {
            finish_order(&store, &auth).await;
            Ok(Json(json!({
                "status": "completed",
                "order_id": order_id,
            })))
        }
    }
}

/// `POST /checkout/razorpay/confirm`.
#[instrument(skip(state, auth, body), fields(user_id = %auth.user.id))]
pub async fn confirm_razorpay(
    State(state): State<AppState>,
    auth: AuthSession,
    Json(body): Json<RazorpayConfirmRequest>,
) -> Result<Json<Value>, AppError> {
    let stage = load_stage(&auth).await?;
    let CheckoutStage::AwaitingProviderCallback { order_id, .. } = &stage else {
        return Err(AppError::Checkout(CheckoutError::NotAwaitingVerification));
    };

    let callback = RazorpayCallback {
        razorpay_order_id: body.razorpay_order_id,
        razorpay_payment_id: body.razorpay_payment_id,
        razorpay_signature: body.razorpay_signature,
        order_id: order_id.clone(),
        user_id: auth.user.id.clone(),
    };

    let commerce = state.commerce().session(auth.token.clone());
    let mut orchestrator = CheckoutOrchestrator::resume(commerce.clone(), stage);

    let result = orchestrator.confirm_razorpay(&callback).await;
    store_stage(&auth, orchestrator.stage()).await?;
    let order_id = result?;

    finish_order(&CartStore::new(commerce), &auth).await;

    Ok(Json(json!({
        "status": "completed",
        "order_id": order_id,
    })))
}

/// `GET /checkout/stripe/return` - verification after hosted checkout.
#[instrument(skip(state, auth, query), fields(user_id = %auth.user.id, order_id = %query.order_id))]
pub async fn stripe_return(
    State(state): State<AppState>,
    auth: AuthSession,
    Query(query): Query<StripeReturnQuery>,
) -> Result<Json<Value>, AppError> {
    let commerce = state.commerce().session(auth.token.clone());

    if query.success != "true" {
        store_stage(
            &auth,
            &CheckoutStage::Failed {
                reason: "Payment was cancelled".to_owned(),
            },
        )
        .await?;
        return Ok(Json(json!({
            "status": "payment_failed",
            "order_id": query.order_id,
        })));
    }

    match commerce.verify_stripe(&query.order_id).await {
        Ok(()) => {
            store_stage(
                &auth,
                &CheckoutStage::Completed {
                    order_id: query.order_id.clone(),
                },
            )
            .await?;
            finish_order(&CartStore::new(commerce), &auth).await;
            Ok(Json(json!({
                "status": "completed",
                "order_id": query.order_id,
            })))
        }
        Err(e) => {
            store_stage(
                &auth,
                &CheckoutStage::Failed {
                    reason: "Payment verification failed".to_owned(),
                },
            )
            .await?;
            Err(AppError::Checkout(CheckoutError::VerificationFailed(e)))
        }
    }
}

/// After a settled payment: clear the server cart, best effort.
async fn finish_order<B: crate::cart::CartBackend>(store: &CartStore<B>, auth: &AuthSession) {
    if let Err(e) = store.clear().await {
        tracing::warn!(error = %e, user_id = %auth.user.id, "Failed to clear cart after order");
    }
}
