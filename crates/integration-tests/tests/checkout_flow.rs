//! Checkout orchestration against the fake commerce API.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::sync::atomic::Ordering;

use rust_decimal::Decimal;

use marigold_core::{AddressError, OrderId, PaymentMethod, UserId};
use marigold_integration_tests::{FakeCommerce, address, product};
use marigold_storefront::cart::{CartState, calculate, order_lines};
use marigold_storefront::checkout::{
    CheckoutError, CheckoutOrchestrator, CheckoutOutcome, CheckoutRequest, CheckoutStage,
};
use marigold_storefront::commerce::types::RazorpayCallback;

use marigold_core::ProductId;

fn priced_request(payment_method: PaymentMethod) -> CheckoutRequest {
    let mut cart = CartState::default();
    cart.add_line(&ProductId::from("p1"), "M", 2);
    let catalog = [product("p1", 500)];

    CheckoutRequest {
        address: address(),
        payment_method,
        lines: order_lines(&cart, &catalog),
        total_amount: calculate(&cart, &catalog).total,
    }
}

fn callback(order_id: &OrderId) -> RazorpayCallback {
    RazorpayCallback {
        razorpay_order_id: "rzp_test_order-1".into(),
        razorpay_payment_id: "pay_1".into(),
        razorpay_signature: "sig_1".into(),
        order_id: order_id.clone(),
        user_id: UserId::from("user-1"),
    }
}

#[tokio::test]
async fn test_invalid_address_never_reaches_the_backend() {
    let fake = Arc::new(FakeCommerce::new());
    let mut orchestrator = CheckoutOrchestrator::new(Arc::clone(&fake));

    let mut request = priced_request(PaymentMethod::CashOnDelivery);
    request.address.zip_code = "abc".into();

    let err = orchestrator.submit(request).await.unwrap_err();

    assert!(matches!(
        err,
        CheckoutError::InvalidAddress(AddressError::InvalidZipCode)
    ));
    assert_eq!(fake.order_calls.load(Ordering::SeqCst), 0);
    assert_eq!(orchestrator.stage(), &CheckoutStage::Idle);
}

#[tokio::test]
async fn test_empty_cart_never_reaches_the_backend() {
    let fake = Arc::new(FakeCommerce::new());
    let mut orchestrator = CheckoutOrchestrator::new(Arc::clone(&fake));

    let mut request = priced_request(PaymentMethod::Stripe);
    request.lines.clear();

    let err = orchestrator.submit(request).await.unwrap_err();

    assert!(matches!(err, CheckoutError::EmptyCart));
    assert_eq!(fake.order_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_cod_completes_synchronously() {
    let fake = Arc::new(FakeCommerce::new());
    let mut orchestrator = CheckoutOrchestrator::new(Arc::clone(&fake));

    let outcome = orchestrator
        .submit(priced_request(PaymentMethod::CashOnDelivery))
        .await
        .unwrap();

    let CheckoutOutcome::Completed { order_id } = outcome else {
        panic!("expected a completed outcome");
    };
    assert_eq!(
        orchestrator.stage(),
        &CheckoutStage::Completed {
            order_id: order_id.clone()
        }
    );

    let orders = fake.orders();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].total_amount, Decimal::new(1010, 0));
    assert_eq!(orders[0].payment_method, PaymentMethod::CashOnDelivery);
}

#[tokio::test]
async fn test_stripe_yields_redirect() {
    let fake = Arc::new(FakeCommerce::new());
    let mut orchestrator = CheckoutOrchestrator::new(Arc::clone(&fake));

    let outcome = orchestrator
        .submit(priced_request(PaymentMethod::Stripe))
        .await
        .unwrap();

    let CheckoutOutcome::RedirectToStripe { session_id } = outcome else {
        panic!("expected a redirect outcome");
    };
    assert_eq!(
        orchestrator.stage(),
        &CheckoutStage::Redirecting {
            session_id: session_id.clone()
        }
    );
}

#[tokio::test]
async fn test_razorpay_awaits_callback_then_completes() {
    let fake = Arc::new(FakeCommerce::new());
    let mut orchestrator = CheckoutOrchestrator::new(Arc::clone(&fake));

    let outcome = orchestrator
        .submit(priced_request(PaymentMethod::Razorpay))
        .await
        .unwrap();

    let CheckoutOutcome::AwaitRazorpay {
        provider_order_id,
        order_id,
        amount,
    } = outcome
    else {
        panic!("expected an awaiting outcome");
    };
    assert_eq!(amount, Decimal::new(1010, 0));
    assert!(provider_order_id.starts_with("rzp_test_"));

    let confirmed = orchestrator.confirm_razorpay(&callback(&order_id)).await.unwrap();

    assert_eq!(confirmed, order_id);
    assert_eq!(orchestrator.stage(), &CheckoutStage::Completed { order_id });
    assert_eq!(fake.verify_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_failed_verification_keeps_awaiting_stage() {
    let fake = Arc::new(FakeCommerce::new());
    let mut orchestrator = CheckoutOrchestrator::new(Arc::clone(&fake));

    let outcome = orchestrator
        .submit(priced_request(PaymentMethod::Razorpay))
        .await
        .unwrap();
    let CheckoutOutcome::AwaitRazorpay { order_id, .. } = outcome else {
        panic!("expected an awaiting outcome");
    };

    fake.fail_verification.store(true, Ordering::SeqCst);
    let err = orchestrator
        .confirm_razorpay(&callback(&order_id))
        .await
        .unwrap_err();

    assert!(matches!(err, CheckoutError::VerificationFailed(_)));
    // The shopper can retry the widget: the stage is still awaiting.
    assert!(matches!(
        orchestrator.stage(),
        CheckoutStage::AwaitingProviderCallback { .. }
    ));

    fake.fail_verification.store(false, Ordering::SeqCst);
    let confirmed = orchestrator.confirm_razorpay(&callback(&order_id)).await.unwrap();
    assert_eq!(confirmed, order_id);
}

#[tokio::test]
async fn test_confirm_without_pending_payment_is_rejected() {
    let fake = Arc::new(FakeCommerce::new());
    let mut orchestrator = CheckoutOrchestrator::new(Arc::clone(&fake));

    let err = orchestrator
        .confirm_razorpay(&callback(&OrderId::from("order-1")))
        .await
        .unwrap_err();

    assert!(matches!(err, CheckoutError::NotAwaitingVerification));
    assert_eq!(fake.verify_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_reentrant_submission_is_rejected() {
    let fake = Arc::new(FakeCommerce::new());
    let mut orchestrator =
        CheckoutOrchestrator::resume(Arc::clone(&fake), CheckoutStage::Submitting);

    let err = orchestrator
        .submit(priced_request(PaymentMethod::CashOnDelivery))
        .await
        .unwrap_err();

    assert!(matches!(err, CheckoutError::AlreadySubmitting));
    assert_eq!(fake.order_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_overlapping_submissions_create_a_single_order() {
    let fake = Arc::new(FakeCommerce::new());

    // First request: validation enters the submitting stage before any
    // backend call, so the route layer can persist it to the session.
    let mut first = CheckoutOrchestrator::new(Arc::clone(&fake));
    let prepared = first
        .begin(priced_request(PaymentMethod::CashOnDelivery))
        .unwrap();
    assert_eq!(first.stage(), &CheckoutStage::Submitting);
    assert_eq!(fake.order_calls.load(Ordering::SeqCst), 0);

    // Second request from the same session resumes from the persisted
    // stage and is rejected before reaching the backend.
    let mut second = CheckoutOrchestrator::resume(Arc::clone(&fake), first.stage().clone());
    let err = second
        .begin(priced_request(PaymentMethod::CashOnDelivery))
        .unwrap_err();
    assert!(matches!(err, CheckoutError::AlreadySubmitting));

    // The first request completes with exactly one order created.
    let outcome = first.dispatch(prepared).await.unwrap();
    assert!(matches!(outcome, CheckoutOutcome::Completed { .. }));
    assert_eq!(fake.order_calls.load(Ordering::SeqCst), 1);
    assert_eq!(fake.orders().len(), 1);
}

#[tokio::test]
async fn test_failed_validation_does_not_enter_submitting_stage() {
    let fake = Arc::new(FakeCommerce::new());
    let mut orchestrator = CheckoutOrchestrator::new(Arc::clone(&fake));

    let mut request = priced_request(PaymentMethod::Razorpay);
    request.address.street = String::new();

    let err = orchestrator.begin(request).unwrap_err();

    assert!(matches!(err, CheckoutError::InvalidAddress(_)));
    // Nothing to persist: a rejected submission must not lock the session
    // out of checkout.
    assert_eq!(orchestrator.stage(), &CheckoutStage::Idle);
}

#[tokio::test]
async fn test_backend_failure_returns_stage_to_idle() {
    let fake = Arc::new(FakeCommerce::new());
    fake.fail_orders.store(true, Ordering::SeqCst);
    let mut orchestrator = CheckoutOrchestrator::new(Arc::clone(&fake));

    let err = orchestrator
        .submit(priced_request(PaymentMethod::Stripe))
        .await
        .unwrap_err();

    assert!(matches!(err, CheckoutError::SubmissionFailed(_)));
    assert_eq!(orchestrator.stage(), &CheckoutStage::Idle);

    // A retry goes through once the API recovers.
    fake.fail_orders.store(false, Ordering::SeqCst);
    let outcome = orchestrator
        .submit(priced_request(PaymentMethod::Stripe))
        .await
        .unwrap();
    assert!(matches!(outcome, CheckoutOutcome::RedirectToStripe { .. }));
}

#[test]
fn test_unknown_payment_method_fails_to_parse() {
    let err = "paypal".parse::<PaymentMethod>().unwrap_err();
    assert_eq!(err.to_string(), "unknown payment method: paypal");
}
