//! Integration tests for Marigold.
//!
//! The storefront's cart and checkout flows run against [`FakeCommerce`],
//! an in-memory stand-in for the remote commerce API that can be told to
//! fail specific call categories.
//!
//! # Test Categories
//!
//! - `cart_totals` - cart/catalog pricing reconciliation
//! - `cart_store` - remote-synchronised cart mutations
//! - `checkout_flow` - payment-provider checkout orchestration

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use axum::http::StatusCode;
use rust_decimal::Decimal;

use marigold_core::{OrderId, PaymentStatus, ProductId};
use marigold_storefront::cart::CartBackend;
use marigold_storefront::checkout::OrderBackend;
use marigold_storefront::commerce::CommerceError;
use marigold_storefront::commerce::types::{
    CartEntry, Order, OrderPayload, OrderResponse, RazorpayCallback, RazorpayOrderResponse,
    StripeOrderResponse,
};

fn upstream_error(message: &str) -> CommerceError {
    CommerceError::Api {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: message.to_owned(),
    }
}

/// In-memory commerce API double.
///
/// Holds the cart as the flat entry list the real API returns, plus
/// failure switches and call counters for assertions.
#[derive(Default)]
pub struct FakeCommerce {
    entries: Mutex<Vec<CartEntry>>,
    orders: Mutex<Vec<Order>>,
    /// Fail cart mutations (add/update/remove/clear).
    pub fail_mutations: AtomicBool,
    /// Fail cart fetches.
    pub fail_fetch: AtomicBool,
    /// Fail order creation.
    pub fail_orders: AtomicBool,
    /// Reject Razorpay signature verification.
    pub fail_verification: AtomicBool,
    /// Number of cart fetches served.
    pub fetch_calls: AtomicUsize,
    /// Number of order creations attempted.
    pub order_calls: AtomicUsize,
    /// Number of verification calls attempted.
    pub verify_calls: AtomicUsize,
}

impl FakeCommerce {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a pre-populated cart.
    #[must_use]
    pub fn with_entries(entries: Vec<CartEntry>) -> Self {
        let fake = Self::default();
        *fake.entries.lock().expect("cart lock") = entries;
        fake
    }

    /// Current server-side cart entries.
    #[must_use]
    pub fn entries(&self) -> Vec<CartEntry> {
        self.entries.lock().expect("cart lock").clone()
    }

    /// Orders created so far.
    #[must_use]
    pub fn orders(&self) -> Vec<Order> {
        self.orders.lock().expect("orders lock").clone()
    }

    fn create_order(&self, payload: &OrderPayload) -> Order {
        let mut orders = self.orders.lock().expect("orders lock");
        let order = Order {
            id: OrderId::from(format!("order-{}", orders.len() + 1)),
            products: payload.products.clone(),
            total_amount: payload.total_amount,
            address: payload.address.clone(),
            payment_method: payload.payment_method,
            payment_status: PaymentStatus::Pending,
            status: marigold_core::OrderStatus::Pending,
            created_at: None,
        };
        orders.push(order.clone());
        order
    }
}

impl CartBackend for FakeCommerce {
    async fn fetch(&self) -> Result<Vec<CartEntry>, CommerceError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(upstream_error("fetch failed"));
        }
        Ok(self.entries())
    }

    async fn add(
        &self,
        product_id: &ProductId,
        size: &str,
        quantity: u32,
    ) -> Result<(), CommerceError> {
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(upstream_error("add failed"));
        }
        let mut entries = self.entries.lock().expect("cart lock");
        if let Some(entry) = entries
            .iter_mut()
            .find(|e| &e.product == product_id && e.size == size)
        {
            entry.quantity += quantity;
        } else {
            entries.push(CartEntry {
                product: product_id.clone(),
                size: size.to_owned(),
                quantity,
            });
        }
        Ok(())
    }

    async fn update(
        &self,
        product_id: &ProductId,
        size: &str,
        quantity: u32,
    ) -> Result<(), CommerceError> {
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(upstream_error("update failed"));
        }
        let mut entries = self.entries.lock().expect("cart lock");
        if quantity == 0 {
            entries.retain(|e| !(&e.product == product_id && e.size == size));
        } else if let Some(entry) = entries
            .iter_mut()
            .find(|e| &e.product == product_id && e.size == size)
        {
            entry.quantity = quantity;
        } else {
            entries.push(CartEntry {
                product: product_id.clone(),
                size: size.to_owned(),
                quantity,
            });
        }
        Ok(())
    }

    async fn remove(&self, product_id: &ProductId, size: &str) -> Result<(), CommerceError> {
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(upstream_error("remove failed"));
        }
        self.entries
            .lock()
            .expect("cart lock")
            .retain(|e| !(&e.product == product_id && e.size == size));
        Ok(())
    }

    async fn clear(&self) -> Result<(), CommerceError> {
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(upstream_error("clear failed"));
        }
        self.entries.lock().expect("cart lock").clear();
        Ok(())
    }
}

impl OrderBackend for FakeCommerce {
    async fn create_stripe_order(
        &self,
        payload: &OrderPayload,
    ) -> Result<StripeOrderResponse, CommerceError> {
        self.order_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_orders.load(Ordering::SeqCst) {
            return Err(upstream_error("order creation failed"));
        }
        let order = self.create_order(payload);
        Ok(StripeOrderResponse {
            session_id: format!("cs_test_{}", order.id),
        })
    }

    async fn create_razorpay_order(
        &self,
        payload: &OrderPayload,
    ) -> Result<RazorpayOrderResponse, CommerceError> {
        self.order_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_orders.load(Ordering::SeqCst) {
            return Err(upstream_error("order creation failed"));
        }
        let order = self.create_order(payload);
        Ok(RazorpayOrderResponse {
            order_id: format!("rzp_test_{}", order.id),
            total_amount: payload.total_amount,
            order,
        })
    }

    async fn create_cod_order(&self, payload: &OrderPayload) -> Result<OrderResponse, CommerceError> {
        self.order_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_orders.load(Ordering::SeqCst) {
            return Err(upstream_error("order creation failed"));
        }
        Ok(OrderResponse {
            order: self.create_order(payload),
        })
    }

    async fn verify_razorpay(&self, _callback: &RazorpayCallback) -> Result<(), CommerceError> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_verification.load(Ordering::SeqCst) {
            return Err(CommerceError::Api {
                status: StatusCode::BAD_REQUEST,
                message: "signature mismatch".to_owned(),
            });
        }
        Ok(())
    }
}

/// A catalog product for test fixtures.
#[must_use]
pub fn product(id: &str, price: i64) -> marigold_storefront::commerce::types::Product {
    marigold_storefront::commerce::types::Product {
        id: ProductId::from(id),
        name: format!("Product {id}"),
        price: Decimal::new(price, 0),
        image: vec![],
        description: None,
        sizes: vec!["S".into(), "M".into(), "L".into()],
        bestseller: false,
    }
}

/// A valid delivery address for test fixtures.
#[must_use]
pub fn address() -> marigold_core::Address {
    marigold_core::Address {
        street: "1 Main St".into(),
        city: "Springfield".into(),
        state: "IL".into(),
        zip_code: "62704".into(),
        country: "USA".into(),
    }
}
