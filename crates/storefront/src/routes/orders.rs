//! Order history handlers.

use axum::Json;
use axum::extract::{Path, State};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::instrument;

use marigold_core::{CurrencyCode, OrderId, OrderStatus, PaymentStatus, Price, ProductId};

use crate::commerce::types::Order;
use crate::error::AppError;
use crate::middleware::AuthSession;
use crate::state::AppState;

/// One line of an order as displayed.
#[derive(Debug, Clone, Serialize)]
pub struct OrderLineView {
    pub product_id: ProductId,
    pub size: String,
    pub quantity: u32,
    pub price: String,
}

/// Order display data.
#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
    pub id: OrderId,
    pub lines: Vec<OrderLineView>,
    pub total: String,
    pub payment_method: String,
    pub payment_status: PaymentStatus,
    pub status: OrderStatus,
    pub placed_at: Option<DateTime<Utc>>,
    /// Whether the shopper can still cancel.
    pub cancellable: bool,
    /// Whether the shopper can request a return.
    pub returnable: bool,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.clone(),
            lines: order
                .products
                .iter()
                .map(|line| OrderLineView {
                    product_id: line.product.clone(),
                    size: line.size.clone(),
                    quantity: line.quantity,
                    price: Price::new(line.price, CurrencyCode::USD).display(),
                })
                .collect(),
            total: Price::new(order.total_amount, CurrencyCode::USD).display(),
            payment_method: order.payment_method.label().to_owned(),
            payment_status: order.payment_status,
            status: order.status,
            placed_at: order.created_at,
            cancellable: matches!(order.status, OrderStatus::Pending | OrderStatus::Processing),
            returnable: order.status == OrderStatus::Delivered,
        }
    }
}

/// `GET /orders` - the shopper's order history.
#[instrument(skip(state, auth), fields(user_id = %auth.user.id))]
pub async fn history(
    State(state): State<AppState>,
    auth: AuthSession,
) -> Result<Json<Value>, AppError> {
    let orders = state
        .commerce()
        .session(auth.token.clone())
        .user_orders(&auth.user.id)
        .await?;

    let views: Vec<OrderView> = orders.iter().map(OrderView::from).collect();
    Ok(Json(json!({ "orders": views })))
}

/// `GET /orders/{id}` - order detail and confirmation lookup.
#[instrument(skip(state, auth), fields(user_id = %auth.user.id, order_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    auth: AuthSession,
    Path(id): Path<OrderId>,
) -> Result<Json<Value>, AppError> {
    let order = state
        .commerce()
        .session(auth.token.clone())
        .order(&auth.user.id, &id)
        .await?;

    Ok(Json(json!({ "order": OrderView::from(&order) })))
}

/// `POST /orders/{id}/cancel`.
#[instrument(skip(state, auth), fields(user_id = %auth.user.id, order_id = %id))]
pub async fn cancel(
    State(state): State<AppState>,
    auth: AuthSession,
    Path(id): Path<OrderId>,
) -> Result<Json<Value>, AppError> {
    state
        .commerce()
        .session(auth.token)
        .cancel_order(&id)
        .await?;

    Ok(Json(json!({ "message": "Order cancelled" })))
}

/// `POST /orders/{id}/return`.
#[instrument(skip(state, auth), fields(user_id = %auth.user.id, order_id = %id))]
pub async fn request_return(
    State(state): State<AppState>,
    auth: AuthSession,
    Path(id): Path<OrderId>,
) -> Result<Json<Value>, AppError> {
    state
        .commerce()
        .session(auth.token)
        .return_order(&id)
        .await?;

    Ok(Json(json!({ "message": "Return requested" })))
}
