//! Cart route handlers.
//!
//! Each handler builds a [`CartStore`] over the session's commerce
//! connection, performs the mutation, and returns the re-fetched cart
//! priced against the current catalog.

use axum::Json;
use axum::extract::State;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use marigold_core::{CurrencyCode, Price, ProductId};

use crate::cart::{CartState, CartStore, calculate};
use crate::commerce::types::Product;
use crate::error::AppError;
use crate::middleware::AuthSession;
use crate::state::AppState;

/// One priced cart line.
#[derive(Debug, Clone, Serialize)]
pub struct CartItemView {
    pub product_id: ProductId,
    pub name: String,
    pub size: String,
    pub quantity: u32,
    pub price: String,
    pub line_total: String,
    pub image: Option<String>,
}

/// Priced cart display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub delivery_fee: String,
    pub total: String,
    pub item_count: u64,
}

impl CartView {
    fn build(cart: &CartState, catalog: &[Product]) -> Self {
        let totals = calculate(cart, catalog);

        let items = cart
            .lines()
            .filter_map(|(product_id, size, quantity)| {
                // Lines missing from the catalog are not shown or priced.
                let product = catalog.iter().find(|p| &p.id == product_id)?;
                let line_total = product.price * Decimal::from(quantity);
                Some(CartItemView {
                    product_id: product_id.clone(),
                    name: product.name.clone(),
                    size: size.to_owned(),
                    quantity,
                    price: display_usd(product.price),
                    line_total: display_usd(line_total),
                    image: product.image.first().cloned(),
                })
            })
            .collect();

        Self {
            items,
            subtotal: display_usd(totals.subtotal),
            delivery_fee: display_usd(totals.delivery_fee),
            total: display_usd(totals.total),
            item_count: totals.item_count,
        }
    }
}

fn display_usd(amount: Decimal) -> String {
    Price::new(amount, CurrencyCode::USD).display()
}

/// Body of the add/update cart mutations.
#[derive(Debug, Deserialize)]
pub struct CartLineRequest {
    pub product_id: ProductId,
    pub size: String,
    pub quantity: u32,
}

/// Body of the remove cart mutation.
#[derive(Debug, Deserialize)]
pub struct CartKeyRequest {
    pub product_id: ProductId,
    pub size: String,
}

async fn priced_view(state: &AppState, cart: &CartState) -> Result<Json<CartView>, AppError> {
    let catalog = state.commerce().fetch_products().await?;
    Ok(Json(CartView::build(cart, &catalog)))
}

/// `GET /cart` - the priced cart.
#[instrument(skip(state, auth), fields(user_id = %auth.user.id))]
pub async fn show(
    State(state): State<AppState>,
    auth: AuthSession,
) -> Result<Json<CartView>, AppError> {
    let store = CartStore::new(state.commerce().session(auth.token));
    let cart = store.refresh().await?;
    priced_view(&state, &cart).await
}

/// `POST /cart/add`.
#[instrument(skip(state, auth, body), fields(user_id = %auth.user.id))]
pub async fn add(
    State(state): State<AppState>,
    auth: AuthSession,
    Json(body): Json<CartLineRequest>,
) -> Result<Json<CartView>, AppError> {
    let store = CartStore::new(state.commerce().session(auth.token));
    let cart = store.add(&body.product_id, &body.size, body.quantity).await?;
    priced_view(&state, &cart).await
}

/// `POST /cart/update` - set a line's quantity; zero removes it.
#[instrument(skip(state, auth, body), fields(user_id = %auth.user.id))]
pub async fn update(
    State(state): State<AppState>,
    auth: AuthSession,
    Json(body): Json<CartLineRequest>,
) -> Result<Json<CartView>, AppError> {
    let store = CartStore::new(state.commerce().session(auth.token));
    let cart = store
        .set_quantity(&body.product_id, &body.size, body.quantity)
        .await?;
    priced_view(&state, &cart).await
}

/// `POST /cart/remove`.
#[instrument(skip(state, auth, body), fields(user_id = %auth.user.id))]
pub async fn remove(
    State(state): State<AppState>,
    auth: AuthSession,
    Json(body): Json<CartKeyRequest>,
) -> Result<Json<CartView>, AppError> {
    let store = CartStore::new(state.commerce().session(auth.token));
    let cart = store.remove(&body.product_id, &body.size).await?;
    priced_view(&state, &cart).await
}

/// `DELETE /cart`.
#[instrument(skip(state, auth), fields(user_id = %auth.user.id))]
pub async fn clear(
    State(state): State<AppState>,
    auth: AuthSession,
) -> Result<Json<CartView>, AppError> {
    let store = CartStore::new(state.commerce().session(auth.token));
    let cart = store.clear().await?;
    priced_view(&state, &cart).await
}
