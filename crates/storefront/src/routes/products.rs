//! Product catalog handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Json, response::IntoResponse};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;

use marigold_core::{CurrencyCode, Price, ProductId};

use crate::commerce::types::{Product, ReviewInput};
use crate::error::AppError;
use crate::middleware::AuthSession;
use crate::state::AppState;

/// Product display data.
#[derive(Debug, Clone, Serialize)]
pub struct ProductView {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub price_display: String,
    pub image: Vec<String>,
    pub description: Option<String>,
    pub sizes: Vec<String>,
    pub bestseller: bool,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            price_display: Price::new(product.price, CurrencyCode::USD).display(),
            image: product.image.clone(),
            description: product.description.clone(),
            sizes: product.sizes.clone(),
            bestseller: product.bestseller,
        }
    }
}

/// Query parameters for the product listing.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Case-insensitive name filter.
    pub search: Option<String>,
}

/// `GET /products` - catalog listing with optional search filter.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let catalog = state.commerce().fetch_products().await?;

    let products: Vec<ProductView> = match query.search.as_deref().map(str::trim) {
        Some(term) if !term.is_empty() => {
            let needle = term.to_lowercase();
            catalog
                .iter()
                .filter(|p| p.name.to_lowercase().contains(&needle))
                .map(ProductView::from)
                .collect()
        }
        _ => catalog.iter().map(ProductView::from).collect(),
    };

    Ok(Json(json!({ "products": products })))
}

/// `GET /products/bestsellers`.
#[instrument(skip(state))]
pub async fn bestsellers(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let bestsellers = state.commerce().fetch_bestsellers().await?;
    let products: Vec<ProductView> = bestsellers.iter().map(ProductView::from).collect();
    Ok(Json(json!({ "products": products })))
}

/// `GET /products/{id}` - product detail.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<impl IntoResponse, AppError> {
    let product = state.commerce().fetch_product(&id).await?;
    Ok(Json(json!({ "product": ProductView::from(&product) })))
}

/// `POST /products/{id}/reviews` - submit a review.
#[instrument(skip(state, auth, review), fields(user_id = %auth.user.id))]
pub async fn submit_review(
    State(state): State<AppState>,
    auth: AuthSession,
    Path(id): Path<ProductId>,
    Json(review): Json<ReviewInput>,
) -> Result<impl IntoResponse, AppError> {
    if !(1..=5).contains(&review.rating) {
        return Err(AppError::Validation(
            "Rating must be between 1 and 5".to_owned(),
        ));
    }
    if review.comment.trim().is_empty() {
        return Err(AppError::Validation("Comment must not be empty".to_owned()));
    }

    state
        .commerce()
        .session(auth.token)
        .submit_review(&id, &review)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Review submitted" })),
    ))
}
