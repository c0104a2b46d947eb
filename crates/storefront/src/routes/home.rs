//! Home page and marketing content handlers.

use axum::Json;
use axum::extract::State;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::instrument;

use crate::error::AppError;
use crate::middleware::MaybeUser;
use crate::models::session::SessionUser;
use crate::state::AppState;

use super::products::ProductView;

/// Number of latest arrivals shown on the home page.
const LATEST_COUNT: usize = 10;

/// Home page data.
#[derive(Serialize)]
pub struct HomeView {
    pub latest: Vec<ProductView>,
    pub bestsellers: Vec<ProductView>,
    /// The logged-in user, when there is one.
    pub user: Option<SessionUser>,
}

/// `GET /` - latest arrivals plus the bestseller strip.
#[instrument(skip(state, user))]
pub async fn home(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
) -> Result<Json<HomeView>, AppError> {
    let catalog = state.commerce().fetch_products().await?;
    let bestsellers = state.commerce().fetch_bestsellers().await?;

    Ok(Json(HomeView {
        latest: catalog
            .iter()
            .take(LATEST_COUNT)
            .map(ProductView::from)
            .collect(),
        bestsellers: bestsellers.iter().map(ProductView::from).collect(),
        user,
    }))
}

/// `GET /faq` - static FAQ entries.
#[instrument]
pub async fn faq() -> Json<Value> {
    Json(json!({
        "entries": [
            {
                "question": "How long does delivery take?",
                "answer": "Orders are dispatched within 2 business days and usually arrive within 5-7 business days."
            },
            {
                "question": "What payment methods do you accept?",
                "answer": "Card payments via Stripe, UPI and cards via Razorpay, and cash on delivery."
            },
            {
                "question": "Can I cancel my order?",
                "answer": "Orders can be cancelled from your order history any time before they ship."
            },
            {
                "question": "How do returns work?",
                "answer": "Delivered orders can be returned within 14 days from your order history page."
            }
        ]
    }))
}
