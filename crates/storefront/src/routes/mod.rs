//! HTTP route handlers for the storefront.
//!
//! All responses are JSON; the storefront is a thin edge in front of the
//! commerce API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                         - Home page data (latest + bestsellers)
//! GET  /faq                      - FAQ entries
//! GET  /health                   - Health check
//!
//! # Products
//! GET  /products                 - Product listing (optional ?search=)
//! GET  /products/bestsellers     - Bestseller list
//! GET  /products/{id}            - Product detail
//! POST /products/{id}/reviews    - Submit a review (requires auth)
//!
//! # Cart (requires auth)
//! GET    /cart                   - Priced cart view
//! POST   /cart/add               - Add a line
//! POST   /cart/update            - Set a line's quantity (0 removes)
//! POST   /cart/remove            - Remove a line
//! DELETE /cart                   - Clear the cart
//!
//! # Checkout (requires auth)
//! POST /checkout/place-order     - Submit an order
//! POST /checkout/razorpay/confirm - Razorpay widget completion callback
//! GET  /checkout/stripe/return   - Stripe return-URL verification
//!
//! # Orders (requires auth)
//! GET  /orders                   - Order history
//! GET  /orders/{id}              - Order detail / confirmation lookup
//! POST /orders/{id}/cancel       - Cancel an order
//! POST /orders/{id}/return       - Request a return
//!
//! # Auth
//! POST /auth/login               - Login
//! POST /auth/register            - Register
//! POST /auth/google              - Google OAuth credential sign-in
//! POST /auth/logout              - Logout
//! GET  /auth/profile             - Current user profile
//!
//! # Account (requires auth)
//! GET    /account/addresses          - Saved addresses
//! POST   /account/addresses          - Save a new address
//! PUT    /account/addresses/{id}     - Update an address
//! DELETE /account/addresses/{id}     - Remove an address
//! POST   /account/addresses/{id}/select - Choose the checkout address
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod home;
pub mod orders;
pub mod products;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::middleware::{api_rate_limiter, auth_rate_limiter};
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .route("/google", post(auth::google))
        .route("/logout", post(auth::logout))
        .route("/profile", get(auth::profile))
        .layer(auth_rate_limiter())
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/bestsellers", get(products::bestsellers))
        .route("/{id}", get(products::show))
        .route("/{id}/reviews", post(products::submit_review))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .layer(api_rate_limiter())
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/place-order", post(checkout::place_order))
        .route("/razorpay/confirm", post(checkout::confirm_razorpay))
        .route("/stripe/return", get(checkout::stripe_return))
        .layer(api_rate_limiter())
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::history))
        .route("/{id}", get(orders::show))
        .route("/{id}/cancel", post(orders::cancel))
        .route("/{id}/return", post(orders::request_return))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/addresses",
            get(account::addresses).post(account::create_address),
        )
        .route(
            "/addresses/{id}",
            put(account::update_address).delete(account::delete_address),
        )
        .route("/addresses/{id}/select", post(account::select_address))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page data
        .route("/", get(home::home))
        .route("/faq", get(home::faq))
        // Product routes
        .nest("/products", product_routes())
        // Cart routes
        .nest("/cart", cart_routes())
        // Checkout routes
        .nest("/checkout", checkout_routes())
        // Order routes
        .nest("/orders", order_routes())
        // Auth routes
        .nest("/auth", auth_routes())
        // Account routes
        .nest("/account", account_routes())
}
