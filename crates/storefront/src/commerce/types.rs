//! Wire types for the commerce API.
//!
//! Field names follow the API's JSON conventions: Mongo-style `_id`
//! primary keys and camelCase body fields.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use marigold_core::{Address, OrderId, OrderStatus, PaymentMethod, PaymentStatus, ProductId, UserId};

// =============================================================================
// Catalog
// =============================================================================

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product id.
    #[serde(rename = "_id")]
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Unit price.
    pub price: Decimal,
    /// Image URLs.
    #[serde(default)]
    pub image: Vec<String>,
    /// Long description.
    #[serde(default)]
    pub description: Option<String>,
    /// Sizes available for this product.
    #[serde(default)]
    pub sizes: Vec<String>,
    /// Whether this product is flagged as a bestseller.
    #[serde(default)]
    pub bestseller: bool,
}

/// Response body of `GET /products/all`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductsResponse {
    pub products: Vec<Product>,
}

/// Response body of `POST /products/getsingle`.
#[derive(Debug, Clone, Deserialize)]
pub struct SingleProductResponse {
    pub product: Product,
}

/// Response body of `GET /products/bestseller`.
#[derive(Debug, Clone, Deserialize)]
pub struct BestsellerResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Vec<Product>,
}

/// Body of `POST /products/:id/reviews`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewInput {
    pub rating: u8,
    pub comment: String,
}

// =============================================================================
// Cart
// =============================================================================

/// One line of the remote cart snapshot (`GET /cart`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    /// Referenced product id.
    pub product: ProductId,
    /// Size key within the product.
    pub size: String,
    /// Quantity, strictly positive in stored state.
    pub quantity: u32,
}

/// Body of `POST /cart/add` and `PUT /cart/update`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineInput {
    pub product_id: ProductId,
    pub size: String,
    pub quantity: u32,
}

/// Body of `POST /cart/removeone`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineKey {
    pub product_id: ProductId,
    pub size: String,
}

// =============================================================================
// Orders
// =============================================================================

/// One flattened order line: a cart line joined with its catalog price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    /// Referenced product id.
    pub product: ProductId,
    pub quantity: u32,
    /// Unit price at the time the order was placed.
    pub price: Decimal,
    pub size: String,
}

/// Order creation payload (`POST /orders/{stripe,razorpay,cod}`).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    pub products: Vec<OrderLine>,
    pub total_amount: Decimal,
    pub address: Address,
    pub payment_method: PaymentMethod,
}

/// An order as mirrored from the commerce API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: OrderId,
    pub products: Vec<OrderLine>,
    pub total_amount: Decimal,
    pub address: Address,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Response body of `POST /orders/cod` and the single-order lookup.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderResponse {
    pub order: Order,
}

/// Response body of `POST /orders/stripe`: a hosted-checkout session reference.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StripeOrderResponse {
    pub session_id: String,
}

/// Response body of `POST /orders/razorpay`: a provider order reference.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RazorpayOrderResponse {
    /// Razorpay order id to hand to the embedded widget.
    pub order_id: String,
    pub total_amount: Decimal,
    /// The order record created on our side (payment still pending).
    pub order: Order,
}

/// Body of `POST /orders/verifyRazorpay`: the widget's completion callback
/// payload forwarded for server-side signature verification.
#[derive(Debug, Clone, Serialize)]
pub struct RazorpayCallback {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
    #[serde(rename = "orderId")]
    pub order_id: OrderId,
    #[serde(rename = "userId")]
    pub user_id: UserId,
}

/// Body of `POST /orders/verifyStripe`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StripeVerifyInput {
    pub order_id: OrderId,
    /// The API expects the literal strings "true"/"false".
    pub success: String,
}

/// Body of `POST /orders/cancel` and `POST /orders/return`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderActionInput {
    pub order_id: OrderId,
}

/// Generic `{ success, message? }` verification response.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

// =============================================================================
// Auth
// =============================================================================

/// The authenticated user's profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub name: String,
    pub email: String,
}

/// Response body of `GET /auth/profile`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileResponse {
    pub user: UserProfile,
}

/// Response body of login/signup: the profile plus a bearer token that the
/// storefront replays on subsequent calls.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub user: UserProfile,
    pub token: String,
}

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Body of `POST /auth/signup`.
#[derive(Debug, Clone, Serialize)]
pub struct SignupInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Body of `POST /auth/google-signup`: the OAuth credential is forwarded
/// unmodified for server-side verification.
#[derive(Debug, Clone, Serialize)]
pub struct GoogleSignupInput {
    pub credential: String,
}

/// Error body shape used by the commerce API (`{ "message": ... }`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiMessage {
    pub message: String,
}
