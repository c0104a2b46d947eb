//! Commerce API client implementation.
//!
//! Uses `reqwest` 0.13 with an explicit per-request timeout. Catalog
//! responses are cached using `moka` (5-minute TTL); cart, order, and
//! auth calls always go to the API.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use marigold_core::{OrderId, ProductId, UserId};

use crate::config::CommerceApiConfig;

use super::CommerceError;
use super::cache::CacheValue;
use super::types::{
    ApiMessage, AuthResponse, BestsellerResponse, CartEntry, CartLineInput, CartLineKey,
    GoogleSignupInput, LoginInput, Order, OrderActionInput, OrderPayload, OrderResponse,
    ProductsResponse, ProfileResponse, RazorpayCallback, RazorpayOrderResponse, ReviewInput,
    SignupInput, SingleProductResponse, StripeOrderResponse, StripeVerifyInput, VerifyResponse,
    Product,
};

/// Catalog cache TTL.
const CACHE_TTL: Duration = Duration::from_secs(300); // 5 minutes

// =============================================================================
// CommerceClient
// =============================================================================

/// Client for the remote commerce API.
///
/// Cheap to clone; all clones share the HTTP connection pool and the
/// catalog cache.
#[derive(Clone)]
pub struct CommerceClient {
    inner: Arc<CommerceClientInner>,
}

struct CommerceClientInner {
    http: reqwest::Client,
    base_url: String,
    cache: Cache<String, CacheValue>,
}

impl CommerceClient {
    /// Create a new commerce API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &CommerceApiConfig) -> Result<Self, CommerceError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(CACHE_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(CommerceClientInner {
                http,
                base_url: config.base_url.clone(),
                cache,
            }),
        })
    }

    /// Bind this client to a session bearer token.
    #[must_use]
    pub fn session(&self, token: impl Into<String>) -> CommerceSession {
        CommerceSession {
            client: self.clone(),
            token: token.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    /// Execute a request and parse the JSON response body.
    async fn request<T, B>(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<&B>,
    ) -> Result<T, CommerceError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let text = self.request_text(method, path, token, body).await?;

        match serde_json::from_str(&text) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    path = %path,
                    body = %text.chars().take(500).collect::<String>(),
                    "Failed to parse commerce API response"
                );
                Err(CommerceError::Parse(e))
            }
        }
    }

    /// Execute a request, discarding the response body.
    async fn request_unit<B>(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<&B>,
    ) -> Result<(), CommerceError>
    where
        B: Serialize + ?Sized,
    {
        self.request_text(method, path, token, body).await?;
        Ok(())
    }

    async fn request_text<B>(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<&B>,
    ) -> Result<String, CommerceError>
    where
        B: Serialize + ?Sized,
    {
        let mut request = self.inner.http.request(method, self.url(path));

        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            return Err(CommerceError::Unauthorized);
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(CommerceError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let text = response.text().await?;

        if status == StatusCode::NOT_FOUND {
            return Err(CommerceError::NotFound(path.to_owned()));
        }

        if !status.is_success() {
            // The API reports failures as `{ "message": ... }`
            let message = serde_json::from_str::<ApiMessage>(&text)
                .map_or_else(|_| text.chars().take(200).collect(), |m| m.message);
            tracing::warn!(
                status = %status,
                path = %path,
                message = %message,
                "Commerce API returned non-success status"
            );
            return Err(CommerceError::Api { status, message });
        }

        Ok(text)
    }

    // =========================================================================
    // Catalog Methods (cached)
    // =========================================================================

    /// Get the full product catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn fetch_products(&self) -> Result<Vec<Product>, CommerceError> {
        let cache_key = "products:all".to_string();

        if let Some(CacheValue::Catalog(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for catalog");
            return Ok(products);
        }

        let response: ProductsResponse = self
            .request(Method::GET, "/products/all", None, None::<&()>)
            .await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Catalog(response.products.clone()))
            .await;

        Ok(response.products)
    }

    /// Get the bestseller list.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or reports failure.
    #[instrument(skip(self))]
    pub async fn fetch_bestsellers(&self) -> Result<Vec<Product>, CommerceError> {
        let cache_key = "products:bestsellers".to_string();

        if let Some(CacheValue::Bestsellers(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for bestsellers");
            return Ok(products);
        }

        let response: BestsellerResponse = self
            .request(Method::GET, "/products/bestseller", None, None::<&()>)
            .await?;

        if !response.success {
            return Err(CommerceError::Api {
                status: StatusCode::BAD_GATEWAY,
                message: "bestseller lookup reported failure".to_owned(),
            });
        }

        self.inner
            .cache
            .insert(cache_key, CacheValue::Bestsellers(response.data.clone()))
            .await;

        Ok(response.data)
    }

    /// Get a single product by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn fetch_product(&self, product_id: &ProductId) -> Result<Product, CommerceError> {
        let cache_key = format!("product:{product_id}");

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let body = serde_json::json!({ "productId": product_id });
        let response: SingleProductResponse = self
            .request(Method::POST, "/products/getsingle", None, Some(&body))
            .await?;

        self.inner
            .cache
            .insert(
                cache_key,
                CacheValue::Product(Box::new(response.product.clone())),
            )
            .await;

        Ok(response.product)
    }

    // =========================================================================
    // Auth Methods (no session yet)
    // =========================================================================

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::Unauthorized` for bad credentials.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: &LoginInput) -> Result<AuthResponse, CommerceError> {
        self.request(Method::POST, "/auth/login", None, Some(input))
            .await
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns an error if the email is taken or the request fails.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn signup(&self, input: &SignupInput) -> Result<AuthResponse, CommerceError> {
        self.request(Method::POST, "/auth/signup", None, Some(input))
            .await
    }

    /// Sign up or log in with a Google OAuth credential.
    ///
    /// The credential is forwarded unmodified; verification happens on the
    /// API side.
    ///
    /// # Errors
    ///
    /// Returns an error if the credential is rejected or the request fails.
    #[instrument(skip_all)]
    pub async fn google_signup(
        &self,
        input: &GoogleSignupInput,
    ) -> Result<AuthResponse, CommerceError> {
        self.request(Method::POST, "/auth/google-signup", None, Some(input))
            .await
    }
}

// =============================================================================
// CommerceSession
// =============================================================================

/// A [`CommerceClient`] bound to a session bearer token.
///
/// Covers everything that requires an authenticated user: the cart, orders,
/// reviews, and profile.
#[derive(Clone)]
pub struct CommerceSession {
    client: CommerceClient,
    token: String,
}

impl CommerceSession {
    fn token(&self) -> Option<&str> {
        Some(self.token.as_str())
    }

    /// Access the underlying shared client.
    #[must_use]
    pub const fn client(&self) -> &CommerceClient {
        &self.client
    }

    // =========================================================================
    // Cart Methods (not cached - mutable state)
    // =========================================================================

    /// Get the authoritative cart snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn fetch_cart(&self) -> Result<Vec<CartEntry>, CommerceError> {
        self.client
            .request(Method::GET, "/cart", self.token(), None::<&()>)
            .await
    }

    /// Add a line to the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(product_id = %product_id, size = %size))]
    pub async fn cart_add(
        &self,
        product_id: &ProductId,
        size: &str,
        quantity: u32,
    ) -> Result<(), CommerceError> {
        let body = CartLineInput {
            product_id: product_id.clone(),
            size: size.to_owned(),
            quantity,
        };
        self.client
            .request_unit(Method::POST, "/cart/add", self.token(), Some(&body))
            .await
    }

    /// Set the quantity of a cart line (0 removes it server-side).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(product_id = %product_id, size = %size))]
    pub async fn cart_update(
        &self,
        product_id: &ProductId,
        size: &str,
        quantity: u32,
    ) -> Result<(), CommerceError> {
        let body = CartLineInput {
            product_id: product_id.clone(),
            size: size.to_owned(),
            quantity,
        };
        self.client
            .request_unit(Method::PUT, "/cart/update", self.token(), Some(&body))
            .await
    }

    /// Remove one cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(product_id = %product_id, size = %size))]
    pub async fn cart_remove(
        &self,
        product_id: &ProductId,
        size: &str,
    ) -> Result<(), CommerceError> {
        let body = CartLineKey {
            product_id: product_id.clone(),
            size: size.to_owned(),
        };
        self.client
            .request_unit(Method::POST, "/cart/removeone", self.token(), Some(&body))
            .await
    }

    /// Clear the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn cart_clear(&self) -> Result<(), CommerceError> {
        self.client
            .request_unit(Method::DELETE, "/cart/clear", self.token(), None::<&()>)
            .await
    }

    // =========================================================================
    // Review Methods
    // =========================================================================

    /// Submit a product review.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, review), fields(product_id = %product_id))]
    pub async fn submit_review(
        &self,
        product_id: &ProductId,
        review: &ReviewInput,
    ) -> Result<(), CommerceError> {
        let path = format!("/products/{product_id}/reviews");
        self.client
            .request_unit(Method::POST, &path, self.token(), Some(review))
            .await
    }

    // =========================================================================
    // Order Methods
    // =========================================================================

    /// Create an order paid through Stripe hosted checkout.
    ///
    /// # Errors
    ///
    /// Returns an error if order creation fails.
    #[instrument(skip(self, payload))]
    pub async fn create_stripe_order(
        &self,
        payload: &OrderPayload,
    ) -> Result<StripeOrderResponse, CommerceError> {
        self.client
            .request(Method::POST, "/orders/stripe", self.token(), Some(payload))
            .await
    }

    /// Create an order paid through the Razorpay widget.
    ///
    /// # Errors
    ///
    /// Returns an error if order creation fails.
    #[instrument(skip(self, payload))]
    pub async fn create_razorpay_order(
        &self,
        payload: &OrderPayload,
    ) -> Result<RazorpayOrderResponse, CommerceError> {
        self.client
            .request(Method::POST, "/orders/razorpay", self.token(), Some(payload))
            .await
    }

    /// Create a cash-on-delivery order. Success is synchronous.
    ///
    /// # Errors
    ///
    /// Returns an error if order creation fails.
    #[instrument(skip(self, payload))]
    pub async fn create_cod_order(
        &self,
        payload: &OrderPayload,
    ) -> Result<OrderResponse, CommerceError> {
        self.client
            .request(Method::POST, "/orders/cod", self.token(), Some(payload))
            .await
    }

    /// Forward a Razorpay completion callback for signature verification.
    ///
    /// # Errors
    ///
    /// Returns an error if verification is rejected.
    #[instrument(skip(self, callback), fields(order_id = %callback.order_id))]
    pub async fn verify_razorpay(
        &self,
        callback: &RazorpayCallback,
    ) -> Result<(), CommerceError> {
        self.client
            .request_unit(
                Method::POST,
                "/orders/verifyRazorpay",
                self.token(),
                Some(callback),
            )
            .await
    }

    /// Trigger server-side Stripe verification after a return-URL visit.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or verification is rejected.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn verify_stripe(&self, order_id: &OrderId) -> Result<(), CommerceError> {
        let body = StripeVerifyInput {
            order_id: order_id.clone(),
            success: "true".to_owned(),
        };
        let response: VerifyResponse = self
            .client
            .request(Method::POST, "/orders/verifyStripe", self.token(), Some(&body))
            .await?;

        if response.success {
            Ok(())
        } else {
            Err(CommerceError::Api {
                status: StatusCode::PAYMENT_REQUIRED,
                message: response
                    .message
                    .unwrap_or_else(|| "payment verification failed".to_owned()),
            })
        }
    }

    /// Get the order history for a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn user_orders(&self, user_id: &UserId) -> Result<Vec<Order>, CommerceError> {
        let path = format!("/orders/user/{user_id}");
        self.client
            .request(Method::GET, &path, self.token(), None::<&()>)
            .await
    }

    /// Get a single order (confirmation page lookup).
    ///
    /// # Errors
    ///
    /// Returns an error if the order is not found or the request fails.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn order(
        &self,
        user_id: &UserId,
        order_id: &OrderId,
    ) -> Result<Order, CommerceError> {
        let path = format!("/orders/{user_id}/{order_id}");
        let response: OrderResponse = self
            .client
            .request(Method::GET, &path, self.token(), None::<&()>)
            .await?;
        Ok(response.order)
    }

    /// Cancel an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn cancel_order(&self, order_id: &OrderId) -> Result<(), CommerceError> {
        let body = OrderActionInput {
            order_id: order_id.clone(),
        };
        self.client
            .request_unit(Method::POST, "/orders/cancel", self.token(), Some(&body))
            .await
    }

    /// Request a return for a delivered order.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn return_order(&self, order_id: &OrderId) -> Result<(), CommerceError> {
        let body = OrderActionInput {
            order_id: order_id.clone(),
        };
        self.client
            .request_unit(Method::POST, "/orders/return", self.token(), Some(&body))
            .await
    }

    // =========================================================================
    // Account Methods
    // =========================================================================

    /// Get the authenticated user's profile.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::Unauthorized` if the token is stale.
    #[instrument(skip(self))]
    pub async fn profile(&self) -> Result<ProfileResponse, CommerceError> {
        self.client
            .request(Method::GET, "/auth/profile", self.token(), None::<&()>)
            .await
    }

    /// Invalidate the session on the API side.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), CommerceError> {
        self.client
            .request_unit(Method::POST, "/auth/logout", self.token(), None::<&()>)
            .await
    }
}
