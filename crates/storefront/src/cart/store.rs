//! Remote-synchronised cart store.
//!
//! Every mutation goes to the commerce API first, then the local snapshot
//! is replaced by a fresh `GET /cart` fetch rather than patched in place.
//! A `tokio::sync::Mutex` serialises mutations so rapid taps from the same
//! session cannot interleave their write-then-refetch round trips.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{instrument, warn};

use marigold_core::ProductId;

use crate::commerce::types::CartEntry;
use crate::commerce::{CommerceError, CommerceSession};

use super::CartState;

/// The remote side of a [`CartStore`].
pub trait CartBackend {
    /// Fetch the authoritative cart snapshot.
    fn fetch(&self) -> impl Future<Output = Result<Vec<CartEntry>, CommerceError>> + Send;
    /// Add quantity to a line.
    fn add(
        &self,
        product_id: &ProductId,
        size: &str,
        quantity: u32,
    ) -> impl Future<Output = Result<(), CommerceError>> + Send;
    /// Set a line's quantity exactly.
    fn update(
        &self,
        product_id: &ProductId,
        size: &str,
        quantity: u32,
    ) -> impl Future<Output = Result<(), CommerceError>> + Send;
    /// Remove a line.
    fn remove(
        &self,
        product_id: &ProductId,
        size: &str,
    ) -> impl Future<Output = Result<(), CommerceError>> + Send;
    /// Remove every line.
    fn clear(&self) -> impl Future<Output = Result<(), CommerceError>> + Send;
}

impl CartBackend for CommerceSession {
    async fn fetch(&self) -> Result<Vec<CartEntry>, CommerceError> {
        self.fetch_cart().await
    }

    async fn add(
        &self,
        product_id: &ProductId,
        size: &str,
        quantity: u32,
    ) -> Result<(), CommerceError> {
        self.cart_add(product_id, size, quantity).await
    }

    async fn update(
        &self,
        product_id: &ProductId,
        size: &str,
        quantity: u32,
    ) -> Result<(), CommerceError> {
        self.cart_update(product_id, size, quantity).await
    }

    async fn remove(&self, product_id: &ProductId, size: &str) -> Result<(), CommerceError> {
        self.cart_remove(product_id, size).await
    }

    async fn clear(&self) -> Result<(), CommerceError> {
        self.cart_clear().await
    }
}

impl<B: CartBackend + Send + Sync> CartBackend for Arc<B> {
    async fn fetch(&self) -> Result<Vec<CartEntry>, CommerceError> {
        (**self).fetch().await
    }

    async fn add(
        &self,
        product_id: &ProductId,
        size: &str,
        quantity: u32,
    ) -> Result<(), CommerceError> {
        (**self).add(product_id, size, quantity).await
    }

    async fn update(
        &self,
        product_id: &ProductId,
        size: &str,
        quantity: u32,
    ) -> Result<(), CommerceError> {
        (**self).update(product_id, size, quantity).await
    }

    async fn remove(&self, product_id: &ProductId, size: &str) -> Result<(), CommerceError> {
        (**self).remove(product_id, size).await
    }

    async fn clear(&self) -> Result<(), CommerceError> {
        (**self).clear().await
    }
}

/// Cart operation failures, one variant per operation so callers can report
/// which step went wrong.
#[derive(Debug, thiserror::Error)]
pub enum CartError {
    #[error("Failed to load cart")]
    FetchFailed(#[source] CommerceError),
    #[error("Failed to add item to cart")]
    AddFailed(#[source] CommerceError),
    #[error("Failed to update cart item")]
    UpdateFailed(#[source] CommerceError),
    #[error("Failed to remove cart item")]
    RemoveFailed(#[source] CommerceError),
    #[error("Failed to clear cart")]
    ClearFailed(#[source] CommerceError),
    #[error("Quantity must be greater than zero")]
    InvalidQuantity,
}

/// A cart snapshot kept in sync with a [`CartBackend`].
pub struct CartStore<B> {
    backend: B,
    state: Mutex<CartState>,
}

impl<B: CartBackend> CartStore<B> {
    /// Create a store with an empty local snapshot.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: Mutex::new(CartState::default()),
        }
    }

    /// Current local snapshot.
    pub async fn snapshot(&self) -> CartState {
        self.state.lock().await.clone()
    }

    /// Replace the local snapshot with a fresh fetch from the backend.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::FetchFailed`] if the backend call fails.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<CartState, CartError> {
        let mut state = self.state.lock().await;
        let entries = self
            .backend
            .fetch()
            .await
            .map_err(CartError::FetchFailed)?;
        *state = CartState::from_entries(&entries);
        Ok(state.clone())
    }

    /// Add quantity to a line and resynchronise.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] for a zero quantity and
    /// [`CartError::AddFailed`] if the backend rejects the mutation.
    #[instrument(skip(self), fields(product_id = %product_id, size = %size))]
    pub async fn add(
        &self,
        product_id: &ProductId,
        size: &str,
        quantity: u32,
    ) -> Result<CartState, CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }
        let mut state = self.state.lock().await;
        match self.backend.add(product_id, size, quantity).await {
            Ok(()) => {
                self.resync_or_apply(&mut state, |s| s.add_line(product_id, size, quantity))
                    .await;
                Ok(state.clone())
            }
            Err(e) => {
                self.resync(&mut state).await;
                Err(CartError::AddFailed(e))
            }
        }
    }

    /// Set a line's quantity exactly (zero removes it) and resynchronise.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::UpdateFailed`] if the backend rejects the
    /// mutation.
    #[instrument(skip(self), fields(product_id = %product_id, size = %size))]
    pub async fn set_quantity(
        &self,
        product_id: &ProductId,
        size: &str,
        quantity: u32,
    ) -> Result<CartState, CartError> {
        let mut state = self.state.lock().await;
        match self.backend.update(product_id, size, quantity).await {
            Ok(()) => {
                self.resync_or_apply(&mut state, |s| s.set_quantity(product_id, size, quantity))
                    .await;
                Ok(state.clone())
            }
            Err(e) => {
                self.resync(&mut state).await;
                Err(CartError::UpdateFailed(e))
            }
        }
    }

    /// Remove a line and resynchronise.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::RemoveFailed`] if the backend rejects the
    /// mutation.
    #[instrument(skip(self), fields(product_id = %product_id, size = %size))]
    pub async fn remove(&self, product_id: &ProductId, size: &str) -> Result<CartState, CartError> {
        let mut state = self.state.lock().await;
        match self.backend.remove(product_id, size).await {
            Ok(()) => {
                self.resync_or_apply(&mut state, |s| s.remove_line(product_id, size))
                    .await;
                Ok(state.clone())
            }
            Err(e) => {
                self.resync(&mut state).await;
                Err(CartError::RemoveFailed(e))
            }
        }
    }

    /// Clear the cart and resynchronise.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ClearFailed`] if the backend rejects the
    /// mutation.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<CartState, CartError> {
        let mut state = self.state.lock().await;
        match self.backend.clear().await {
            Ok(()) => {
                self.resync_or_apply(&mut state, CartState::clear).await;
                Ok(state.clone())
            }
            Err(e) => {
                self.resync(&mut state).await;
                Err(CartError::ClearFailed(e))
            }
        }
    }

    /// After a successful mutation: re-fetch the authoritative state, or
    /// fall back to applying the mutation locally if the re-fetch fails.
    async fn resync_or_apply(&self, state: &mut CartState, apply: impl FnOnce(&mut CartState)) {
        match self.backend.fetch().await {
            Ok(entries) => *state = CartState::from_entries(&entries),
            Err(e) => {
                warn!(error = %e, "Cart re-fetch after mutation failed, applying locally");
                apply(state);
            }
        }
    }

    /// After a failed mutation: best-effort resync so the snapshot does not
    /// drift from whatever the API actually holds.
    async fn resync(&self, state: &mut CartState) {
        if let Ok(entries) = self.backend.fetch().await {
            *state = CartState::from_entries(&entries);
        }
    }
}
