//! Shared application state.

use std::sync::Arc;

use crate::commerce::CommerceClient;
use crate::config::StorefrontConfig;

/// Application state shared across request handlers.
///
/// Cheap to clone; handlers get it via axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    commerce: CommerceClient,
}

impl AppState {
    /// Build application state from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the commerce client cannot be constructed.
    pub fn new(config: StorefrontConfig) -> Result<Self, crate::commerce::CommerceError> {
        let commerce = CommerceClient::new(&config.commerce)?;
        Ok(Self {
            inner: Arc::new(AppStateInner { config, commerce }),
        })
    }

    /// Application configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Shared commerce API client.
    #[must_use]
    pub fn commerce(&self) -> &CommerceClient {
        &self.inner.commerce
    }
}
