//! Session-stored data.
//!
//! The session is the only state the storefront itself holds: the bearer
//! token, the logged-in user, the address book, and the in-flight checkout
//! stage. Everything else lives behind the commerce API.

use serde::{Deserialize, Serialize};

use marigold_core::UserId;

/// Keys under which session data is stored.
pub mod session_keys {
    /// Bearer token replayed on authenticated commerce API calls.
    pub const AUTH_TOKEN: &str = "auth_token";
    /// The logged-in user ([`super::SessionUser`]).
    pub const USER: &str = "user";
    /// The shopper's saved addresses ([`crate::addresses::AddressBook`]).
    pub const ADDRESS_BOOK: &str = "address_book";
    /// In-flight checkout stage ([`crate::checkout::CheckoutStage`]).
    pub const CHECKOUT_STAGE: &str = "checkout_stage";
}

/// The logged-in user as cached in the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

impl From<crate::commerce::types::UserProfile> for SessionUser {
    fn from(profile: crate::commerce::types::UserProfile) -> Self {
        Self {
            id: profile.id,
            name: profile.name,
            email: profile.email,
        }
    }
}
