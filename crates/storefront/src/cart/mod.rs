//! Cart state, pricing, and remote synchronisation.
//!
//! The commerce API owns the cart. [`state`] is the pure nested-map model
//! and its reducers, [`totals`] joins the cart against the catalog to price
//! it, and [`store`] keeps the local snapshot synchronised with the API
//! through a [`store::CartBackend`].

pub mod state;
pub mod store;
pub mod totals;

pub use state::CartState;
pub use store::{CartBackend, CartError, CartStore};
pub use totals::{CartTotals, DELIVERY_FEE, calculate, order_lines};
