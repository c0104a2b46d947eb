//! Request-scoped models and session data.

pub mod session;

pub use session::{SessionUser, session_keys};
