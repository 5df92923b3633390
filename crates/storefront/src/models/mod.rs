//! Session-scoped models for the storefront.

pub mod checkout;
pub mod session;

pub use checkout::CheckoutFlow;
pub use session::keys as session_keys;
