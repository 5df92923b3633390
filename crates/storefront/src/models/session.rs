//! Keys for values stored in the shopper's server-side session.

/// Session keys.
pub mod keys {
    /// Per-session shopper id keying the auth registry.
    pub const SHOPPER_ID: &str = "shopper_id";

    /// Identity backend session token.
    pub const AUTH_TOKEN: &str = "auth_token";

    /// In-progress checkout form and step.
    pub const CHECKOUT: &str = "checkout";
}
