//! Shopper authentication state.
//!
//! [`AuthStatus`] is the single authority for whether a shopper is signed
//! in. Consumers subscribe to it instead of polling; login and logout push
//! updates immediately. A coarse periodic reconciliation follows the local
//! token and signs the shopper out once the backend rejects it.

mod error;
pub mod shopper;
pub mod status;

use std::future::Future;

use serde::{Deserialize, Serialize};

pub use error::IdentityError;
pub use shopper::{AuthRegistry, SessionIdentity, ShopperAuth};
pub use status::{AuthStatus, ReconcilerHandle};

/// Profile summary returned by the identity backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
}

/// Published authentication state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub is_authenticated: bool,
    pub profile: Option<Profile>,
}

impl AuthSession {
    /// A signed-in session, optionally with a known profile.
    #[must_use]
    pub const fn signed_in(profile: Option<Profile>) -> Self {
        Self {
            is_authenticated: true,
            profile,
        }
    }
}

/// Source of truth for a single shopper's session.
pub trait IdentityProvider: Send + Sync {
    /// Whether a session token is present locally. Never blocks.
    fn is_authenticated(&self) -> bool;

    /// Fetch the signed-in shopper's profile.
    fn fetch_profile(&self) -> impl Future<Output = Result<Profile, IdentityError>> + Send;

    /// Drop the local token after the backend rejected it.
    fn forget(&self) {}
}
