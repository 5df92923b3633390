//! Per-shopper authorities.
//!
//! Each browser session gets a shopper id. [`AuthRegistry`] keeps one
//! [`ShopperAuth`] per id in a `moka` cache; idle shoppers are evicted, which
//! drops their authority and stops their reconciler.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use moka::future::Cache;
use secrecy::SecretString;
use tracing::{debug, instrument, warn};

use super::status::{AuthStatus, ReconcilerHandle};
use super::{AuthSession, IdentityError, IdentityProvider, Profile};
use crate::backend::IdentityClient;

/// Shared slot holding the shopper's session token.
type TokenSlot = Arc<RwLock<Option<SecretString>>>;

/// [`IdentityProvider`] backed by a token slot and the identity backend.
#[derive(Clone)]
pub struct SessionIdentity {
    token: TokenSlot,
    client: IdentityClient,
}

impl SessionIdentity {
    fn token(&self) -> Option<SecretString> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl IdentityProvider for SessionIdentity {
    fn is_authenticated(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    async fn fetch_profile(&self) -> Result<Profile, IdentityError> {
        let token = self.token().ok_or(IdentityError::NotAuthenticated)?;
        self.client.fetch_profile(&token).await
    }

    fn forget(&self) {
        self.token
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}

/// One shopper's authority, token, and reconciler.
pub struct ShopperAuth {
    status: Arc<AuthStatus>,
    identity: SessionIdentity,
    _reconciler: ReconcilerHandle,
}

impl ShopperAuth {
    /// Create an authority seeded with `token` and start reconciling it.
    #[must_use]
    pub fn start(client: IdentityClient, token: Option<SecretString>, period: Duration) -> Self {
        let identity = SessionIdentity {
            token: Arc::new(RwLock::new(token)),
            client,
        };
        let status = Arc::new(AuthStatus::new());
        let reconciler = status.spawn_reconciler(identity.clone(), period);
        Self {
            status,
            identity,
            _reconciler: reconciler,
        }
    }

    /// The shopper's authority.
    #[must_use]
    pub fn status(&self) -> &Arc<AuthStatus> {
        &self.status
    }

    /// Snapshot of the published state.
    #[must_use]
    pub fn current(&self) -> AuthSession {
        self.status.current()
    }

    /// Sign in and publish the result immediately.
    ///
    /// Returns the token so the caller can keep it in the session.
    ///
    /// # Errors
    ///
    /// Returns the identity backend's error; the state is left unchanged.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<SecretString, IdentityError> {
        let outcome = self.identity.client.login(email, password).await?;
        *self
            .identity
            .token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(outcome.token.clone());
        self.status.login(outcome.profile);
        Ok(outcome.token)
    }

    /// Sign out. Local state is cleared before the backend is told, and
    /// regardless of whether the backend call succeeds.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        let token = self
            .identity
            .token
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        self.status.logout();

        if let Some(token) = token
            && let Err(e) = self.identity.client.logout(&token).await
        {
            warn!(error = %e, "Backend logout failed, local session cleared anyway");
        }
    }
}

/// Cache of per-shopper authorities.
#[derive(Clone)]
pub struct AuthRegistry {
    shoppers: Cache<String, Arc<ShopperAuth>>,
    client: IdentityClient,
    period: Duration,
}

impl AuthRegistry {
    /// Create a registry reconciling every `period`.
    #[must_use]
    pub fn new(client: IdentityClient, period: Duration) -> Self {
        let shoppers = Cache::builder()
            .max_capacity(10_000)
            .time_to_idle(Duration::from_secs(30 * 60)) // 30 minutes
            .build();
        Self {
            shoppers,
            client,
            period,
        }
    }

    /// The authority for `shopper_id`, created from `token` if absent.
    pub async fn shopper(&self, shopper_id: &str, token: Option<&str>) -> Arc<ShopperAuth> {
        let seed = token.map(|t| SecretString::from(t.to_owned()));
        self.shoppers
            .get_with(shopper_id.to_owned(), async {
                debug!(shopper_id, has_token = seed.is_some(), "Starting shopper authority");
                Arc::new(ShopperAuth::start(self.client.clone(), seed, self.period))
            })
            .await
    }
}
