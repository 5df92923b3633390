//! Expiring key/value storage for the order draft.
//!
//! [`DraftStore`] never fails its callers: storage that is unavailable,
//! corrupt, or expired reads as absent, and failed writes are logged and
//! dropped. The draft simply starts fresh.
//!
//! Values are written inside an envelope carrying their expiry:
//!
//! ```json
//! { "expiresAt": "2026-10-24T12:00:00Z", "value": { "sizeId": "medium", ... } }
//! ```

use std::future::Future;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;
use tower_sessions::Session;
use tracing::{debug, warn};

/// Errors raised by a storage backend.
///
/// These never leave [`DraftStore`]; they exist so backends can report what
/// went wrong for logging.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The session store failed to load or persist.
    #[error("session store error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// The backend cannot be reached at all.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// A raw key/value storage handle.
pub trait DraftBackend: Send + Sync {
    /// Read the JSON value stored under `key`.
    fn get(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<serde_json::Value>, StoreError>> + Send;

    /// Write `value` under `key`, replacing any previous value.
    fn insert(
        &self,
        key: &str,
        value: serde_json::Value,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Remove whatever is stored under `key`.
    fn remove(&self, key: &str) -> impl Future<Output = Result<(), StoreError>> + Send;
}

impl DraftBackend for Session {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        Ok(Self::get::<serde_json::Value>(self, key).await?)
    }

    async fn insert(&self, key: &str, value: serde_json::Value) -> Result<(), StoreError> {
        Ok(Self::insert(self, key, value).await?)
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        Self::remove_value(self, key).await?;
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    expires_at: DateTime<Utc>,
    value: serde_json::Value,
}

/// Draft persistence with expiry and silent degradation.
#[derive(Debug, Clone)]
pub struct DraftStore<B> {
    backend: B,
}

impl<B: DraftBackend> DraftStore<B> {
    /// Wrap a storage backend.
    #[must_use]
    pub const fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Save `value` under `key`, expiring after `ttl`.
    pub async fn save<T: Serialize + Sync>(&self, key: &str, value: &T, ttl: TimeDelta) {
        let value = match serde_json::to_value(value) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "Failed to serialize draft value");
                return;
            }
        };
        let expires_at = Utc::now()
            .checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let envelope = match serde_json::to_value(Envelope { expires_at, value }) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(key, error = %e, "Failed to serialize draft envelope");
                return;
            }
        };

        if let Err(e) = self.backend.insert(key, envelope).await {
            warn!(key, error = %e, "Draft storage unavailable, selection not saved");
        }
    }

    /// Load the value saved under `key`.
    ///
    /// Returns `None` if nothing is stored, the record expired, or it does
    /// not match the shape of `T`.
    pub async fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.backend.get(key).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(key, error = %e, "Draft storage unavailable, starting fresh");
                return None;
            }
        };

        let Ok(envelope) = serde_json::from_value::<Envelope>(raw) else {
            debug!(key, "Discarding malformed draft record");
            return None;
        };

        if envelope.expires_at <= Utc::now() {
            debug!(key, expires_at = %envelope.expires_at, "Draft record expired");
            self.clear(key).await;
            return None;
        }

        match serde_json::from_value(envelope.value) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(key, error = %e, "Discarding partial draft record");
                None
            }
        }
    }

    /// Remove the value saved under `key`.
    pub async fn clear(&self, key: &str) {
        if let Err(e) = self.backend.remove(key).await {
            warn!(key, error = %e, "Failed to clear draft record");
        }
    }

    /// The wrapped backend.
    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }
}
