//! Publish/subscribe authentication authority.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, instrument, warn};

use super::{AuthSession, IdentityError, IdentityProvider, Profile};

/// Owner of one shopper's [`AuthSession`].
///
/// Every change is published on a `watch` channel. Profile fetches are
/// tagged with a generation counter; sign-in, sign-out, and logout bump it,
/// so a fetch that resolves after the session changed is discarded.
#[derive(Debug)]
pub struct AuthStatus {
    tx: watch::Sender<AuthSession>,
    generation: AtomicU64,
}

impl Default for AuthStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthStatus {
    /// A signed-out authority.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tx: watch::Sender::new(AuthSession::default()),
            generation: AtomicU64::new(0),
        }
    }

    /// Receive every subsequent change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthSession> {
        self.tx.subscribe()
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn current(&self) -> AuthSession {
        self.tx.borrow().clone()
    }

    /// Current fetch generation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Publish a completed login.
    pub fn login(&self, profile: Option<Profile>) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.tx.send_replace(AuthSession::signed_in(profile));
    }

    /// Clear the session immediately.
    ///
    /// Any profile fetch still in flight is invalidated.
    pub fn logout(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.tx.send_replace(AuthSession::default());
    }

    /// Run one reconciliation against `provider`.
    ///
    /// Publishes a sign-in as soon as it is observed, then fetches the
    /// profile if none is cached. A token the backend rejects is forgotten
    /// and the session signed out; other fetch failures leave it signed in.
    #[instrument(skip_all)]
    pub async fn reconcile<P: IdentityProvider>(&self, provider: &P) {
        if !provider.is_authenticated() {
            if self.tx.borrow().is_authenticated {
                debug!("Session token gone, signing out");
                self.logout();
            }
            return;
        }

        let signed_in = self.tx.send_if_modified(|session| {
            if session.is_authenticated {
                false
            } else {
                *session = AuthSession::signed_in(None);
                true
            }
        });
        if signed_in {
            self.generation.fetch_add(1, Ordering::SeqCst);
            debug!("Session observed, signed in");
        }

        if self.tx.borrow().profile.is_some() {
            return;
        }

        let generation = self.generation();
        let profile = match provider.fetch_profile().await {
            Ok(profile) => profile,
            Err(IdentityError::Rejected(reason)) if self.generation() == generation => {
                warn!(%reason, "Session token rejected by backend, signing out");
                provider.forget();
                self.logout();
                return;
            }
            Err(e) => {
                warn!(error = %e, "Profile fetch failed");
                return;
            }
        };

        let applied = self.tx.send_if_modified(|session| {
            if self.generation() != generation || !session.is_authenticated {
                return false;
            }
            session.profile = Some(profile);
            true
        });
        if !applied {
            debug!(generation, "Discarding stale profile");
        }
    }

    /// Reconcile against `provider` every `period` until cancelled.
    ///
    /// The task holds only a weak reference and stops once the authority
    /// is dropped. The first reconciliation runs immediately.
    pub fn spawn_reconciler<P>(self: &Arc<Self>, provider: P, period: Duration) -> ReconcilerHandle
    where
        P: IdentityProvider + 'static,
    {
        let status: Weak<Self> = Arc::downgrade(self);
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let Some(status) = status.upgrade() else {
                    debug!("Auth authority dropped, stopping reconciler");
                    break;
                };
                status.reconcile(&provider).await;
            }
        });
        ReconcilerHandle { task }
    }
}

/// Handle to a running reconciler. Dropping it stops the task.
#[derive(Debug)]
pub struct ReconcilerHandle {
    task: JoinHandle<()>,
}

impl ReconcilerHandle {
    /// Stop the reconciler.
    pub fn cancel(&self) {
        self.task.abort();
    }

    /// Whether the task has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for ReconcilerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize};

    use tokio::sync::Notify;

    use super::*;

    fn ada() -> Profile {
        Profile {
            first_name: "Ada".to_string(),
            last_name: "Obi".to_string(),
            email: "ada@example.com".to_string(),
        }
    }

    /// Provider whose profile fetch waits until released.
    struct GatedProvider {
        signed_in: AtomicBool,
        fetches: AtomicUsize,
        started: Notify,
        release: Notify,
        gated: bool,
    }

    impl GatedProvider {
        fn new(signed_in: bool, gated: bool) -> Self {
            Self {
                signed_in: AtomicBool::new(signed_in),
                fetches: AtomicUsize::new(0),
                started: Notify::new(),
                release: Notify::new(),
                gated,
            }
        }
    }

    impl IdentityProvider for Arc<GatedProvider> {
        fn is_authenticated(&self) -> bool {
            self.signed_in.load(Ordering::SeqCst)
        }

        async fn fetch_profile(&self) -> Result<Profile, IdentityError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.started.notify_one();
            if self.gated {
                self.release.notified().await;
            }
            Ok(ada())
        }
    }

    struct FailingProvider;

    impl IdentityProvider for FailingProvider {
        fn is_authenticated(&self) -> bool {
            true
        }

        async fn fetch_profile(&self) -> Result<Profile, IdentityError> {
            Err(IdentityError::Unexpected("backend unavailable".to_string()))
        }
    }

    /// Provider holding a token the backend no longer accepts.
    struct ExpiredTokenProvider {
        token: AtomicBool,
    }

    impl IdentityProvider for ExpiredTokenProvider {
        fn is_authenticated(&self) -> bool {
            self.token.load(Ordering::SeqCst)
        }

        async fn fetch_profile(&self) -> Result<Profile, IdentityError> {
            Err(IdentityError::Rejected("token expired".to_string()))
        }

        fn forget(&self) {
            self.token.store(false, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_reconcile_signs_in_and_fetches_profile() {
        let status = AuthStatus::new();
        let provider = Arc::new(GatedProvider::new(true, false));

        status.reconcile(&provider).await;
        assert_eq!(status.current(), AuthSession::signed_in(Some(ada())));

        status.reconcile(&provider).await;
        assert_eq!(provider.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_reconcile_observes_missing_token() {
        let status = AuthStatus::new();
        status.login(Some(ada()));
        let provider = Arc::new(GatedProvider::new(false, false));

        status.reconcile(&provider).await;
        assert_eq!(status.current(), AuthSession::default());
        assert_eq!(provider.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_signed_in_without_profile() {
        let status = AuthStatus::new();
        status.reconcile(&FailingProvider).await;
        assert_eq!(status.current(), AuthSession::signed_in(None));
    }

    #[tokio::test]
    async fn test_rejected_token_signs_out_and_is_forgotten() {
        let status = AuthStatus::new();
        let mut rx = status.subscribe();
        let provider = ExpiredTokenProvider {
            token: AtomicBool::new(true),
        };

        status.reconcile(&provider).await;
        assert_eq!(status.current(), AuthSession::default());
        assert!(!provider.is_authenticated());
        assert!(rx.has_changed().unwrap());

        // Nothing left to observe on the next pass
        status.reconcile(&provider).await;
        assert_eq!(status.current(), AuthSession::default());
    }

    #[tokio::test]
    async fn test_logout_during_fetch_discards_profile() {
        let status = Arc::new(AuthStatus::new());
        let provider = Arc::new(GatedProvider::new(true, true));

        let task = {
            let status = Arc::clone(&status);
            let provider = Arc::clone(&provider);
            tokio::spawn(async move { status.reconcile(&provider).await })
        };

        provider.started.notified().await;
        assert!(status.current().is_authenticated);

        provider.signed_in.store(false, Ordering::SeqCst);
        status.logout();
        assert_eq!(status.current(), AuthSession::default());

        provider.release.notify_one();
        task.await.unwrap();
        assert_eq!(status.current(), AuthSession::default());
    }

    #[tokio::test]
    async fn test_subscribers_see_login_and_logout() {
        let status = AuthStatus::new();
        let mut rx = status.subscribe();

        status.login(Some(ada()));
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_authenticated);

        status.logout();
        rx.changed().await.unwrap();
        assert!(!rx.borrow_and_update().is_authenticated);
    }

    #[tokio::test]
    async fn test_reconciler_publishes_and_stops_with_authority() {
        let status = Arc::new(AuthStatus::new());
        let provider = Arc::new(GatedProvider::new(true, false));
        let mut rx = status.subscribe();

        let handle = status.spawn_reconciler(Arc::clone(&provider), Duration::from_millis(10));
        tokio::time::timeout(Duration::from_secs(2), rx.wait_for(|s| s.profile.is_some()))
            .await
            .unwrap()
            .unwrap();

        drop(rx);
        drop(status);
        tokio::time::timeout(Duration::from_secs(2), async {
            while !handle.is_finished() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_cancel_stops_reconciler() {
        let status = Arc::new(AuthStatus::new());
        let provider = Arc::new(GatedProvider::new(false, false));
        let handle = status.spawn_reconciler(provider, Duration::from_millis(10));

        handle.cancel();
        tokio::time::timeout(Duration::from_secs(2), async {
            while !handle.is_finished() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();
    }
}
