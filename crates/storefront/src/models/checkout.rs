//! Session-scoped checkout flow.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use super::session_keys;
use crate::checkout::{CheckoutForm, CheckoutStepMachine};

/// Checkout form plus step state for one shopper session.
///
/// Lives only in the session. It is never written through the draft
/// store, so it carries no expiry of its own.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutFlow {
    pub form: CheckoutForm,
    pub machine: CheckoutStepMachine,
}

impl CheckoutFlow {
    /// A fresh flow on the first step.
    #[must_use]
    pub fn new(phone_prefix: &str) -> Self {
        Self {
            form: CheckoutForm::new(phone_prefix),
            machine: CheckoutStepMachine::new(),
        }
    }

    /// Load the session's flow, or start a fresh one.
    ///
    /// A stored flow that no longer deserializes is replaced.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn load(
        session: &Session,
        phone_prefix: &str,
    ) -> Result<Self, tower_sessions::session::Error> {
        let flow = match session.get::<Self>(session_keys::CHECKOUT).await {
            Ok(flow) => flow,
            Err(tower_sessions::session::Error::SerdeJson(e)) => {
                tracing::debug!(error = %e, "Discarding unreadable checkout flow");
                None
            }
            Err(e) => return Err(e),
        };
        Ok(flow.unwrap_or_else(|| Self::new(phone_prefix)))
    }

    /// Save the flow into the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn save(&self, session: &Session) -> Result<(), tower_sessions::session::Error> {
        session.insert(session_keys::CHECKOUT, self).await
    }

    /// Drop the session's flow.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn discard(session: &Session) -> Result<(), tower_sessions::session::Error> {
        session.remove_value(session_keys::CHECKOUT).await?;
        Ok(())
    }
}
