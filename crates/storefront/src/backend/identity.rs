//! Identity client: login, logout, and profile lookup.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, instrument, warn};
use url::Url;

use super::{Envelope, endpoint};
use crate::auth::{IdentityError, Profile};

#[derive(Debug, Deserialize)]
struct WireToken {
    token: String,
}

#[derive(Debug, Deserialize)]
struct WireLogin {
    token: Option<WireToken>,
    #[serde(flatten)]
    user: serde_json::Value,
}

/// Result of a successful login.
#[derive(Debug)]
pub struct LoginOutcome {
    pub token: SecretString,
    /// Profile fields returned alongside the token, if present.
    pub profile: Option<Profile>,
}

/// Client for the identity endpoints.
#[derive(Clone)]
pub struct IdentityClient {
    inner: Arc<IdentityClientInner>,
}

struct IdentityClientInner {
    client: reqwest::Client,
    api: Url,
}

impl IdentityClient {
    /// Create a new identity client.
    #[must_use]
    pub fn new(client: reqwest::Client, api: Url) -> Self {
        Self {
            inner: Arc::new(IdentityClientInner { client, api }),
        }
    }

    /// Exchange credentials for a session token.
    ///
    /// The password is sent base64-encoded in a multipart form.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::Blocked` for a blocked account,
    /// `IdentityError::Rejected` for bad credentials, or a transport error.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, IdentityError> {
        let form = reqwest::multipart::Form::new()
            .text("email", email.to_owned())
            .text("password", STANDARD.encode(password.as_bytes()));

        let response = self
            .inner
            .client
            .post(endpoint(&self.inner.api, "auth/login"))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let envelope: Envelope<WireLogin> = response
            .json()
            .await
            .map_err(|e| IdentityError::Unexpected(e.to_string()))?;

        if status == StatusCode::FORBIDDEN || envelope.code == 403 {
            let message = if envelope.message.is_empty() {
                "Account has been blocked".to_owned()
            } else {
                envelope.message
            };
            return Err(IdentityError::Blocked(message));
        }

        if envelope.code != 200 {
            return Err(IdentityError::Rejected(envelope.message));
        }
        let Some(WireLogin {
            token: Some(token),
            user,
        }) = envelope.data
        else {
            return Err(IdentityError::Rejected(envelope.message));
        };

        debug!("Login accepted");
        Ok(LoginOutcome {
            token: SecretString::from(token.token),
            profile: serde_json::from_value(user).ok(),
        })
    }

    /// Invalidate `token` on the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reached or refuses.
    #[instrument(skip_all)]
    pub async fn logout(&self, token: &SecretString) -> Result<(), IdentityError> {
        let response = self
            .inner
            .client
            .get(endpoint(&self.inner.api, "auth/logout"))
            .bearer_auth(token.expose_secret())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "Backend logout failed");
            return Err(IdentityError::Rejected(format!("logout returned {status}")));
        }
        Ok(())
    }

    /// Fetch the profile of the shopper holding `token`.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::Rejected` if the token is not accepted.
    #[instrument(skip_all)]
    pub async fn fetch_profile(&self, token: &SecretString) -> Result<Profile, IdentityError> {
        let response = self
            .inner
            .client
            .get(endpoint(&self.inner.api, "user/get"))
            .bearer_auth(token.expose_secret().trim())
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(IdentityError::Rejected("token not accepted".to_owned()));
        }
        let envelope: Envelope<Profile> = response
            .json()
            .await
            .map_err(|e| IdentityError::Unexpected(e.to_string()))?;

        match envelope.data {
            Some(profile) if envelope.is_success() => Ok(profile),
            _ => Err(IdentityError::Rejected(envelope.message)),
        }
    }
}
