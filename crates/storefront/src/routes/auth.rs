//! Authentication route handlers.
//!
//! Login and logout update the shopper's auth authority directly, so
//! subscribers see the change without waiting for reconciliation.

use axum::Json;
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::instrument;

use crate::auth::AuthSession;
use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{Shopper, clear_auth_token, set_auth_token};

/// Login request body.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Current authentication state.
#[instrument(skip_all, fields(shopper_id = %shopper.id))]
pub async fn status(shopper: Shopper) -> Json<AuthSession> {
    Json(shopper.auth.current())
}

/// Sign in with email and password.
#[instrument(skip_all, fields(shopper_id = %shopper.id, email = %request.email))]
pub async fn login(shopper: Shopper, Json(request): Json<LoginRequest>) -> Result<Json<AuthSession>> {
    let token = shopper.auth.login(&request.email, &request.password).await?;
    set_auth_token(&shopper.session, token.expose_secret()).await?;
    // New session id after privilege change
    shopper.session.cycle_id().await?;

    let session = shopper.auth.current();
    let email = session.profile.as_ref().map(|p| p.email.as_str());
    set_sentry_user(&shopper.id, email);
    Ok(Json(session))
}

/// Sign out.
///
/// Local state is cleared even if the backend call fails.
#[instrument(skip_all, fields(shopper_id = %shopper.id))]
pub async fn logout(shopper: Shopper) -> Result<Json<AuthSession>> {
    shopper.auth.logout().await;
    clear_auth_token(&shopper.session).await?;
    clear_sentry_user();
    Ok(Json(shopper.auth.current()))
}
