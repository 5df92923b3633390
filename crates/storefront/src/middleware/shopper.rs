//! Shopper extractor.
//!
//! Resolves the request's session to a shopper id and that shopper's auth
//! authority. A shopper id is minted on first contact.

use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;
use tracing::Span;
use uuid::Uuid;

use crate::auth::ShopperAuth;
use crate::error::AppError;
use crate::models::session_keys;
use crate::state::AppState;

/// The current shopper.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(shopper: Shopper) -> impl IntoResponse {
///     Json(shopper.auth.current())
/// }
/// ```
pub struct Shopper {
    pub id: String,
    pub session: Session,
    pub auth: Arc<ShopperAuth>,
}

impl FromRequestParts<AppState> for Shopper {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer missing".to_string()))?;

        let id = match session.get::<String>(session_keys::SHOPPER_ID).await? {
            Some(id) => id,
            None => {
                let id = Uuid::new_v4().to_string();
                session.insert(session_keys::SHOPPER_ID, &id).await?;
                id
            }
        };
        Span::current().record("shopper_id", id.as_str());

        let token = session.get::<String>(session_keys::AUTH_TOKEN).await?;
        let auth = state.auth().shopper(&id, token.as_deref()).await;

        Ok(Self { id, session, auth })
    }
}

/// Store the identity token in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_auth_token(
    session: &Session,
    token: &str,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::AUTH_TOKEN, token).await
}

/// Remove the identity token from the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_auth_token(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove_value(session_keys::AUTH_TOKEN).await?;
    Ok(())
}
