//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//!
//! Checkout validation failures are not errors: they are part of the
//! checkout view. `AppError` covers page-level failures only.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::auth::IdentityError;
use crate::backend::CatalogError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Catalog fetch failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Identity backend refused or failed.
    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Checkout was requested without a selected size.
    #[error("No order in progress")]
    NoDraft,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    /// Where the shopper can go to recover.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recovery: Option<&'static str>,
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Catalog(CatalogError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Catalog(_) => StatusCode::BAD_GATEWAY,
            Self::Identity(err) => match err {
                IdentityError::NotAuthenticated | IdentityError::Rejected(_) => {
                    StatusCode::UNAUTHORIZED
                }
                IdentityError::Blocked(_) => StatusCode::FORBIDDEN,
                IdentityError::Http(_) | IdentityError::Unexpected(_) => StatusCode::BAD_GATEWAY,
            },
            Self::Session(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NoDraft => StatusCode::CONFLICT,
        }
    }

    const fn recovery(&self) -> Option<&'static str> {
        match self {
            Self::Catalog(_) => Some("/"),
            Self::NoDraft => Some("/order"),
            _ => None,
        }
    }

    fn reportable(&self) -> bool {
        matches!(
            self,
            Self::Catalog(_) | Self::Session(_) | Self::Internal(_)
        ) || matches!(
            self,
            Self::Identity(IdentityError::Http(_) | IdentityError::Unexpected(_))
        )
    }

    // Don't expose internal error details to clients
    fn public_message(&self) -> String {
        match self {
            Self::Catalog(CatalogError::NotFound(_)) => "Product not found".to_string(),
            Self::Catalog(_) => "Failed to load product data".to_string(),
            Self::Identity(err) => match err {
                IdentityError::NotAuthenticated => "Not signed in".to_string(),
                IdentityError::Rejected(msg) if !msg.is_empty() => msg.clone(),
                IdentityError::Rejected(_) => "Invalid credentials".to_string(),
                IdentityError::Blocked(msg) => msg.clone(),
                _ => "Authentication service unavailable".to_string(),
            },
            Self::Session(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::NoDraft => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.reportable() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = ErrorBody {
            error: self.public_message(),
            recovery: self.recovery(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(shopper_id: &str, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(shopper_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for shopper actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("order", "Selected size", Some(&[("size_id", "medium")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
