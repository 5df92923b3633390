//! Identity error types.

use thiserror::Error;

/// Errors raised by the identity backend.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// No session token is present.
    #[error("not signed in")]
    NotAuthenticated,

    /// The backend refused the credentials or token.
    #[error("rejected by identity backend: {0}")]
    Rejected(String),

    /// The account exists but has been blocked.
    #[error("account blocked: {0}")]
    Blocked(String),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with something we could not interpret.
    #[error("unexpected identity response: {0}")]
    Unexpected(String),
}
