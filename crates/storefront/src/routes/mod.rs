//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//!
//! # Order
//! GET  /order                  - Product, saved selection, and totals
//! POST /order/size             - Select a size ({sizeId})
//! POST /order/quantity         - Adjust quantity ({delta})
//! POST /order/cancel           - Discard the draft
//!
//! # Checkout
//! GET  /checkout               - Step, errors, form, and totals
//! POST /checkout/field         - Edit a field ({field, value})
//! POST /checkout/shipping      - Choose shipping ({method})
//! POST /checkout/advance       - Validate and move forward / place order
//! POST /checkout/retreat       - Move back one step
//!
//! # Auth
//! GET  /auth/status            - Current auth session
//! POST /auth/login             - Login ({email, password})
//! POST /auth/logout            - Logout
//! ```

pub mod auth;
pub mod checkout;
pub mod order;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(order::show))
        .route("/size", post(order::select_size))
        .route("/quantity", post(order::set_quantity))
        .route("/cancel", post(order::cancel))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show))
        .route("/field", post(checkout::set_field))
        .route("/shipping", post(checkout::set_shipping))
        .route("/advance", post(checkout::advance))
        .route("/retreat", post(checkout::retreat))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/status", get(auth::status))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/order", order_routes())
        .nest("/checkout", checkout_routes())
        .nest("/auth", auth_routes())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check the backend.
async fn health() -> &'static str {
    "ok"
}
