//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions with in-memory store)
//!
//! The [`Shopper`] extractor runs inside handlers, after the session layer.

pub mod request_id;
pub mod session;
pub mod shopper;

pub use request_id::{RequestId, request_id_middleware};
pub use session::create_session_layer;
pub use shopper::{Shopper, clear_auth_token, set_auth_token};
