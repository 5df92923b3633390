//! Sunbloom Core - Shared domain types.
//!
//! This crate provides the types that flow through the Sunbloom storefront:
//! catalog sizes, prices, shipping methods, checkout steps, and the order
//! payload handed to order submission.
//!
//! # Architecture
//!
//! The core crate contains only types and pure helpers - no I/O, no sessions,
//! no HTTP clients. Behavior that touches storage or the network lives in
//! `sunbloom-storefront`.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, decimal prices, catalog and order types

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
