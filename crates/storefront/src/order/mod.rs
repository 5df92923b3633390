//! In-progress order draft.
//!
//! # Components
//!
//! - [`store`] - expiring draft persistence over the shopper's session
//! - [`stock`] - quantity clamping against available stock
//! - [`pricing`] - subtotal, shipping, and total computation
//! - [`controller`] - the owner of the draft, the only place it is mutated
//!
//! Every mutation in the controller writes through to the store so a reload
//! never loses the last good selection.

pub mod controller;
pub mod pricing;
pub mod stock;
pub mod store;

pub use controller::{DRAFT_KEY, OrderDraftController};
pub use pricing::compute_totals;
pub use store::{DraftBackend, DraftStore, StoreError};
