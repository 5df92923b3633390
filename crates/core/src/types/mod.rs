//! Core types for Sunbloom.
//!
//! This module provides type-safe wrappers for the storefront's domain concepts.

pub mod id;
pub mod order;
pub mod price;
pub mod product;
pub mod shipping;
pub mod step;

pub use id::*;
pub use order::{DraftRecord, OrderDraft, OrderPayload, PricingSnapshot};
pub use price::{Price, PriceError};
pub use product::{CatalogProduct, ProductSize};
pub use shipping::{ShippingMethod, UnknownShippingMethod};
pub use step::CheckoutStep;
