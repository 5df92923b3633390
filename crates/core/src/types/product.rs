//! Catalog product and size types.
//!
//! These are the storefront's view of the catalog response: immutable once
//! fetched, shared by the draft controller and checkout.

use serde::{Deserialize, Serialize};

use crate::types::id::{ProductId, SizeId};
use crate::types::price::Price;

/// One purchasable size of the product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSize {
    /// Stable identifier (the lowercased size label).
    pub id: SizeId,
    /// Display name, e.g. "Medium".
    pub name: String,
    /// Weight label, e.g. "500g".
    pub weight: String,
    /// Unit price.
    pub price: Price,
    /// Units available.
    pub stock: u32,
    /// Absolute URL of the container image, if any.
    pub container_image: Option<String>,
}

impl ProductSize {
    /// Whether the size can be selected at all.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.stock > 0
    }
}

/// The product offered by the storefront.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogProduct {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    /// Absolute image URLs.
    pub images: Vec<String>,
    pub features: Vec<String>,
    pub sizes: Vec<ProductSize>,
}

impl CatalogProduct {
    /// Look up a size by id.
    #[must_use]
    pub fn size(&self, id: &SizeId) -> Option<&ProductSize> {
        self.sizes.iter().find(|size| &size.id == id)
    }

    /// 1-based position of a size in the catalog list.
    #[must_use]
    pub fn size_index(&self, id: &SizeId) -> Option<usize> {
        self.sizes
            .iter()
            .position(|size| &size.id == id)
            .map(|index| index + 1)
    }
}
