//! Order draft snapshots and the hand-off payload.

use serde::{Deserialize, Serialize};

use crate::types::id::{ProductId, SizeId};
use crate::types::price::Price;
use crate::types::product::ProductSize;
use crate::types::shipping::ShippingMethod;

/// Totals derived from a draft and a shipping method.
///
/// Invariant: `total == subtotal + shipping_cost`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingSnapshot {
    pub subtotal: Price,
    pub shipping_cost: Price,
    pub total: Price,
}

impl PricingSnapshot {
    /// Snapshot used when no size is selected.
    pub const ZERO: Self = Self {
        subtotal: Price::ZERO,
        shipping_cost: Price::ZERO,
        total: Price::ZERO,
    };

    /// Build a snapshot, deriving the total.
    #[must_use]
    pub fn new(subtotal: Price, shipping_cost: Price) -> Self {
        Self {
            subtotal,
            shipping_cost,
            total: subtotal + shipping_cost,
        }
    }
}

/// The in-progress purchase configuration.
///
/// Invariants (kept by the draft controller, which is the only mutator):
/// - `1 <= quantity <= selected_size.stock` whenever a size is selected
/// - `pricing` is zeroed whenever no size is selected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    pub product_id: ProductId,
    pub product_name: String,
    pub selected_size: Option<ProductSize>,
    pub quantity: u32,
    pub pricing: PricingSnapshot,
}

impl OrderDraft {
    /// A draft with nothing selected yet.
    #[must_use]
    pub const fn empty(product_id: ProductId, product_name: String) -> Self {
        Self {
            product_id,
            product_name,
            selected_size: None,
            quantity: 1,
            pricing: PricingSnapshot::ZERO,
        }
    }

    /// Id of the selected size, if any.
    #[must_use]
    pub fn size_id(&self) -> Option<&SizeId> {
        self.selected_size.as_ref().map(|size| &size.id)
    }

    /// The persisted form of this draft, if a size is selected.
    #[must_use]
    pub fn to_record(&self) -> Option<DraftRecord> {
        self.selected_size.as_ref().map(|size| DraftRecord {
            size_id: size.id.clone(),
            quantity: self.quantity,
            product_id: self.product_id.clone(),
            product_name: self.product_name.clone(),
        })
    }
}

/// Persisted form of an in-progress selection.
///
/// This is the record the draft store writes across page loads. Readers
/// ignore fields they don't know about; a record missing any of these
/// fields is treated as absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftRecord {
    pub size_id: SizeId,
    pub quantity: u32,
    pub product_id: ProductId,
    pub product_name: String,
}

/// Immutable snapshot handed to order submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    pub product_id: ProductId,
    pub product_name: String,
    pub size_id: SizeId,
    /// 1-based position of the size in the catalog list.
    pub size_index: usize,
    pub quantity: u32,
    pub unit_price: Price,
    pub shipping_method: ShippingMethod,
    pub subtotal: Price,
    pub shipping_cost: Price,
    pub total: Price,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_snapshot_total_is_sum() {
        let snapshot = PricingSnapshot::new(Price::from_units(25), ShippingMethod::Express.cost());
        assert_eq!(snapshot.total.to_string(), "40.00");
    }

    #[test]
    fn test_empty_draft_has_no_record() {
        let draft = OrderDraft::empty(ProductId::new("847694"), "Honey".to_string());
        assert_eq!(draft.quantity, 1);
        assert_eq!(draft.pricing, PricingSnapshot::ZERO);
        assert!(draft.to_record().is_none());
    }

    #[test]
    fn test_draft_record_ignores_unknown_fields() {
        let record: DraftRecord = serde_json::from_value(json!({
            "sizeId": "medium",
            "quantity": 2,
            "productId": "847694",
            "productName": "Wildflower Honey",
            "totalPrice": 25.0,
            "schemaVersion": 7
        }))
        .unwrap();
        assert_eq!(record.size_id, SizeId::new("medium"));
        assert_eq!(record.quantity, 2);
    }

    #[test]
    fn test_partial_draft_record_is_rejected() {
        let result = serde_json::from_value::<DraftRecord>(json!({
            "sizeId": "medium",
            "quantity": 2
        }));
        assert!(result.is_err());
    }
}
