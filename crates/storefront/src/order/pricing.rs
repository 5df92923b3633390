//! Pricing for the order draft.
//!
//! Pure functions only: callers decide when to recompute (every size,
//! quantity, or shipping change).

use sunbloom_core::{OrderDraft, PricingSnapshot, ShippingMethod};

/// Compute subtotal, shipping cost, and total for a draft.
///
/// A draft without a selected size prices to zero across the board.
#[must_use]
pub fn compute_totals(draft: &OrderDraft, method: ShippingMethod) -> PricingSnapshot {
    draft
        .selected_size
        .as_ref()
        .map_or(PricingSnapshot::ZERO, |size| {
            PricingSnapshot::new(size.price.times(draft.quantity), method.cost())
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use proptest::prelude::*;
    use sunbloom_core::{Price, ProductId, ProductSize, SizeId};

    use super::*;

    fn draft(price: &str, quantity: u32) -> OrderDraft {
        let mut draft = OrderDraft::empty(ProductId::new("847694"), "Honey".to_string());
        draft.selected_size = Some(ProductSize {
            id: SizeId::new("medium"),
            name: "Medium".to_string(),
            weight: "500g".to_string(),
            price: price.parse().unwrap(),
            stock: 10,
            container_image: None,
        });
        draft.quantity = quantity;
        draft
    }

    #[test]
    fn test_express_shipping_on_twenty_five() {
        let totals = compute_totals(&draft("12.50", 2), ShippingMethod::Express);
        assert_eq!(totals.subtotal.to_string(), "25.00");
        assert_eq!(totals.shipping_cost.to_string(), "15.00");
        assert_eq!(totals.total.to_string(), "40.00");
    }

    #[test]
    fn test_no_size_is_zeroed() {
        let empty = OrderDraft::empty(ProductId::new("847694"), "Honey".to_string());
        assert_eq!(
            compute_totals(&empty, ShippingMethod::Overnight),
            PricingSnapshot::ZERO
        );
    }

    #[test]
    fn test_no_float_drift() {
        let totals = compute_totals(&draft("0.10", 3), ShippingMethod::Standard);
        assert_eq!(totals.total, "0.30".parse::<Price>().unwrap());
    }

    proptest! {
        #[test]
        fn totals_are_pure_and_additive(
            cents in 0_i64..1_000_000,
            quantity in 1_u32..100,
            method_index in 0_usize..3,
        ) {
            let method = ShippingMethod::ALL[method_index];
            let mut d = draft("0", quantity);
            if let Some(size) = d.selected_size.as_mut() {
                size.price = Price::from_minor_units(cents);
            }
            let first = compute_totals(&d, method);
            let second = compute_totals(&d, method);
            prop_assert_eq!(first, second);
            prop_assert_eq!(first.total, first.subtotal + first.shipping_cost);
        }
    }
}
