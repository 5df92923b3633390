//! Stock policy for quantity selection.

use sunbloom_core::ProductSize;

/// Bound a requested quantity to `[1, size.stock]`.
///
/// Zero and negative requests yield 1. A size with no stock is never
/// selectable, so the lower bound wins and quantity is never 0.
#[must_use]
pub fn clamp(requested: i64, size: &ProductSize) -> u32 {
    let max = i64::from(size.stock.max(1));
    u32::try_from(requested.clamp(1, max)).unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use sunbloom_core::{Price, SizeId};

    use super::*;

    fn size(stock: u32) -> ProductSize {
        ProductSize {
            id: SizeId::new("medium"),
            name: "Medium".to_string(),
            weight: "500g".to_string(),
            price: "12.50".parse().unwrap_or(Price::ZERO),
            stock,
            container_image: None,
        }
    }

    #[test]
    fn test_clamp_within_range() {
        assert_eq!(clamp(2, &size(3)), 2);
    }

    #[test]
    fn test_clamp_zero_and_negative_yield_one() {
        assert_eq!(clamp(0, &size(3)), 1);
        assert_eq!(clamp(-7, &size(3)), 1);
    }

    #[test]
    fn test_clamp_above_stock() {
        assert_eq!(clamp(4, &size(3)), 3);
        assert_eq!(clamp(i64::MAX, &size(3)), 3);
    }

    #[test]
    fn test_clamp_delta_sequence_stops_at_stock() {
        let medium = size(3);
        let mut quantity = 1;
        let mut seen = Vec::new();
        for delta in [1, 1, 1, 1] {
            quantity = clamp(i64::from(quantity) + delta, &medium);
            seen.push(quantity);
        }
        assert_eq!(seen, vec![2, 3, 3, 3]);
    }

    proptest! {
        #[test]
        fn clamp_stays_in_bounds(requested in any::<i64>(), stock in 1_u32..10_000) {
            let clamped = clamp(requested, &size(stock));
            prop_assert!(clamped >= 1);
            prop_assert!(clamped <= stock);
        }
    }
}
