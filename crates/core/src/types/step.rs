//! Checkout step enumeration.

use serde::{Deserialize, Serialize};

/// Position of a shopper in the three-step checkout.
///
/// Steps are ordered; `Completed` is terminal and only reachable after a
/// successful order submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    /// Step 1: name, email, phone.
    #[default]
    Personal,
    /// Step 2: delivery address and shipping method.
    Shipping,
    /// Step 3: card details.
    Payment,
    /// Order placed.
    Completed,
}

impl CheckoutStep {
    /// 1-based step index shown in the progress indicator.
    ///
    /// `Completed` reports 3, the last real step.
    #[must_use]
    pub const fn index(self) -> u8 {
        match self {
            Self::Personal => 1,
            Self::Shipping => 2,
            Self::Payment | Self::Completed => 3,
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Personal => "Personal Info",
            Self::Shipping => "Shipping",
            Self::Payment => "Payment",
            Self::Completed => "Completed",
        }
    }

    /// The previous step, saturating at `Personal`.
    #[must_use]
    pub const fn previous(self) -> Self {
        match self {
            Self::Personal | Self::Shipping => Self::Personal,
            Self::Payment => Self::Shipping,
            Self::Completed => Self::Completed,
        }
    }

    /// Whether the flow has finished.
    #[must_use]
    pub const fn is_completed(self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl std::fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_bounds() {
        assert_eq!(CheckoutStep::Personal.index(), 1);
        assert_eq!(CheckoutStep::Shipping.index(), 2);
        assert_eq!(CheckoutStep::Payment.index(), 3);
        assert_eq!(CheckoutStep::Completed.index(), 3);
    }

    #[test]
    fn test_previous_never_drops_below_first_step() {
        assert_eq!(CheckoutStep::Personal.previous(), CheckoutStep::Personal);
        assert_eq!(CheckoutStep::Payment.previous(), CheckoutStep::Shipping);
    }
}
