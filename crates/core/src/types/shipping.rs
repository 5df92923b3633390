//! Shipping method selection and its fixed cost table.

use serde::{Deserialize, Serialize};

use crate::types::price::Price;

/// Error returned when parsing an unknown shipping method name.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid shipping method: {0}")]
pub struct UnknownShippingMethod(String);

/// Delivery speed chosen on the shipping step of checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ShippingMethod {
    /// Free delivery.
    #[default]
    Standard,
    /// Faster delivery for a flat fee.
    Express,
    /// Next-day delivery.
    Overnight,
}

impl ShippingMethod {
    /// Every method, in the order shown to shoppers.
    pub const ALL: [Self; 3] = [Self::Standard, Self::Express, Self::Overnight];

    /// Fixed cost of the method.
    #[must_use]
    pub fn cost(self) -> Price {
        match self {
            Self::Standard => Price::ZERO,
            Self::Express => Price::from_units(15),
            Self::Overnight => Price::from_units(25),
        }
    }

    /// Wire name of the method.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Express => "express",
            Self::Overnight => "overnight",
        }
    }
}

impl std::fmt::Display for ShippingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ShippingMethod {
    type Err = UnknownShippingMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(Self::Standard),
            "express" => Ok(Self::Express),
            "overnight" => Ok(Self::Overnight),
            _ => Err(UnknownShippingMethod(s.to_owned())),
        }
    }
}
