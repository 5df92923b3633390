//! Checkout form state.

use serde::{Deserialize, Serialize};
use sunbloom_core::{CheckoutStep, ShippingMethod};

use super::normalize::normalize;

/// A single editable checkout field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    FirstName,
    LastName,
    Email,
    Phone,
    Address,
    Apartment,
    City,
    State,
    ZipCode,
    Country,
    CardName,
    CardNumber,
    ExpiryDate,
    Cvv,
}

impl Field {
    /// The step whose form group holds this field.
    #[must_use]
    pub const fn step(self) -> CheckoutStep {
        match self {
            Self::FirstName | Self::LastName | Self::Email | Self::Phone => CheckoutStep::Personal,
            Self::Address
            | Self::Apartment
            | Self::City
            | Self::State
            | Self::ZipCode
            | Self::Country => CheckoutStep::Shipping,
            Self::CardName | Self::CardNumber | Self::ExpiryDate | Self::Cvv => {
                CheckoutStep::Payment
            }
        }
    }
}

/// Step 1 fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

/// Step 2 fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingInfo {
    pub address: String,
    pub apartment: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub method: ShippingMethod,
}

/// Step 3 fields.
///
/// Card number and CVV are held in memory only: they are never serialized,
/// so neither the session nor a checkout view carries them.
/// Implements `Debug` manually to redact card data.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInfo {
    pub card_name: String,
    #[serde(skip)]
    pub card_number: String,
    pub expiry_date: String,
    #[serde(skip)]
    pub cvv: String,
}

impl std::fmt::Debug for PaymentInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentInfo")
            .field("card_name", &self.card_name)
            .field("card_number", &"[REDACTED]")
            .field("expiry_date", &self.expiry_date)
            .field("cvv", &"[REDACTED]")
            .finish()
    }
}

/// All checkout fields, grouped by step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutForm {
    pub personal: PersonalInfo,
    pub shipping: ShippingInfo,
    pub payment: PaymentInfo,
}

impl CheckoutForm {
    /// An empty form with the phone field pre-filled with `phone_prefix`.
    #[must_use]
    pub fn new(phone_prefix: &str) -> Self {
        let mut form = Self::default();
        form.personal.phone = phone_prefix.to_owned();
        form
    }

    /// Current text of a field.
    #[must_use]
    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::FirstName => &self.personal.first_name,
            Field::LastName => &self.personal.last_name,
            Field::Email => &self.personal.email,
            Field::Phone => &self.personal.phone,
            Field::Address => &self.shipping.address,
            Field::Apartment => &self.shipping.apartment,
            Field::City => &self.shipping.city,
            Field::State => &self.shipping.state,
            Field::ZipCode => &self.shipping.zip_code,
            Field::Country => &self.shipping.country,
            Field::CardName => &self.payment.card_name,
            Field::CardNumber => &self.payment.card_number,
            Field::ExpiryDate => &self.payment.expiry_date,
            Field::Cvv => &self.payment.cvv,
        }
    }

    fn slot(&mut self, field: Field) -> &mut String {
        match field {
            Field::FirstName => &mut self.personal.first_name,
            Field::LastName => &mut self.personal.last_name,
            Field::Email => &mut self.personal.email,
            Field::Phone => &mut self.personal.phone,
            Field::Address => &mut self.shipping.address,
            Field::Apartment => &mut self.shipping.apartment,
            Field::City => &mut self.shipping.city,
            Field::State => &mut self.shipping.state,
            Field::ZipCode => &mut self.shipping.zip_code,
            Field::Country => &mut self.shipping.country,
            Field::CardName => &mut self.payment.card_name,
            Field::CardNumber => &mut self.payment.card_number,
            Field::ExpiryDate => &mut self.payment.expiry_date,
            Field::Cvv => &mut self.payment.cvv,
        }
    }

    /// Apply an edit, normalizing it first. Returns the stored value.
    pub fn set(&mut self, field: Field, raw: &str, phone_prefix: &str) -> &str {
        let normalized = normalize(field, raw, phone_prefix);
        let slot = self.slot(field);
        *slot = normalized;
        slot
    }

    /// Choose the shipping method.
    pub const fn set_shipping_method(&mut self, method: ShippingMethod) {
        self.shipping.method = method;
    }
}
