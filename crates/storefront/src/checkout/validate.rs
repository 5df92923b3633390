//! Step-local validation.
//!
//! Validators only read normalized form text and report a field-to-message
//! map. They never edit the form.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sunbloom_core::CheckoutStep;

use super::form::{CheckoutForm, Field};

/// Validation failures keyed by field. An absent key means no error.
pub type FieldErrors = BTreeMap<Field, String>;

/// How strictly payment fields are checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardValidation {
    /// Required fields must be non-blank.
    #[default]
    Presence,
    /// Presence plus card number checksum, expiry date and CVV length.
    Strict,
}

/// Error returned when parsing an unknown [`CardValidation`] name.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown card validation policy: {0}")]
pub struct UnknownCardValidation(String);

impl FromStr for CardValidation {
    type Err = UnknownCardValidation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "presence" => Ok(Self::Presence),
            "strict" => Ok(Self::Strict),
            _ => Err(UnknownCardValidation(s.to_owned())),
        }
    }
}

const PERSONAL: &[(Field, &str)] = &[
    (Field::FirstName, "First name is required"),
    (Field::LastName, "Last name is required"),
    (Field::Email, "Email is required"),
    (Field::Phone, "Phone number is required"),
];

const SHIPPING: &[(Field, &str)] = &[
    (Field::Address, "Address is required"),
    (Field::City, "City is required"),
    (Field::State, "State is required"),
    (Field::ZipCode, "ZIP code is required"),
];

const PAYMENT: &[(Field, &str)] = &[
    (Field::CardName, "Name on card is required"),
    (Field::CardNumber, "Card number is required"),
    (Field::ExpiryDate, "Expiry date is required"),
    (Field::Cvv, "CVV is required"),
];

/// Validate the fields belonging to `step`.
///
/// `Completed` has nothing to validate.
#[must_use]
pub fn validate_step(form: &CheckoutForm, step: CheckoutStep, policy: CardValidation) -> FieldErrors {
    validate_step_on(form, step, policy, Utc::now().date_naive())
}

/// [`validate_step`] with an explicit "today" for expiry checks.
#[must_use]
pub fn validate_step_on(
    form: &CheckoutForm,
    step: CheckoutStep,
    policy: CardValidation,
    today: NaiveDate,
) -> FieldErrors {
    let required = match step {
        CheckoutStep::Personal => PERSONAL,
        CheckoutStep::Shipping => SHIPPING,
        CheckoutStep::Payment => PAYMENT,
        CheckoutStep::Completed => return FieldErrors::new(),
    };

    let mut errors: FieldErrors = required
        .iter()
        .filter(|(field, _)| form.value(*field).trim().is_empty())
        .map(|(field, message)| (*field, (*message).to_owned()))
        .collect();

    if step == CheckoutStep::Payment && policy == CardValidation::Strict {
        strict_payment(form, today, &mut errors);
    }
    errors
}

fn strict_payment(form: &CheckoutForm, today: NaiveDate, errors: &mut FieldErrors) {
    let payment = &form.payment;

    if !errors.contains_key(&Field::CardNumber) && !card_number_valid(&payment.card_number) {
        errors.insert(Field::CardNumber, "Card number is invalid".to_owned());
    }

    if !errors.contains_key(&Field::ExpiryDate) {
        match parse_expiry(&payment.expiry_date) {
            None => {
                errors.insert(Field::ExpiryDate, "Expiry date is invalid".to_owned());
            }
            Some((year, month)) if (year, month) < (today.year(), today.month()) => {
                errors.insert(Field::ExpiryDate, "Card has expired".to_owned());
            }
            Some(_) => {}
        }
    }

    if !errors.contains_key(&Field::Cvv) {
        let cvv = payment.cvv.trim();
        let digits_only = cvv.chars().all(|c| c.is_ascii_digit());
        if !digits_only || !(3..=4).contains(&cvv.len()) {
            errors.insert(Field::Cvv, "CVV is invalid".to_owned());
        }
    }
}

/// Luhn checksum over a 13-19 digit number. Spaces are ignored.
fn card_number_valid(raw: &str) -> bool {
    let digits: Vec<u32> = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_digit(10))
        .collect::<Option<_>>()
        .unwrap_or_default();

    if !(13..=19).contains(&digits.len()) {
        return false;
    }

    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                d
            }
        })
        .sum();
    sum % 10 == 0
}

/// Parse `MM/YY` into `(year, month)`.
fn parse_expiry(raw: &str) -> Option<(i32, u32)> {
    let (mm, yy) = raw.trim().split_once('/')?;
    if mm.len() != 2 || yy.len() != 2 {
        return None;
    }
    let month: u32 = mm.parse().ok()?;
    let year: i32 = yy.parse().ok()?;
    (1..=12).contains(&month).then_some((2000 + year, month))
}
