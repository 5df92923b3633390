//! Field normalizers applied on every edit.
//!
//! Each normalizer is a pure `&str -> String` function. They only adjust
//! punctuation, grouping, and length caps; digits already entered are kept.

use super::form::Field;

/// Maximum digits in an expiry date (`MMYY`).
const EXPIRY_DIGITS: usize = 4;
/// Maximum digits in a card security code.
const CVV_DIGITS: usize = 4;
/// Maximum digits in a ZIP code.
const ZIP_DIGITS: usize = 5;

fn digits(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

fn digits_capped(raw: &str, cap: usize) -> String {
    raw.chars().filter(char::is_ascii_digit).take(cap).collect()
}

/// Force `prefix` onto a phone number and keep only digits after it.
#[must_use]
pub fn phone(raw: &str, prefix: &str) -> String {
    let rest = if prefix.is_empty() {
        raw.to_owned()
    } else {
        raw.replacen(prefix, "", 1)
    };
    format!("{prefix}{}", digits(&rest))
}

/// Group card digits into blocks of four.
#[must_use]
pub fn card_number(raw: &str) -> String {
    let digits: Vec<char> = raw.chars().filter(char::is_ascii_digit).collect();
    digits
        .chunks(4)
        .map(|chunk| chunk.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Format an expiry date as `MM/YY`.
///
/// The slash only appears once a third digit is typed so that deleting
/// back past it works naturally.
#[must_use]
pub fn expiry(raw: &str) -> String {
    let digits = digits_capped(raw, EXPIRY_DIGITS);
    if digits.len() < 3 {
        return digits;
    }
    let (month, year) = digits.split_at(2);
    format!("{month}/{year}")
}

/// Keep up to four CVV digits.
#[must_use]
pub fn cvv(raw: &str) -> String {
    digits_capped(raw, CVV_DIGITS)
}

/// Keep up to five ZIP digits.
#[must_use]
pub fn zip_code(raw: &str) -> String {
    digits_capped(raw, ZIP_DIGITS)
}

/// Normalize a raw edit for `field`. Fields without a formatter pass through.
#[must_use]
pub fn normalize(field: Field, raw: &str, phone_prefix: &str) -> String {
    match field {
        Field::Phone => phone(raw, phone_prefix),
        Field::CardNumber => card_number(raw),
        Field::ExpiryDate => expiry(raw),
        Field::Cvv => cvv(raw),
        Field::ZipCode => zip_code(raw),
        _ => raw.to_owned(),
    }
}
