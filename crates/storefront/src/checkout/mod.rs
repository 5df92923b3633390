//! Three-step checkout.
//!
//! Editing a field runs it through [`normalize`] only. Validation runs when
//! the shopper tries to move forward, inside [`CheckoutStepMachine::advance`].

pub mod form;
pub mod machine;
pub mod normalize;
pub mod submit;
pub mod validate;

pub use form::{CheckoutForm, Field, PaymentInfo, PersonalInfo, ShippingInfo};
pub use machine::{CheckoutStepMachine, SUBMISSION_FAILED, Transition};
pub use submit::{CardDetails, CheckoutSubmission, OrderConfirmation, OrderSubmitter, SubmissionError};
pub use validate::{CardValidation, FieldErrors};

/// Checkout settings fixed at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutPolicy {
    /// Country-code prefix forced onto the phone field.
    pub phone_prefix: String,
    pub card_validation: CardValidation,
}

impl Default for CheckoutPolicy {
    fn default() -> Self {
        Self {
            phone_prefix: "+234".to_owned(),
            card_validation: CardValidation::Presence,
        }
    }
}
