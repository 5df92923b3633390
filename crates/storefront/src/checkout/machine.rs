//! Checkout step sequencing.
//!
//! The machine moves forward only through [`CheckoutStepMachine::advance`],
//! which validates the current step, and backward only through
//! [`CheckoutStepMachine::retreat`], which never validates. `Completed` is
//! reached only after the order submitter accepts the order.

use serde::{Deserialize, Serialize};
use sunbloom_core::{CheckoutStep, OrderPayload};
use tracing::{info, instrument, warn};

use super::CheckoutPolicy;
use super::form::{CheckoutForm, Field};
use super::submit::{CardDetails, CheckoutSubmission, OrderConfirmation, OrderSubmitter};
use super::validate::{FieldErrors, validate_step};

/// Message shown on the payment step when the order could not be placed.
pub const SUBMISSION_FAILED: &str = "Failed to process order. Please try again.";

/// Outcome of an [`CheckoutStepMachine::advance`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Validation passed and the machine moved to the given step.
    Advanced(CheckoutStep),
    /// Validation failed; errors are populated and the step is unchanged.
    Invalid,
    /// The order was placed.
    Completed(OrderConfirmation),
    /// Submission failed; the machine stays on the payment step.
    SubmissionFailed,
    /// The flow already finished.
    AlreadyCompleted,
}

/// Current step plus its pending errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutStepMachine {
    step: CheckoutStep,
    errors: FieldErrors,
    submission_error: Option<String>,
}

impl CheckoutStepMachine {
    /// A machine on the first step.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn step(&self) -> CheckoutStep {
        self.step
    }

    /// Per-field errors for the current step.
    #[must_use]
    pub const fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// General error from the last submission attempt.
    #[must_use]
    pub fn submission_error(&self) -> Option<&str> {
        self.submission_error.as_deref()
    }

    /// Validate the current step and move forward on success.
    ///
    /// On the payment step a successful validation submits the order; only
    /// an accepted submission completes the flow. `order` is required at
    /// that point; a missing payload is treated as a failed submission.
    #[instrument(skip_all, fields(step = %self.step))]
    pub async fn advance<S: OrderSubmitter>(
        &mut self,
        form: &CheckoutForm,
        policy: &CheckoutPolicy,
        order: Option<&OrderPayload>,
        submitter: &S,
    ) -> Transition {
        if self.step.is_completed() {
            return Transition::AlreadyCompleted;
        }

        self.submission_error = None;
        self.errors = validate_step(form, self.step, policy.card_validation);
        if !self.errors.is_empty() {
            return Transition::Invalid;
        }

        let next = match self.step {
            CheckoutStep::Personal => CheckoutStep::Shipping,
            CheckoutStep::Shipping => CheckoutStep::Payment,
            CheckoutStep::Payment | CheckoutStep::Completed => {
                return self.submit(form, order, submitter).await;
            }
        };
        self.step = next;
        Transition::Advanced(next)
    }

    async fn submit<S: OrderSubmitter>(
        &mut self,
        form: &CheckoutForm,
        order: Option<&OrderPayload>,
        submitter: &S,
    ) -> Transition {
        let Some(order) = order else {
            warn!("Payment step validated without an order draft");
            self.submission_error = Some(SUBMISSION_FAILED.to_owned());
            return Transition::SubmissionFailed;
        };

        let submission = CheckoutSubmission {
            personal: form.personal.clone(),
            shipping: form.shipping.clone(),
            payment: CardDetails::from(&form.payment),
            order: order.clone(),
        };

        match submitter.submit(&submission).await {
            Ok(confirmation) => {
                info!(order_id = %confirmation.order_id, "Order placed");
                self.step = CheckoutStep::Completed;
                Transition::Completed(confirmation)
            }
            Err(e) => {
                warn!(error = %e, "Order submission failed");
                self.submission_error = Some(SUBMISSION_FAILED.to_owned());
                Transition::SubmissionFailed
            }
        }
    }

    /// Move one step back without validating, clearing the errors of the
    /// step being left. Returns whether the step changed.
    pub fn retreat(&mut self) -> bool {
        let previous = self.step.previous();
        if previous == self.step {
            return false;
        }

        let leaving = self.step;
        self.errors.retain(|field, _| field.step() != leaving);
        self.submission_error = None;
        self.step = previous;
        true
    }

    /// Drop the pending error for `field`, called when the shopper edits it.
    pub fn clear_field_error(&mut self, field: Field) {
        self.errors.remove(&field);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use sunbloom_core::{Price, ProductId, ShippingMethod, SizeId};

    use super::*;
    use crate::checkout::submit::SubmissionError;
    use crate::checkout::validate::CardValidation;

    struct CountingSubmitter {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingSubmitter {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail,
            }
        }
    }

    impl OrderSubmitter for CountingSubmitter {
        async fn submit(
            &self,
            submission: &CheckoutSubmission,
        ) -> Result<OrderConfirmation, SubmissionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert_eq!(submission.order.quantity, 2);
            assert_eq!(submission.payment.card_number, "4242 4242 4242 4242");
            if self.fail {
                Err(SubmissionError::Rejected("card declined".to_string()))
            } else {
                Ok(OrderConfirmation {
                    order_id: "ord-1".to_string(),
                })
            }
        }
    }

    fn policy() -> CheckoutPolicy {
        CheckoutPolicy {
            phone_prefix: "+234".to_string(),
            card_validation: CardValidation::Presence,
        }
    }

    fn payload() -> OrderPayload {
        OrderPayload {
            product_id: ProductId::new("847694"),
            product_name: "Wildflower Honey".to_string(),
            size_id: SizeId::new("medium"),
            size_index: 2,
            quantity: 2,
            unit_price: "12.50".parse().unwrap(),
            shipping_method: ShippingMethod::Express,
            subtotal: "25.00".parse().unwrap(),
            shipping_cost: Price::from_units(15),
            total: "40.00".parse().unwrap(),
        }
    }

    fn complete_form() -> CheckoutForm {
        let prefix = "+234";
        let mut form = CheckoutForm::new(prefix);
        for (field, value) in [
            (Field::FirstName, "Ada"),
            (Field::LastName, "Obi"),
            (Field::Email, "ada@example.com"),
            (Field::Phone, "0712345678"),
            (Field::Address, "12 Marina Rd"),
            (Field::City, "Lagos"),
            (Field::State, "LA"),
            (Field::ZipCode, "10001"),
            (Field::CardName, "Ada Obi"),
            (Field::CardNumber, "4242424242424242"),
            (Field::ExpiryDate, "1230"),
            (Field::Cvv, "123"),
        ] {
            form.set(field, value, prefix);
        }
        form
    }

    #[tokio::test]
    async fn test_empty_email_blocks_advance() {
        let mut form = complete_form();
        form.personal.email.clear();
        let submitter = CountingSubmitter::new(false);
        let mut machine = CheckoutStepMachine::new();

        let outcome = machine
            .advance(&form, &policy(), Some(&payload()), &submitter)
            .await;
        assert_eq!(outcome, Transition::Invalid);
        assert_eq!(machine.step(), CheckoutStep::Personal);
        assert_eq!(machine.errors()[&Field::Email], "Email is required");
    }

    #[tokio::test]
    async fn test_full_flow_submits_once() {
        let form = complete_form();
        let submitter = CountingSubmitter::new(false);
        let mut machine = CheckoutStepMachine::new();
        let order = payload();

        assert_eq!(
            machine.advance(&form, &policy(), Some(&order), &submitter).await,
            Transition::Advanced(CheckoutStep::Shipping)
        );
        assert_eq!(
            machine.advance(&form, &policy(), Some(&order), &submitter).await,
            Transition::Advanced(CheckoutStep::Payment)
        );
        assert_eq!(submitter.calls.load(Ordering::SeqCst), 0);

        let outcome = machine.advance(&form, &policy(), Some(&order), &submitter).await;
        assert!(matches!(outcome, Transition::Completed(ref c) if c.order_id == "ord-1"));
        assert_eq!(machine.step(), CheckoutStep::Completed);
        assert_eq!(submitter.calls.load(Ordering::SeqCst), 1);

        assert_eq!(
            machine.advance(&form, &policy(), Some(&order), &submitter).await,
            Transition::AlreadyCompleted
        );
        assert_eq!(submitter.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_submission_failure_stays_on_payment() {
        let form = complete_form();
        let submitter = CountingSubmitter::new(true);
        let mut machine = CheckoutStepMachine::new();
        let order = payload();
        for _ in 0..2 {
            machine.advance(&form, &policy(), Some(&order), &submitter).await;
        }

        let outcome = machine.advance(&form, &policy(), Some(&order), &submitter).await;
        assert_eq!(outcome, Transition::SubmissionFailed);
        assert_eq!(machine.step(), CheckoutStep::Payment);
        assert_eq!(machine.submission_error(), Some(SUBMISSION_FAILED));
        assert!(machine.errors().is_empty());
    }

    #[tokio::test]
    async fn test_missing_order_fails_submission() {
        let form = complete_form();
        let submitter = CountingSubmitter::new(false);
        let mut machine = CheckoutStepMachine::new();
        for _ in 0..2 {
            machine.advance(&form, &policy(), None, &submitter).await;
        }
        assert_eq!(machine.step(), CheckoutStep::Payment);

        let outcome = machine.advance(&form, &policy(), None, &submitter).await;
        assert_eq!(outcome, Transition::SubmissionFailed);
        assert_eq!(submitter.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_retreat_clears_left_step_errors_without_validating() {
        let mut form = complete_form();
        let submitter = CountingSubmitter::new(false);
        let mut machine = CheckoutStepMachine::new();
        machine.advance(&form, &policy(), None, &submitter).await;
        assert_eq!(machine.step(), CheckoutStep::Shipping);

        form.shipping.city.clear();
        form.personal.first_name.clear();
        machine.advance(&form, &policy(), None, &submitter).await;
        assert!(machine.errors().contains_key(&Field::City));

        assert!(machine.retreat());
        assert_eq!(machine.step(), CheckoutStep::Personal);
        assert!(machine.errors().is_empty());

        assert!(!machine.retreat());
        assert_eq!(machine.step(), CheckoutStep::Personal);
    }

    #[tokio::test]
    async fn test_editing_clears_field_error() {
        let form = CheckoutForm::new("+234");
        let submitter = CountingSubmitter::new(false);
        let mut machine = CheckoutStepMachine::new();
        machine.advance(&form, &policy(), None, &submitter).await;
        assert!(machine.errors().contains_key(&Field::FirstName));

        machine.clear_field_error(Field::FirstName);
        assert!(!machine.errors().contains_key(&Field::FirstName));
        assert!(machine.errors().contains_key(&Field::LastName));
    }

    #[test]
    fn test_machine_state_round_trips_through_session_json() {
        let mut machine = CheckoutStepMachine::new();
        machine.errors.insert(Field::ZipCode, "ZIP code is required".to_string());
        let json = serde_json::to_value(&machine).unwrap();
        assert_eq!(json["errors"]["zipCode"], "ZIP code is required");

        let back: CheckoutStepMachine = serde_json::from_value(json).unwrap();
        assert_eq!(back, machine);
    }
}
