//! Order submission boundary.

use std::future::Future;

use serde::{Deserialize, Serialize};
use sunbloom_core::OrderPayload;
use thiserror::Error;

use super::form::{PaymentInfo, PersonalInfo, ShippingInfo};

/// Everything handed to the order backend once payment details validate.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSubmission {
    pub personal: PersonalInfo,
    pub shipping: ShippingInfo,
    pub payment: CardDetails,
    pub order: OrderPayload,
}

/// Payment fields as sent to the order backend, card number and CVV included.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDetails {
    pub card_name: String,
    pub card_number: String,
    pub expiry_date: String,
    pub cvv: String,
}

impl From<&PaymentInfo> for CardDetails {
    fn from(payment: &PaymentInfo) -> Self {
        Self {
            card_name: payment.card_name.clone(),
            card_number: payment.card_number.clone(),
            expiry_date: payment.expiry_date.clone(),
            cvv: payment.cvv.clone(),
        }
    }
}

impl std::fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardDetails")
            .field("card_name", &self.card_name)
            .field("card_number", &"[REDACTED]")
            .field("expiry_date", &self.expiry_date)
            .field("cvv", &"[REDACTED]")
            .finish()
    }
}

/// Acknowledgement of a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    pub order_id: String,
}

/// Why an order could not be placed.
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// The backend answered but refused the order.
    #[error("order rejected: {0}")]
    Rejected(String),

    /// The backend could not be reached or answered garbage.
    #[error("order transport error: {0}")]
    Transport(String),
}

/// Places orders.
pub trait OrderSubmitter: Send + Sync {
    /// Submit a validated checkout. Invoked once per successful payment step.
    fn submit(
        &self,
        submission: &CheckoutSubmission,
    ) -> impl Future<Output = Result<OrderConfirmation, SubmissionError>> + Send;
}
