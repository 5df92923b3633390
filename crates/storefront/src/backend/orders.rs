//! Order submission client.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{error, instrument};
use url::Url;

use super::{Envelope, endpoint};
use crate::checkout::{CheckoutSubmission, OrderConfirmation, OrderSubmitter, SubmissionError};

#[derive(Debug, Deserialize)]
struct WireOrder {
    #[serde(alias = "ID", alias = "id")]
    order_id: serde_json::Value,
}

/// Places orders with the backend.
#[derive(Clone)]
pub struct OrderClient {
    inner: Arc<OrderClientInner>,
}

struct OrderClientInner {
    client: reqwest::Client,
    api: Url,
}

impl OrderClient {
    /// Create a new order client.
    #[must_use]
    pub fn new(client: reqwest::Client, api: Url) -> Self {
        Self {
            inner: Arc::new(OrderClientInner { client, api }),
        }
    }
}

impl OrderSubmitter for OrderClient {
    #[instrument(skip_all, fields(product_id = %submission.order.product_id))]
    async fn submit(
        &self,
        submission: &CheckoutSubmission,
    ) -> Result<OrderConfirmation, SubmissionError> {
        let response = self
            .inner
            .client
            .post(endpoint(&self.inner.api, "orders"))
            .json(submission)
            .send()
            .await
            .map_err(|e| SubmissionError::Transport(e.to_string()))?;

        let status = response.status();
        let envelope: Envelope<WireOrder> = response
            .json()
            .await
            .map_err(|e| SubmissionError::Transport(e.to_string()))?;

        if !status.is_success() || !envelope.is_success() {
            error!(status = %status, code = envelope.code, "Order rejected by backend");
            return Err(SubmissionError::Rejected(envelope.message));
        }

        let order_id = match envelope.data.map(|order| order.order_id) {
            Some(serde_json::Value::String(id)) => id,
            Some(serde_json::Value::Null) | None => {
                return Err(SubmissionError::Transport(
                    "order accepted without an id".to_owned(),
                ));
            }
            Some(other) => other.to_string(),
        };
        Ok(OrderConfirmation { order_id })
    }
}
