//! Checkout route handlers.
//!
//! The checkout flow is kept in the session. Validation failures are part of
//! the returned view, never an error response.
//!
//! Card number and CVV are never stored: an edit echoes the normalized value
//! once, and the payment step takes them in the `/checkout/advance` body.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use sunbloom_core::{CheckoutStep, OrderPayload, PricingSnapshot, ShippingMethod};
use tower_sessions::Session;
use tracing::{info, instrument};

use super::order::load_controller;
use crate::checkout::{CheckoutForm, Field, FieldErrors, OrderConfirmation, Transition};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::models::CheckoutFlow;
use crate::order::OrderDraftController;
use crate::state::AppState;

/// Checkout page data.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutView {
    pub step: CheckoutStep,
    pub step_index: u8,
    pub step_label: &'static str,
    pub errors: FieldErrors,
    pub submission_error: Option<String>,
    pub form: CheckoutForm,
    /// Normalized value of the field just edited.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalized: Option<String>,
    pub pricing: PricingSnapshot,
    pub order: Option<OrderPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmation: Option<OrderConfirmation>,
}

impl CheckoutView {
    fn new(flow: &CheckoutFlow, pricing: PricingSnapshot, order: Option<OrderPayload>) -> Self {
        let step = flow.machine.step();
        Self {
            step,
            step_index: step.index(),
            step_label: step.label(),
            errors: flow.machine.errors().clone(),
            submission_error: flow.machine.submission_error().map(String::from),
            form: flow.form.clone(),
            normalized: None,
            pricing,
            order,
            confirmation: None,
        }
    }
}

/// Field edit request body.
#[derive(Debug, Deserialize)]
pub struct FieldRequest {
    pub field: Field,
    pub value: String,
}

/// Advance request body. Only read on the payment step.
#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdvanceRequest {
    pub card_number: String,
    pub cvv: String,
}

/// Shipping method request body.
#[derive(Debug, Deserialize)]
pub struct ShippingRequest {
    pub method: ShippingMethod,
}

/// Load the draft and flow, pricing the draft with the form's shipping method.
async fn load(
    state: &AppState,
    session: &Session,
) -> Result<(OrderDraftController<Session>, CheckoutFlow)> {
    let mut controller = load_controller(state, session).await?;
    if controller.draft().selected_size.is_none() {
        return Err(AppError::NoDraft);
    }
    let flow = CheckoutFlow::load(session, &state.config().checkout.phone_prefix).await?;
    controller.set_shipping_method(flow.form.shipping.method);
    Ok((controller, flow))
}

fn view(controller: &OrderDraftController<Session>, flow: &CheckoutFlow) -> CheckoutView {
    CheckoutView::new(flow, controller.pricing(), controller.to_order_payload())
}

/// Display the checkout page.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<Json<CheckoutView>> {
    let (controller, flow) = load(&state, &session).await?;
    Ok(Json(view(&controller, &flow)))
}

/// Edit one field. The value is normalized and the field's error cleared.
#[instrument(skip(state, session, request), fields(field = ?request.field))]
pub async fn set_field(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<FieldRequest>,
) -> Result<Json<CheckoutView>> {
    let (controller, mut flow) = load(&state, &session).await?;
    let normalized = flow
        .form
        .set(
            request.field,
            &request.value,
            &state.config().checkout.phone_prefix,
        )
        .to_owned();
    flow.machine.clear_field_error(request.field);
    flow.save(&session).await?;

    let mut view = view(&controller, &flow);
    view.normalized = Some(normalized);
    Ok(Json(view))
}

/// Choose the shipping method and reprice.
#[instrument(skip(state, session))]
pub async fn set_shipping(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<ShippingRequest>,
) -> Result<Json<CheckoutView>> {
    let (mut controller, mut flow) = load(&state, &session).await?;
    flow.form.set_shipping_method(request.method);
    controller.set_shipping_method(request.method);
    flow.save(&session).await?;
    Ok(Json(view(&controller, &flow)))
}

/// Validate the current step and move forward, placing the order on the
/// payment step.
#[instrument(skip_all)]
pub async fn advance(
    State(state): State<AppState>,
    session: Session,
    request: Option<Json<AdvanceRequest>>,
) -> Result<Json<CheckoutView>> {
    let (mut controller, mut flow) = load(&state, &session).await?;
    let order = controller.to_order_payload();

    if flow.machine.step() == CheckoutStep::Payment {
        let Json(request) = request.unwrap_or_default();
        let prefix = &state.config().checkout.phone_prefix;
        flow.form.set(Field::CardNumber, &request.card_number, prefix);
        flow.form.set(Field::Cvv, &request.cvv, prefix);
    }

    let outcome = flow
        .machine
        .advance(
            &flow.form,
            &state.config().checkout,
            order.as_ref(),
            state.orders(),
        )
        .await;

    if let Transition::Completed(confirmation) = outcome {
        info!(order_id = %confirmation.order_id, "Checkout completed");
        add_breadcrumb("checkout", "Order placed", Some(&[("order_id", confirmation.order_id.as_str())]));

        let pricing = controller.pricing();
        controller.clear().await;
        CheckoutFlow::discard(&session).await?;

        let mut view = CheckoutView::new(&flow, pricing, order);
        view.confirmation = Some(confirmation);
        return Ok(Json(view));
    }

    flow.save(&session).await?;
    Ok(Json(view(&controller, &flow)))
}

/// Move one step back without validating.
#[instrument(skip(state, session))]
pub async fn retreat(State(state): State<AppState>, session: Session) -> Result<Json<CheckoutView>> {
    let (controller, mut flow) = load(&state, &session).await?;
    if flow.machine.retreat() {
        flow.save(&session).await?;
    }
    Ok(Json(view(&controller, &flow)))
}
