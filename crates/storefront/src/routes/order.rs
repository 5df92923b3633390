//! Order page route handlers.
//!
//! Every request rebuilds the draft controller from the cached catalog
//! product and the shopper's saved selection, applies one mutation, and
//! returns the resulting view.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use sunbloom_core::{CatalogProduct, OrderDraft, ShippingMethod, SizeId};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, add_breadcrumb};
use crate::models::CheckoutFlow;
use crate::order::{DraftStore, OrderDraftController};
use crate::state::AppState;

/// Order page data.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub product: CatalogProduct,
    pub draft: OrderDraft,
    pub shipping_method: ShippingMethod,
    /// Whether the last mutation changed the draft.
    pub changed: bool,
}

impl OrderView {
    fn new(controller: &OrderDraftController<Session>, changed: bool) -> Self {
        Self {
            product: controller.product().clone(),
            draft: controller.draft().clone(),
            shipping_method: controller.shipping_method(),
            changed,
        }
    }
}

/// Select size request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectSizeRequest {
    pub size_id: SizeId,
}

/// Adjust quantity request body.
#[derive(Debug, Deserialize)]
pub struct QuantityRequest {
    pub delta: i64,
}

/// Build the shopper's draft controller.
///
/// # Errors
///
/// Returns `AppError::Catalog` if the product cannot be loaded.
pub async fn load_controller(
    state: &AppState,
    session: &Session,
) -> Result<OrderDraftController<Session>> {
    let config = state.config();
    let product = state.catalog().get_product(&config.product_id).await?;
    Ok(OrderDraftController::initialize(product, DraftStore::new(session.clone()), config.draft_ttl).await)
}

/// Display the order page.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<Json<OrderView>> {
    let controller = load_controller(&state, &session).await?;
    Ok(Json(OrderView::new(&controller, false)))
}

/// Select a size.
#[instrument(skip(state, session))]
pub async fn select_size(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<SelectSizeRequest>,
) -> Result<Json<OrderView>> {
    let mut controller = load_controller(&state, &session).await?;
    let changed = controller.select_size(&request.size_id).await;
    if changed {
        add_breadcrumb("order", "Selected size", Some(&[("size_id", request.size_id.as_str())]));
    }
    Ok(Json(OrderView::new(&controller, changed)))
}

/// Adjust the quantity.
#[instrument(skip(state, session))]
pub async fn set_quantity(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<QuantityRequest>,
) -> Result<Json<OrderView>> {
    let mut controller = load_controller(&state, &session).await?;
    let changed = controller.set_quantity(request.delta).await;
    Ok(Json(OrderView::new(&controller, changed)))
}

/// Cancel the order, discarding the draft and any checkout progress.
#[instrument(skip(state, session))]
pub async fn cancel(State(state): State<AppState>, session: Session) -> Result<Json<OrderView>> {
    let mut controller = load_controller(&state, &session).await?;
    controller.cancel().await;
    CheckoutFlow::discard(&session).await?;
    add_breadcrumb("order", "Cancelled order", None);
    Ok(Json(OrderView::new(&controller, true)))
}
