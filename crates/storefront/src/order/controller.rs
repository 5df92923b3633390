//! Order draft controller.
//!
//! Owns the shopper's in-progress selection for one catalog product and is
//! the only code that mutates it. Each mutation reprices the draft and writes
//! the selection through to the [`DraftStore`].

use chrono::TimeDelta;
use sunbloom_core::{
    CatalogProduct, DraftRecord, OrderDraft, OrderPayload, PricingSnapshot, ProductSize,
    ShippingMethod, SizeId,
};
use tracing::{debug, instrument};

use super::pricing::compute_totals;
use super::stock;
use super::store::{DraftBackend, DraftStore};

/// Storage key for the persisted selection.
pub const DRAFT_KEY: &str = "order_selection";

/// Owner of an [`OrderDraft`].
pub struct OrderDraftController<B> {
    product: CatalogProduct,
    draft: OrderDraft,
    shipping: ShippingMethod,
    store: DraftStore<B>,
    ttl: TimeDelta,
}

impl<B: DraftBackend> OrderDraftController<B> {
    /// Build a draft for `product`, restoring any saved selection.
    ///
    /// A saved selection is only merged if it belongs to this product and its
    /// size still exists with stock; otherwise it is ignored. A restored
    /// quantity is clamped to the size's current stock.
    #[instrument(skip_all, fields(product_id = %product.id))]
    pub async fn initialize(product: CatalogProduct, store: DraftStore<B>, ttl: TimeDelta) -> Self {
        let mut draft = OrderDraft::empty(product.id.clone(), product.name.clone());

        if let Some(record) = store.load::<DraftRecord>(DRAFT_KEY).await {
            match restore(&product, &record) {
                Some((size, quantity)) => {
                    debug!(size_id = %size.id, quantity, "Restored saved selection");
                    draft.selected_size = Some(size);
                    draft.quantity = quantity;
                }
                None => debug!(size_id = %record.size_id, "Ignoring stale saved selection"),
            }
        }

        let mut controller = Self {
            product,
            draft,
            shipping: ShippingMethod::default(),
            store,
            ttl,
        };
        controller.reprice();
        controller
    }

    /// The current draft.
    #[must_use]
    pub const fn draft(&self) -> &OrderDraft {
        &self.draft
    }

    /// The catalog product the draft is for.
    #[must_use]
    pub const fn product(&self) -> &CatalogProduct {
        &self.product
    }

    /// Shipping method used for pricing.
    #[must_use]
    pub const fn shipping_method(&self) -> ShippingMethod {
        self.shipping
    }

    /// Current pricing snapshot.
    #[must_use]
    pub const fn pricing(&self) -> PricingSnapshot {
        self.draft.pricing
    }

    /// Select a size, resetting quantity to 1.
    ///
    /// Unknown or out-of-stock sizes are ignored. Returns whether the
    /// selection changed the draft.
    #[instrument(skip(self), fields(size_id = %size_id))]
    pub async fn select_size(&mut self, size_id: &SizeId) -> bool {
        let Some(size) = self.product.size(size_id).filter(|s| s.is_available()) else {
            debug!("Ignoring unknown or unavailable size");
            return false;
        };

        self.draft.selected_size = Some(size.clone());
        self.draft.quantity = 1;
        self.reprice();
        self.persist().await;
        true
    }

    /// Adjust quantity by `delta`, clamped to the selected size's stock.
    ///
    /// Does nothing when no size is selected.
    #[instrument(skip(self))]
    pub async fn set_quantity(&mut self, delta: i64) -> bool {
        let Some(size) = self.draft.selected_size.as_ref() else {
            return false;
        };

        let requested = i64::from(self.draft.quantity).saturating_add(delta);
        self.draft.quantity = stock::clamp(requested, size);
        self.reprice();
        self.persist().await;
        true
    }

    /// Change the shipping method used for pricing.
    pub fn set_shipping_method(&mut self, method: ShippingMethod) {
        self.shipping = method;
        self.reprice();
    }

    /// Snapshot handed to order submission.
    ///
    /// Returns `None` if no size is selected.
    #[must_use]
    pub fn to_order_payload(&self) -> Option<OrderPayload> {
        let size = self.draft.selected_size.as_ref()?;
        let pricing = self.draft.pricing;

        Some(OrderPayload {
            product_id: self.draft.product_id.clone(),
            product_name: self.draft.product_name.clone(),
            size_id: size.id.clone(),
            size_index: self.product.size_index(&size.id).unwrap_or(0),
            quantity: self.draft.quantity,
            unit_price: size.price,
            shipping_method: self.shipping,
            subtotal: pricing.subtotal,
            shipping_cost: pricing.shipping_cost,
            total: pricing.total,
        })
    }

    /// Empty the draft and remove the persisted selection.
    ///
    /// Called after an order is placed.
    #[instrument(skip(self))]
    pub async fn clear(&mut self) {
        self.draft = OrderDraft::empty(self.product.id.clone(), self.product.name.clone());
        self.reprice();
        self.store.clear(DRAFT_KEY).await;
    }

    /// Explicit cancellation by the shopper.
    pub async fn cancel(&mut self) {
        self.clear().await;
    }

    fn reprice(&mut self) {
        self.draft.pricing = compute_totals(&self.draft, self.shipping);
    }

    async fn persist(&self) {
        if let Some(record) = self.draft.to_record() {
            self.store.save(DRAFT_KEY, &record, self.ttl).await;
        }
    }
}

/// Match a saved record against the current catalog.
fn restore(product: &CatalogProduct, record: &DraftRecord) -> Option<(ProductSize, u32)> {
    if record.product_id != product.id {
        return None;
    }
    let size = product.size(&record.size_id).filter(|s| s.is_available())?;
    let quantity = stock::clamp(i64::from(record.quantity), size);
    Some((size.clone(), quantity))
}
