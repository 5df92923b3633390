//! Application state shared across handlers.

use std::sync::Arc;

use crate::auth::AuthRegistry;
use crate::backend::{CatalogClient, IdentityClient, OrderClient};
use crate::config::StorefrontConfig;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like backend clients and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: CatalogClient,
    orders: OrderClient,
    auth: AuthRegistry,
}

impl AppState {
    /// Create a new application state.
    ///
    /// All backend clients share one `reqwest` connection pool.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let http = reqwest::Client::new();
        let catalog = CatalogClient::new(http.clone(), config.api_url.clone());
        let identity = IdentityClient::new(http.clone(), config.api_url.clone());
        let orders = OrderClient::new(http, config.api_url.clone());
        let auth = AuthRegistry::new(identity, config.auth_reconcile_interval);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                orders,
                auth,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the catalog client.
    #[must_use]
    pub fn catalog(&self) -> &CatalogClient {
        &self.inner.catalog
    }

    /// Get a reference to the order submission client.
    #[must_use]
    pub fn orders(&self) -> &OrderClient {
        &self.inner.orders
    }

    /// Get a reference to the per-shopper auth registry.
    #[must_use]
    pub fn auth(&self) -> &AuthRegistry {
        &self.inner.auth
    }
}
