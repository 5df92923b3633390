//! Catalog client.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::Deserialize;
use serde_json::Value;
use sunbloom_core::{CatalogProduct, Price, ProductId, ProductSize, SizeId};
use thiserror::Error;
use tracing::{debug, error, instrument};
use url::Url;

use super::{Envelope, asset_url, endpoint};

/// Errors that can occur when fetching catalog data.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("catalog returned status {0}")]
    Status(u16),

    /// Response body did not match the catalog shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The product does not exist.
    #[error("product not found: {0}")]
    NotFound(ProductId),
}

#[derive(Debug, Deserialize)]
struct WireProduct {
    #[serde(rename = "ID")]
    id: Value,
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    image_base_url: String,
    #[serde(default)]
    images: Vec<String>,
    #[serde(default)]
    features: Option<Vec<String>>,
    #[serde(default)]
    sizes: Option<Vec<WireSize>>,
}

#[derive(Debug, Deserialize)]
struct WireSize {
    size: String,
    #[serde(default)]
    weight: String,
    #[serde(default)]
    price: Option<Value>,
    #[serde(default)]
    quantity: Option<Value>,
    #[serde(default)]
    container_image: Option<String>,
}

/// Stock from a wire quantity. Missing, negative, or non-numeric is 0.
fn stock(value: Option<&Value>) -> u32 {
    let quantity = match value {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    quantity.map_or(0, |q| u32::try_from(q).unwrap_or(u32::MAX))
}

fn convert_product(wire: WireProduct) -> CatalogProduct {
    let id = match wire.id {
        Value::String(s) => s,
        other => other.to_string(),
    };
    let base = wire.image_base_url;

    let sizes = wire
        .sizes
        .unwrap_or_default()
        .into_iter()
        .map(|size| ProductSize {
            id: SizeId::new(size.size.to_lowercase()),
            price: Price::from_catalog_value(size.price.as_ref()),
            stock: stock(size.quantity.as_ref()),
            container_image: size
                .container_image
                .filter(|path| !path.is_empty())
                .map(|path| asset_url(&base, &path)),
            name: size.size,
            weight: size.weight,
        })
        .collect();

    CatalogProduct {
        id: ProductId::new(id),
        name: wire.name,
        description: wire.description,
        images: wire.images.iter().map(|path| asset_url(&base, path)).collect(),
        features: wire.features.unwrap_or_default(),
        sizes,
    }
}

/// Client for the catalog endpoints.
///
/// Products are cached for 5 minutes.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    api: Url,
    cache: Cache<ProductId, CatalogProduct>,
}

impl CatalogClient {
    /// Create a new catalog client.
    #[must_use]
    pub fn new(client: reqwest::Client, api: Url) -> Self {
        let cache = Cache::builder()
            .max_capacity(100)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(CatalogClientInner { client, api, cache }),
        }
    }

    /// Fetch a product by id.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the backend has no such product,
    /// or a transport/parse error if the request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: &ProductId) -> Result<CatalogProduct, CatalogError> {
        if let Some(product) = self.inner.cache.get(id).await {
            debug!("Cache hit for product");
            return Ok(product);
        }

        let url = endpoint(&self.inner.api, &format!("products/{id}"));
        let response = self.inner.client.get(url).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(id.clone()));
        }
        let body = response.text().await?;
        if !status.is_success() {
            error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Catalog returned non-success status"
            );
            return Err(CatalogError::Status(status.as_u16()));
        }

        let envelope: Envelope<Value> = serde_json::from_str(&body)?;
        let data = match envelope.data {
            None | Some(Value::Null) => return Err(CatalogError::NotFound(id.clone())),
            Some(Value::Object(map)) if map.is_empty() => {
                return Err(CatalogError::NotFound(id.clone()));
            }
            Some(data) => data,
        };

        let product = convert_product(serde_json::from_value(data)?);
        self.inner.cache.insert(id.clone(), product.clone()).await;
        Ok(product)
    }
}
