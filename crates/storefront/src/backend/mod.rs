//! Sunbloom backend API clients.
//!
//! # Architecture
//!
//! - Every endpoint answers with the same `{ code, message, data }` envelope
//! - The catalog is cached in memory via `moka` (5 minute TTL)
//! - Identity and order calls are never cached
//!
//! # Example
//!
//! ```rust,ignore
//! use sunbloom_storefront::backend::CatalogClient;
//!
//! let catalog = CatalogClient::new(reqwest::Client::new(), config.api_url.clone());
//! let product = catalog.get_product(&ProductId::new("847694")).await?;
//! ```

mod catalog;
mod identity;
mod orders;

pub use catalog::{CatalogClient, CatalogError};
pub use identity::{IdentityClient, LoginOutcome};
pub use orders::OrderClient;

use serde::Deserialize;
use url::Url;

/// Response envelope shared by all backend endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Whether the backend reported success.
    pub(crate) const fn is_success(&self) -> bool {
        self.code >= 200 && self.code < 300
    }
}

/// Join `path` onto the API base URL, keeping any base path prefix.
pub(crate) fn endpoint(base: &Url, path: &str) -> Url {
    let mut url = base.clone();
    let joined = format!(
        "{}/{}",
        base.path().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    url.set_path(&joined);
    url
}

/// Join a relative asset path onto an image base URL.
pub(crate) fn asset_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_keeps_base_path() {
        let base = Url::parse("https://api.sunbloom.test/v1/").unwrap();
        assert_eq!(
            endpoint(&base, "/products/847694").as_str(),
            "https://api.sunbloom.test/v1/products/847694"
        );

        let bare = Url::parse("https://api.sunbloom.test").unwrap();
        assert_eq!(
            endpoint(&bare, "user/get").as_str(),
            "https://api.sunbloom.test/user/get"
        );
    }

    #[test]
    fn test_asset_url_normalizes_slashes() {
        assert_eq!(
            asset_url("https://cdn.test/img/", "/jar.png"),
            "https://cdn.test/img/jar.png"
        );
        assert_eq!(asset_url("https://cdn.test", "jar.png"), "https://cdn.test/jar.png");
    }

    #[test]
    fn test_envelope_tolerates_missing_data() {
        let envelope: Envelope<serde_json::Value> =
            serde_json::from_str(r#"{"code":404,"message":"missing"}"#).unwrap();
        assert!(!envelope.is_success());
        assert!(envelope.data.is_none());
    }

    #[test]
    fn test_envelope_data_needs_no_default() {
        let envelope: Envelope<crate::auth::Profile> =
            serde_json::from_str(r#"{"code":401,"message":"expired"}"#).unwrap();
        assert!(envelope.data.is_none());

        let envelope: Envelope<crate::auth::Profile> = serde_json::from_str(
            r#"{"code":200,"message":"ok","data":{"first_name":"Ada"}}"#,
        )
        .unwrap();
        assert!(envelope.is_success());
        assert_eq!(envelope.data.unwrap().first_name, "Ada");
    }
}
