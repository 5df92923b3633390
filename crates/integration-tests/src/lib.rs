//! Integration tests for the Sunbloom storefront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p sunbloom-integration-tests
//! ```
//!
//! Each test builds the full storefront router with [`TestApp::spawn`] and
//! drives it in-process. Catalog, identity, and order calls go to a
//! [`FakeBackend`] served on an ephemeral local port, so nothing outside
//! the test process is needed.
//!
//! # Test Categories
//!
//! - `order_flow` - size selection, quantity, persistence, cancellation
//! - `checkout_flow` - step validation, submission, failure and retry
//! - `auth_flow` - login, logout, and per-shopper status

use std::sync::atomic::{AtomicBool, AtomicU16, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use axum::{
    Json, Router,
    body::Body,
    extract::{Multipart, Path, State},
    http::{HeaderMap, Request, StatusCode, header},
    routing::{get, post},
};
use serde_json::{Value, json};
use sunbloom_core::ProductId;
use sunbloom_storefront::config::StorefrontConfig;
use sunbloom_storefront::state::AppState;
use tower::ServiceExt;
use url::Url;

/// Product id served by the fake catalog.
pub const PRODUCT_ID: &str = "847694";
/// Email accepted by the fake identity backend.
pub const EMAIL: &str = "ada@sunbloom.test";
/// Password accepted by the fake identity backend.
pub const PASSWORD: &str = "secret";
/// Token issued on a successful login.
pub const TOKEN: &str = "tok-ada-1";
/// Order id returned for accepted orders.
pub const ORDER_ID: &str = "SB-1001";

// =============================================================================
// Fake Backend
// =============================================================================

/// In-process stand-in for the Sunbloom backend API.
#[derive(Clone, Default)]
pub struct FakeBackend {
    inner: Arc<FakeBackendInner>,
}

#[derive(Default)]
struct FakeBackendInner {
    catalog_status: AtomicU16,
    reject_orders: AtomicBool,
    blocked: AtomicBool,
    orders: Mutex<Vec<Value>>,
    logouts: AtomicUsize,
    product_fetches: AtomicUsize,
}

impl FakeBackend {
    /// Make the catalog answer with `status` instead of the product.
    pub fn fail_catalog(&self, status: StatusCode) {
        self.inner
            .catalog_status
            .store(status.as_u16(), Ordering::SeqCst);
    }

    /// Refuse (or accept again) every order.
    pub fn reject_orders(&self, reject: bool) {
        self.inner.reject_orders.store(reject, Ordering::SeqCst);
    }

    /// Report the test account as blocked.
    pub fn block_account(&self) {
        self.inner.blocked.store(true, Ordering::SeqCst);
    }

    /// Order bodies received so far.
    #[must_use]
    pub fn orders(&self) -> Vec<Value> {
        self.inner
            .orders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of backend logout calls.
    #[must_use]
    pub fn logouts(&self) -> usize {
        self.inner.logouts.load(Ordering::SeqCst)
    }

    /// Number of product fetches that reached the backend.
    #[must_use]
    pub fn product_fetches(&self) -> usize {
        self.inner.product_fetches.load(Ordering::SeqCst)
    }

    fn router(&self) -> Router {
        Router::new()
            .route("/api/products/{id}", get(product))
            .route("/api/auth/login", post(login))
            .route("/api/auth/logout", get(logout))
            .route("/api/user/get", get(profile))
            .route("/api/orders", post(place_order))
            .with_state(self.clone())
    }

    /// Serve the backend on an ephemeral port and return its API base URL.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn serve(&self) -> Url {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake backend");
        let addr = listener.local_addr().expect("fake backend address");
        let router = self.router();
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        Url::parse(&format!("http://{addr}/api/")).expect("fake backend url")
    }
}

/// Catalog record for the test product.
#[must_use]
pub fn product_json() -> Value {
    json!({
        "ID": 847_694,
        "name": "Sunbloom Shea Butter",
        "description": "Raw unrefined shea butter.",
        "image_base_url": "https://cdn.sunbloom.test/",
        "images": ["shea/front.png"],
        "features": ["Unrefined", "Grade A"],
        "sizes": [
            { "size": "Small", "weight": "250g", "price": "5000", "quantity": 10,
              "container_image": "shea/small.png" },
            { "size": "Large", "weight": "500g", "price": 9000, "quantity": 2 },
            { "size": "Family", "weight": "1kg", "price": "15000", "quantity": 0 }
        ]
    })
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

async fn product(
    State(backend): State<FakeBackend>,
    Path(id): Path<String>,
) -> (StatusCode, Json<Value>) {
    backend.inner.product_fetches.fetch_add(1, Ordering::SeqCst);

    let failure = backend.inner.catalog_status.load(Ordering::SeqCst);
    if failure != 0 {
        let status = StatusCode::from_u16(failure).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (status, Json(json!({ "code": failure, "message": "catalog down" })));
    }
    if id != PRODUCT_ID {
        return (StatusCode::OK, Json(json!({ "code": 200, "message": "ok", "data": null })));
    }
    (
        StatusCode::OK,
        Json(json!({ "code": 200, "message": "ok", "data": product_json() })),
    )
}

async fn login(State(backend): State<FakeBackend>, mut form: Multipart) -> (StatusCode, Json<Value>) {
    let mut email = String::new();
    let mut password = String::new();
    while let Ok(Some(field)) = form.next_field().await {
        let name = field.name().unwrap_or_default().to_owned();
        let value = field.text().await.unwrap_or_default();
        match name.as_str() {
            "email" => email = value,
            "password" => password = value,
            _ => {}
        }
    }

    if backend.inner.blocked.load(Ordering::SeqCst) {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "code": 403, "message": "Account has been blocked" })),
        );
    }
    // "secret", base64-encoded
    if email != EMAIL || password != "c2VjcmV0" {
        return (
            StatusCode::OK,
            Json(json!({ "code": 401, "message": "Invalid email or password" })),
        );
    }
    (
        StatusCode::OK,
        Json(json!({
            "code": 200,
            "message": "ok",
            "data": {
                "token": { "token": TOKEN },
                "first_name": "Ada",
                "last_name": "Obi",
                "email": EMAIL
            }
        })),
    )
}

async fn logout(State(backend): State<FakeBackend>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if bearer(&headers) != Some(TOKEN) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "code": 401 })));
    }
    backend.inner.logouts.fetch_add(1, Ordering::SeqCst);
    (StatusCode::OK, Json(json!({ "code": 200, "message": "ok" })))
}

async fn profile(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if bearer(&headers) != Some(TOKEN) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "code": 401 })));
    }
    (
        StatusCode::OK,
        Json(json!({
            "code": 200,
            "message": "ok",
            "data": { "first_name": "Ada", "last_name": "Obi", "email": EMAIL }
        })),
    )
}

async fn place_order(
    State(backend): State<FakeBackend>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    backend
        .inner
        .orders
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(body);

    if backend.inner.reject_orders.load(Ordering::SeqCst) {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "code": 422, "message": "Size sold out" })),
        );
    }
    (
        StatusCode::OK,
        Json(json!({ "code": 200, "message": "ok", "data": { "order_id": ORDER_ID } })),
    )
}

// =============================================================================
// Storefront Client
// =============================================================================

/// A response from the storefront.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub text: String,
}

impl TestResponse {
    /// The body as JSON, or `Value::Null` if it is not JSON.
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.text).unwrap_or(Value::Null)
    }
}

/// A browser-like client: one shopper, one session cookie.
#[derive(Clone)]
pub struct TestClient {
    app: Router,
    cookie: Option<String>,
}

impl TestClient {
    /// `GET path`.
    pub async fn get(&mut self, path: &str) -> TestResponse {
        self.send("GET", path, None).await
    }

    /// `POST path` with a JSON body.
    pub async fn post(&mut self, path: &str, body: Value) -> TestResponse {
        self.send("POST", path, Some(body)).await
    }

    /// `POST path` without a body.
    pub async fn post_empty(&mut self, path: &str) -> TestResponse {
        self.send("POST", path, None).await
    }

    /// Whether the storefront has issued a session cookie.
    #[must_use]
    pub const fn has_session(&self) -> bool {
        self.cookie.is_some()
    }

    /// The current session cookie pair, if any.
    #[must_use]
    pub fn cookie(&self) -> Option<&str> {
        self.cookie.as_deref()
    }

    /// A different shopper on the same storefront.
    #[must_use]
    pub fn another_shopper(&self) -> Self {
        Self {
            app: self.app.clone(),
            cookie: None,
        }
    }

    async fn send(&mut self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let request = builder.body(body).expect("valid request");

        let Ok(response) = self.app.clone().oneshot(request).await;

        if let Some(cookie) = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.split(';').next())
        {
            self.cookie = Some(cookie.to_owned());
        }

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");
        TestResponse {
            status,
            text: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}

// =============================================================================
// Test App
// =============================================================================

/// A storefront wired to its own fake backend.
pub struct TestApp {
    pub backend: FakeBackend,
    pub client: TestClient,
}

impl TestApp {
    /// Start a storefront with the default test configuration.
    pub async fn spawn() -> Self {
        Self::spawn_with(|_| {}).await
    }

    /// Start a storefront, adjusting the configuration first.
    ///
    /// # Panics
    ///
    /// Panics if the fake backend cannot be started.
    pub async fn spawn_with(configure: impl FnOnce(&mut StorefrontConfig)) -> Self {
        let backend = FakeBackend::default();
        let api_url = backend.serve().await;

        let base_url = Url::parse("http://localhost:3000").expect("base url");
        let mut config = StorefrontConfig::new(base_url, api_url);
        config.product_id = ProductId::new(PRODUCT_ID);
        configure(&mut config);

        let app = sunbloom_storefront::app(AppState::new(config));
        Self {
            backend,
            client: TestClient { app, cookie: None },
        }
    }
}
