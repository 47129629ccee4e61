//! Integration tests for the product API endpoints
//!
//! These tests drive the full router (middleware included) through
//! `tower::ServiceExt::oneshot`, without binding a socket.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use catalog::{
    build_router,
    config::ServerConfig,
    state::ServerState,
    store::{InMemoryBackend, ProductStore, StoreBackend, StoreError},
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

/// Build a router over a fresh in-memory store
fn test_router() -> Router {
    let state = ServerState::new(ServerConfig::default()).expect("Failed to create test state");
    build_router(Arc::new(state))
}

/// Send a request, optionally with a JSON body, and collect the response
async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, String) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

/// Send a request with a raw (possibly invalid) JSON body
async fn send_raw(router: &Router, method: &str, uri: &str, body: &str) -> (StatusCode, String) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

fn jacket() -> Value {
    json!({
        "title": "Leather Jacket",
        "price": 150,
        "description": "High quality leather jacket",
        "category": "fashion",
        "image": "http://example.com/jacket.png"
    })
}

#[tokio::test]
async fn test_empty_list_is_a_json_array() {
    let router = test_router();

    let (status, body) = send(&router, "GET", "/products", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "[]");
}

#[tokio::test]
async fn test_create_assigns_first_id() {
    let router = test_router();

    let (status, body) = send(&router, "POST", "/products", Some(jacket())).await;
    assert_eq!(status, StatusCode::CREATED);

    let created: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(created["id"], 1);
    assert_eq!(created["title"], "Leather Jacket");
    assert_eq!(created["price"], 150.0);

    let (status, body) = send(&router, "GET", "/products/1", None).await;
    assert_eq!(status, StatusCode::OK);
    let fetched: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_create_with_explicit_id_and_duplicate() {
    let router = test_router();

    let mut payload = jacket();
    payload["id"] = json!(7);
    let (status, body) = send(&router, "POST", "/products", Some(payload.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    let created: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(created["id"], 7);

    // Same id again is a client error, not an overwrite.
    let (status, body) = send(&router, "POST", "/products", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Error creating product");

    // The counter moved past the explicit id.
    let (status, body) = send(&router, "POST", "/products", Some(jacket())).await;
    assert_eq!(status, StatusCode::CREATED);
    let next: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(next["id"], 8);
}

#[tokio::test]
async fn test_create_coerces_id_representations() {
    let router = test_router();

    let mut payload = jacket();
    payload["id"] = json!("7");
    let (status, body) = send(&router, "POST", "/products", Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    let created: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(created["id"], 7);

    let mut payload = jacket();
    payload["id"] = json!(9.0);
    let (status, body) = send(&router, "POST", "/products", Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    let created: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(created["id"], 9);
}

#[tokio::test]
async fn test_create_rejects_fractional_id() {
    let router = test_router();

    let mut payload = jacket();
    payload["id"] = json!(7.5);
    let (status, body) = send(&router, "POST", "/products", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Error creating product");
}

#[tokio::test]
async fn test_create_rejects_id_beyond_integer_range() {
    let router = test_router();

    let mut payload = jacket();
    payload["id"] = json!(9_223_372_036_854_775_808u64);
    let (status, body) = send(&router, "POST", "/products", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Error creating product");
}

#[tokio::test]
async fn test_list_is_ascending_by_id() {
    let router = test_router();

    for id in [3, 1, 2] {
        let mut payload = jacket();
        payload["id"] = json!(id);
        let (status, _) = send(&router, "POST", "/products", Some(payload)).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(&router, "GET", "/products", None).await;
    assert_eq!(status, StatusCode::OK);
    let products: Vec<Value> = serde_json::from_str(&body).unwrap();
    let ids: Vec<i64> = products.iter().map(|p| p["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

/// Backend wrapper that counts every store interaction
struct CountingBackend {
    inner: InMemoryBackend,
    calls: Arc<AtomicUsize>,
}

impl StoreBackend for CountingBackend {
    fn put(&self, id: i64, value: &[u8]) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.put(id, value)
    }

    fn get(&self, id: i64) -> Result<Option<Vec<u8>>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.get(id)
    }

    fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.delete(id)
    }

    fn scan(
        &self,
        visitor: &mut dyn FnMut(&[u8]) -> Result<(), StoreError>,
    ) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.scan(visitor)
    }
}

#[tokio::test]
async fn test_non_numeric_id_never_reaches_the_store() {
    let calls = Arc::new(AtomicUsize::new(0));
    let backend = CountingBackend {
        inner: InMemoryBackend::new(),
        calls: calls.clone(),
    };
    let store = ProductStore::with_backend(Box::new(backend)).unwrap();
    let state = Arc::new(ServerState {
        config: Arc::new(ServerConfig::default()),
        store: Arc::new(store),
    });
    let router = build_router(state);

    // Opening the store scans once to seed the id counter.
    let baseline = calls.load(Ordering::SeqCst);

    for method in ["GET", "PUT", "PATCH", "DELETE"] {
        let body = matches!(method, "PUT" | "PATCH").then(jacket);
        let (status, body) = send(&router, method, "/products/abc", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{method} /products/abc");
        assert_eq!(body, "Invalid product ID");
    }

    assert_eq!(calls.load(Ordering::SeqCst), baseline);
}

/// Backend wrapper that can be flipped into a failing state
struct FlakyBackend {
    inner: InMemoryBackend,
    failing: Arc<AtomicBool>,
}

impl FlakyBackend {
    fn check(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::backend("injected backend failure"));
        }
        Ok(())
    }
}

impl StoreBackend for FlakyBackend {
    fn put(&self, id: i64, value: &[u8]) -> Result<(), StoreError> {
        self.check()?;
        self.inner.put(id, value)
    }

    fn get(&self, id: i64) -> Result<Option<Vec<u8>>, StoreError> {
        self.check()?;
        self.inner.get(id)
    }

    fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.check()?;
        self.inner.delete(id)
    }

    fn scan(
        &self,
        visitor: &mut dyn FnMut(&[u8]) -> Result<(), StoreError>,
    ) -> Result<(), StoreError> {
        self.check()?;
        self.inner.scan(visitor)
    }
}

#[tokio::test]
async fn test_store_failures_map_to_fixed_bodies() {
    let failing = Arc::new(AtomicBool::new(false));
    let backend = FlakyBackend {
        inner: InMemoryBackend::new(),
        failing: failing.clone(),
    };
    let store = ProductStore::with_backend(Box::new(backend)).unwrap();
    let state = Arc::new(ServerState {
        config: Arc::new(ServerConfig::default()),
        store: Arc::new(store),
    });
    let router = build_router(state);

    // Seed a product while the backend is healthy.
    let (status, _) = send(&router, "POST", "/products", Some(jacket())).await;
    assert_eq!(status, StatusCode::CREATED);

    failing.store(true, Ordering::SeqCst);

    // Read-path failures are server errors.
    let (status, body) = send(&router, "GET", "/products", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Error retrieving products");

    let (status, body) = send(&router, "GET", "/products/1", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Error retrieving product");

    // Write-path failures stay client errors.
    let (status, body) = send(&router, "DELETE", "/products/1", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Error deleting product");
}

#[tokio::test]
async fn test_missing_product_is_404() {
    let router = test_router();

    for method in ["GET", "PUT", "PATCH", "DELETE"] {
        let body = matches!(method, "PUT" | "PATCH").then(jacket);
        let (status, body) = send(&router, method, "/products/999", body).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{method} /products/999");
        assert_eq!(body, "Product not found");
    }
}

#[tokio::test]
async fn test_absent_product_wins_over_invalid_body() {
    let router = test_router();

    // Even a body that would fail validation reports the missing product.
    let mut payload = jacket();
    payload["title"] = json!("   ");
    let (status, body) = send(&router, "PUT", "/products/999", Some(payload)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "Product not found");

    let (status, body) = send(&router, "PATCH", "/products/999", Some(json!({"title": "   "}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "Product not found");
}

#[tokio::test]
async fn test_replace_overwrites_every_field() {
    let router = test_router();
    send(&router, "POST", "/products", Some(jacket())).await;

    let replacement = json!({
        "title": "Denim Jacket",
        "price": 95,
        "description": "Stonewashed denim jacket",
        "category": "fashion",
        "image": "http://example.com/denim.png"
    });

    let (status, body) = send(&router, "PUT", "/products/1", Some(replacement.clone())).await;
    assert_eq!(status, StatusCode::OK);
    let updated: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(updated["id"], 1);
    assert_eq!(updated["title"], "Denim Jacket");
    assert_eq!(updated["price"], 95.0);

    // Replaying the same replacement changes nothing.
    let (status, body) = send(&router, "PUT", "/products/1", Some(replacement)).await;
    assert_eq!(status, StatusCode::OK);
    let replayed: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(replayed, updated);
}

#[tokio::test]
async fn test_patch_changes_only_supplied_fields() {
    let router = test_router();
    send(&router, "POST", "/products", Some(jacket())).await;

    let (status, body) = send(&router, "PATCH", "/products/1", Some(json!({"price": 99}))).await;
    assert_eq!(status, StatusCode::OK);

    let patched: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(patched["price"], 99.0);
    assert_eq!(patched["title"], "Leather Jacket");
    assert_eq!(patched["description"], "High quality leather jacket");
    assert_eq!(patched["category"], "fashion");
    assert_eq!(patched["image"], "http://example.com/jacket.png");
}

#[tokio::test]
async fn test_body_id_must_match_path_id() {
    let router = test_router();
    send(&router, "POST", "/products", Some(jacket())).await;

    let mut replacement = jacket();
    replacement["id"] = json!(2);
    let (status, body) = send(&router, "PUT", "/products/1", Some(replacement)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Error updating product");

    let patch = json!({"id": 2, "price": 5});
    let (status, body) = send(&router, "PATCH", "/products/1", Some(patch)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Error modifying product");

    // A matching body id is accepted.
    let patch = json!({"id": 1, "price": 5});
    let (status, _) = send(&router, "PATCH", "/products/1", Some(patch)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_delete_returns_empty_204_then_404() {
    let router = test_router();
    send(&router, "POST", "/products", Some(jacket())).await;

    let (status, body) = send(&router, "DELETE", "/products/1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, "");

    let (status, body) = send(&router, "GET", "/products/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "Product not found");

    let (status, _) = send(&router, "DELETE", "/products/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_body_maps_to_operation_error() {
    let router = test_router();
    send(&router, "POST", "/products", Some(jacket())).await;

    let (status, body) = send_raw(&router, "POST", "/products", "{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Error creating product");

    let (status, body) = send_raw(&router, "PUT", "/products/1", "{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Error updating product");

    let (status, body) = send_raw(&router, "PATCH", "/products/1", "{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Error modifying product");
}

#[tokio::test]
async fn test_missing_required_field_rejected() {
    let router = test_router();

    let mut payload = jacket();
    payload.as_object_mut().unwrap().remove("title");
    let (status, body) = send(&router, "POST", "/products", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Error creating product");
}

#[tokio::test]
async fn test_blank_title_rejected() {
    let router = test_router();

    let mut payload = jacket();
    payload["title"] = json!("   ");
    let (status, body) = send(&router, "POST", "/products", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Error creating product");
}

#[tokio::test]
async fn test_error_bodies_are_plain_text() {
    let router = test_router();

    let request = Request::builder()
        .method("GET")
        .uri("/products/abc")
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(
        content_type.starts_with("text/plain"),
        "unexpected content type {content_type:?}"
    );

    let request = Request::builder()
        .method("GET")
        .uri("/products")
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(
        content_type.starts_with("application/json"),
        "unexpected content type {content_type:?}"
    );
}

#[tokio::test]
async fn test_docs_spec_lists_product_paths() {
    let router = test_router();

    let (status, body) = send(&router, "GET", "/docs/spec", None).await;
    assert_eq!(status, StatusCode::OK);

    let spec: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(spec["info"]["title"], "Product API Documentation");
    assert!(spec["paths"]["/products"].is_object());
    assert!(spec["paths"]["/products/{id}"].is_object());
}

#[tokio::test]
async fn test_docs_page_serves_redoc() {
    let router = test_router();

    let (status, body) = send(&router, "GET", "/docs", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("redoc"));
    assert!(body.contains("/docs/spec"));
}

#[tokio::test]
async fn test_service_routes() {
    let router = test_router();

    let (status, body) = send(&router, "GET", "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Catalog Server"));

    let (status, _) = send(&router, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&router, "GET", "/ready", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&router, "GET", "/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
