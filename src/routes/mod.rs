//! API route handlers
//!
//! This module contains all HTTP endpoint implementations for the catalog
//! server. Routes are organized by functionality:
//!
//! - `products`: the CRUD surface over the product collection
//! - `docs`: generated OpenAPI document and its rendered view
//! - `health`: liveness and readiness checks

pub mod docs;
pub mod health;
pub mod products;

use crate::error::ApiResult;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// API version and base info
///
/// Returns service information including version and available endpoints.
/// This is the root endpoint (GET /).
pub async fn api_info() -> ApiResult<impl IntoResponse> {
    Ok(Json(json!({
        "name": "Catalog Server",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "/products",
            "/products/{id}",
            "/docs",
            "/docs/spec",
            "/health",
            "/ready"
        ]
    })))
}

/// 404 Not Found handler for undefined routes.
pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not found")
}
