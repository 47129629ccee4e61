use crate::error::{ApiError, ApiResult};
use crate::model::{Product, ProductDraft, ProductPatch};
use crate::state::ServerState;
use crate::store::StoreError;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use std::sync::Arc;

/// Parse the path identifier before any store interaction. Strict decimal
/// integers only; anything else is the contract's 400.
fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>().map_err(|_| ApiError::InvalidId)
}

/// List every product in the catalog.
#[utoipa::path(
    get,
    path = "/products",
    tag = "products",
    responses(
        (status = 200, description = "All products, ascending by id", body = [Product]),
        (status = 500, description = "Store failure", body = String, content_type = "text/plain"),
    )
)]
pub async fn list_products(
    State(state): State<Arc<ServerState>>,
) -> ApiResult<impl IntoResponse> {
    let products = state.store.find_all().map_err(ApiError::List)?;
    Ok(Json(products))
}

/// Fetch a single product by id.
#[utoipa::path(
    get,
    path = "/products/{id}",
    tag = "products",
    params(("id" = i64, Path, description = "Product id")),
    responses(
        (status = 200, description = "The product", body = Product),
        (status = 400, description = "Non-numeric id", body = String, content_type = "text/plain"),
        (status = 404, description = "No product under this id", body = String, content_type = "text/plain"),
        (status = 500, description = "Store failure", body = String, content_type = "text/plain"),
    )
)]
pub async fn get_product(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    match state.store.find_one(id).map_err(ApiError::Fetch)? {
        Some(product) => Ok(Json(product)),
        None => Err(ApiError::NotFound),
    }
}

/// Create a product.
#[utoipa::path(
    post,
    path = "/products",
    tag = "products",
    request_body = ProductDraft,
    responses(
        (status = 201, description = "Created product", body = Product),
        (status = 400, description = "Malformed body, validation failure, or duplicate id", body = String, content_type = "text/plain"),
    )
)]
pub async fn create_product(
    State(state): State<Arc<ServerState>>,
    draft: Result<Json<ProductDraft>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    // Body rejections surface through the same 400 contract as store-level
    // validation failures, not the extractor's default status.
    let Json(draft) =
        draft.map_err(|err| ApiError::Create(StoreError::Validation(err.body_text())))?;

    let product = state.store.insert(draft).map_err(ApiError::Create)?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Replace a product wholesale.
#[utoipa::path(
    put,
    path = "/products/{id}",
    tag = "products",
    params(("id" = i64, Path, description = "Product id")),
    request_body = ProductDraft,
    responses(
        (status = 200, description = "Updated product", body = Product),
        (status = 400, description = "Non-numeric id, malformed body, or validation failure", body = String, content_type = "text/plain"),
        (status = 404, description = "No product under this id", body = String, content_type = "text/plain"),
    )
)]
pub async fn update_product(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
    draft: Result<Json<ProductDraft>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    let Json(draft) =
        draft.map_err(|err| ApiError::Update(StoreError::Validation(err.body_text())))?;

    match state.store.replace(id, draft).map_err(ApiError::Update)? {
        Some(product) => Ok(Json(product)),
        None => Err(ApiError::NotFound),
    }
}

/// Apply a partial update to a product. Only supplied fields change.
#[utoipa::path(
    patch,
    path = "/products/{id}",
    tag = "products",
    params(("id" = i64, Path, description = "Product id")),
    request_body = ProductPatch,
    responses(
        (status = 200, description = "Updated product", body = Product),
        (status = 400, description = "Non-numeric id, malformed body, or validation failure", body = String, content_type = "text/plain"),
        (status = 404, description = "No product under this id", body = String, content_type = "text/plain"),
    )
)]
pub async fn modify_product(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
    patch: Result<Json<ProductPatch>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    let Json(patch) =
        patch.map_err(|err| ApiError::Modify(StoreError::Validation(err.body_text())))?;

    match state.store.merge(id, patch).map_err(ApiError::Modify)? {
        Some(product) => Ok(Json(product)),
        None => Err(ApiError::NotFound),
    }
}

/// Delete a product.
#[utoipa::path(
    delete,
    path = "/products/{id}",
    tag = "products",
    params(("id" = i64, Path, description = "Product id")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 400, description = "Non-numeric id or store failure", body = String, content_type = "text/plain"),
        (status = 404, description = "No product under this id", body = String, content_type = "text/plain"),
    )
)]
pub async fn delete_product(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    match state.store.remove(id).map_err(ApiError::Delete)? {
        Some(_) => Ok(StatusCode::NO_CONTENT),
        None => Err(ApiError::NotFound),
    }
}
