use crate::model::{Product, ProductDraft, ProductPatch};
use axum::response::Html;
use axum::Json;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Product API Documentation",
        version = "1.0.0",
        description = "API for managing products in a catalog"
    ),
    servers((url = "http://localhost:3000", description = "Development server")),
    paths(
        crate::routes::products::list_products,
        crate::routes::products::get_product,
        crate::routes::products::create_product,
        crate::routes::products::update_product,
        crate::routes::products::modify_product,
        crate::routes::products::delete_product,
    ),
    components(schemas(Product, ProductDraft, ProductPatch)),
    tags((name = "products", description = "Product catalog management"))
)]
pub struct ApiDoc;

/// Machine-readable OpenAPI document, derived from the handler annotations.
pub async fn openapi_spec() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Browsable documentation UI. The page pulls the OpenAPI document from
/// `/docs/spec`.
pub async fn docs_ui() -> Html<&'static str> {
    Html(include_str!("../web/redoc.html"))
}
