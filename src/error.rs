use crate::store::StoreError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

pub type ApiResult<T> = Result<T, ApiError>;

/// Router error type, keyed by the operation that failed so each maps to
/// its fixed client-facing status and plain-text body.
///
/// The contract distinguishes invalid input (400) from absence (404), and
/// read-path store failures (500) from write-path ones (400). The store
/// error carried by the operation variants is diagnostic detail: it is
/// logged, never returned to the client.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid product id")]
    InvalidId,

    #[error("product not found")]
    NotFound,

    #[error("listing products failed: {0}")]
    List(#[source] StoreError),

    #[error("fetching product failed: {0}")]
    Fetch(#[source] StoreError),

    #[error("creating product failed: {0}")]
    Create(#[source] StoreError),

    #[error("replacing product failed: {0}")]
    Update(#[source] StoreError),

    #[error("patching product failed: {0}")]
    Modify(#[source] StoreError),

    #[error("deleting product failed: {0}")]
    Delete(#[source] StoreError),
}

impl ApiError {
    /// Get HTTP status code for this error
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidId => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::List(_) | ApiError::Fetch(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Create(_) | ApiError::Update(_) | ApiError::Modify(_)
            | ApiError::Delete(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Get the fixed plain-text body returned to the client
    fn client_message(&self) -> &'static str {
        match self {
            ApiError::InvalidId => "Invalid product ID",
            ApiError::NotFound => "Product not found",
            ApiError::List(_) => "Error retrieving products",
            ApiError::Fetch(_) => "Error retrieving product",
            ApiError::Create(_) => "Error creating product",
            ApiError::Update(_) => "Error updating product",
            ApiError::Modify(_) => "Error modifying product",
            ApiError::Delete(_) => "Error deleting product",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "store failure");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }

        (status, self.client_message()).into_response()
    }
}
