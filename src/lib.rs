//! Product catalog service.
//!
//! A small HTTP CRUD service over a single `product` resource, backed by a
//! pluggable document store (in-memory or embedded redb). The `server`
//! feature carries the HTTP layer; the store and model are always available
//! for embedding.
//!
//! Endpoints:
//! - `GET /products` - list every product
//! - `POST /products` - create a product
//! - `GET /products/{id}` - fetch one product
//! - `PUT /products/{id}` - replace a product
//! - `PATCH /products/{id}` - partially update a product
//! - `DELETE /products/{id}` - delete a product
//! - `GET /docs` - browsable API documentation
//! - `GET /docs/spec` - machine-readable OpenAPI document
//! - `GET /health`, `GET /ready` - service probes

pub mod model;
pub mod store;

#[cfg(feature = "server")]
pub mod config;
#[cfg(feature = "server")]
pub mod error;
#[cfg(feature = "server")]
pub mod middleware;
#[cfg(feature = "server")]
pub mod routes;
#[cfg(feature = "server")]
pub mod server;
#[cfg(feature = "server")]
pub mod state;

pub use model::{Product, ProductDraft, ProductPatch};
#[cfg(feature = "embedded")]
pub use store::RedbBackend;
pub use store::{BackendConfig, InMemoryBackend, ProductStore, StoreBackend, StoreError};

#[cfg(feature = "server")]
pub use config::ServerConfig;
#[cfg(feature = "server")]
pub use error::{ApiError, ApiResult};
#[cfg(feature = "server")]
pub use server::{build_router, start_server};
#[cfg(feature = "server")]
pub use state::ServerState;
