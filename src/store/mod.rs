//! The product store: a document collection keyed by an application-level
//! integer id, kept behind a pluggable byte-level backend.
//!
//! The store owns everything above raw persistence: the JSON codec for
//! product documents, required-field validation, id assignment and
//! uniqueness, and the atomicity of read-modify-write updates. Handlers
//! talk to it through explicit `Result` values; absence is `Ok(None)`, so
//! callers pick 404 without matching on error variants.
//!
//! Mutating operations serialize through a single-writer gate. That keeps
//! check-then-write sequences (duplicate-id check on insert, read-merge-
//! write on partial update) atomic with respect to other writers while
//! reads go straight to the backend.

pub mod backend;

#[cfg(feature = "embedded")]
pub use backend::RedbBackend;
pub use backend::{BackendConfig, InMemoryBackend, StoreBackend};

use crate::model::{Product, ProductDraft, ProductPatch};
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};
use thiserror::Error;

/// Store-layer error type.
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("product {0} already exists")]
    DuplicateId(i64),
    #[error("product id space exhausted")]
    IdExhausted,
    #[error("backend error: {0}")]
    Backend(String),
    #[error("codec error: {0}")]
    Codec(String),
}

impl StoreError {
    pub fn backend<E: std::fmt::Display>(err: E) -> Self {
        Self::Backend(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Codec(e.to_string())
    }
}

/// Document store for products.
pub struct ProductStore {
    backend: Box<dyn StoreBackend>,
    /// Next id to hand out when a draft arrives without one. Seeded from
    /// the backend at open time; explicit client ids bump it past
    /// themselves.
    next_id: AtomicI64,
    /// Serializes mutating operations. Readers bypass it.
    write_gate: Mutex<()>,
}

impl ProductStore {
    /// Open a store on the backend the configuration describes.
    pub fn new(cfg: BackendConfig) -> Result<Self, StoreError> {
        tracing::debug!(backend = ?cfg, "opening product store");
        let backend = cfg.build()?;
        Self::with_backend(backend)
    }

    /// Open a store on an already-built backend. This is the injection
    /// seam tests use to substitute instrumented backends.
    pub fn with_backend(backend: Box<dyn StoreBackend>) -> Result<Self, StoreError> {
        let mut max_id = 0i64;
        backend.scan(&mut |bytes| {
            let product: Product = serde_json::from_slice(bytes)?;
            max_id = max_id.max(product.id);
            Ok(())
        })?;

        Ok(Self {
            backend,
            next_id: AtomicI64::new(max_id.saturating_add(1)),
            write_gate: Mutex::new(()),
        })
    }

    /// List every product, ascending by id.
    pub fn find_all(&self) -> Result<Vec<Product>, StoreError> {
        let mut products = Vec::new();
        self.backend.scan(&mut |bytes| {
            let product: Product = serde_json::from_slice(bytes)?;
            products.push(product);
            Ok(())
        })?;
        Ok(products)
    }

    /// Fetch one product by id.
    pub fn find_one(&self, id: i64) -> Result<Option<Product>, StoreError> {
        match self.backend.get(id)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Create a product. A draft without an id gets the next free one; a
    /// draft with an id that is already stored is a duplicate.
    pub fn insert(&self, draft: ProductDraft) -> Result<Product, StoreError> {
        validate_title(&draft.title)?;

        let _gate = self.lock_writes()?;
        let id = match draft.id {
            Some(requested) => {
                if self.backend.get(requested)?.is_some() {
                    return Err(StoreError::DuplicateId(requested));
                }
                self.next_id
                    .fetch_max(requested.saturating_add(1), Ordering::Relaxed);
                requested
            }
            None => self.allocate_id()?,
        };

        let product = draft.into_product(id);
        let payload = serde_json::to_vec(&product)?;
        self.backend.put(id, &payload)?;
        Ok(product)
    }

    /// Next free auto-assigned id. Callers hold the write gate.
    ///
    /// Explicit inserts keep the counter above every stored id, so the
    /// occupancy walk only moves near the top of the id range. Running out
    /// of ids is an error; the counter never wraps.
    fn allocate_id(&self) -> Result<i64, StoreError> {
        let mut candidate = self.next_id.load(Ordering::Relaxed);
        while self.backend.get(candidate)?.is_some() {
            candidate = candidate.checked_add(1).ok_or(StoreError::IdExhausted)?;
        }
        self.next_id
            .store(candidate.saturating_add(1), Ordering::Relaxed);
        Ok(candidate)
    }

    /// Replace the product stored under `id` with the draft. `Ok(None)`
    /// when no such product exists; absence is decided before the draft is
    /// validated, the same way `merge` resolves it. A draft id differing
    /// from `id` is a validation failure.
    pub fn replace(&self, id: i64, draft: ProductDraft) -> Result<Option<Product>, StoreError> {
        check_body_id(id, draft.id)?;

        let _gate = self.lock_writes()?;
        if self.backend.get(id)?.is_none() {
            return Ok(None);
        }
        validate_title(&draft.title)?;

        let product = draft.into_product(id);
        let payload = serde_json::to_vec(&product)?;
        self.backend.put(id, &payload)?;
        Ok(Some(product))
    }

    /// Apply a partial update to the product stored under `id`, then
    /// re-validate the merged document. `Ok(None)` when no such product
    /// exists.
    pub fn merge(&self, id: i64, patch: ProductPatch) -> Result<Option<Product>, StoreError> {
        check_body_id(id, patch.id)?;

        let _gate = self.lock_writes()?;
        let mut product = match self.backend.get(id)? {
            Some(bytes) => serde_json::from_slice::<Product>(&bytes)?,
            None => return Ok(None),
        };

        patch.apply(&mut product);
        validate_title(&product.title)?;

        let payload = serde_json::to_vec(&product)?;
        self.backend.put(id, &payload)?;
        Ok(Some(product))
    }

    /// Delete the product stored under `id`, returning the removed
    /// document. `Ok(None)` when no such product exists.
    pub fn remove(&self, id: i64) -> Result<Option<Product>, StoreError> {
        let _gate = self.lock_writes()?;
        match self.backend.get(id)? {
            Some(bytes) => {
                let product: Product = serde_json::from_slice(&bytes)?;
                self.backend.delete(id)?;
                Ok(Some(product))
            }
            None => Ok(None),
        }
    }

    fn lock_writes(&self) -> Result<std::sync::MutexGuard<'_, ()>, StoreError> {
        self.write_gate
            .lock()
            .map_err(|_| StoreError::backend("poisoned lock"))
    }
}

fn validate_title(title: &str) -> Result<(), StoreError> {
    if title.trim().is_empty() {
        return Err(StoreError::Validation("title must not be empty".into()));
    }
    Ok(())
}

fn check_body_id(path_id: i64, body_id: Option<i64>) -> Result<(), StoreError> {
    if let Some(body_id) = body_id {
        if body_id != path_id {
            return Err(StoreError::Validation(format!(
                "body id {body_id} does not match path id {path_id}"
            )));
        }
    }
    Ok(())
}
