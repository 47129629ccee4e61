use crate::store::StoreError;
use std::collections::BTreeMap;
use std::sync::RwLock;

/// Byte-level storage backend for product documents, keyed by the
/// application-level id. Implementations must be safe to share across
/// request handlers.
pub trait StoreBackend: Send + Sync {
    /// Insert or overwrite the document stored under `id`.
    fn put(&self, id: i64, value: &[u8]) -> Result<(), StoreError>;
    /// Retrieve the document stored under `id`.
    fn get(&self, id: i64) -> Result<Option<Vec<u8>>, StoreError>;
    /// Delete the document stored under `id`. Deleting an absent id is not
    /// an error.
    fn delete(&self, id: i64) -> Result<(), StoreError>;
    /// Visit every stored document in ascending id order.
    fn scan(
        &self,
        visitor: &mut dyn FnMut(&[u8]) -> Result<(), StoreError>,
    ) -> Result<(), StoreError>;
}

/// Configuration for selecting and building a backend.
///
/// # Example
/// ```
/// use catalog::store::BackendConfig;
///
/// // In-memory (default, for testing and ephemeral deployments)
/// let config = BackendConfig::in_memory();
///
/// // Embedded redb file (persistent)
/// let config = BackendConfig::redb("/data/catalog.redb");
/// ```
#[derive(Clone, Debug, Default)]
pub enum BackendConfig {
    /// Store documents in a redb database file at `path`.
    ///
    /// Requires the `embedded` feature (enabled by default).
    Redb { path: String },
    /// Keep documents in process memory. Contents are lost on shutdown.
    #[default]
    InMemory,
}

impl BackendConfig {
    /// Create an in-memory backend configuration.
    pub fn in_memory() -> Self {
        BackendConfig::InMemory
    }

    /// Create a redb backend configuration for the given database file.
    pub fn redb<P: Into<String>>(path: P) -> Self {
        BackendConfig::Redb { path: path.into() }
    }

    /// Build the backend this configuration describes.
    pub fn build(&self) -> Result<Box<dyn StoreBackend>, StoreError> {
        match self {
            BackendConfig::InMemory => Ok(Box::new(InMemoryBackend::new())),
            BackendConfig::Redb { path } => {
                #[cfg(feature = "embedded")]
                {
                    Ok(Box::new(RedbBackend::open(path)?))
                }
                #[cfg(not(feature = "embedded"))]
                {
                    let _ = path;
                    Err(StoreError::backend("redb backend disabled at compile time"))
                }
            }
        }
    }
}

/// An in-memory backend using a `RwLock` around a `BTreeMap`, so scans see
/// the same ascending id order the redb backend produces.
pub struct InMemoryBackend {
    records: RwLock<BTreeMap<i64, Vec<u8>>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
        }
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreBackend for InMemoryBackend {
    fn put(&self, id: i64, value: &[u8]) -> Result<(), StoreError> {
        self.records
            .write()
            .map_err(|_| StoreError::backend("poisoned lock"))?
            .insert(id, value.to_vec());
        Ok(())
    }

    fn get(&self, id: i64) -> Result<Option<Vec<u8>>, StoreError> {
        let guard = self
            .records
            .read()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        Ok(guard.get(&id).cloned())
    }

    fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.records
            .write()
            .map_err(|_| StoreError::backend("poisoned lock"))?
            .remove(&id);
        Ok(())
    }

    fn scan(
        &self,
        visitor: &mut dyn FnMut(&[u8]) -> Result<(), StoreError>,
    ) -> Result<(), StoreError> {
        // The read lock is held for the duration of the scan.
        let guard = self
            .records
            .read()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        for value in guard.values() {
            visitor(value)?;
        }
        Ok(())
    }
}

#[cfg(feature = "embedded")]
pub mod redb;

#[cfg(feature = "embedded")]
pub use redb::RedbBackend;
