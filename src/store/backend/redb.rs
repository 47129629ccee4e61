//! Redb-backed persistence for product documents.
//!
//! Redb is a pure Rust embedded key-value store with ACID transactions, so
//! the service stays a single self-contained binary: no database server to
//! run next to it. Every backend operation is its own transaction and
//! commits synchronously.

use crate::store::{StoreBackend, StoreError};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::path::Path;
use std::sync::Arc;

/// Product documents, keyed by application-level id.
const PRODUCTS_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("products");

/// Redb backend for persistent product storage.
///
/// The `Arc<Database>` allows sharing across threads; redb handles its own
/// internal locking and MVCC.
pub struct RedbBackend {
    db: Arc<Database>,
}

impl RedbBackend {
    /// Open or create the database file at `path`, creating the products
    /// table on first use.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = Database::create(path).map_err(StoreError::backend)?;

        let write_txn = db.begin_write().map_err(StoreError::backend)?;
        {
            // Opening the table creates it if it does not exist yet.
            let _table = write_txn
                .open_table(PRODUCTS_TABLE)
                .map_err(StoreError::backend)?;
        }
        write_txn.commit().map_err(StoreError::backend)?;

        Ok(Self { db: Arc::new(db) })
    }
}

impl StoreBackend for RedbBackend {
    fn put(&self, id: i64, value: &[u8]) -> Result<(), StoreError> {
        let write_txn = self.db.begin_write().map_err(StoreError::backend)?;
        {
            let mut table = write_txn
                .open_table(PRODUCTS_TABLE)
                .map_err(StoreError::backend)?;
            table.insert(id, value).map_err(StoreError::backend)?;
        }
        write_txn.commit().map_err(StoreError::backend)?;
        Ok(())
    }

    fn get(&self, id: i64) -> Result<Option<Vec<u8>>, StoreError> {
        let read_txn = self.db.begin_read().map_err(StoreError::backend)?;
        let table = read_txn
            .open_table(PRODUCTS_TABLE)
            .map_err(StoreError::backend)?;

        match table.get(id).map_err(StoreError::backend)? {
            Some(value) => Ok(Some(value.value().to_vec())),
            None => Ok(None),
        }
    }

    fn delete(&self, id: i64) -> Result<(), StoreError> {
        let write_txn = self.db.begin_write().map_err(StoreError::backend)?;
        {
            let mut table = write_txn
                .open_table(PRODUCTS_TABLE)
                .map_err(StoreError::backend)?;
            table.remove(id).map_err(StoreError::backend)?;
        }
        write_txn.commit().map_err(StoreError::backend)?;
        Ok(())
    }

    fn scan(
        &self,
        visitor: &mut dyn FnMut(&[u8]) -> Result<(), StoreError>,
    ) -> Result<(), StoreError> {
        let read_txn = self.db.begin_read().map_err(StoreError::backend)?;
        let table = read_txn
            .open_table(PRODUCTS_TABLE)
            .map_err(StoreError::backend)?;

        // Range iteration yields keys in ascending order.
        for item in table.iter().map_err(StoreError::backend)? {
            let (_, value) = item.map_err(StoreError::backend)?;
            visitor(value.value())?;
        }

        Ok(())
    }
}
