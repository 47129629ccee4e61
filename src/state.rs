use crate::config::ServerConfig;
use crate::store::{BackendConfig, ProductStore};
use std::sync::Arc;

/// Shared server state, cloned into every handler.
#[derive(Clone)]
pub struct ServerState {
    pub config: Arc<ServerConfig>,
    pub store: Arc<ProductStore>,
}

impl ServerState {
    /// Open the store the configuration describes and wrap it for sharing.
    pub fn new(config: ServerConfig) -> anyhow::Result<Self> {
        let backend = match &config.store_path {
            Some(path) => BackendConfig::redb(path.clone()),
            None => BackendConfig::in_memory(),
        };
        let store = ProductStore::new(backend)?;

        Ok(Self {
            config: Arc::new(config),
            store: Arc::new(store),
        })
    }
}
