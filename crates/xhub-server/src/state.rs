//! Shared application state for the axum server.
//!
//! [`AppState`] wraps the [`ResourceRepository`]. The repository is cheap to
//! clone and its backends synchronize internally, so no lock is held here.

use std::sync::Arc;

use tracing::info;
use xhub_storage::{InMemoryStore, OrderedStore, ResourceRepository, SqliteStore, StorageResult};

use crate::config::{ServerConfig, DEFAULT_BASE_URL};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub repository: ResourceRepository,
}

impl AppState {
    /// Opens the store named by `config`.
    pub fn new(config: &ServerConfig) -> StorageResult<Self> {
        let store: Arc<dyn OrderedStore> = if config.in_memory {
            info!("using in-memory store");
            Arc::new(InMemoryStore::new())
        } else {
            info!(path = %config.db_path, "opening sqlite store");
            Arc::new(SqliteStore::new(&config.db_path)?)
        };
        Ok(Self::with_store(store, config))
    }

    pub fn with_store(store: Arc<dyn OrderedStore>, config: &ServerConfig) -> Self {
        let repository = ResourceRepository::new(store, config.base_url.clone())
            .with_write_mode(config.write_mode);
        AppState { repository }
    }

    /// In-memory state with default settings, for tests.
    pub fn in_memory() -> Self {
        let config = ServerConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            in_memory: true,
            ..ServerConfig::default()
        };
        Self::with_store(Arc::new(InMemoryStore::new()), &config)
    }
}
