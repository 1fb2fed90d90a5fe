//! Session Storage
//!
//! [`SessionStore`](crate::domain::SessionStore) adapters.

mod file_store;
mod memory_store;

pub use file_store::JsonFileStore;
pub use memory_store::MemoryStore;

use std::sync::Arc;

use tracing::info;

use crate::config::StorageSettings;
use crate::domain::SessionStore;
use crate::shared::error::StorageError;

/// Open the store described by `settings`.
pub fn open_store(settings: &StorageSettings) -> Result<Arc<dyn SessionStore>, StorageError> {
    match &settings.path {
        Some(path) => {
            let store = JsonFileStore::open(path)?;
            info!(path = %path.display(), "Using file-backed session storage");
            Ok(Arc::new(store))
        }
        None => {
            info!("Using in-memory session storage");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
