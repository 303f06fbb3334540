mod file_store;
mod memory;

pub use file_store::*;
pub use memory::*;

use std::sync::Arc;

use crate::domain::models::SharedAppStore;

pub struct StoreManager {}

impl StoreManager {
    /// A file store rooted at `store_dir`, or a process-local store when no
    /// directory is configured.
    pub fn get(store_dir: &str) -> SharedAppStore {
        if store_dir.trim().is_empty() {
            tracing::debug!("No store directory configured, apps will not be persisted");
            return Arc::new(MemoryStore::default());
        }

        return Arc::new(FileStore::new(store_dir));
    }
}
