use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;

use crate::domain::models::AppStore;
use crate::domain::models::ChatMessage;
use crate::domain::models::StoredApp;

/// Process-local store, used when no store directory is configured.
#[derive(Default)]
pub struct MemoryStore {
    apps: DashMap<String, StoredApp>,
    messages: DashMap<String, Vec<ChatMessage>>,
    saves: AtomicUsize,
}

impl MemoryStore {
    pub fn save_count(&self) -> usize {
        return self.saves.load(Ordering::SeqCst);
    }
}

#[async_trait]
impl AppStore for MemoryStore {
    #[allow(clippy::implicit_return)]
    async fn load_app(&self, id: &str) -> Result<Option<StoredApp>> {
        return Ok(self.apps.get(id).map(|app| return app.clone()));
    }

    #[allow(clippy::implicit_return)]
    async fn save_app(&self, app: &StoredApp) -> Result<()> {
        self.apps.insert(app.id.to_string(), app.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn append_message(&self, id: &str, message: &ChatMessage) -> Result<()> {
        self.messages
            .entry(id.to_string())
            .or_default()
            .push(message.clone());
        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn load_messages(&self, id: &str) -> Result<Vec<ChatMessage>> {
        return Ok(self
            .messages
            .get(id)
            .map(|messages| return messages.clone())
            .unwrap_or_default());
    }
}
