#[cfg(test)]
#[path = "persistence_test.rs"]
mod tests;

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time;

use crate::domain::models::ChatMessage;
use crate::domain::models::SharedAppStore;
use crate::domain::models::StoredApp;

enum PersistCommand {
    Save(StoredApp),
    Append(String, ChatMessage),
}

/// Fire-and-forget handle to the persistence worker.
#[derive(Clone)]
pub struct PersistenceHandle {
    tx: mpsc::UnboundedSender<PersistCommand>,
}

impl PersistenceHandle {
    /// Schedules a save. Saves arriving within the quiet interval are
    /// coalesced into one write of the latest snapshot.
    pub fn save(&self, app: StoredApp) {
        if self.tx.send(PersistCommand::Save(app)).is_err() {
            tracing::warn!("Persistence worker stopped, dropping save");
        }
    }

    /// Appends a chat message. Appends are written in order, immediately.
    pub fn append(&self, app_id: &str, message: ChatMessage) {
        if self
            .tx
            .send(PersistCommand::Append(app_id.to_string(), message))
            .is_err()
        {
            tracing::warn!("Persistence worker stopped, dropping chat message");
        }
    }
}

pub struct Persistence {}

impl Persistence {
    /// Spawns the worker. It exits, flushing any pending save, once every
    /// handle has been dropped.
    pub fn start(store: SharedAppStore, debounce: Duration) -> (PersistenceHandle, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<PersistCommand>();

        let worker = tokio::spawn(async move {
            let mut pending: Option<StoredApp> = None;

            loop {
                let command = if pending.is_some() {
                    match time::timeout(debounce, rx.recv()).await {
                        Ok(command) => command,
                        Err(_) => {
                            write_app(&store, pending.take()).await;
                            continue;
                        }
                    }
                } else {
                    rx.recv().await
                };

                match command {
                    Some(PersistCommand::Save(app)) => {
                        pending = Some(app);
                    }
                    Some(PersistCommand::Append(app_id, message)) => {
                        if let Err(err) = store.append_message(&app_id, &message).await {
                            tracing::error!(error = ?err, app_id = %app_id, "Failed to append chat message");
                        }
                    }
                    None => {
                        write_app(&store, pending.take()).await;
                        break;
                    }
                }
            }
        });

        return (PersistenceHandle { tx }, worker);
    }
}

async fn write_app(store: &SharedAppStore, app: Option<StoredApp>) {
    let app = match app {
        Some(app) => app,
        None => return,
    };

    if let Err(err) = store.save_app(&app).await {
        tracing::error!(error = ?err, app_id = %app.id, "Failed to save app");
        return;
    }

    tracing::debug!(app_id = %app.id, version = app.version, "Saved app");
}
