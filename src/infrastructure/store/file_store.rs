#[cfg(test)]
#[path = "file_store_test.rs"]
mod tests;

use std::path;

use anyhow::Result;
use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::domain::models::AppStore;
use crate::domain::models::ChatMessage;
use crate::domain::models::StoredApp;

/// Stores each app as `<dir>/<id>.yaml`, with its chat log appended line by
/// line to `<dir>/<id>.messages.jsonl`.
pub struct FileStore {
    pub dir: path::PathBuf,
}

impl FileStore {
    pub fn new(dir: &str) -> FileStore {
        return FileStore {
            dir: path::PathBuf::from(dir),
        };
    }

    fn app_path(&self, id: &str) -> path::PathBuf {
        return self.dir.join(format!("{id}.yaml"));
    }

    fn messages_path(&self, id: &str) -> path::PathBuf {
        return self.dir.join(format!("{id}.messages.jsonl"));
    }

    async fn ensure_dir(&self) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).await?;
        }

        return Ok(());
    }
}

#[async_trait]
impl AppStore for FileStore {
    #[allow(clippy::implicit_return)]
    async fn load_app(&self, id: &str) -> Result<Option<StoredApp>> {
        let app_path = self.app_path(id);
        if !app_path.exists() {
            return Ok(None);
        }

        let yaml_str = fs::read_to_string(app_path).await?;
        let app = serde_yaml::from_str::<StoredApp>(&yaml_str)?;
        return Ok(Some(app));
    }

    #[allow(clippy::implicit_return)]
    async fn save_app(&self, app: &StoredApp) -> Result<()> {
        self.ensure_dir().await?;

        // Written beside the target and renamed so readers never see a
        // partial document.
        let tmp_path = self.dir.join(format!("{}.yaml.tmp", app.id));
        let mut file = fs::File::create(&tmp_path).await?;
        file.write_all(serde_yaml::to_string(app)?.as_bytes()).await?;
        file.flush().await?;
        fs::rename(tmp_path, self.app_path(&app.id)).await?;

        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn append_message(&self, id: &str, message: &ChatMessage) -> Result<()> {
        self.ensure_dir().await?;

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.messages_path(id))
            .await?;
        let line = format!("{}\n", serde_json::to_string(message)?);
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn load_messages(&self, id: &str) -> Result<Vec<ChatMessage>> {
        let messages_path = self.messages_path(id);
        if !messages_path.exists() {
            return Ok(vec![]);
        }

        let contents = fs::read_to_string(messages_path).await?;
        let mut messages = vec![];
        for line in contents.lines() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<ChatMessage>(line) {
                Ok(message) => messages.push(message),
                Err(err) => {
                    tracing::warn!(error = ?err, app_id = id, "Skipping unreadable chat message");
                }
            }
        }

        return Ok(messages);
    }
}
