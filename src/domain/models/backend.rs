use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

use super::BuildRequest;
use super::BuildStatusResponse;
use super::ChatMessage;
use super::Event;
use super::GenerationRequest;
use super::GenerationResult;
use super::StoredApp;

#[async_trait]
pub trait GenerationBackend {
    /// Used at startup to verify the backend is reachable.
    async fn health_check(&self) -> Result<()>;

    /// Sends one generation request.
    ///
    /// `Event::GenerationStarted` is sent once the backend accepts the
    /// request, followed by one `Event::GenerationProgress` per progress frame
    /// as soon as it is decoded. The resolved result is returned rather than
    /// sent, so the caller decides how it is applied. A stream that ends
    /// without a complete frame is an error.
    async fn generate<'a>(
        &self,
        request: GenerationRequest,
        tx: &'a mpsc::UnboundedSender<Event>,
    ) -> Result<GenerationResult>;
}

pub type SharedGenerationBackend = Arc<dyn GenerationBackend + Send + Sync>;

#[async_trait]
pub trait BuildBackend {
    /// Submits a remote build and returns its id without waiting for it.
    async fn submit(&self, request: BuildRequest) -> Result<String>;

    async fn status(&self, build_id: &str) -> Result<BuildStatusResponse>;
}

pub type SharedBuildBackend = Arc<dyn BuildBackend + Send + Sync>;

/// Backing store for apps and their chat logs, keyed by app id.
#[async_trait]
pub trait AppStore {
    async fn load_app(&self, id: &str) -> Result<Option<StoredApp>>;

    async fn save_app(&self, app: &StoredApp) -> Result<()>;

    /// Appends to the chat log. Existing entries are never rewritten.
    async fn append_message(&self, id: &str, message: &ChatMessage) -> Result<()>;

    async fn load_messages(&self, id: &str) -> Result<Vec<ChatMessage>>;
}

pub type SharedAppStore = Arc<dyn AppStore + Send + Sync>;
