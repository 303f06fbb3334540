#[cfg(test)]
#[path = "commands_test.rs"]
mod tests;

use std::path;
use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use tokio::sync::mpsc;
use yansi::Paint;

use super::repl::format_build;
use crate::domain::models::AppModel;
use crate::domain::models::Artifact;
use crate::domain::models::BuildStatus;
use crate::domain::models::BuilderError;
use crate::domain::models::Event;
use crate::domain::models::ExportInput;
use crate::domain::models::ExportTarget;
use crate::domain::models::SharedAppStore;
use crate::domain::models::SharedBuildBackend;
use crate::domain::services::exporters;
use crate::domain::services::exporters::CloudApkExporter;
use crate::domain::services::BuildPoller;
use crate::infrastructure::artifacts::ArtifactWriter;

async fn load_saved_app(store: &SharedAppStore, app_id: &str) -> Result<AppModel> {
    let stored = match store.load_app(app_id).await? {
        Some(stored) => stored,
        None => bail!(BuilderError::Validation(format!("No saved app with id {app_id}"))),
    };

    let model = AppModel::from_stored(stored);
    if model.is_empty() {
        bail!(BuilderError::Validation(format!(
            "App {app_id} has no screens to export yet"
        )));
    }

    return Ok(model);
}

/// Exports a saved app to disk and returns the folder written.
pub async fn export_app(
    store: SharedAppStore,
    app_id: &str,
    target: ExportTarget,
    writer: &ArtifactWriter,
    theme_color: &str,
) -> Result<path::PathBuf> {
    let model = load_saved_app(&store, app_id).await?;
    let input = ExportInput::from_model(&model, theme_color);

    match exporters::export(target, &input, None).await? {
        Artifact::Files { files, .. } => {
            return writer.write(&model.display_name(), target, &files).await;
        }
        Artifact::Pending(job) => {
            bail!(format!("Export {target} produced a pending build {}", job.id));
        }
    }
}

/// Submits a cloud build for a saved app and reports its status until it
/// finishes.
pub async fn build_app(
    store: SharedAppStore,
    app_id: &str,
    backend: SharedBuildBackend,
    interval: Duration,
) -> Result<Option<String>> {
    let model = load_saved_app(&store, app_id).await?;
    let input = ExportInput::from_model(&model, "");

    let job = CloudApkExporter::new(backend.clone())
        .submit(CloudApkExporter::request(&input))
        .await?;
    println!("{}", Paint::cyan(format_build(&job)));

    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
    let mut poller = BuildPoller::new(backend, interval);
    poller.start(job, tx);

    while let Some(event) = rx.recv().await {
        let job = match event {
            Event::BuildUpdated(job) => job,
            _ => continue,
        };

        match job.status {
            BuildStatus::Done => {
                println!("{}", Paint::green(format_build(&job)));
                return Ok(job.artifact_url);
            }
            BuildStatus::Error => {
                bail!(BuilderError::BuildJob {
                    build_id: job.id.to_string(),
                    message: job.message.unwrap_or_else(|| return "unknown error".to_string()),
                });
            }
            _ => println!("{}", Paint::cyan(format_build(&job))),
        }
    }

    bail!("Build tracking stopped before the build finished");
}
