#[cfg(test)]
#[path = "cloud_apk_test.rs"]
mod tests;

use anyhow::Result;
use async_trait::async_trait;

use super::Exporter;
use crate::domain::models::Artifact;
use crate::domain::models::BuildJob;
use crate::domain::models::BuildRequest;
use crate::domain::models::ExportInput;
use crate::domain::models::ExportTarget;
use crate::domain::models::ScreenPayload;
use crate::domain::models::SharedBuildBackend;

pub const APK_TARGET: &str = "apk";

/// Hands the screens to the remote build service. The artifact is the queued
/// job, its progress is tracked by the build poller.
#[derive(Clone)]
pub struct CloudApkExporter {
    backend: SharedBuildBackend,
}

impl CloudApkExporter {
    pub fn new(backend: SharedBuildBackend) -> CloudApkExporter {
        return CloudApkExporter { backend };
    }

    pub fn request(input: &ExportInput) -> BuildRequest {
        return BuildRequest {
            app_name: input.display_name(),
            screens: input.screens.iter().map(ScreenPayload::from).collect(),
            description: input.description.to_string(),
        };
    }

    pub async fn submit(&self, request: BuildRequest) -> Result<BuildJob> {
        let build_id = self.backend.submit(request).await?;
        tracing::info!(build_id = %build_id, "Submitted cloud build");

        return Ok(BuildJob::queued(&build_id, APK_TARGET));
    }
}

#[async_trait]
impl Exporter for CloudApkExporter {
    fn target(&self) -> ExportTarget {
        return ExportTarget::Apk;
    }

    #[allow(clippy::implicit_return)]
    async fn export<'a>(&self, input: &ExportInput<'a>) -> Result<Artifact> {
        let job = self.submit(CloudApkExporter::request(input)).await?;
        return Ok(Artifact::Pending(job));
    }
}
