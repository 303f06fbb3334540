use std::sync::Arc;
use std::sync::Mutex;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;

use super::CloudApkExporter;
use crate::domain::models::Artifact;
use crate::domain::models::BuildBackend;
use crate::domain::models::BuildRequest;
use crate::domain::models::BuildStatus;
use crate::domain::models::BuildStatusResponse;
use crate::domain::models::ExportInput;
use crate::domain::models::Screen;
use crate::domain::services::exporters::Exporter;

#[derive(Default)]
struct RecordingBackend {
    requests: Mutex<Vec<BuildRequest>>,
    reject: bool,
}

#[async_trait]
impl BuildBackend for RecordingBackend {
    #[allow(clippy::implicit_return)]
    async fn submit(&self, request: BuildRequest) -> Result<String> {
        if self.reject {
            bail!("Build service unavailable");
        }
        self.requests.lock().unwrap().push(request);
        return Ok("b-42".to_string());
    }

    #[allow(clippy::implicit_return)]
    async fn status(&self, _build_id: &str) -> Result<BuildStatusResponse> {
        return Ok(BuildStatusResponse {
            status: BuildStatus::Queued,
            message: "".to_string(),
            artifact_url: None,
        });
    }
}

#[tokio::test]
async fn it_submits_and_returns_a_pending_job() {
    let backend = Arc::new(RecordingBackend::default());
    let exporter = CloudApkExporter::new(backend.clone());
    let screens = vec![Screen::new("Home", "<h1>Home</h1>")];
    let input = ExportInput {
        name: "",
        description: "Simple app",
        screens: &screens,
        theme_color: "#4f46e5",
    };

    let artifact = exporter.export(&input).await.unwrap();
    match artifact {
        Artifact::Pending(job) => {
            assert_eq!(job.id, "b-42");
            assert_eq!(job.status, BuildStatus::Queued);
            assert_eq!(job.target, "apk");
        }
        Artifact::Files { .. } => panic!("Expected a pending build"),
    }

    let requests = backend.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].app_name, "Untitled App");
    assert_eq!(requests[0].screens[0].name, "Home");
    assert_eq!(requests[0].description, "Simple app");
}

#[tokio::test]
async fn it_propagates_submit_failures() {
    let backend = Arc::new(RecordingBackend {
        reject: true,
        ..RecordingBackend::default()
    });
    let exporter = CloudApkExporter::new(backend);
    let screens = vec![Screen::new("Home", "")];
    let input = ExportInput {
        name: "Fit",
        description: "",
        screens: &screens,
        theme_color: "#4f46e5",
    };

    let res = exporter.export(&input).await;
    assert_eq!(res.unwrap_err().to_string(), "Build service unavailable");
}
