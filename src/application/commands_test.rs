use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use super::build_app;
use super::export_app;
use crate::domain::models::AppModel;
use crate::domain::models::AppStore;
use crate::domain::models::BuilderError;
use crate::domain::models::ExportTarget;
use crate::domain::models::Screen;
use crate::infrastructure::artifacts::ArtifactWriter;
use crate::infrastructure::backends::CloudBuilds;
use crate::infrastructure::store::MemoryStore;

async fn seeded_store(screens: Vec<Screen>) -> Result<Arc<MemoryStore>> {
    let store = Arc::new(MemoryStore::default());
    let mut model = AppModel::new("fit");
    model.name = "FitTrack".to_string();
    model.screens = screens;
    store.save_app(&model.to_stored()).await?;

    return Ok(store);
}

#[tokio::test]
async fn it_exports_saved_apps() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let store = seeded_store(vec![Screen::new("Home", "<h1>Home</h1>")]).await?;
    let writer = ArtifactWriter::new(&dir.path().to_string_lossy());

    let root = export_app(store, "fit", ExportTarget::Pwa, &writer, "#111111").await?;

    assert_eq!(root, dir.path().join("fittrack").join("pwa"));
    assert!(root.join("index.html").exists());
    assert!(root.join("sw.js").exists());
    assert!(root.join("manifest.webmanifest").exists());
    return Ok(());
}

#[tokio::test]
async fn it_refuses_unknown_or_empty_apps() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let store = seeded_store(vec![]).await?;
    let writer = ArtifactWriter::new(&dir.path().to_string_lossy());

    for app_id in ["fit", "missing"] {
        let err = export_app(store.clone(), app_id, ExportTarget::Static, &writer, "#111111")
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BuilderError>(),
            Some(BuilderError::Validation(_))
        ));
    }

    return Ok(());
}

#[tokio::test]
async fn it_waits_for_cloud_builds() -> Result<()> {
    let store = seeded_store(vec![Screen::new("Home", "<h1>Home</h1>")]).await?;

    let mut server = mockito::Server::new_async().await;
    let _submit = server
        .mock("POST", "/api/builds")
        .with_status(200)
        .with_body(r#"{"buildId":"b-9"}"#)
        .create_async()
        .await;
    let _status = server
        .mock("GET", "/api/builds/b-9")
        .with_status(200)
        .with_body(r#"{"status":"done","message":"","artifactUrl":"https://builds.example.com/b-9.apk"}"#)
        .create_async()
        .await;

    let backend = Arc::new(CloudBuilds::new(&server.url(), ""));
    let url = build_app(store, "fit", backend, Duration::from_millis(10)).await?;

    assert_eq!(url, Some("https://builds.example.com/b-9.apk".to_string()));
    return Ok(());
}

#[tokio::test]
async fn it_fails_when_the_build_fails() -> Result<()> {
    let store = seeded_store(vec![Screen::new("Home", "<h1>Home</h1>")]).await?;

    let mut server = mockito::Server::new_async().await;
    let _submit = server
        .mock("POST", "/api/builds")
        .with_status(200)
        .with_body(r#"{"buildId":"b-9"}"#)
        .create_async()
        .await;
    let _status = server
        .mock("GET", "/api/builds/b-9")
        .with_status(200)
        .with_body(r#"{"status":"error","message":"Gradle failed"}"#)
        .create_async()
        .await;

    let backend = Arc::new(CloudBuilds::new(&server.url(), ""));
    let err = build_app(store, "fit", backend, Duration::from_millis(10))
        .await
        .unwrap_err();

    assert_eq!(
        err.downcast_ref::<BuilderError>(),
        Some(&BuilderError::BuildJob {
            build_id: "b-9".to_string(),
            message: "Gradle failed".to_string(),
        })
    );
    return Ok(());
}
