use anyhow::Result;
use tokio::fs;

use super::ArtifactWriter;
use crate::domain::models::ArtifactFile;
use crate::domain::models::ExportTarget;

#[tokio::test]
async fn it_writes_files_per_app_and_target() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let writer = ArtifactWriter::new(&dir.path().to_string_lossy());

    let root = writer
        .write(
            "Fit Track",
            ExportTarget::MiniApp,
            &[
                ArtifactFile::new("mini-app.html", "<html></html>".to_string()),
                ArtifactFile::new("nested/deep/README.txt", "hello".to_string()),
            ],
        )
        .await?;

    assert_eq!(root, dir.path().join("fit-track").join("mini-app"));
    assert_eq!(fs::read_to_string(root.join("mini-app.html")).await?, "<html></html>");
    assert_eq!(
        fs::read_to_string(root.join("nested/deep/README.txt")).await?,
        "hello"
    );
    return Ok(());
}

#[tokio::test]
async fn it_refuses_to_escape_the_export_folder() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let writer = ArtifactWriter::new(&dir.path().to_string_lossy());

    let res = writer
        .write(
            "Fit",
            ExportTarget::Static,
            &[ArtifactFile::new("../escape.html", "".to_string())],
        )
        .await;

    assert!(res.is_err());
    assert!(!dir.path().join("fit").join("escape.html").exists());
    return Ok(());
}
