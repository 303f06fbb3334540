use anyhow::Result;
use mockito::Matcher;

use super::CloudBuilds;
use crate::domain::models::BuildBackend;
use crate::domain::models::BuildRequest;
use crate::domain::models::BuildStatus;
use crate::domain::models::BuilderError;
use crate::domain::models::ScreenPayload;

#[tokio::test]
async fn it_submits_builds() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/builds")
        .match_body(Matcher::Json(serde_json::json!({
            "appName": "FitTrack",
            "screens": [{"name": "Home", "content": "<h1>Home</h1>"}],
            "description": "Workouts"
        })))
        .with_status(200)
        .with_body(r#"{"buildId":"b-7"}"#)
        .create_async()
        .await;

    let backend = CloudBuilds::new(&server.url(), "");
    let build_id = backend
        .submit(BuildRequest {
            app_name: "FitTrack".to_string(),
            screens: vec![ScreenPayload {
                name: "Home".to_string(),
                content: "<h1>Home</h1>".to_string(),
            }],
            description: "Workouts".to_string(),
        })
        .await?;

    assert_eq!(build_id, "b-7");
    mock.assert_async().await;
    return Ok(());
}

#[tokio::test]
async fn it_reads_build_status() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/builds/b-7")
        .with_status(200)
        .with_body(r#"{"status":"done","message":"Finished","artifactUrl":"https://builds.example.com/b-7.apk"}"#)
        .create_async()
        .await;

    let backend = CloudBuilds::new(&server.url(), "");
    let res = backend.status("b-7").await?;

    assert_eq!(res.status, BuildStatus::Done);
    assert_eq!(res.message, "Finished");
    assert_eq!(
        res.artifact_url,
        Some("https://builds.example.com/b-7.apk".to_string())
    );
    mock.assert_async().await;
    return Ok(());
}

#[tokio::test]
async fn it_fails_rejected_submissions() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/builds")
        .with_status(429)
        .create_async()
        .await;

    let backend = CloudBuilds::new(&server.url(), "");
    let err = backend
        .submit(BuildRequest {
            app_name: "FitTrack".to_string(),
            screens: vec![],
            description: "".to_string(),
        })
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<BuilderError>(),
        Some(BuilderError::Transport(_))
    ));
}
