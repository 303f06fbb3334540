use std::sync::Arc;
use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

use super::help_text;
use super::ActionsService;
use crate::domain::models::Action;
use crate::domain::models::BuildBackend;
use crate::domain::models::BuildRequest;
use crate::domain::models::BuildStatus;
use crate::domain::models::BuildStatusResponse;
use crate::domain::models::BuilderError;
use crate::domain::models::CompletePayload;
use crate::domain::models::Event;
use crate::domain::models::GenerationBackend;
use crate::domain::models::GenerationMode;
use crate::domain::models::GenerationRequest;
use crate::domain::models::GenerationResult;
use crate::domain::models::Progress;
use crate::domain::models::ScreenPayload;
use crate::domain::services::exporters::CloudApkExporter;
use crate::domain::services::BuildPoller;

struct EchoBackend {}

#[async_trait]
impl GenerationBackend for EchoBackend {
    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn generate<'a>(
        &self,
        request: GenerationRequest,
        tx: &'a mpsc::UnboundedSender<Event>,
    ) -> Result<GenerationResult> {
        tx.send(Event::GenerationStarted())?;
        if request.prompt == "fail" {
            bail!("connection reset");
        }

        tx.send(Event::GenerationProgress(Progress::new(50.0, "Halfway")))?;
        return Ok(GenerationResult::Screens(CompletePayload {
            screens: vec![ScreenPayload {
                name: request.prompt.to_string(),
                content: "<h1>Echo</h1>".to_string(),
            }],
            ..CompletePayload::default()
        }));
    }
}

struct InstantBuilds {}

#[async_trait]
impl BuildBackend for InstantBuilds {
    #[allow(clippy::implicit_return)]
    async fn submit(&self, request: BuildRequest) -> Result<String> {
        if request.app_name == "reject" {
            bail!("quota exceeded");
        }
        if request.app_name == "slow" {
            tokio::time::sleep(Duration::from_millis(300)).await;
        }
        return Ok("b-1".to_string());
    }

    #[allow(clippy::implicit_return)]
    async fn status(&self, _build_id: &str) -> Result<BuildStatusResponse> {
        return Ok(BuildStatusResponse {
            status: BuildStatus::Done,
            message: "Built".to_string(),
            artifact_url: Some("https://builds.example.com/b-1.apk".to_string()),
        });
    }
}

fn start_service() -> (
    mpsc::UnboundedSender<Action>,
    mpsc::UnboundedReceiver<Event>,
) {
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    let (event_tx, event_rx) = mpsc::unbounded_channel::<Event>();
    let builds = Arc::new(InstantBuilds {});
    let poller = BuildPoller::new(builds.clone(), Duration::from_millis(10));

    tokio::spawn(async move {
        return ActionsService::start(
            Arc::new(EchoBackend {}),
            CloudApkExporter::new(builds),
            poller,
            event_tx,
            &mut action_rx,
        )
        .await;
    });

    return (action_tx, event_rx);
}

async fn next_event(rx: &mut mpsc::UnboundedReceiver<Event>) -> Event {
    return tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .unwrap()
        .unwrap();
}

fn build_request(app_name: &str) -> BuildRequest {
    return BuildRequest {
        app_name: app_name.to_string(),
        screens: vec![],
        description: "".to_string(),
    };
}

fn request(prompt: &str) -> GenerationRequest {
    return GenerationRequest {
        prompt: prompt.to_string(),
        mode: GenerationMode::Generate,
        history: vec![],
        screens: None,
        app_name: None,
        description: None,
    };
}

#[test]
fn it_lists_commands_in_help() {
    let text = help_text();
    assert!(text.starts_with("COMMANDS:"));
    assert!(text.contains("/export (/e)"));
    assert!(text.contains("PROMPTS:"));
}

#[tokio::test]
async fn it_runs_generation_requests() {
    let (tx, mut rx) = start_service();
    tx.send(Action::Generate(request("Home"))).unwrap();

    assert_eq!(next_event(&mut rx).await, Event::GenerationStarted());
    assert_eq!(
        next_event(&mut rx).await,
        Event::GenerationProgress(Progress::new(50.0, "Halfway"))
    );
    match next_event(&mut rx).await {
        Event::GenerationFinished(GenerationResult::Screens(payload)) => {
            assert_eq!(payload.screens[0].name, "Home");
        }
        other => panic!("Expected screens, got {other:?}"),
    }
}

#[tokio::test]
async fn it_reports_generation_failures() {
    let (tx, mut rx) = start_service();
    tx.send(Action::Generate(request("fail"))).unwrap();

    assert_eq!(next_event(&mut rx).await, Event::GenerationStarted());
    assert_eq!(
        next_event(&mut rx).await,
        Event::GenerationFailed(BuilderError::Transport("connection reset".to_string()))
    );
}

#[tokio::test]
async fn it_submits_and_polls_builds() {
    let (tx, mut rx) = start_service();
    tx.send(Action::SubmitBuild(BuildRequest {
        app_name: "FitTrack".to_string(),
        screens: vec![],
        description: "".to_string(),
    }))
    .unwrap();

    match next_event(&mut rx).await {
        Event::BuildSubmitted(job) => {
            assert_eq!(job.id, "b-1");
            assert_eq!(job.status, BuildStatus::Queued);
        }
        other => panic!("Expected a submitted build, got {other:?}"),
    }
    match next_event(&mut rx).await {
        Event::BuildUpdated(job) => {
            assert_eq!(job.status, BuildStatus::Done);
            assert_eq!(
                job.artifact_url,
                Some("https://builds.example.com/b-1.apk".to_string())
            );
        }
        other => panic!("Expected a build update, got {other:?}"),
    }
}

#[tokio::test]
async fn it_reports_rejected_builds() {
    let (tx, mut rx) = start_service();
    tx.send(Action::SubmitBuild(BuildRequest {
        app_name: "reject".to_string(),
        screens: vec![],
        description: "".to_string(),
    }))
    .unwrap();

    assert_eq!(
        next_event(&mut rx).await,
        Event::BuildSubmitFailed(BuilderError::Transport("quota exceeded".to_string()))
    );
}

#[tokio::test]
async fn it_runs_back_to_back_generation_requests() {
    let (tx, mut rx) = start_service();
    tx.send(Action::Generate(request("Home"))).unwrap();
    tx.send(Action::Generate(request("Profile"))).unwrap();

    let mut names = vec![];
    while names.len() < 2 {
        if let Event::GenerationFinished(GenerationResult::Screens(payload)) =
            next_event(&mut rx).await
        {
            names.push(payload.screens[0].name.to_string());
        }
    }

    names.sort();
    assert_eq!(names, vec!["Home", "Profile"]);
}

#[tokio::test]
async fn it_handles_generation_while_a_build_submits() {
    let (tx, mut rx) = start_service();
    tx.send(Action::SubmitBuild(build_request("slow"))).unwrap();
    tx.send(Action::Generate(request("Home"))).unwrap();

    assert_eq!(next_event(&mut rx).await, Event::GenerationStarted());

    let mut submitted = false;
    while !submitted {
        if let Event::BuildSubmitted(job) = next_event(&mut rx).await {
            assert_eq!(job.id, "b-1");
            submitted = true;
        }
    }
}

#[tokio::test]
async fn it_discards_builds_cancelled_while_submitting() {
    let (tx, mut rx) = start_service();
    tx.send(Action::SubmitBuild(build_request("slow"))).unwrap();
    tx.send(Action::CancelBuild()).unwrap();

    let res = tokio::time::timeout(Duration::from_millis(600), rx.recv()).await;
    assert!(res.is_err());
}
