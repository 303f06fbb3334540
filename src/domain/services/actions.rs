#[cfg(test)]
#[path = "actions_test.rs"]
mod tests;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::exporters::CloudApkExporter;
use super::BuildPoller;
use crate::domain::models::Action;
use crate::domain::models::BuildJob;
use crate::domain::models::BuilderError;
use crate::domain::models::Event;
use crate::domain::models::SharedGenerationBackend;

pub fn help_text() -> String {
    let text = r#"
COMMANDS:
- /export (/e) [TARGET] - Exports the current screens. Targets: static, pwa, flutter, android, mini-app, apk.
- /build (/b) - Submits a cloud APK build and tracks it until it finishes.
- /cancel-build (/cb) - Stops tracking the current cloud build.
- /retry (/r) - Resubmits your last prompt.
- /screens (/s) - Lists all screens, marking the current one and any that just changed.
- /show [INDEX] - Prints the markup of a screen.
- /next (/n), /prev (/p) - Moves between screens.
- /skip - Skips the onboarding questions and generates straight away.
- /quit /exit (/q) - Exit Screenforge.
- /help (/h) - Provides this help menu.

PROMPTS:
Anything that is not a command is sent to the generation backend. The first prompt for a new app may be answered with a few clarifying questions. Once screens exist, every prompt updates them in place. Screens are never deleted by an update.
        "#;

    return text.trim().to_string();
}

fn worker_error(err: anyhow::Error, tx: &mpsc::UnboundedSender<Event>) -> Result<()> {
    tx.send(Event::GenerationFailed(BuilderError::from_anyhow(err)))?;
    return Ok(());
}

/// Outcome of a build submission, tagged with the submission it belongs to.
struct Submitted {
    seq: u64,
    res: Result<BuildJob>,
}

pub struct ActionsService {}

impl ActionsService {
    /// Runs until the action channel closes. Generation requests and build
    /// submissions run in spawned tasks so the loop keeps handling actions
    /// while they wait on the network. Only one generation is in flight at a
    /// time because the session refuses to dispatch a second one.
    pub async fn start(
        backend: SharedGenerationBackend,
        apk: CloudApkExporter,
        mut poller: BuildPoller,
        tx: mpsc::UnboundedSender<Event>,
        rx: &mut mpsc::UnboundedReceiver<Action>,
    ) -> Result<()> {
        let mut worker: Option<JoinHandle<Result<()>>> = None;
        let (submitted_tx, mut submitted_rx) = mpsc::unbounded_channel::<Submitted>();
        let mut submit_seq: u64 = 0;

        loop {
            tokio::select! {
                action = rx.recv() => {
                    let action = match action {
                        Some(action) => action,
                        None => break,
                    };

                    match action {
                        Action::Generate(request) => {
                            if let Some(previous) = worker.as_ref() {
                                if !previous.is_finished() {
                                    tracing::debug!("Previous generation task is still winding down");
                                }
                            }

                            let worker_tx = tx.clone();
                            let worker_backend = backend.clone();
                            worker = Some(tokio::spawn(async move {
                                let res = worker_backend.generate(request, &worker_tx).await;
                                match res {
                                    Ok(result) => {
                                        worker_tx.send(Event::GenerationFinished(result))?;
                                    }
                                    Err(err) => {
                                        worker_error(err, &worker_tx)?;
                                    }
                                }

                                return Ok(());
                            }));
                        }
                        Action::SubmitBuild(request) => {
                            submit_seq += 1;
                            let seq = submit_seq;
                            let submit_apk = apk.clone();
                            let submit_tx = submitted_tx.clone();
                            tokio::spawn(async move {
                                let res = submit_apk.submit(request).await;
                                let _ = submit_tx.send(Submitted { seq, res });
                            });
                        }
                        Action::CancelBuild() => {
                            // Submissions still waiting on the service are discarded.
                            submit_seq += 1;
                            poller.cancel();
                        }
                    }
                }
                Some(submitted) = submitted_rx.recv() => {
                    if submitted.seq != submit_seq {
                        tracing::debug!("Discarding build submission that was cancelled or superseded");
                        continue;
                    }

                    match submitted.res {
                        Ok(job) => {
                            tx.send(Event::BuildSubmitted(job.clone()))?;
                            poller.start(job, tx.clone());
                        }
                        Err(err) => {
                            tx.send(Event::BuildSubmitFailed(BuilderError::from_anyhow(err)))?;
                        }
                    }
                }
            }
        }

        poller.cancel();
        return Ok(());
    }
}
