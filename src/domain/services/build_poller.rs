#[cfg(test)]
#[path = "build_poller_test.rs"]
mod tests;

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::domain::models::BuildJob;
use crate::domain::models::Event;
use crate::domain::models::SharedBuildBackend;

struct PollTask {
    build_id: String,
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// Tracks at most one remote build at a time. Starting a new build, or
/// dropping the poller, cancels tracking of the previous one.
pub struct BuildPoller {
    backend: SharedBuildBackend,
    interval: Duration,
    current: Option<PollTask>,
}

impl BuildPoller {
    pub fn new(backend: SharedBuildBackend, interval: Duration) -> BuildPoller {
        return BuildPoller {
            backend,
            interval,
            current: None,
        };
    }

    pub fn active_build_id(&self) -> Option<&str> {
        let task = self.current.as_ref()?;
        if task.handle.is_finished() {
            return None;
        }

        return Some(&task.build_id);
    }

    pub fn start(&mut self, job: BuildJob, tx: mpsc::UnboundedSender<Event>) {
        self.cancel();

        let token = CancellationToken::new();
        let build_id = job.id.to_string();
        let handle = tokio::spawn(poll(
            job,
            self.backend.clone(),
            self.interval,
            token.clone(),
            tx,
        ));

        self.current = Some(PollTask {
            build_id,
            token,
            handle,
        });
    }

    /// Stops tracking the current build. Safe to call repeatedly.
    pub fn cancel(&mut self) {
        if let Some(task) = self.current.take() {
            tracing::debug!(build_id = %task.build_id, "Cancelling build poller");
            task.token.cancel();
        }
    }
}

impl Drop for BuildPoller {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn poll(
    mut job: BuildJob,
    backend: SharedBuildBackend,
    interval: Duration,
    token: CancellationToken,
    tx: mpsc::UnboundedSender<Event>,
) {
    while !job.is_terminal() {
        tokio::select! {
            _ = token.cancelled() => return,
            _ = tokio::time::sleep(interval) => {}
        }

        let res = tokio::select! {
            _ = token.cancelled() => return,
            res = backend.status(&job.id) => res,
        };

        let status = match res {
            Ok(status) => status,
            Err(err) => {
                tracing::warn!(error = ?err, build_id = %job.id, "Build status request failed");
                continue;
            }
        };

        if token.is_cancelled() {
            return;
        }

        job.apply(status);
        tracing::debug!(build_id = %job.id, status = %job.status, "Build status");
        if tx.send(Event::BuildUpdated(job.clone())).is_err() {
            return;
        }
    }
}
