#[cfg(test)]
#[path = "generator_test.rs"]
mod tests;

use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use serde_derive::Deserialize;
use tokio::sync::mpsc;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::BuilderError;
use crate::domain::models::CompletePayload;
use crate::domain::models::Event;
use crate::domain::models::GenerationBackend;
use crate::domain::models::GenerationRequest;
use crate::domain::models::GenerationResult;
use crate::domain::models::QuestionSet;
use crate::domain::services::frames::consume_stream;

/// Shapes a non-streamed JSON response can take.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneShotResponse {
    Questions(QuestionSet),
    Complete(CompletePayload),
}

/// Generation backend reached over HTTP. Question sets come back as one JSON
/// document, screens as a stream of progress frames and a complete frame.
pub struct HttpGenerator {
    url: String,
    token: String,
    timeout: String,
}

impl Default for HttpGenerator {
    fn default() -> HttpGenerator {
        return HttpGenerator::new(
            &Config::get(ConfigKey::BackendURL),
            &Config::get(ConfigKey::BackendToken),
            &Config::get(ConfigKey::BackendHealthCheckTimeout),
        );
    }
}

impl HttpGenerator {
    pub fn new(url: &str, token: &str, timeout: &str) -> HttpGenerator {
        return HttpGenerator {
            url: url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            timeout: timeout.to_string(),
        };
    }
}

fn is_json(res: &reqwest::Response) -> bool {
    return res
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|val| return val.to_str().ok())
        .map(|val| return val.starts_with("application/json"))
        .unwrap_or(false);
}

#[async_trait]
impl GenerationBackend for HttpGenerator {
    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        let res = reqwest::Client::new()
            .get(&self.url)
            .timeout(Duration::from_millis(self.timeout.parse::<u64>()?))
            .send()
            .await;

        let res = match res {
            Ok(res) => res,
            Err(err) => {
                tracing::error!(error = ?err, url = %self.url, "Generation backend is not reachable");
                bail!(BuilderError::Transport(format!(
                    "nothing is listening at {}",
                    self.url
                )));
            }
        };

        if !res.status().is_success() {
            tracing::error!(status = res.status().as_u16(), "Generation backend health check failed");
            bail!(BuilderError::Transport(format!(
                "health check returned {}",
                res.status()
            )));
        }

        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn generate<'a>(
        &self,
        request: GenerationRequest,
        tx: &'a mpsc::UnboundedSender<Event>,
    ) -> Result<GenerationResult> {
        let mut req = reqwest::Client::new()
            .post(format!("{url}/api/generate", url = self.url))
            .json(&request);
        if !self.token.is_empty() {
            req = req.bearer_auth(&self.token);
        }

        let res = req.send().await?;
        if !res.status().is_success() {
            tracing::error!(
                status = res.status().as_u16(),
                mode = %request.mode,
                "Generation request failed"
            );
            bail!(BuilderError::Transport(format!(
                "generation request returned {}",
                res.status()
            )));
        }

        tx.send(Event::GenerationStarted())?;

        if is_json(&res) {
            let body = res.text().await?;
            tracing::debug!(body = %body, "One-shot generation response");
            let parsed = serde_json::from_str::<OneShotResponse>(&body).map_err(|err| {
                return BuilderError::TerminalGeneration(format!("unreadable response: {err}"));
            })?;

            match parsed {
                OneShotResponse::Questions(set) => return Ok(GenerationResult::Questions(set)),
                OneShotResponse::Complete(payload) => return Ok(GenerationResult::Screens(payload)),
            }
        }

        let payload = consume_stream(Box::pin(res.bytes_stream()), tx).await?;
        return Ok(GenerationResult::Screens(payload));
    }
}
