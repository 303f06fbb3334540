#[cfg(test)]
#[path = "cloud_build_test.rs"]
mod tests;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::BuildBackend;
use crate::domain::models::BuildRequest;
use crate::domain::models::BuildStatusResponse;
use crate::domain::models::BuildSubmission;
use crate::domain::models::BuilderError;

/// Remote APK build service.
pub struct CloudBuilds {
    url: String,
    token: String,
}

impl Default for CloudBuilds {
    fn default() -> CloudBuilds {
        return CloudBuilds::new(&Config::build_url(), &Config::get(ConfigKey::BackendToken));
    }
}

impl CloudBuilds {
    pub fn new(url: &str, token: &str) -> CloudBuilds {
        return CloudBuilds {
            url: url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        };
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.token.is_empty() {
            return req;
        }

        return req.bearer_auth(&self.token);
    }
}

#[async_trait]
impl BuildBackend for CloudBuilds {
    #[allow(clippy::implicit_return)]
    async fn submit(&self, request: BuildRequest) -> Result<String> {
        let req = reqwest::Client::new()
            .post(format!("{url}/api/builds", url = self.url))
            .json(&request);

        let res = self.authorize(req).send().await?;
        if !res.status().is_success() {
            tracing::error!(status = res.status().as_u16(), "Build submission failed");
            bail!(BuilderError::Transport(format!(
                "build submission returned {}",
                res.status()
            )));
        }

        let submission = res.json::<BuildSubmission>().await?;
        return Ok(submission.build_id);
    }

    #[allow(clippy::implicit_return)]
    async fn status(&self, build_id: &str) -> Result<BuildStatusResponse> {
        let req = reqwest::Client::new()
            .get(format!("{url}/api/builds/{build_id}", url = self.url));

        let res = self.authorize(req).send().await?;
        if !res.status().is_success() {
            bail!(BuilderError::Transport(format!(
                "build status returned {}",
                res.status()
            )));
        }

        return Ok(res.json::<BuildStatusResponse>().await?);
    }
}
