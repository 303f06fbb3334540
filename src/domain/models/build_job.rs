use serde_derive::Deserialize;
use serde_derive::Serialize;

use super::ScreenPayload;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BuildStatus {
    Queued,
    Building,
    Done,
    Error,
}

impl BuildStatus {
    pub fn is_terminal(&self) -> bool {
        return matches!(self, BuildStatus::Done | BuildStatus::Error);
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildRequest {
    pub app_name: String,
    pub screens: Vec<ScreenPayload>,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildSubmission {
    pub build_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildStatusResponse {
    pub status: BuildStatus,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_url: Option<String>,
}

/// A remote compilation tracked until it reaches a terminal status.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildJob {
    pub id: String,
    pub status: BuildStatus,
    pub target: String,
    pub artifact_url: Option<String>,
    pub message: Option<String>,
}

impl BuildJob {
    pub fn queued(id: &str, target: &str) -> BuildJob {
        return BuildJob {
            id: id.to_string(),
            status: BuildStatus::Queued,
            target: target.to_string(),
            artifact_url: None,
            message: None,
        };
    }

    pub fn is_terminal(&self) -> bool {
        return self.status.is_terminal();
    }

    /// Applies a status response. Terminal jobs are immutable.
    pub fn apply(&mut self, res: BuildStatusResponse) -> bool {
        if self.is_terminal() {
            return false;
        }

        self.status = res.status;
        if !res.message.is_empty() {
            self.message = Some(res.message);
        }
        if res.artifact_url.is_some() {
            self.artifact_url = res.artifact_url;
        }

        return true;
    }
}
