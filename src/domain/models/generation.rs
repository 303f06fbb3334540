use serde_derive::Deserialize;
use serde_derive::Serialize;

use super::Blueprint;
use super::ChatMessage;
use super::QuestionSet;
use super::Role;
use super::Screen;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GenerationMode {
    Onboarding,
    Generate,
    Update,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
}

impl From<&ChatMessage> for HistoryEntry {
    fn from(msg: &ChatMessage) -> HistoryEntry {
        return HistoryEntry {
            role: msg.role,
            content: msg.content.to_string(),
        };
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenPayload {
    pub name: String,
    pub content: String,
}

impl From<&Screen> for ScreenPayload {
    fn from(screen: &Screen) -> ScreenPayload {
        return ScreenPayload {
            name: screen.name.to_string(),
            content: screen.content.to_string(),
        };
    }
}

/// Body sent to the generation backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub prompt: String,
    pub mode: GenerationMode,
    pub history: Vec<HistoryEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screens: Option<Vec<ScreenPayload>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub percent: u8,
    pub message: String,
}

impl Progress {
    /// Clamps any reported value into `[0, 100]`.
    pub fn new(percent: f64, message: &str) -> Progress {
        let clamped = if percent.is_finite() {
            percent.round().clamp(0.0, 100.0)
        } else {
            0.0
        };

        return Progress {
            percent: clamped as u8,
            message: message.to_string(),
        };
    }
}

/// The terminal frame of a generation stream.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletePayload {
    pub screens: Vec<ScreenPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blueprint: Option<Blueprint>,
}

/// One decoded frame of a generation stream.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamFrame {
    Progress {
        #[serde(default, alias = "percent")]
        progress: f64,
        #[serde(default)]
        message: String,
    },
    Complete(CompletePayload),
}

/// What a single generation request resolved to.
#[derive(Clone, Debug, PartialEq)]
pub enum GenerationResult {
    Screens(CompletePayload),
    Questions(QuestionSet),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CompletionStatus {
    Success,
    Error,
}

/// `Idle → Submitting → Streaming → Complete → Idle`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GenerationPhase {
    Idle,
    Submitting,
    Streaming,
    Complete(CompletionStatus),
}

impl GenerationPhase {
    pub fn can_transition_to(&self, next: GenerationPhase) -> bool {
        return matches!(
            (self, next),
            (GenerationPhase::Idle, GenerationPhase::Submitting)
                | (GenerationPhase::Submitting, GenerationPhase::Streaming)
                | (GenerationPhase::Submitting, GenerationPhase::Complete(_))
                | (GenerationPhase::Streaming, GenerationPhase::Complete(_))
                | (GenerationPhase::Complete(_), GenerationPhase::Idle)
        );
    }
}
