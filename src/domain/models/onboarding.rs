use serde_derive::Deserialize;
use serde_derive::Serialize;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    #[serde(alias = "single-choice", alias = "single_choice")]
    Single,
    #[serde(alias = "multi-choice", alias = "multi_choice", alias = "multiple")]
    Multi,
    #[serde(alias = "free-text", alias = "free_text")]
    Text,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingQuestion {
    pub id: String,
    #[serde(alias = "prompt")]
    pub question: String,
    #[serde(rename = "type")]
    pub qtype: QuestionType,
    #[serde(default)]
    pub options: Vec<String>,
}

/// One-shot onboarding response from the generation backend.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionSet {
    pub questions: Vec<OnboardingQuestion>,
    #[serde(default)]
    pub acknowledgment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Answer {
    Choice(String),
    Choices(Vec<String>),
    Text(String),
}

impl Answer {
    /// Empty answers are dropped rather than rejected.
    pub fn render(&self) -> Option<String> {
        let rendered = match self {
            Answer::Choice(text) | Answer::Text(text) => text.trim().to_string(),
            Answer::Choices(items) => items
                .iter()
                .map(|item| return item.trim())
                .filter(|item| return !item.is_empty())
                .collect::<Vec<&str>>()
                .join(", "),
        };

        if rendered.is_empty() {
            return None;
        }

        return Some(rendered);
    }
}
