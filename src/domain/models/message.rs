#[cfg(test)]
#[path = "message_test.rs"]
mod tests;

use serde_derive::Deserialize;
use serde_derive::Serialize;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<u32>,
    /// The app version this message refers to.
    pub version: u32,
    pub timestamp: String,
    #[serde(skip)]
    provisional: bool,
}

impl ChatMessage {
    pub fn new(role: Role, content: &str, version: u32) -> ChatMessage {
        return ChatMessage {
            role,
            content: content.to_string(),
            model: None,
            tokens: None,
            version,
            timestamp: chrono::Local::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, false),
            provisional: false,
        };
    }

    /// An assistant placeholder shown while a request is in flight.
    pub fn provisional(version: u32) -> ChatMessage {
        let mut msg = ChatMessage::new(Role::Assistant, "Working on it...", version);
        msg.provisional = true;
        return msg;
    }

    pub fn is_provisional(&self) -> bool {
        return self.provisional;
    }
}

/// Append-only conversation log for one app.
#[derive(Clone, Debug, Default)]
pub struct ChatLog {
    messages: Vec<ChatMessage>,
}

impl ChatLog {
    pub fn from_messages(messages: Vec<ChatMessage>) -> ChatLog {
        return ChatLog { messages };
    }

    pub fn messages(&self) -> &[ChatMessage] {
        return &self.messages;
    }

    pub fn len(&self) -> usize {
        return self.messages.len();
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn user_turns(&self) -> usize {
        return self
            .messages
            .iter()
            .filter(|msg| return msg.role == Role::User)
            .count();
    }

    pub fn last_user_prompt(&self) -> Option<String> {
        return self
            .messages
            .iter()
            .rev()
            .find(|msg| return msg.role == Role::User)
            .map(|msg| return msg.content.to_string());
    }

    /// The last `window` finalized messages, oldest first.
    pub fn trailing(&self, window: usize) -> Vec<ChatMessage> {
        let finalized = self
            .messages
            .iter()
            .filter(|msg| return !msg.provisional)
            .collect::<Vec<&ChatMessage>>();

        let start = finalized.len().saturating_sub(window);
        return finalized[start..]
            .iter()
            .map(|msg| return (*msg).clone())
            .collect();
    }

    /// Replaces the trailing provisional message with its final content.
    /// Returns the finalized message, or `None` if nothing was pending.
    pub fn finalize_last(&mut self, content: &str, version: u32) -> Option<ChatMessage> {
        let last = self.messages.last_mut()?;
        if !last.provisional {
            return None;
        }

        last.content = content.to_string();
        last.version = version;
        last.provisional = false;
        return Some(last.clone());
    }
}
