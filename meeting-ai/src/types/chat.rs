//! Types for chat-style language-model completions.

use serde::{Deserialize, Serialize};

/// Role tag carried by every message sent to a chat completion endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// A single role-tagged turn of a chat exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A non-streaming completion request: one model, an ordered list of messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Request {
    pub model: String,
    pub messages: Vec<Message>,
}

impl Request {
    /// Builds the two-turn exchange used for pattern extraction: the prompt template
    /// as system instruction followed by the verbatim transcript as user content.
    pub fn instruct(model: impl Into<String>, instruction: &str, content: &str) -> Self {
        Self {
            model: model.into(),
            messages: vec![Message::system(instruction), Message::user(content)],
        }
    }
}
