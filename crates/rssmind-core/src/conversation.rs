//! Chat conversation state
//!
//! Holds the message list a chat front-end renders. Streamed replies land in
//! an assistant placeholder that is overwritten with each full snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::RequestMessage;

const DEFAULT_TITLE: &str = "New conversation";
const TITLE_MAX_CHARS: usize = 30;
const FAILURE_NOTICE: &str = "Sorry, an error occurred while sending the message";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Conversation {
    title: String,
    messages: Vec<ChatMessage>,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    pub fn new() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            messages: Vec::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Add a user message and return the history to send with it
    pub fn push_user(&mut self, content: &str) -> Vec<RequestMessage> {
        let first_user = !self.messages.iter().any(|m| m.role == Role::User);
        self.messages.push(ChatMessage::new(Role::User, content));
        if first_user {
            self.title = derive_title(content);
        }
        self.history()
    }

    /// Role/content pairs for the backend; failure notices and empty replies stay local
    pub fn history(&self) -> Vec<RequestMessage> {
        self.messages
            .iter()
            .filter(|m| m.role != Role::System && !m.content.is_empty())
            .map(|m| RequestMessage {
                role: m.role,
                content: m.content.clone(),
            })
            .collect()
    }

    /// Append an empty assistant message for a reply about to stream in
    pub fn begin_reply(&mut self) -> Uuid {
        let message = ChatMessage::new(Role::Assistant, "");
        let id = message.id;
        self.messages.push(message);
        id
    }

    /// Replace a reply's content with the latest full snapshot.
    ///
    /// Returns false if no message has this id.
    pub fn apply_snapshot(&mut self, id: Uuid, text: &str) -> bool {
        match self.messages.iter_mut().find(|m| m.id == id) {
            Some(message) => {
                if message.content != text {
                    message.content.clear();
                    message.content.push_str(text);
                }
                true
            }
            None => false,
        }
    }

    /// Append a visible failure notice; any partial reply is kept
    pub fn record_failure(&mut self, message: &str) -> &ChatMessage {
        self.messages.push(ChatMessage::new(
            Role::System,
            format!("{FAILURE_NOTICE}: {message}"),
        ));
        &self.messages[self.messages.len() - 1]
    }
}

/// First characters of the opening message, ellipsized when cut
fn derive_title(content: &str) -> String {
    let trimmed = content.trim();
    let mut title: String = trimmed.chars().take(TITLE_MAX_CHARS).collect();
    if trimmed.chars().count() > TITLE_MAX_CHARS {
        title.push_str("...");
    }
    title
}
