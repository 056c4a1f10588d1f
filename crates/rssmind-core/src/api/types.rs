//! Request bodies for the streaming endpoints

use serde::{Deserialize, Serialize};

use crate::conversation::Role;

/// One message of the chat history sent to the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestMessage {
    pub role: Role,
    pub content: String,
}

/// Body of `POST /llm/stream_chat`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<RequestMessage>,
    pub temperature: f32,
    pub stream: bool,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, messages: Vec<RequestMessage>, temperature: f32) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature,
            stream: true,
        }
    }
}

/// Body of `POST /llm/ai_summary/stream`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRequest {
    pub article_id: Option<String>,
    pub url: String,
}
