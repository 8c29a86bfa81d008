//! Request and response bodies of the interview backend's REST endpoints.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The author of a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        })
    }
}

/// A search query, used as the interview's context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub id: i64,
    pub query: String,
    #[serde(default)]
    pub total_results: Option<i64>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// A message as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub id: Option<i64>,
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// A conversation session, including its message history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDetails {
    pub session_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub total_messages: u64,
    #[serde(default)]
    pub interview_finished: bool,
    #[serde(default)]
    pub evaluated: bool,
    #[serde(default)]
    pub search_query_id: Option<i64>,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

/// Body of both the one-shot and the streaming interview chat endpoints.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct InterviewRequest<'a> {
    pub search_query_id: i64,
    pub query: &'a str,
}

/// Response of the one-shot interview chat endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    #[serde(default)]
    pub interview_finished: bool,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct EvaluationRequest<'a> {
    pub chat_session_id: &'a str,
    pub search_query_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Health {
    pub status: String,
    #[serde(default)]
    pub message: String,
}
