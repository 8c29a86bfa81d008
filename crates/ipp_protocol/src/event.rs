use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::speech::SESSION_COMPLETED;

/// The kind of a [`StreamEvent`], as carried in the `type` field on the wire.
///
/// Kinds outside the known set are kept verbatim in [`EventKind::Other`], so
/// that consumers can decide to ignore them instead of the parser dropping
/// them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventKind {
    /// Recognized user speech.
    Transcript,

    /// Incremental "thinking" text.
    Reasoning,

    /// Incremental answer text.
    Answer,

    /// The assistant finished its response for this turn.
    Complete,

    /// A base64 fragment of synthesized audio.
    AudioChunk,

    /// A protocol-level failure reported by the server.
    Error,

    /// Informational message, including the speech completion sentinel.
    Info,

    /// Any kind this client does not know about.
    Other(String),
}

impl EventKind {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Transcript => "transcript",
            Self::Reasoning => "reasoning",
            Self::Answer => "answer",
            Self::Complete => "complete",
            Self::AudioChunk => "audio_chunk",
            Self::Error => "error",
            Self::Info => "info",
            Self::Other(kind) => kind,
        }
    }
}

impl From<String> for EventKind {
    fn from(kind: String) -> Self {
        match kind.as_str() {
            "transcript" => Self::Transcript,
            "reasoning" => Self::Reasoning,
            "answer" => Self::Answer,
            "complete" => Self::Complete,
            "audio_chunk" => Self::AudioChunk,
            "error" => Self::Error,
            "info" => Self::Info,
            _ => Self::Other(kind),
        }
    }
}

impl From<EventKind> for String {
    fn from(kind: EventKind) -> Self {
        match kind {
            EventKind::Other(kind) => kind,
            kind => kind.as_str().to_owned(),
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single event received from either the chat stream or the speech socket.
///
/// On the wire this is `{"type": <kind>, "data": {...}}`. Both fields are
/// required; the payload is kept as an opaque map and interpreted through the
/// accessor methods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,

    #[serde(rename = "data")]
    pub payload: Map<String, Value>,
}

impl StreamEvent {
    #[must_use]
    pub fn new(kind: EventKind, payload: Map<String, Value>) -> Self {
        Self { kind, payload }
    }

    /// Get a string field from the payload, if present and a string.
    #[must_use]
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(Value::as_str)
    }

    /// The incremental text of a `reasoning` or `answer` event.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.str_field("token")
    }

    /// The recognized text of a `transcript` event.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.str_field("text")
    }

    /// The base64 fragment of an `audio_chunk` event.
    #[must_use]
    pub fn chunk(&self) -> Option<&str> {
        self.str_field("chunk")
    }

    /// The final response text of a chat `complete` event.
    #[must_use]
    pub fn response(&self) -> Option<&str> {
        self.str_field("response")
    }

    /// The message of an `info` event.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.str_field("message")
    }

    /// The failure reason of an `error` event.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.str_field("error")
    }

    /// The `interview_finished` flag of a `complete` event.
    #[must_use]
    pub fn interview_finished(&self) -> Option<bool> {
        self.payload.get("interview_finished").and_then(Value::as_bool)
    }

    /// Returns `true` if this is the `info` event that marks a successfully
    /// finished speech session.
    #[must_use]
    pub fn is_session_completed(&self) -> bool {
        self.kind == EventKind::Info && self.message() == Some(SESSION_COMPLETED)
    }
}
