use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};

/// The `info` message that marks a successfully finished speech session.
pub const SESSION_COMPLETED: &str = "Speech session completed.";

/// Placeholder file name sent with every speech session.
pub const AUDIO_FILE_NAME: &str = "browser_recording.webm";

/// A message sent from the client to the speech socket.
///
/// Every session sends exactly three of these, in order: [`Start`],
/// [`Audio`] and [`End`].
///
/// [`Start`]: ClientMessage::Start
/// [`Audio`]: ClientMessage::Audio
/// [`End`]: ClientMessage::End
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Start {
        session_id: String,
        search_query_id: i64,
        tts_enabled: bool,
        audio_file_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language_code: Option<String>,
    },

    /// The entire recorded clip, as a single base64 payload.
    Audio { chunk: String },

    End,
}

impl ClientMessage {
    #[must_use]
    pub fn start(
        session_id: impl Into<String>,
        search_query_id: i64,
        tts_enabled: bool,
        language_code: Option<String>,
    ) -> Self {
        Self::Start {
            session_id: session_id.into(),
            search_query_id,
            tts_enabled,
            audio_file_name: AUDIO_FILE_NAME.to_owned(),
            language_code,
        }
    }

    /// Encode a recorded clip into an `audio` message.
    #[must_use]
    pub fn audio(clip: &[u8]) -> Self {
        Self::Audio {
            chunk: STANDARD.encode(clip),
        }
    }

    /// The compact JSON text sent over the socket.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
