use ipp_client::types::{ChatMessage, Role};
use tracing::warn;

/// A message that is part of the visible conversation.
///
/// Once committed, only [`CommittedMessage::audio_url`] may change, and only
/// from `None` to `Some`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedMessage {
    pub role: Role,
    pub content: String,
    pub audio_url: Option<String>,
}

impl CommittedMessage {
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            audio_url: None,
        }
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            audio_url: None,
        }
    }

    #[must_use]
    pub fn with_audio_url(mut self, audio_url: Option<String>) -> Self {
        self.audio_url = audio_url;
        self
    }

    /// Attach an audio reference, unless one is already attached.
    ///
    /// Returns `true` if the reference was attached.
    pub(crate) fn attach_audio(&mut self, audio_url: String) -> bool {
        if let Some(existing) = &self.audio_url {
            warn!(existing, audio_url, "Message already has audio attached.");
            return false;
        }

        self.audio_url = Some(audio_url);
        true
    }
}

impl From<ChatMessage> for CommittedMessage {
    fn from(message: ChatMessage) -> Self {
        Self {
            role: message.role,
            content: message.content,
            audio_url: None,
        }
    }
}
