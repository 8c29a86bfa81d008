use std::fmt;

use uuid::Uuid;

use crate::audio::{AudioBlob, AudioReassembler};

/// Lease identifying the turn in flight on a conversation.
///
/// Events and completions are only applied when they carry the lease of the
/// active turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TurnId(Uuid);

impl TurnId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for TurnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The transport a turn runs over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnMode {
    Chat,
    Speech,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    /// The request is out; nothing has been received yet.
    Sending,

    /// Partial reasoning or answer text is arriving.
    Streaming,

    /// The assistant's answer is committed. Audio fragments may still arrive.
    Committed,

    /// The turn failed. Later events are ignored.
    Failed,
}

impl TurnPhase {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Committed | Self::Failed)
    }
}

/// State owned by a single in-flight turn. Dropped when the turn ends.
#[derive(Debug)]
pub struct Turn {
    pub(crate) id: TurnId,
    pub(crate) mode: TurnMode,
    pub(crate) search_query_id: i64,
    pub(crate) phase: TurnPhase,
    pub(crate) user_text: Option<String>,

    /// The user's own recording. Stored and attached to the user message
    /// once the transcript is known, dropped with the turn otherwise.
    pub(crate) recording: Option<AudioBlob>,
    pub(crate) partial_reasoning: String,
    pub(crate) partial_answer: String,
    pub(crate) final_answer: Option<String>,

    /// Index of the assistant message committed by this turn.
    pub(crate) answer_index: Option<usize>,
    pub(crate) audio: AudioReassembler,
}

impl Turn {
    pub(crate) fn new(mode: TurnMode, search_query_id: i64) -> Self {
        Self {
            id: TurnId::new(),
            mode,
            search_query_id,
            phase: TurnPhase::Sending,
            user_text: None,
            recording: None,
            partial_reasoning: String::new(),
            partial_answer: String::new(),
            final_answer: None,
            answer_index: None,
            audio: AudioReassembler::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> TurnId {
        self.id
    }

    #[must_use]
    pub fn mode(&self) -> TurnMode {
        self.mode
    }

    #[must_use]
    pub fn search_query_id(&self) -> i64 {
        self.search_query_id
    }

    #[must_use]
    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    #[must_use]
    pub fn user_text(&self) -> Option<&str> {
        self.user_text.as_deref()
    }

    #[must_use]
    pub fn partial_reasoning(&self) -> &str {
        &self.partial_reasoning
    }

    #[must_use]
    pub fn partial_answer(&self) -> &str {
        &self.partial_answer
    }

    #[must_use]
    pub fn final_answer(&self) -> Option<&str> {
        self.final_answer.as_deref()
    }

    /// Number of audio fragments collected so far.
    #[must_use]
    pub fn audio_fragments(&self) -> usize {
        self.audio.len()
    }

    pub(crate) fn clear_partials(&mut self) {
        self.partial_reasoning.clear();
        self.partial_answer.clear();
    }
}
