use std::mem;

use ipp_client::types::{Role, SessionDetails};
use ipp_protocol::{EventKind, StreamEvent};
use tracing::{debug, trace, warn};

use crate::{
    audio::{AudioBlob, AudioStore},
    error::{Error, Result},
    message::CommittedMessage,
    turn::{Turn, TurnId, TurnMode, TurnPhase},
};

/// Failure reason used when an `error` event carries no message.
const GENERIC_TURN_ERROR: &str = "Interview error";

/// The user-visible state of the most recent turn.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TurnStatus {
    /// No turn has run yet.
    #[default]
    Idle,

    /// A turn is in flight and its answer is not committed yet.
    Streaming,

    /// The assistant's answer was committed.
    Completed,

    /// The transport ended (or the turn was abandoned) before the answer was
    /// committed. Nothing was committed for the assistant.
    Incomplete,

    /// The turn failed, with the reason.
    Failed(String),
}

impl TurnStatus {
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Conversation state for one session: the committed messages, the turn in
/// flight (if any) and the flags the presentation layer renders.
///
/// All mutation goes through the turn lifecycle:
///
/// 1. [`begin_chat_turn`] or [`begin_speech_turn`] hands out a [`TurnId`]
///    lease; only one turn may be in flight at a time.
/// 2. [`apply`] folds each [`StreamEvent`] of that turn into the state.
/// 3. [`end_turn`] or [`fail_turn`] releases the lease when the transport
///    resolves.
///
/// [`begin_chat_turn`]: Conversation::begin_chat_turn
/// [`begin_speech_turn`]: Conversation::begin_speech_turn
/// [`apply`]: Conversation::apply
/// [`end_turn`]: Conversation::end_turn
/// [`fail_turn`]: Conversation::fail_turn
#[derive(Debug)]
pub struct Conversation {
    session_id: String,
    search_query_id: Option<i64>,
    messages: Vec<CommittedMessage>,
    interview_finished: bool,
    status: TurnStatus,
    turn: Option<Turn>,
    audio: AudioStore,
}

impl Conversation {
    #[must_use]
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            search_query_id: None,
            messages: vec![],
            interview_finished: false,
            status: TurnStatus::Idle,
            turn: None,
            audio: AudioStore::default(),
        }
    }

    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    #[must_use]
    pub fn search_query_id(&self) -> Option<i64> {
        self.search_query_id
    }

    #[must_use]
    pub fn messages(&self) -> &[CommittedMessage] {
        &self.messages
    }

    #[must_use]
    pub fn interview_finished(&self) -> bool {
        self.interview_finished
    }

    #[must_use]
    pub fn status(&self) -> &TurnStatus {
        &self.status
    }

    #[must_use]
    pub fn audio(&self) -> &AudioStore {
        &self.audio
    }

    #[must_use]
    pub fn active_turn(&self) -> Option<&Turn> {
        self.turn.as_ref()
    }

    /// Returns `true` while a turn holds the lease.
    #[must_use]
    pub fn is_streaming(&self) -> bool {
        self.turn.is_some()
    }

    #[must_use]
    pub fn partial_reasoning(&self) -> &str {
        self.turn.as_ref().map_or("", Turn::partial_reasoning)
    }

    #[must_use]
    pub fn partial_answer(&self) -> &str {
        self.turn.as_ref().map_or("", Turn::partial_answer)
    }

    /// The context can no longer change once the user sent a message.
    #[must_use]
    pub fn is_context_locked(&self) -> bool {
        self.messages.iter().any(|m| m.role == Role::User)
    }

    /// An interview can be evaluated once there is at least one exchange and
    /// nothing is in flight.
    #[must_use]
    pub fn can_evaluate(&self) -> bool {
        self.search_query_id.is_some() && self.messages.len() >= 2 && self.turn.is_none()
    }

    /// Replace the local state with a session fetched from the backend.
    pub fn hydrate(&mut self, details: SessionDetails) -> Result<()> {
        if self.turn.is_some() {
            return Err(Error::TurnInFlight(self.session_id.clone()));
        }

        debug!(
            session_id = self.session_id,
            messages = details.messages.len(),
            search_query_id = details.search_query_id,
            "Hydrating conversation."
        );

        // Backend messages carry no local audio references.
        self.audio.clear();
        self.messages = details.messages.into_iter().map(Into::into).collect();
        self.search_query_id = details.search_query_id.or(self.search_query_id);
        self.interview_finished = details.interview_finished;
        self.status = TurnStatus::Idle;

        Ok(())
    }

    /// Choose the search query that gives the interview its context.
    pub fn select_context(&mut self, search_query_id: i64) -> Result<()> {
        if self.turn.is_some() {
            return Err(Error::TurnInFlight(self.session_id.clone()));
        }

        match self.search_query_id {
            Some(current) if current != search_query_id && self.is_context_locked() => {
                Err(Error::ContextLocked(current))
            }
            _ => {
                self.search_query_id = Some(search_query_id);
                Ok(())
            }
        }
    }

    /// Start a typed turn. The user's message is committed immediately.
    pub fn begin_chat_turn(&mut self, message: &str) -> Result<TurnId> {
        let message = message.trim();
        if message.is_empty() {
            return Err(Error::EmptyMessage);
        }

        let mut turn = self.new_turn(TurnMode::Chat)?;
        turn.user_text = Some(message.to_owned());
        self.messages.push(CommittedMessage::user(message));

        Ok(self.start(turn))
    }

    /// Start a spoken turn. The user's message is committed when the
    /// transcript arrives, with `recording` attached as its audio.
    pub fn begin_speech_turn(&mut self, recording: Option<AudioBlob>) -> Result<TurnId> {
        let mut turn = self.new_turn(TurnMode::Speech)?;
        turn.recording = recording;

        Ok(self.start(turn))
    }

    /// Fold one event of the turn identified by `id` into the state.
    ///
    /// Events for any other turn are ignored, as are unknown kinds.
    pub fn apply(&mut self, id: TurnId, event: &StreamEvent) {
        let Some(turn) = self.turn.as_mut().filter(|turn| turn.id == id) else {
            warn!(%id, kind = %event.kind, "Ignoring event for a turn that is not in flight.");
            return;
        };

        // A committed answer may still be followed by its audio, or by an
        // error that fails the turn.
        if turn.phase.is_terminal() {
            let trailing = turn.phase == TurnPhase::Committed
                && matches!(event.kind, EventKind::AudioChunk | EventKind::Error);

            if !trailing {
                trace!(
                    kind = %event.kind,
                    phase = ?turn.phase,
                    "Ignoring event after turn ended."
                );
                return;
            }
        }

        match &event.kind {
            EventKind::Transcript => {
                let Some(text) = event.text().filter(|text| !text.trim().is_empty()) else {
                    debug!("Ignoring empty transcript.");
                    return;
                };

                if turn.mode == TurnMode::Chat || turn.user_text.is_some() {
                    warn!(mode = ?turn.mode, "Ignoring repeated transcript.");
                    return;
                }

                let audio_url = turn.recording.take().map(|blob| self.audio.insert(blob));

                turn.user_text = Some(text.to_owned());
                turn.phase = TurnPhase::Streaming;
                self.messages.push(CommittedMessage::user(text).with_audio_url(audio_url));
            }
            EventKind::Reasoning => {
                if let Some(token) = event.token() {
                    turn.partial_reasoning.push_str(token);
                    turn.phase = TurnPhase::Streaming;
                }
            }
            EventKind::Answer => {
                if let Some(token) = event.token() {
                    turn.partial_answer.push_str(token);
                    turn.phase = TurnPhase::Streaming;
                }
            }
            EventKind::AudioChunk => match event.chunk() {
                Some(chunk) => turn.audio.push(chunk),
                None => debug!("Ignoring audio chunk without payload."),
            },
            EventKind::Complete => {
                // The speech backend does not repeat the answer in `complete`,
                // so the streamed tokens are the answer.
                let text = match (turn.mode, event.response()) {
                    (TurnMode::Chat, Some(response)) => response.to_owned(),
                    _ => mem::take(&mut turn.partial_answer),
                };

                turn.clear_partials();
                turn.final_answer = Some(text.clone());
                turn.answer_index = Some(self.messages.len());
                turn.phase = TurnPhase::Committed;
                self.messages.push(CommittedMessage::assistant(text));

                if let Some(finished) = event.interview_finished() {
                    self.interview_finished = finished;
                }
                self.status = TurnStatus::Completed;
            }
            EventKind::Error => {
                let reason = event.error().unwrap_or(GENERIC_TURN_ERROR).to_owned();
                warn!(%id, reason, "Turn failed with error event.");

                turn.clear_partials();
                turn.phase = TurnPhase::Failed;
                self.status = TurnStatus::Failed(reason);
            }
            EventKind::Info => debug!(message = ?event.message(), "Received info event."),
            EventKind::Other(kind) => debug!(kind, "Ignoring unknown event kind."),
        }
    }

    /// Release the lease after the transport ended normally.
    ///
    /// If the turn committed an answer, collected audio is reassembled and
    /// attached to that answer. A turn that never committed ends as
    /// [`TurnStatus::Incomplete`].
    pub fn end_turn(&mut self, id: TurnId) -> TurnStatus {
        let Some(mut turn) = self.take_turn(id) else {
            return self.status.clone();
        };

        match turn.phase {
            TurnPhase::Committed => self.attach_audio(&mut turn),
            TurnPhase::Failed => {}
            TurnPhase::Sending | TurnPhase::Streaming => {
                warn!(%id, "Transport ended before the turn completed.");
                self.status = TurnStatus::Incomplete;
            }
        }

        self.status.clone()
    }

    /// Release the lease after the transport failed.
    ///
    /// Messages committed so far stay; partial text and audio are dropped.
    pub fn fail_turn(&mut self, id: TurnId, reason: impl Into<String>) -> TurnStatus {
        if self.take_turn(id).is_none() {
            return self.status.clone();
        }

        // An `error` event already recorded the more specific reason.
        if !self.status.is_failed() {
            self.status = TurnStatus::Failed(reason.into());
        }

        self.status.clone()
    }

    /// Drop the turn in flight without waiting for its transport.
    pub fn abandon_turn(&mut self) -> Option<TurnId> {
        let turn = self.turn.take()?;
        warn!(id = %turn.id, phase = ?turn.phase, "Abandoning turn in flight.");

        if turn.phase != TurnPhase::Committed {
            self.status = TurnStatus::Incomplete;
        }

        Some(turn.id)
    }

    fn new_turn(&self, mode: TurnMode) -> Result<Turn> {
        if let Some(turn) = &self.turn {
            warn!(active = %turn.id, "Rejecting turn while another is in flight.");
            return Err(Error::TurnInFlight(self.session_id.clone()));
        }

        let search_query_id = self.search_query_id.ok_or(Error::MissingContext)?;
        Ok(Turn::new(mode, search_query_id))
    }

    fn start(&mut self, turn: Turn) -> TurnId {
        let id = turn.id;
        debug!(%id, session_id = self.session_id, mode = ?turn.mode, "Starting turn.");

        self.status = TurnStatus::Streaming;
        self.turn = Some(turn);
        id
    }

    fn take_turn(&mut self, id: TurnId) -> Option<Turn> {
        if self.turn.as_ref().is_some_and(|turn| turn.id == id) {
            return self.turn.take();
        }

        warn!(%id, "Ignoring completion for a turn that is not in flight.");
        None
    }

    fn attach_audio(&mut self, turn: &mut Turn) {
        if turn.audio.is_empty() {
            return;
        }

        let blob = match turn.audio.reassemble() {
            Ok(Some(blob)) => blob,
            Ok(None) => return,
            Err(error) => {
                warn!(%error, "Discarding undecodable audio.");
                return;
            }
        };

        let Some(message) = turn.answer_index.and_then(|i| self.messages.get_mut(i)) else {
            return;
        };

        let url = self.audio.insert(blob);
        if !message.attach_audio(url.clone()) {
            self.audio.remove(&url);
        }
    }
}

/// Apply one event to a conversation, returning the new state.
#[must_use]
pub fn reduce(mut conversation: Conversation, id: TurnId, event: &StreamEvent) -> Conversation {
    conversation.apply(id, event);
    conversation
}

#[cfg(test)]
#[path = "conversation_tests.rs"]
mod tests;
