//! Runs a complete turn: starts it on the [`Conversation`], drives the
//! transport and folds every event into the conversation as it arrives.

use ipp_client::{Client, SpeechOutcome, SpeechRequest};
use tracing::{debug, info};

use crate::{
    Conversation, Turn, TurnId, TurnStatus,
    audio::{AudioBlob, RECORDING_MEDIA_TYPE},
    error::{Error, Result},
};

/// Options forwarded in the speech session's `start` message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechOptions {
    pub tts_enabled: bool,
    pub language_code: Option<String>,
}

impl Default for SpeechOptions {
    fn default() -> Self {
        Self {
            tts_enabled: true,
            language_code: None,
        }
    }
}

/// The result of a turn that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReport {
    pub id: TurnId,
    pub status: TurnStatus,

    /// How the speech session ended. `None` for chat turns.
    pub speech: Option<SpeechOutcome>,
}

/// Send a typed message and stream the answer into `conversation`.
///
/// Returns an error if the turn could not start, the transport failed, or
/// the server reported an error event.
pub async fn chat_turn(
    client: &Client,
    conversation: &mut Conversation,
    message: &str,
) -> Result<TurnReport> {
    let id = conversation.begin_chat_turn(message)?;
    let search_query_id = conversation
        .active_turn()
        .map(Turn::search_query_id)
        .ok_or(Error::MissingContext)?;
    let session_id = conversation.session_id().to_owned();

    let result = client
        .stream_chat(&session_id, search_query_id, message.trim(), |event| {
            conversation.apply(id, &event);
        })
        .await;

    finish(conversation, id, result.map(|()| None))
}

/// Send a recorded clip over the speech socket and stream the transcript,
/// answer and synthesized audio into `conversation`.
pub async fn speech_turn(
    client: &Client,
    conversation: &mut Conversation,
    clip: Vec<u8>,
    options: &SpeechOptions,
) -> Result<TurnReport> {
    let recording = AudioBlob::new(RECORDING_MEDIA_TYPE, clip.clone());
    let id = conversation.begin_speech_turn(Some(recording))?;
    let search_query_id = conversation
        .active_turn()
        .map(Turn::search_query_id)
        .ok_or(Error::MissingContext)?;

    let request = SpeechRequest {
        session_id: conversation.session_id().to_owned(),
        search_query_id,
        audio: clip,
        tts_enabled: options.tts_enabled,
        language_code: options.language_code.clone(),
    };

    let result = client
        .stream_speech(&request, |event| conversation.apply(id, &event))
        .await;

    finish(conversation, id, result.map(Some))
}

fn finish(
    conversation: &mut Conversation,
    id: TurnId,
    result: std::result::Result<Option<SpeechOutcome>, ipp_client::Error>,
) -> Result<TurnReport> {
    match result {
        Ok(speech) => {
            let status = conversation.end_turn(id);
            debug!(%id, ?status, ?speech, "Turn transport ended.");

            if let TurnStatus::Failed(reason) = status {
                return Err(Error::Failed(reason));
            }

            info!(%id, messages = conversation.messages().len(), ?status, "Turn finished.");
            Ok(TurnReport { id, status, speech })
        }
        Err(error) => {
            conversation.fail_turn(id, error.to_string());
            Err(error.into())
        }
    }
}
