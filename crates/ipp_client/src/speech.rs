use futures::{SinkExt as _, StreamExt as _};
use ipp_protocol::{ClientMessage, EventKind, StreamEvent, parse_event};
use tokio_tungstenite::{
    connect_async,
    tungstenite::{self, Message},
};
use tracing::{debug, trace, warn};
use url::Url;

use crate::{
    Client,
    error::{Error, Result},
};

/// Failure reason used when an `error` event carries no message.
const GENERIC_SPEECH_ERROR: &str = "Speech error";

/// A recorded clip to send over the speech socket.
#[derive(Debug, Clone)]
pub struct SpeechRequest {
    pub session_id: String,
    pub search_query_id: i64,

    /// The complete recording. It is sent as a single base64 payload.
    pub audio: Vec<u8>,
    pub tts_enabled: bool,
    pub language_code: Option<String>,
}

/// How a speech session ended, when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechOutcome {
    /// The server sent the completion sentinel.
    Completed,

    /// The socket closed before the completion sentinel (or an error) was
    /// seen.
    ClosedWithoutSentinel,
}

impl Client {
    /// The speech socket URL: the base URL with its scheme mapped to
    /// `ws`/`wss` and `/speech/stream` appended to its path.
    pub fn speech_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)?;

        let scheme = match url.scheme() {
            "https" | "wss" => "wss",
            "http" | "ws" => "ws",
            other => return Err(Error::UnsupportedScheme(other.to_owned())),
        };
        url.set_scheme(scheme)
            .map_err(|()| Error::UnsupportedScheme(scheme.to_owned()))?;

        let path = format!("{}/speech/stream", url.path().trim_end_matches('/'));
        url.set_path(&path);

        Ok(url)
    }

    /// Run a speech session for a recorded clip.
    ///
    /// Sends the `start`, `audio` and `end` messages, then invokes `on_event`
    /// for every inbound event until the server sends the completion sentinel
    /// (success), an `error` event (failure) or closes the socket.
    pub async fn stream_speech<F>(
        &self,
        request: &SpeechRequest,
        mut on_event: F,
    ) -> Result<SpeechOutcome>
    where
        F: FnMut(StreamEvent),
    {
        let url = self.speech_url()?;

        trace!(%url, session_id = request.session_id, "Connecting to speech socket.");
        let (socket, _) = connect_async(url.as_str())
            .await
            .map_err(|e| Error::Connect(e.to_string()))?;
        let (mut sink, mut stream) = socket.split();

        let handshake = [
            ClientMessage::start(
                request.session_id.clone(),
                request.search_query_id,
                request.tts_enabled,
                request.language_code.clone(),
            ),
            ClientMessage::audio(&request.audio),
            ClientMessage::End,
        ];

        for message in handshake {
            sink.send(Message::Text(message.to_json()?.into()))
                .await
                .map_err(socket_error)?;
        }
        trace!(audio_bytes = request.audio.len(), "Speech handshake sent.");

        while let Some(message) = stream.next().await {
            let text = match message {
                Ok(Message::Text(text)) => text,
                Ok(Message::Close(frame)) => {
                    debug!(?frame, "Speech socket closed by server.");
                    break;
                }
                Ok(_) => continue,
                Err(tungstenite::Error::ConnectionClosed) => break,
                Err(error) => return Err(socket_error(error)),
            };

            let Some(event) = parse_event(text.as_str()) else {
                continue;
            };

            let completed = event.is_session_completed();
            let failure = (event.kind == EventKind::Error)
                .then(|| event.error().unwrap_or(GENERIC_SPEECH_ERROR).to_owned());

            on_event(event);

            if completed {
                debug!(session_id = request.session_id, "Speech session completed.");
                close(&mut sink).await;
                return Ok(SpeechOutcome::Completed);
            }

            if let Some(failure) = failure {
                warn!(session_id = request.session_id, error = failure, "Speech session failed.");
                close(&mut sink).await;
                return Err(Error::Speech(failure));
            }
        }

        warn!(
            session_id = request.session_id,
            strict = self.strict_close,
            "Speech socket closed without completion sentinel."
        );

        if self.strict_close {
            return Err(Error::ClosedWithoutSentinel);
        }

        Ok(SpeechOutcome::ClosedWithoutSentinel)
    }
}

fn socket_error(error: tungstenite::Error) -> Error {
    Error::Socket(error.to_string())
}

async fn close<S>(sink: &mut S)
where
    S: futures::Sink<Message, Error = tungstenite::Error> + Unpin,
{
    if let Err(error) = sink.close().await {
        debug!(%error, "Failed to close speech socket.");
    }
}
