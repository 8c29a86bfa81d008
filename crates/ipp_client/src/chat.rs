use std::{io, pin::Pin};

use futures::{Stream, StreamExt as _, TryStreamExt as _, future};
use ipp_protocol::{FrameCodec, StreamEvent, parse_event};
use reqwest::StatusCode;
use tokio_util::{codec::FramedRead, io::StreamReader};
use tracing::{debug, trace};

use crate::{
    Client,
    client::ensure_success,
    error::{Error, Result},
    types::InterviewRequest,
};

/// A stream of parsed chat events, in arrival order.
///
/// Malformed frames are dropped before they reach the stream; an `Err` item
/// means the underlying transport failed.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>;

impl Client {
    /// Send a chat message and invoke `on_event` once per parsed event.
    ///
    /// Resolves when the server ends the stream. A `complete` event does not
    /// end the stream by itself; interpreting it is up to the caller.
    pub async fn stream_chat<F>(
        &self,
        session_id: &str,
        search_query_id: i64,
        message: &str,
        mut on_event: F,
    ) -> Result<()>
    where
        F: FnMut(StreamEvent),
    {
        let mut events = self
            .chat_events(session_id, search_query_id, message)
            .await?;

        let mut count = 0_usize;
        while let Some(event) = events.next().await {
            on_event(event?);
            count += 1;
        }

        debug!(session_id, events = count, "Chat stream ended.");
        Ok(())
    }

    /// Open the chat event stream for a message.
    ///
    /// Fails if the request cannot be established, the server responds with an
    /// error status, or the response has no body.
    pub async fn chat_events(
        &self,
        session_id: &str,
        search_query_id: i64,
        message: &str,
    ) -> Result<EventStream> {
        let url = self.endpoint(&format!("chat/interview/{session_id}/stream"));
        let body = InterviewRequest {
            search_query_id,
            query: message,
        };

        trace!(%url, search_query_id, "Opening chat stream.");
        let response = self.http_client.post(&url).json(&body).send().await?;
        let response = ensure_success(response).await?;

        if response.status() == StatusCode::NO_CONTENT {
            return Err(Error::MissingBody);
        }

        let byte_stream = response.bytes_stream().map_err(io::Error::other);
        let frames = FramedRead::new(StreamReader::new(byte_stream), FrameCodec::new());

        let events = frames
            .map_err(|e| Error::Stream(format!("Stream error: {e}")))
            .try_filter_map(|payload| future::ready(Ok(parse_event(&payload))));

        Ok(Box::pin(events))
    }
}
