pub(crate) type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("No search query selected. Choose an interview context first.")]
    MissingContext,

    #[error("Message is empty")]
    EmptyMessage,

    #[error("A turn is already in flight for session {0}")]
    TurnInFlight(String),

    #[error("Interview context is locked to search query {0} once the conversation started")]
    ContextLocked(i64),

    #[error("Failed to decode audio fragment #{index}: {source}")]
    AudioDecode {
        index: usize,
        #[source]
        source: base64::DecodeError,
    },

    #[error("Audio fragments were already reassembled")]
    AudioConsumed,

    /// The turn ended with a protocol-level `error` event.
    #[error("Turn failed: {0}")]
    Failed(String),

    #[error("Client error: {0}")]
    Client(#[from] ipp_client::Error),
}

#[cfg(test)]
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        if std::mem::discriminant(self) != std::mem::discriminant(other) {
            return false;
        }

        // Good enough for testing purposes
        format!("{self:?}") == format!("{other:?}")
    }
}
