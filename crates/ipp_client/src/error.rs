pub(crate) type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error (status {}): {}", .code, .message)]
    Api { code: u16, message: String },

    #[error("Failed to stream response: server returned no body")]
    MissingBody,

    #[error("Stream processing error: {0}")]
    Stream(String),

    #[error("Speech WebSocket connection error: {0}")]
    Connect(String),

    #[error("Speech WebSocket error: {0}")]
    Socket(String),

    /// An `error` event reported by the speech server.
    #[error("{0}")]
    Speech(String),

    #[error("Speech WebSocket closed before the session completed")]
    ClosedWithoutSentinel,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),
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
