use std::io;

pub(crate) type Result<T> = std::result::Result<T, Error>;

/// CLI Error types
#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ipp_config::Error),

    #[error(transparent)]
    Client(#[from] ipp_client::Error),

    #[error(transparent)]
    Turn(#[from] ipp_turn::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Session {0} has no exchange to evaluate yet")]
    NotReady(String),
}
