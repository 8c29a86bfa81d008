//! Transport clients for the interview backend.
//!
//! - [`Client::stream_chat`] drives the text chat event stream.
//! - [`Client::stream_speech`] drives a speech session over a WebSocket.
//! - The remaining methods are plain request/response calls to collaborator
//!   endpoints.

mod chat;
mod client;
mod error;
mod speech;
pub mod types;

pub use chat::EventStream;
pub use client::Client;
pub use error::Error;
pub use speech::{SpeechOutcome, SpeechRequest};
