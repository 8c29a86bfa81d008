//! Turn lifecycle for interview conversations.
//!
//! A [`Conversation`] owns the committed messages of a session. Each exchange
//! with the backend is a turn: it is started on the conversation, fed the
//! transport's events through [`Conversation::apply`], and released when the
//! transport resolves. The [`driver`] functions tie this to an
//! [`ipp_client::Client`].

mod audio;
mod conversation;
pub mod driver;
mod error;
mod message;
mod turn;

pub use audio::{
    AudioBlob, AudioReassembler, AudioStore, RECORDING_MEDIA_TYPE, SYNTHESIZED_MEDIA_TYPE,
};
pub use conversation::{Conversation, TurnStatus, reduce};
pub use driver::{SpeechOptions, TurnReport, chat_turn, speech_turn};
pub use error::Error;
pub use message::CommittedMessage;
pub use turn::{Turn, TurnId, TurnMode, TurnPhase};
