//! Wire formats for the interview transports.
//!
//! The chat stream is a sequence of newline-delimited `data:` frames, each
//! carrying a JSON [`StreamEvent`]. The speech socket exchanges JSON text
//! messages: [`ClientMessage`]s outbound, [`StreamEvent`]s inbound.

mod event;
mod frame;
mod parse;
pub mod speech;

pub use event::{EventKind, StreamEvent};
pub use frame::{FrameCodec, FrameDecoder};
pub use parse::parse_event;
pub use speech::ClientMessage;
