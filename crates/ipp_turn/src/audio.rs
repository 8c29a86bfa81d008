use std::collections::HashMap;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Media type of audio synthesized by the speech backend.
pub const SYNTHESIZED_MEDIA_TYPE: &str = "audio/mpeg";

/// Media type of clips recorded by the user.
pub const RECORDING_MEDIA_TYPE: &str = "audio/webm";

/// A complete, playable audio object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioBlob {
    media_type: String,
    bytes: Vec<u8>,
}

impl AudioBlob {
    #[must_use]
    pub fn new(media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            media_type: media_type.into(),
            bytes,
        }
    }

    #[must_use]
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Collects base64 audio fragments in arrival order and turns them into a
/// single [`AudioBlob`] once the stream is over.
///
/// Fragments are stored exactly as received; nothing is decoded until
/// [`AudioReassembler::reassemble`] is called. Reassembly consumes the
/// fragments and can happen once.
#[derive(Debug, Default)]
pub struct AudioReassembler {
    fragments: Vec<String>,
    consumed: bool,
}

impl AudioReassembler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, fragment: impl Into<String>) {
        if self.consumed {
            warn!("Ignoring audio fragment received after reassembly.");
            return;
        }

        self.fragments.push(fragment.into());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    #[must_use]
    pub fn is_consumed(&self) -> bool {
        self.consumed
    }

    /// Decode all fragments and concatenate them, in arrival order.
    ///
    /// Returns `Ok(None)` if no fragment was received.
    pub fn reassemble(&mut self) -> Result<Option<AudioBlob>> {
        if self.consumed {
            return Err(Error::AudioConsumed);
        }
        self.consumed = true;

        let fragments = std::mem::take(&mut self.fragments);
        if fragments.is_empty() {
            return Ok(None);
        }

        let mut bytes = Vec::with_capacity(fragments.iter().map(|f| f.len() / 4 * 3).sum());
        for (index, fragment) in fragments.iter().enumerate() {
            STANDARD
                .decode_vec(fragment, &mut bytes)
                .map_err(|source| Error::AudioDecode { index, source })?;
        }

        debug!(
            fragments = fragments.len(),
            bytes = bytes.len(),
            "Reassembled audio."
        );

        Ok(Some(AudioBlob::new(SYNTHESIZED_MEDIA_TYPE, bytes)))
    }
}

/// Keeps audio blobs addressable by a local `blob:` reference, the value
/// stored in [`CommittedMessage::audio_url`].
///
/// [`CommittedMessage::audio_url`]: crate::CommittedMessage::audio_url
#[derive(Debug, Default)]
pub struct AudioStore {
    blobs: HashMap<String, AudioBlob>,
}

impl AudioStore {
    /// Store a blob and return its reference.
    pub fn insert(&mut self, blob: AudioBlob) -> String {
        let url = format!("blob:ipp/{}", Uuid::new_v4());
        self.blobs.insert(url.clone(), blob);
        url
    }

    #[must_use]
    pub fn get(&self, url: &str) -> Option<&AudioBlob> {
        self.blobs.get(url)
    }

    pub fn remove(&mut self, url: &str) -> Option<AudioBlob> {
        self.blobs.remove(url)
    }

    /// Drop every stored blob.
    pub fn clear(&mut self) {
        self.blobs.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

#[cfg(test)]
#[path = "audio_tests.rs"]
mod tests;
