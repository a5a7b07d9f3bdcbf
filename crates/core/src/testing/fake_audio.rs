//! A stand-in audio container for tests.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::tags::TagSet;

/// JSON document standing in for an encoded audio file.
///
/// Tags live inside the file, so they move with it across renames just
/// like real embedded tags. `payload` pads the file to a chosen size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FakeAudio {
    /// Stream bitrate in kbps.
    pub bitrate_kbps: u32,
    #[serde(default)]
    pub tags: TagSet,
    /// The audio data cannot be decoded.
    #[serde(default)]
    pub corrupt: bool,
    /// The tag header cannot be read.
    #[serde(default)]
    pub tags_unreadable: bool,
    #[serde(default)]
    pub payload: String,
}

impl FakeAudio {
    pub fn new(bitrate_kbps: u32) -> Self {
        Self {
            bitrate_kbps,
            tags: TagSet::new(),
            corrupt: false,
            tags_unreadable: false,
            payload: String::new(),
        }
    }

    pub fn with_tags(mut self, tags: TagSet) -> Self {
        self.tags = tags;
        self
    }

    /// Pads the payload to `len` bytes.
    pub fn with_payload_len(mut self, len: usize) -> Self {
        self.payload = "x".repeat(len);
        self
    }

    pub fn corrupt(mut self) -> Self {
        self.corrupt = true;
        self
    }

    pub fn with_unreadable_tags(mut self) -> Self {
        self.tags_unreadable = true;
        self
    }

    pub fn write(&self, path: &Path) -> std::io::Result<()> {
        let bytes = serde_json::to_vec(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, bytes)
    }

    pub fn read(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        serde_json::from_slice(&bytes)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}
