//! Types for the transcoder module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Target audio format.
///
/// Only lossy encodings are listed: the pipeline converges files onto a
/// bitrate, which is meaningless for lossless codecs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioFormat {
    /// MPEG Audio Layer III
    #[default]
    Mp3,
    /// Advanced Audio Coding in an MPEG-4 container
    Aac,
    /// Ogg Vorbis
    OggVorbis,
    /// Opus
    Opus,
}

impl AudioFormat {
    /// Returns the file extension for this format, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Aac => "m4a",
            Self::OggVorbis => "ogg",
            Self::Opus => "opus",
        }
    }

    /// Returns the ffmpeg encoder name for this format.
    pub fn ffmpeg_codec(&self) -> &'static str {
        match self {
            Self::Mp3 => "libmp3lame",
            Self::Aac => "aac",
            Self::OggVorbis => "libvorbis",
            Self::Opus => "libopus",
        }
    }

    /// Short human-readable name used in notifications.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Mp3 => "MP3",
            Self::Aac => "AAC",
            Self::OggVorbis => "Ogg Vorbis",
            Self::Opus => "Opus",
        }
    }
}

/// A freshly encoded file waiting in scratch space to be committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Location of the encoded output.
    pub path: PathBuf,
    /// Size of the encoded output in bytes.
    pub size_bytes: u64,
}
