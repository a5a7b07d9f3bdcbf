//! Error types for the transcoder module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while encoding a single file.
///
/// Every variant is confined to the task that produced it.
#[derive(Debug, Error)]
pub enum TranscodeError {
    /// FFmpeg binary not found.
    #[error("FFmpeg not found at path: {path}")]
    FfmpegNotFound { path: PathBuf },

    /// Source file not found.
    #[error("Source file not found: {path}")]
    SourceNotFound { path: PathBuf },

    /// Source could not be decoded.
    #[error("Source is unreadable or corrupt: {reason}")]
    SourceUnreadable { reason: String },

    /// The container holds a codec the decoder does not support.
    #[error("Unsupported codec: {reason}")]
    UnsupportedCodec { reason: String },

    /// Encoder process failed.
    #[error("Encoding failed: {reason}")]
    EncoderFailed {
        reason: String,
        stderr: Option<String>,
    },

    /// Scratch directory could not be prepared.
    #[error("Scratch directory unavailable: {path}")]
    ScratchUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Scratch volume ran out of space.
    #[error("Insufficient scratch space at {path}")]
    InsufficientSpace { path: PathBuf },

    /// Encode timed out.
    #[error("Encoding timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// I/O error during encoding.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TranscodeError {
    /// Creates an encoder failure with captured stderr.
    pub fn encoder_failed(reason: impl Into<String>, stderr: Option<String>) -> Self {
        Self::EncoderFailed {
            reason: reason.into(),
            stderr,
        }
    }

    /// Classifies a failed ffmpeg run from its stderr output.
    pub fn from_ffmpeg_stderr(scratch: PathBuf, exit_code: Option<i32>, stderr: &str) -> Self {
        let lowered = stderr.to_lowercase();
        let detail = stderr.trim().lines().last().unwrap_or_default().to_string();

        if lowered.contains("no space left on device") {
            Self::InsufficientSpace { path: scratch }
        } else if lowered.contains("invalid data found when processing input")
            || lowered.contains("end of file")
            || lowered.contains("moov atom not found")
        {
            Self::SourceUnreadable { reason: detail }
        } else if (lowered.contains("decoder") && lowered.contains("not found"))
            || lowered.contains("could not find codec parameters")
        {
            Self::UnsupportedCodec { reason: detail }
        } else {
            Self::encoder_failed(
                format!("FFmpeg exited with code: {:?}", exit_code),
                if stderr.trim().is_empty() {
                    None
                } else {
                    Some(stderr.to_string())
                },
            )
        }
    }
}
