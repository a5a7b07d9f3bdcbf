//! Error types for tag access.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading or writing tags.
///
/// None of these fail a conversion task on their own.
#[derive(Debug, Error)]
pub enum TagError {
    /// The file's tags could not be read at all.
    #[error("Tags unavailable for {path}: {reason}")]
    Unavailable { path: PathBuf, reason: String },

    /// The stream bitrate could not be determined.
    #[error("Could not read bitrate of {path}: {reason}")]
    BitrateUnavailable { path: PathBuf, reason: String },

    /// Tags could not be persisted.
    #[error("Failed to write tags to {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },
}

impl TagError {
    pub fn unavailable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Unavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn bitrate_unavailable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::BitrateUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn write_failed(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::WriteFailed {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
