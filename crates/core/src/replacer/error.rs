//! Error types for the replacer module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while committing an artifact over its source.
///
/// Each variant states which copy of the audio survives.
#[derive(Debug, Error)]
pub enum ReplaceError {
    /// Source file not found. Nothing was changed.
    #[error("Source file not found: {path}")]
    SourceNotFound { path: PathBuf },

    /// Artifact not found. Nothing was changed.
    #[error("Artifact not found: {path}")]
    ArtifactNotFound { path: PathBuf },

    /// Another file already occupies the converted name. Nothing was changed.
    #[error("Destination already exists: {path}")]
    DestinationExists { path: PathBuf },

    /// Owner and permissions of the source could not be read. Nothing was changed.
    #[error("Failed to read ownership of {path}")]
    OwnershipUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to move the artifact into place. The source is untouched.
    #[error("Failed to move file from {source} to {destination}")]
    MoveFailed {
        source: PathBuf,
        destination: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// Failed to copy the artifact across volumes. The source is untouched.
    #[error("Failed to copy file from {source} to {destination}")]
    CopyFailed {
        source: PathBuf,
        destination: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// The cross-volume copy does not match the artifact. The source is untouched.
    #[error("Checksum mismatch for {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    /// Owner or permissions could not be reapplied to the converted file.
    ///
    /// When the converted file has a new name it is removed again and the
    /// source is left as the only copy.
    #[error("Failed to restore ownership on {path}")]
    OwnershipRestoreFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The converted file is in place but the original could not be deleted.
    #[error("Failed to delete original file: {path}")]
    CleanupFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ReplaceError {
    /// Creates a copy failed error.
    pub fn copy_failed(source: PathBuf, destination: PathBuf, error: std::io::Error) -> Self {
        Self::CopyFailed {
            source,
            destination,
            error,
        }
    }

    /// Creates a move failed error.
    pub fn move_failed(source: PathBuf, destination: PathBuf, error: std::io::Error) -> Self {
        Self::MoveFailed {
            source,
            destination,
            error,
        }
    }
}
