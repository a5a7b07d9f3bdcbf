//! Trait definitions for the transcoder module.

use async_trait::async_trait;
use std::path::Path;

use super::error::TranscodeError;
use super::types::{Artifact, AudioFormat};

/// A transcoder that re-encodes one audio file into scratch space.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Returns the name of this transcoder implementation.
    fn name(&self) -> &str;

    /// The format every artifact is encoded to.
    fn target_format(&self) -> AudioFormat;

    /// Encodes `source` at `bitrate_kbps` into a new scratch artifact.
    ///
    /// The source is never modified. On error no artifact is left behind.
    async fn transcode(&self, source: &Path, bitrate_kbps: u32)
        -> Result<Artifact, TranscodeError>;

    /// Validates that the transcoder is properly configured and ready.
    async fn validate(&self) -> Result<(), TranscodeError>;
}
