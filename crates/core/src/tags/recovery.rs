//! Filename-based recovery of missing artist/title tags.
//!
//! When tags cannot be copied onto a converted file, or the copied tags lack
//! an artist or a title, a [`RecoveryPolicy`] derives them from the file name.
//! Estimates only fill fields that are empty; existing values are kept.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::TagError;
use super::traits::TagAccessor;
use super::types::{TagField, TagSet};

/// Artist and title derived from a file name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimatedTags {
    pub artist: String,
    pub title: String,
}

/// Derives artist and title from a file stem (the name without extension).
pub trait RecoveryPolicy: Send + Sync {
    fn estimate(&self, file_stem: &str) -> Option<EstimatedTags>;
}

impl<F> RecoveryPolicy for F
where
    F: Fn(&str) -> Option<EstimatedTags> + Send + Sync,
{
    fn estimate(&self, file_stem: &str) -> Option<EstimatedTags> {
        self(file_stem)
    }
}

/// Splits `"Artist<sep>Title"` at the first occurrence of the separator.
#[derive(Debug, Clone)]
pub struct SeparatorPolicy {
    separator: String,
}

impl SeparatorPolicy {
    pub const DEFAULT_SEPARATOR: &'static str = " - ";

    pub fn new(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
        }
    }
}

impl Default for SeparatorPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SEPARATOR)
    }
}

impl RecoveryPolicy for SeparatorPolicy {
    fn estimate(&self, file_stem: &str) -> Option<EstimatedTags> {
        let (artist, title) = file_stem.split_once(self.separator.as_str())?;
        let (artist, title) = (artist.trim(), title.trim());

        if artist.is_empty() || title.is_empty() {
            return None;
        }

        Some(EstimatedTags {
            artist: artist.to_string(),
            title: title.to_string(),
        })
    }
}

/// Result of a recovery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryOutcome {
    /// Artist and title were already present.
    NotNeeded,
    /// At least one field was filled from the file name.
    Estimated(EstimatedTags),
    /// The file name does not match the policy; tags are left as they are.
    NotEstimable,
}

/// Fills missing artist/title on `target` from the name of `name_source`.
///
/// `current` holds the tags `target` carries now (empty when they could not
/// be read). Only empty fields are written.
pub fn recover_missing_fields(
    accessor: &dyn TagAccessor,
    policy: &dyn RecoveryPolicy,
    name_source: &Path,
    target: &Path,
    current: &TagSet,
) -> Result<RecoveryOutcome, TagError> {
    if !current.lacks_identity() {
        return Ok(RecoveryOutcome::NotNeeded);
    }

    let stem = name_source
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();

    let Some(estimate) = policy.estimate(&stem) else {
        debug!(path = %name_source.display(), "File name does not yield artist/title");
        return Ok(RecoveryOutcome::NotEstimable);
    };

    let mut fill = TagSet::new();
    if current.artist().is_none() {
        fill.set(TagField::Artist, estimate.artist.as_str());
    }
    if current.title().is_none() {
        fill.set(TagField::Title, estimate.title.as_str());
    }

    accessor.write_tags(target, &fill)?;

    // Report the values the file ends up with
    Ok(RecoveryOutcome::Estimated(EstimatedTags {
        artist: current
            .artist()
            .map(str::to_string)
            .unwrap_or(estimate.artist),
        title: current.title().map(str::to_string).unwrap_or(estimate.title),
    }))
}
