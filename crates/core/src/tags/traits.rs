//! Trait definitions for tag access.

use std::path::Path;

use super::error::TagError;
use super::types::TagSet;

/// Reads and writes tags independent of the container format.
///
/// Implementations are synchronous; callers on the async runtime run them on
/// the blocking pool.
pub trait TagAccessor: Send + Sync {
    /// Returns the name of this accessor implementation.
    fn name(&self) -> &str;

    /// Audio stream bitrate in kbps.
    fn read_bitrate(&self, path: &Path) -> Result<u32, TagError>;

    /// Reads every known field of the file's tags.
    fn read_tags(&self, path: &Path) -> Result<TagSet, TagError>;

    /// Writes the fields present in `tags`, leaving the others untouched.
    fn write_tags(&self, path: &Path, tags: &TagSet) -> Result<(), TagError>;

    /// Copies the full tag set of `source` onto `dest` and persists it.
    ///
    /// Source values win over values already on `dest`. Returns the merged
    /// fields of `dest`. Fails with `TagError::Unavailable` when the source
    /// tags cannot be read.
    fn copy_tags(&self, source: &Path, dest: &Path) -> Result<TagSet, TagError>;
}
