//! Trait definitions for the replacer module.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::error::ReplaceError;

/// Swaps an original file for its converted artifact.
#[async_trait]
pub trait Replacer: Send + Sync {
    /// Returns the name of this replacer implementation.
    fn name(&self) -> &str;

    /// Moves `artifact` to `source` with its extension replaced by
    /// `extension`, carrying over owner, group and permission bits.
    ///
    /// The original is deleted last, and only when the new path differs.
    /// Returns the new path.
    async fn commit(
        &self,
        source: &Path,
        artifact: &Path,
        extension: &str,
    ) -> Result<PathBuf, ReplaceError>;
}

/// Path the converted file ends up at.
pub fn converted_path(source: &Path, extension: &str) -> PathBuf {
    let same = source
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));

    if same {
        source.to_path_buf()
    } else {
        source.with_extension(extension)
    }
}
