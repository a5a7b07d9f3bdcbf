//! Recursive enumeration of the files under an input root.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::replacer::PARTIAL_SUFFIX;

/// Errors that abort a scan. Unreadable entries below the root are skipped.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Input root not found: {0}")]
    RootNotFound(PathBuf),

    #[error("Input root is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Input root unreadable: {path}: {source}")]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Scan task failed: {0}")]
    Join(String),
}

/// Walks a directory tree and returns every regular file in it.
#[derive(Debug, Clone, Default)]
pub struct DirectoryWalker {
    excluded: Vec<PathBuf>,
}

impl DirectoryWalker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Skips everything below `dir`, e.g. a scratch directory placed inside the root.
    pub fn exclude(mut self, dir: impl Into<PathBuf>) -> Self {
        self.excluded.push(dir.into());
        self
    }

    /// Lists all regular files below `root`, in no particular order.
    ///
    /// Symlinks are not followed. Runs on the blocking pool.
    pub async fn scan(&self, root: &Path) -> Result<Vec<PathBuf>, ScanError> {
        let root = root.to_path_buf();
        let excluded = self.excluded.clone();

        tokio::task::spawn_blocking(move || scan_sync(&root, &excluded))
            .await
            .map_err(|e| ScanError::Join(e.to_string()))?
    }
}

fn scan_sync(root: &Path, excluded: &[PathBuf]) -> Result<Vec<PathBuf>, ScanError> {
    let meta = std::fs::metadata(root).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ScanError::RootNotFound(root.to_path_buf())
        } else {
            ScanError::RootUnreadable {
                path: root.to_path_buf(),
                source,
            }
        }
    })?;
    if !meta.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    // Surface permission problems on the root itself instead of an empty batch
    std::fs::read_dir(root).map_err(|source| ScanError::RootUnreadable {
        path: root.to_path_buf(),
        source,
    })?;

    let excluded = rebase_excluded(root, excluded);
    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| !excluded.iter().any(|dir| entry.path().starts_with(dir)));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Skipping unreadable entry");
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let is_partial = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.ends_with(PARTIAL_SUFFIX));
        if is_partial {
            debug!(path = %entry.path().display(), "Skipping leftover partial copy");
            continue;
        }

        files.push(entry.into_path());
    }

    debug!(root = %root.display(), count = files.len(), "Scan complete");
    Ok(files)
}

/// Expresses each excluded directory below `root` in the same form as the
/// paths the walker yields, so `./music` and `/abs/music/scratch` still match.
///
/// Directories that do not exist or lie outside `root` are dropped.
fn rebase_excluded(root: &Path, excluded: &[PathBuf]) -> Vec<PathBuf> {
    let canonical_root = match std::fs::canonicalize(root) {
        Ok(path) => path,
        Err(_) => return excluded.to_vec(),
    };

    excluded
        .iter()
        .filter_map(|dir| {
            let canonical = std::fs::canonicalize(dir).ok()?;
            let relative = canonical.strip_prefix(&canonical_root).ok()?;
            Some(root.join(relative))
        })
        .collect()
}
