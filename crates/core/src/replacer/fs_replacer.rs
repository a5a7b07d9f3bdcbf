//! File system replacer implementation.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::fs::Permissions;
use std::io::ErrorKind;
use std::os::unix::fs::{MetadataExt, PermissionsExt};
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader, BufWriter};
use tracing::{debug, warn};
use uuid::Uuid;

use super::config::ReplacerConfig;
use super::error::ReplaceError;
use super::traits::{converted_path, Replacer};
use super::PARTIAL_SUFFIX;

/// Owner, group and mode captured from the original before any mutation.
#[derive(Debug, Clone, Copy)]
struct Ownership {
    uid: u32,
    gid: u32,
    mode: u32,
}

/// File system based replacer implementation.
pub struct FsReplacer {
    config: ReplacerConfig,
}

impl FsReplacer {
    /// Creates a new file system replacer with the given configuration.
    pub fn new(config: ReplacerConfig) -> Self {
        Self { config }
    }

    /// Creates a replacer with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(ReplacerConfig::default())
    }

    async fn capture_ownership(path: &Path) -> Result<Ownership, ReplaceError> {
        let meta = fs::metadata(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ReplaceError::SourceNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ReplaceError::OwnershipUnreadable {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;

        Ok(Ownership {
            uid: meta.uid(),
            gid: meta.gid(),
            mode: meta.mode() & 0o7777,
        })
    }

    /// Attempts to move a file atomically (rename). Returns `false` when the
    /// two paths are on different volumes.
    async fn try_atomic_move(source: &Path, destination: &Path) -> Result<bool, std::io::Error> {
        match fs::rename(source, destination).await {
            Ok(()) => Ok(true),
            Err(e) if is_cross_device(&e) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Moves `source` to a `destination` that must not exist yet.
    ///
    /// The name is claimed with a hard link, or with an exclusive placeholder
    /// on file systems without hard links, so two concurrent commits to the
    /// same destination cannot both succeed. Fails with `AlreadyExists` when
    /// the destination is taken and with a cross-device error when the paths
    /// are on different volumes.
    async fn claim(source: &Path, destination: &Path) -> Result<(), std::io::Error> {
        match fs::hard_link(source, destination).await {
            Ok(()) => {
                if let Err(e) = fs::remove_file(source).await {
                    warn!(path = %source.display(), error = %e, "Failed to remove linked file");
                }
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists || is_cross_device(&e) => Err(e),
            Err(e) => {
                debug!(destination = %destination.display(), error = %e, "Hard link unavailable, reserving name");
                fs::OpenOptions::new()
                    .write(true)
                    .create_new(true)
                    .open(destination)
                    .await?;
                // Only replaces our own placeholder
                if let Err(e) = fs::rename(source, destination).await {
                    let _ = fs::remove_file(destination).await;
                    return Err(e);
                }
                Ok(())
            }
        }
    }

    /// Hidden sibling of `destination` used while copying across volumes.
    /// Unique per commit so concurrent copies never share one.
    fn partial_path(destination: &Path) -> PathBuf {
        let name = destination
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        destination.with_file_name(format!(".{}.{}{}", name, Uuid::new_v4().simple(), PARTIAL_SUFFIX))
    }

    /// Copies `source` to `destination`, fsyncs it and returns the SHA-256 of
    /// the bytes read.
    async fn copy_file(&self, source: &Path, destination: &Path) -> Result<String, ReplaceError> {
        let copy_err = |e: std::io::Error| {
            ReplaceError::copy_failed(source.to_path_buf(), destination.to_path_buf(), e)
        };

        let source_file = File::open(source).await.map_err(copy_err)?;
        let dest_file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(destination)
            .await
            .map_err(copy_err)?;

        let mut reader = BufReader::with_capacity(self.config.buffer_size, source_file);
        let mut writer = BufWriter::with_capacity(self.config.buffer_size, dest_file);
        let mut hasher = Sha256::new();
        let mut buffer = vec![0u8; self.config.buffer_size];

        loop {
            let bytes_read = reader.read(&mut buffer).await.map_err(copy_err)?;
            if bytes_read == 0 {
                break;
            }
            hasher.update(&buffer[..bytes_read]);
            writer
                .write_all(&buffer[..bytes_read])
                .await
                .map_err(copy_err)?;
        }

        writer.flush().await.map_err(copy_err)?;
        writer.into_inner().sync_all().await.map_err(copy_err)?;

        Ok(format!("{:x}", hasher.finalize()))
    }

    /// Calculates the SHA-256 checksum of a file.
    async fn calculate_checksum(&self, path: &Path) -> Result<String, std::io::Error> {
        let file = File::open(path).await?;
        let mut reader = BufReader::with_capacity(self.config.buffer_size, file);
        let mut buffer = vec![0u8; self.config.buffer_size];
        let mut hasher = Sha256::new();

        loop {
            let bytes_read = reader.read(&mut buffer).await?;
            if bytes_read == 0 {
                break;
            }
            hasher.update(&buffer[..bytes_read]);
        }

        Ok(format!("{:x}", hasher.finalize()))
    }

    /// Copies the artifact next to `destination`, verifies it, then moves it
    /// to `destination`. With `exclusive`, an existing destination is refused.
    async fn copy_into_place(
        &self,
        artifact: &Path,
        destination: &Path,
        exclusive: bool,
    ) -> Result<(), ReplaceError> {
        let partial = Self::partial_path(destination);

        let result = match self.copy_verified(artifact, &partial).await {
            Ok(()) if exclusive => Self::claim(&partial, destination)
                .await
                .map_err(|e| Self::claim_error(&partial, destination, e)),
            Ok(()) => fs::rename(&partial, destination)
                .await
                .map_err(|e| ReplaceError::move_failed(partial.clone(), destination.to_path_buf(), e)),
            Err(e) => Err(e),
        };

        if result.is_err() {
            let _ = fs::remove_file(&partial).await;
            return result;
        }

        if let Err(e) = fs::remove_file(artifact).await {
            warn!(artifact = %artifact.display(), error = %e, "Failed to remove scratch artifact");
        }
        Ok(())
    }

    fn claim_error(from: &Path, destination: &Path, e: std::io::Error) -> ReplaceError {
        if e.kind() == ErrorKind::AlreadyExists {
            ReplaceError::DestinationExists {
                path: destination.to_path_buf(),
            }
        } else {
            ReplaceError::move_failed(from.to_path_buf(), destination.to_path_buf(), e)
        }
    }

    async fn copy_verified(&self, artifact: &Path, partial: &Path) -> Result<(), ReplaceError> {
        let expected = self.copy_file(artifact, partial).await?;
        let actual = self.calculate_checksum(partial).await.map_err(|e| {
            ReplaceError::copy_failed(artifact.to_path_buf(), partial.to_path_buf(), e)
        })?;

        if expected != actual {
            return Err(ReplaceError::ChecksumMismatch {
                path: partial.to_path_buf(),
                expected,
                actual,
            });
        }
        Ok(())
    }

    /// Flushes the directory entry of `path` so a rename survives a crash.
    async fn sync_parent(path: &Path) {
        let Some(parent) = path.parent() else {
            return;
        };
        let synced = match File::open(parent).await {
            Ok(dir) => dir.sync_all().await,
            Err(e) => Err(e),
        };
        if let Err(e) = synced {
            debug!(dir = %parent.display(), error = %e, "Directory sync failed");
        }
    }

    async fn restore_ownership(path: &Path, ownership: Ownership) -> Result<(), std::io::Error> {
        let meta = fs::metadata(path).await?;
        if meta.uid() != ownership.uid || meta.gid() != ownership.gid {
            std::os::unix::fs::chown(path, Some(ownership.uid), Some(ownership.gid))?;
        }

        // After chown, which clears setuid/setgid bits
        fs::set_permissions(path, Permissions::from_mode(ownership.mode)).await
    }
}

/// Cross-filesystem moves fail with EXDEV (18 on Linux).
fn is_cross_device(e: &std::io::Error) -> bool {
    e.kind() == ErrorKind::CrossesDevices || e.raw_os_error() == Some(18)
}

#[async_trait]
impl Replacer for FsReplacer {
    fn name(&self) -> &str {
        "fs"
    }

    async fn commit(
        &self,
        source: &Path,
        artifact: &Path,
        extension: &str,
    ) -> Result<PathBuf, ReplaceError> {
        let new_path = converted_path(source, extension);
        let renamed = new_path != source;

        let ownership = Self::capture_ownership(source).await?;

        if !artifact.exists() {
            return Err(ReplaceError::ArtifactNotFound {
                path: artifact.to_path_buf(),
            });
        }
        // Early refusal; the move itself claims the name atomically
        if renamed && fs::symlink_metadata(&new_path).await.is_ok() {
            return Err(ReplaceError::DestinationExists { path: new_path });
        }

        let moved = if !self.config.prefer_atomic_moves {
            false
        } else if renamed {
            match Self::claim(artifact, &new_path).await {
                Ok(()) => true,
                Err(e) if is_cross_device(&e) => false,
                Err(e) => return Err(Self::claim_error(artifact, &new_path, e)),
            }
        } else {
            Self::try_atomic_move(artifact, &new_path)
                .await
                .map_err(|e| ReplaceError::move_failed(artifact.to_path_buf(), new_path.clone(), e))?
        };

        if !moved {
            debug!(artifact = %artifact.display(), destination = %new_path.display(), "Copying across volumes");
            self.copy_into_place(artifact, &new_path, renamed).await?;
        }
        Self::sync_parent(&new_path).await;

        if let Err(e) = Self::restore_ownership(&new_path, ownership).await {
            if renamed {
                // Leave the untouched original as the only copy
                let _ = fs::remove_file(&new_path).await;
            }
            return Err(ReplaceError::OwnershipRestoreFailed {
                path: new_path,
                source: e,
            });
        }

        if renamed {
            fs::remove_file(source)
                .await
                .map_err(|e| ReplaceError::CleanupFailed {
                    path: source.to_path_buf(),
                    source: e,
                })?;
        }

        debug!(source = %source.display(), destination = %new_path.display(), "Committed");
        Ok(new_path)
    }
}
