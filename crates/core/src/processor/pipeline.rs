//! Per-file conversion pipeline.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::inspector::{Eligibility, EligibilityInspector};
use crate::notify::{Notification, NotificationHandle};
use crate::replacer::Replacer;
use crate::tags::{
    recover_missing_fields, RecoveryOutcome, RecoveryPolicy, SeparatorPolicy, TagAccessor, TagError,
    TagSet,
};
use crate::transcoder::{Artifact, AudioFormat, Transcoder};

use super::config::ProcessorConfig;
use super::types::{ConversionOutcome, ProcessingStage};

/// Runs one file through inspect, transcode, metadata copy and commit.
///
/// Never returns an error: every failure becomes a `Failed` outcome and a
/// notification. Metadata problems are reported but never fail the file.
pub struct FileProcessor {
    config: ProcessorConfig,
    inspector: EligibilityInspector,
    transcoder: Arc<dyn Transcoder>,
    tags: Arc<dyn TagAccessor>,
    replacer: Arc<dyn Replacer>,
    recovery: Arc<dyn RecoveryPolicy>,
    notifications: NotificationHandle,
}

impl FileProcessor {
    /// Creates a processor converging files onto the transcoder's format.
    pub fn new(
        config: ProcessorConfig,
        transcoder: Arc<dyn Transcoder>,
        tags: Arc<dyn TagAccessor>,
        replacer: Arc<dyn Replacer>,
        notifications: NotificationHandle,
    ) -> Self {
        let inspector = EligibilityInspector::new(transcoder.target_format(), config.bitrate_kbps);
        Self {
            config,
            inspector,
            transcoder,
            tags,
            replacer,
            recovery: Arc::new(SeparatorPolicy::default()),
            notifications,
        }
    }

    /// Replaces the filename heuristic used when tags are missing.
    pub fn with_recovery_policy(mut self, policy: Arc<dyn RecoveryPolicy>) -> Self {
        self.recovery = policy;
        self
    }

    /// Format every eligible file converges to.
    pub fn target_format(&self) -> AudioFormat {
        self.inspector.target()
    }

    /// Processes a single file to completion.
    pub async fn process(&self, path: &Path) -> ConversionOutcome {
        let start = Instant::now();

        debug!(path = %path.display(), stage = %ProcessingStage::Inspecting, "Processing file");
        let eligibility = match self.inspect(path).await {
            Ok(eligibility) => eligibility,
            Err(reason) => return self.fail(path, ProcessingStage::Inspecting, reason).await,
        };

        if eligibility.is_skip() {
            debug!(path = %path.display(), reason = eligibility.as_str(), "Skipped");
            if self.config.repair_skipped_tags && eligibility != Eligibility::SkipWrongExtension {
                self.repair_in_place(path).await;
            }
            return ConversionOutcome::Skipped {
                reason: eligibility,
            };
        }

        let original_size = match tokio::fs::metadata(path).await {
            Ok(meta) => meta.len(),
            Err(e) => return self.fail(path, ProcessingStage::Inspecting, e.to_string()).await,
        };

        debug!(path = %path.display(), stage = %ProcessingStage::Transcoding, "Encoding");
        let artifact = match self
            .transcoder
            .transcode(path, self.config.bitrate_kbps)
            .await
        {
            Ok(artifact) => artifact,
            Err(e) => return self.fail(path, ProcessingStage::Transcoding, e.to_string()).await,
        };

        debug!(path = %path.display(), stage = %ProcessingStage::MetadataCopying, "Copying tags");
        self.carry_metadata(path, &artifact).await;

        debug!(path = %path.display(), stage = %ProcessingStage::Committing, "Committing");
        let extension = self.inspector.target().extension();
        let new_path = match self.replacer.commit(path, &artifact.path, extension).await {
            Ok(new_path) => new_path,
            Err(e) => {
                discard_artifact(&artifact.path).await;
                return self.fail(path, ProcessingStage::Committing, e.to_string()).await;
            }
        };

        let new_size = tokio::fs::metadata(&new_path)
            .await
            .map(|meta| meta.len())
            .unwrap_or(artifact.size_bytes);
        let bytes_saved = original_size.saturating_sub(new_size);

        info!(
            path = %new_path.display(),
            original_size,
            new_size,
            bytes_saved,
            duration_ms = start.elapsed().as_millis() as u64,
            "Converted"
        );

        ConversionOutcome::Converted {
            new_path,
            bytes_saved,
        }
    }

    async fn inspect(&self, path: &Path) -> Result<Eligibility, String> {
        let inspector = self.inspector;
        let tags = Arc::clone(&self.tags);
        let owned = path.to_path_buf();

        tokio::task::spawn_blocking(move || inspector.inspect(tags.as_ref(), &owned))
            .await
            .map_err(|e| format!("inspection task failed: {}", e))
    }

    /// Copies tags from `source` onto the artifact and fills missing
    /// artist/title from the file name. Failures only produce notifications.
    async fn carry_metadata(&self, source: &Path, artifact: &Artifact) {
        let tags = Arc::clone(&self.tags);
        let recovery = Arc::clone(&self.recovery);
        let source = source.to_path_buf();
        let target = artifact.path.clone();

        let events = tokio::task::spawn_blocking(move || {
            let mut events = Vec::new();

            let current = match tags.copy_tags(&source, &target) {
                Ok(copied) => copied,
                Err(e) => {
                    match &e {
                        TagError::Unavailable { .. } => {
                            info!(path = %source.display(), error = %e, "Source tags unavailable")
                        }
                        _ => {
                            warn!(path = %source.display(), error = %e, "Failed to copy tags");
                            events.push(Notification::MetadataCopyFailed {
                                path: source.clone(),
                                reason: e.to_string(),
                            });
                        }
                    }
                    tags.read_tags(&target).unwrap_or_default()
                }
            };

            events.extend(recover(
                tags.as_ref(),
                recovery.as_ref(),
                &source,
                &target,
                &current,
            ));
            events
        })
        .await;

        match events {
            Ok(events) => {
                for event in events {
                    self.notifications.emit(event).await;
                }
            }
            Err(e) => warn!(path = %artifact.path.display(), error = %e, "Metadata task failed"),
        }
    }

    /// Fills missing artist/title on a skipped target-format file in place.
    async fn repair_in_place(&self, path: &Path) {
        let tags = Arc::clone(&self.tags);
        let recovery = Arc::clone(&self.recovery);
        let path = path.to_path_buf();

        let events = tokio::task::spawn_blocking(move || match tags.read_tags(&path) {
            Ok(current) => recover(tags.as_ref(), recovery.as_ref(), &path, &path, &current),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Tags unreadable, not repairing");
                Vec::new()
            }
        })
        .await
        .unwrap_or_default();

        for event in events {
            self.notifications.emit(event).await;
        }
    }

    async fn fail(&self, path: &Path, stage: ProcessingStage, reason: String) -> ConversionOutcome {
        warn!(path = %path.display(), stage = %stage, error = %reason, "Conversion failed");

        self.notifications
            .emit(Notification::ConversionFailed {
                path: path.to_path_buf(),
                format: self.inspector.target().label().to_string(),
                reason: reason.clone(),
            })
            .await;

        ConversionOutcome::Failed { stage, reason }
    }
}

/// Runs the recovery policy and turns its outcome into notifications.
///
/// Blocking.
fn recover(
    tags: &dyn TagAccessor,
    policy: &dyn RecoveryPolicy,
    name_source: &Path,
    target: &Path,
    current: &TagSet,
) -> Vec<Notification> {
    let path: PathBuf = name_source.to_path_buf();

    match recover_missing_fields(tags, policy, name_source, target, current) {
        Ok(RecoveryOutcome::NotNeeded) => Vec::new(),
        Ok(RecoveryOutcome::Estimated(estimate)) => {
            info!(
                path = %path.display(),
                artist = %estimate.artist,
                title = %estimate.title,
                "Estimated metadata from file name"
            );
            vec![Notification::MetadataEstimated {
                path,
                artist: estimate.artist,
                title: estimate.title,
            }]
        }
        Ok(RecoveryOutcome::NotEstimable) => {
            info!(path = %path.display(), "Could not estimate metadata");
            vec![Notification::MetadataNotEstimable { path }]
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to write estimated metadata");
            vec![Notification::MetadataCopyFailed {
                path,
                reason: e.to_string(),
            }]
        }
    }
}

async fn discard_artifact(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!(artifact = %path.display(), "Removed scratch artifact"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(artifact = %path.display(), error = %e, "Failed to remove scratch artifact"),
    }
}
