//! Batch orchestrator implementation.
//!
//! Fans one task per discovered file out over a bounded pool and waits for
//! every one of them before reducing the outcomes.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio::sync::Semaphore;
use tokio::task::{Id, JoinError, JoinSet};
use tracing::{debug, info, warn};

use crate::notify::{Notification, NotificationHandle};
use crate::processor::{ConversionOutcome, FileProcessor, FileReport, ProcessingStage};
use crate::scanner::DirectoryWalker;

use super::config::OrchestratorConfig;
use super::types::{BatchError, BatchSummary};

/// Runs a `FileProcessor` over every file below a root.
pub struct BatchOrchestrator {
    config: OrchestratorConfig,
    processor: Arc<FileProcessor>,
    walker: DirectoryWalker,
    notifications: NotificationHandle,
}

impl BatchOrchestrator {
    pub fn new(
        config: OrchestratorConfig,
        processor: FileProcessor,
        notifications: NotificationHandle,
    ) -> Self {
        Self {
            config,
            processor: Arc::new(processor),
            walker: DirectoryWalker::new(),
            notifications,
        }
    }

    /// Replaces the directory walker, e.g. to exclude a scratch directory.
    pub fn with_walker(mut self, walker: DirectoryWalker) -> Self {
        self.walker = walker;
        self
    }

    /// Processes every file below `root` and returns the aggregate.
    ///
    /// Only a failure to enumerate `root` is an error. Sends the summary
    /// notification when at least one file was converted and always logs the
    /// final report line.
    pub async fn run(&self, root: &Path) -> Result<BatchSummary, BatchError> {
        let started_at = Utc::now();
        let start = Instant::now();

        let files = self.walker.scan(root).await?;
        info!(
            root = %root.display(),
            files = files.len(),
            workers = self.config.pool_size(),
            target = self.processor.target_format().label(),
            "Starting batch"
        );

        let reports = self.dispatch(files).await;
        let summary = BatchSummary::from_reports(reports, started_at, start.elapsed());

        if let Some(notification) = summary.notification() {
            self.notifications.emit(notification).await;
        }

        info!(
            converted = summary.converted_count,
            skipped = summary.skipped,
            failed = summary.failed,
            bytes_saved = summary.total_bytes_saved,
            "{}",
            summary.report_line()
        );

        Ok(summary)
    }

    /// Runs every file to completion, at most `pool_size` at a time.
    async fn dispatch(&self, files: Vec<PathBuf>) -> Vec<FileReport> {
        let semaphore = Arc::new(Semaphore::new(self.config.pool_size()));
        let mut tasks = JoinSet::new();
        let mut in_flight: HashMap<Id, PathBuf> = HashMap::with_capacity(files.len());

        for path in files {
            let permit = match Arc::clone(&semaphore).acquire_owned().await {
                Ok(permit) => permit,
                // The semaphore is never closed while dispatching.
                Err(_) => break,
            };
            let processor = Arc::clone(&self.processor);
            let task_path = path.clone();

            let handle = tasks.spawn(async move {
                let _permit = permit;
                processor.process(&task_path).await
            });
            in_flight.insert(handle.id(), path);
        }

        let mut reports = Vec::with_capacity(in_flight.len());
        while let Some(joined) = tasks.join_next_with_id().await {
            let report = match joined {
                Ok((id, outcome)) => FileReport {
                    path: in_flight.remove(&id).unwrap_or_default(),
                    outcome,
                },
                Err(e) => {
                    let path = in_flight.remove(&e.id()).unwrap_or_default();
                    self.worker_lost(path, e).await
                }
            };
            debug!(path = %report.path.display(), remaining = in_flight.len(), "Task finished");
            reports.push(report);
        }

        reports
    }

    /// Turns a panicked or cancelled task into a failed outcome for its file.
    async fn worker_lost(&self, path: PathBuf, error: JoinError) -> FileReport {
        let reason = if error.is_panic() {
            "worker panicked".to_string()
        } else {
            error.to_string()
        };
        warn!(path = %path.display(), error = %reason, "Worker stopped unexpectedly");

        self.notifications
            .emit(Notification::ConversionFailed {
                path: path.clone(),
                format: self.processor.target_format().label().to_string(),
                reason: reason.clone(),
            })
            .await;

        FileReport {
            path,
            outcome: ConversionOutcome::Failed {
                stage: ProcessingStage::Unknown,
                reason,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspector::Eligibility;
    use crate::notify::create_notification_system;
    use crate::processor::ProcessorConfig;
    use crate::replacer::FsReplacer;
    use crate::scanner::ScanError;
    use crate::testing::{fixtures, MockTagAccessor, MockTranscoder, RecordingNotifier};
    use std::time::Duration;
    use tempfile::TempDir;

    struct Harness {
        _temp: TempDir,
        library: PathBuf,
        scratch: PathBuf,
        transcoder: Arc<MockTranscoder>,
        notifier: Arc<RecordingNotifier>,
    }

    impl Harness {
        fn new() -> Self {
            let temp = TempDir::new().unwrap();
            let library = temp.path().join("library");
            let scratch = temp.path().join("scratch");
            std::fs::create_dir_all(&library).unwrap();
            Self {
                transcoder: Arc::new(MockTranscoder::new(&scratch)),
                notifier: Arc::new(RecordingNotifier::new()),
                library,
                scratch,
                _temp: temp,
            }
        }

        async fn run(&self, workers: usize) -> Result<BatchSummary, BatchError> {
            self.run_at(&self.library, workers).await
        }

        async fn run_at(&self, root: &Path, workers: usize) -> Result<BatchSummary, BatchError> {
            let (handle, writer) = create_notification_system(self.notifier.clone(), 64);
            let writer = tokio::spawn(writer.run());

            let processor = FileProcessor::new(
                ProcessorConfig::new(256),
                self.transcoder.clone(),
                Arc::new(MockTagAccessor::new()),
                Arc::new(FsReplacer::with_defaults()),
                handle.clone(),
            );
            let orchestrator =
                BatchOrchestrator::new(OrchestratorConfig::with_workers(workers), processor, handle)
                    .with_walker(DirectoryWalker::new().exclude(&self.scratch));

            let result = orchestrator.run(root).await;
            drop(orchestrator);
            writer.await.unwrap();
            result
        }
    }

    #[tokio::test]
    async fn test_worker_pool_is_bounded() {
        let h = Harness::new();
        for i in 0..8 {
            fixtures::untagged_source(&h.library, &format!("track{}.flac", i));
        }
        h.transcoder.set_delay(Duration::from_millis(20)).await;

        let summary = h.run(2).await.unwrap();

        assert_eq!(summary.converted_count, 8);
        assert_eq!(h.transcoder.transcode_count().await, 8);
        assert!(h.transcoder.peak_concurrency() <= 2);
        assert!(h.transcoder.peak_concurrency() >= 1);
    }

    #[tokio::test]
    async fn test_panicking_task_is_isolated() {
        let h = Harness::new();
        fixtures::untagged_source(&h.library, "one.flac");
        fixtures::untagged_source(&h.library, "boom.flac");
        fixtures::untagged_source(&h.library, "three.flac");
        h.transcoder.panic_on("boom.flac").await;

        let summary = h.run(2).await.unwrap();

        assert_eq!(summary.converted_count, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.total_files(), 3);

        let failed = summary
            .files
            .iter()
            .find(|report| report.outcome.is_failed())
            .unwrap();
        assert_eq!(failed.path, h.library.join("boom.flac"));
        assert!(h.library.join("boom.flac").exists());

        let errors = h.notifier.messages_starting_with("Error converting").await;
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("boom.flac"));
        assert!(errors[0].contains("worker panicked"));
    }

    #[tokio::test]
    async fn test_summary_notification_only_when_converted() {
        let h = Harness::new();
        fixtures::encoded_file(&h.library, "done.mp3", 256);
        fixtures::encoded_file(&h.library, "low.mp3", 128);

        let summary = h.run(4).await.unwrap();

        assert_eq!(summary.converted_count, 0);
        assert_eq!(summary.skipped, 2);
        assert!(summary
            .files
            .iter()
            .any(|r| r.outcome == ConversionOutcome::Skipped { reason: Eligibility::SkipLowerThanTarget }));
        assert!(h.notifier.messages().await.is_empty());
    }

    #[tokio::test]
    async fn test_summary_notification_sent_once() {
        let h = Harness::new();
        fixtures::untagged_source(&h.library, "a.flac");
        fixtures::untagged_source(&h.library, "nested/b.wav");

        let summary = h.run(4).await.unwrap();

        assert_eq!(summary.converted_count, 2);
        let summaries = h.notifier.messages_starting_with("Audio Conversion Completed!").await;
        assert_eq!(summaries.len(), 1);
        assert!(summaries[0].contains("Files Converted: 2"));
    }

    #[tokio::test]
    async fn test_scratch_inside_root_is_not_processed() {
        let temp = TempDir::new().unwrap();
        let library = temp.path().to_path_buf();
        let scratch = library.join(".scratch");
        fixtures::untagged_source(&library, "a.flac");
        fixtures::untagged_source(&scratch, "leftover.flac");

        let transcoder = Arc::new(MockTranscoder::new(&scratch));
        transcoder.set_delay(Duration::from_millis(10)).await;
        let notifier = Arc::new(RecordingNotifier::new());
        let (handle, writer) = create_notification_system(notifier.clone(), 16);
        let writer = tokio::spawn(writer.run());

        let processor = FileProcessor::new(
            ProcessorConfig::new(256),
            transcoder.clone(),
            Arc::new(MockTagAccessor::new()),
            Arc::new(FsReplacer::with_defaults()),
            handle.clone(),
        );
        let summary = BatchOrchestrator::new(OrchestratorConfig::with_workers(1), processor, handle)
            .with_walker(DirectoryWalker::new().exclude(&scratch))
            .run(&library)
            .await
            .unwrap();
        writer.await.unwrap();

        assert_eq!(summary.total_files(), 1);
        assert_eq!(summary.converted_count, 1);
        assert!(library.join("a.mp3").exists());
    }

    #[tokio::test]
    async fn test_missing_root_is_fatal() {
        let h = Harness::new();
        let missing = h.library.join("nope");

        let result = h.run_at(&missing, 2).await;

        assert!(matches!(
            result,
            Err(BatchError::Scan(ScanError::RootNotFound(_)))
        ));
        assert!(h.notifier.messages().await.is_empty());
    }
}
