//! Batch orchestrator integration tests.
//!
//! These tests run whole batches over temporary directories with the mock
//! transcoder and tag accessor and the real file replacer:
//! - Failure isolation and summary arithmetic
//! - Worker pool bounds and panic isolation
//! - Notification delivery, including a failing sink
//! - Fatal enumeration errors

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use camps_core::{
    create_notification_system, BatchError, BatchOrchestrator, BatchSummary, ConversionOutcome,
    DirectoryWalker, FileProcessor, FsReplacer, OrchestratorConfig, ProcessorConfig, ScanError,
    testing::{fixtures, FakeAudio, MockTagAccessor, MockTranscoder, RecordingNotifier},
};

/// Test helper owning a library, a scratch dir and the mocks.
struct TestHarness {
    temp_dir: TempDir,
    transcoder: Arc<MockTranscoder>,
    tags: Arc<MockTagAccessor>,
    notifier: Arc<RecordingNotifier>,
    workers: usize,
}

impl TestHarness {
    fn new() -> Self {
        Self::with_notifier(RecordingNotifier::new())
    }

    fn with_notifier(notifier: RecordingNotifier) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        std::fs::create_dir_all(temp_dir.path().join("library"))
            .expect("Failed to create library dir");
        let transcoder = Arc::new(MockTranscoder::new(temp_dir.path().join("scratch")));

        Self {
            temp_dir,
            transcoder,
            tags: Arc::new(MockTagAccessor::new()),
            notifier: Arc::new(notifier),
            workers: 4,
        }
    }

    fn library(&self) -> PathBuf {
        self.temp_dir.path().join("library")
    }

    fn scratch(&self) -> PathBuf {
        self.temp_dir.path().join("scratch")
    }

    async fn run(&self) -> Result<BatchSummary, BatchError> {
        self.run_at(&self.library()).await
    }

    async fn run_at(&self, root: &Path) -> Result<BatchSummary, BatchError> {
        let (handle, writer) = create_notification_system(self.notifier.clone(), 32);
        let writer = tokio::spawn(writer.run());

        let processor = FileProcessor::new(
            ProcessorConfig::new(256),
            self.transcoder.clone(),
            self.tags.clone(),
            Arc::new(FsReplacer::with_defaults()),
            handle.clone(),
        );
        let orchestrator = BatchOrchestrator::new(
            OrchestratorConfig::with_workers(self.workers),
            processor,
            handle,
        )
        .with_walker(DirectoryWalker::new().exclude(self.scratch()));

        let result = orchestrator.run(root).await;
        drop(orchestrator);
        writer.await.expect("Notification writer panicked");
        result
    }

    fn scratch_is_empty(&self) -> bool {
        std::fs::read_dir(self.scratch())
            .map(|mut entries| entries.next().is_none())
            .unwrap_or(true)
    }
}

fn file_size(path: &Path) -> u64 {
    std::fs::metadata(path).expect("Failed to stat file").len()
}

// =============================================================================
// Failure Isolation
// =============================================================================

#[tokio::test]
async fn test_one_corrupt_file_among_ten() {
    let h = TestHarness::new();
    let library = h.library();

    let mut sizes = HashMap::new();
    for i in 0..9 {
        let name = format!("Artist {} - Song {}.flac", i, i);
        let path = fixtures::tagged_source(&library, &name, &format!("Artist {}", i), "Song");
        sizes.insert(path.with_extension("mp3"), file_size(&path));
    }
    let corrupt = fixtures::write_fixture(
        &library,
        "broken.wav",
        FakeAudio::new(fixtures::LOSSLESS_KBPS)
            .with_payload_len(4096)
            .corrupt(),
    );

    let summary = h.run().await.unwrap();

    assert_eq!(summary.total_files(), 10);
    assert_eq!(summary.converted_count, 9);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.skipped, 0);

    let expected_savings: u64 = sizes
        .iter()
        .map(|(converted, original)| original.saturating_sub(file_size(converted)))
        .sum();
    assert!(expected_savings > 0);
    assert_eq!(summary.total_bytes_saved, expected_savings);

    // The corrupt source is untouched and nothing was left in scratch
    assert!(corrupt.exists());
    assert!(!corrupt.with_extension("mp3").exists());
    assert!(h.scratch_is_empty());

    let errors = h.notifier.messages_starting_with("Error converting").await;
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("broken.wav"));
    assert!(errors[0].contains("to MP3"));

    let summaries = h
        .notifier
        .messages_starting_with("Audio Conversion Completed!")
        .await;
    assert_eq!(summaries.len(), 1);
    assert!(summaries[0].contains("Files Converted: 9"));
}

#[tokio::test]
async fn test_summary_matches_outcomes_for_mixed_batch() {
    let h = TestHarness::new();
    let library = h.library();

    fixtures::tagged_source(&library, "a.flac", "A", "One");
    fixtures::tagged_source(&library, "sub/b.aiff", "B", "Two");
    fixtures::encoded_file(&library, "c.mp3", 256);
    fixtures::encoded_file(&library, "d.mp3", 128);
    fixtures::encoded_file(&library, "e.mp3", 320);
    std::fs::write(library.join("cover.jpg"), b"not audio").unwrap();
    fixtures::untagged_source(&library, "f.wma");
    h.transcoder.fail_on("f.wma").await;

    let summary = h.run().await.unwrap();

    let converted: Vec<_> = summary
        .files
        .iter()
        .filter(|r| r.outcome.is_converted())
        .collect();
    let saved: u64 = converted.iter().map(|r| r.outcome.bytes_saved()).sum();

    // a.flac, b.aiff and the 320 kbps e.mp3 are re-encoded
    assert_eq!(summary.converted_count, 3);
    assert_eq!(converted.len(), summary.converted_count);
    assert_eq!(summary.total_bytes_saved, saved);
    assert_eq!(summary.skipped, 3);
    assert_eq!(summary.failed, 1);
    assert_eq!(
        summary.converted_count + summary.skipped + summary.failed,
        summary.total_files()
    );
    assert!(library.join("f.wma").exists());
    assert!(library.join("cover.jpg").exists());
}

#[tokio::test]
async fn test_larger_output_counts_as_converted_without_savings() {
    let h = TestHarness::new();
    fixtures::untagged_source(&h.library(), "tiny.flac");
    h.transcoder.set_output_ratio(3.0).await;

    let summary = h.run().await.unwrap();

    assert_eq!(summary.converted_count, 1);
    assert_eq!(summary.total_bytes_saved, 0);
    assert!(summary.report_line().contains("Total space saved: 0.00 MB"));
}

// =============================================================================
// Worker Pool
// =============================================================================

#[tokio::test]
async fn test_single_worker_runs_files_one_at_a_time() {
    let mut h = TestHarness::new();
    h.workers = 1;
    for i in 0..4 {
        fixtures::untagged_source(&h.library(), &format!("{}.wav", i));
    }
    h.transcoder.set_delay(Duration::from_millis(10)).await;

    let summary = h.run().await.unwrap();

    assert_eq!(summary.converted_count, 4);
    assert_eq!(h.transcoder.peak_concurrency(), 1);
}

#[tokio::test]
async fn test_panic_in_one_task_does_not_stop_the_batch() {
    let h = TestHarness::new();
    for name in ["a.flac", "b.flac", "crash.flac", "d.flac"] {
        fixtures::untagged_source(&h.library(), name);
    }
    h.transcoder.panic_on("crash.flac").await;

    let summary = h.run().await.unwrap();

    assert_eq!(summary.converted_count, 3);
    assert_eq!(summary.failed, 1);
    let failed = summary
        .files
        .iter()
        .find(|r| r.outcome.is_failed())
        .unwrap();
    assert_eq!(failed.path, h.library().join("crash.flac"));
    assert!(matches!(failed.outcome, ConversionOutcome::Failed { .. }));
    assert!(h.library().join("crash.flac").exists());
}

// =============================================================================
// Notifications
// =============================================================================

#[tokio::test]
async fn test_failing_sink_never_fails_the_batch() {
    let h = TestHarness::with_notifier(RecordingNotifier::failing());
    fixtures::tagged_source(&h.library(), "a.flac", "Low", "Lines");
    fixtures::write_fixture(
        &h.library(),
        "bad.flac",
        FakeAudio::new(fixtures::LOSSLESS_KBPS).corrupt(),
    );

    let summary = h.run().await.unwrap();

    assert_eq!(summary.converted_count, 1);
    assert_eq!(summary.failed, 1);
    // Failure report plus summary were both attempted
    assert_eq!(h.notifier.attempts(), 2);
}

#[tokio::test]
async fn test_nothing_to_do_sends_nothing() {
    let h = TestHarness::new();
    fixtures::encoded_file(&h.library(), "done.mp3", 256);

    let summary = h.run().await.unwrap();

    assert_eq!(summary.converted_count, 0);
    assert_eq!(summary.skipped, 1);
    assert!(h.notifier.messages().await.is_empty());
    assert!(summary.report_line().starts_with("Conversion completed! Files converted: 0,"));
}

#[tokio::test]
async fn test_empty_library() {
    let h = TestHarness::new();

    let summary = h.run().await.unwrap();

    assert_eq!(summary.total_files(), 0);
    assert_eq!(summary.converted_count, 0);
    assert!(h.notifier.messages().await.is_empty());
}

// =============================================================================
// Fatal Errors
// =============================================================================

#[tokio::test]
async fn test_missing_root_aborts_run() {
    let h = TestHarness::new();
    let missing = h.temp_dir.path().join("does-not-exist");

    let result = h.run_at(&missing).await;

    assert!(matches!(
        result,
        Err(BatchError::Scan(ScanError::RootNotFound(_)))
    ));
}

#[tokio::test]
async fn test_root_that_is_a_file_aborts_run() {
    let h = TestHarness::new();
    let file = fixtures::untagged_source(&h.library(), "a.flac");

    let result = h.run_at(&file).await;

    assert!(matches!(
        result,
        Err(BatchError::Scan(ScanError::NotADirectory(_)))
    ));
    assert!(file.exists());
}
