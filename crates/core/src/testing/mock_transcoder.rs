//! Mock transcoder for testing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::FakeAudio;
use crate::transcoder::{Artifact, AudioFormat, TranscodeError, Transcoder};

/// A recorded transcode call for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedTranscode {
    /// The source that was submitted.
    pub source: PathBuf,
    /// Requested bitrate in kbps.
    pub bitrate_kbps: u32,
    /// Whether the transcode succeeded.
    pub success: bool,
}

/// Mock implementation of the Transcoder trait.
///
/// Decodes [`FakeAudio`] sources and writes a `FakeAudio` artifact at the
/// requested bitrate with no tags, its payload scaled by the output ratio.
/// Provides controllable behavior for testing:
/// - Track transcode calls for assertions
/// - Fail on corrupt sources or on configured file names
/// - Panic on configured file names
/// - Simulate encode time and observe peak concurrency
#[derive(Debug)]
pub struct MockTranscoder {
    format: AudioFormat,
    scratch_dir: PathBuf,
    /// Output payload length relative to the source file size.
    output_ratio: Arc<RwLock<f64>>,
    /// File names that fail to encode.
    fail_names: Arc<RwLock<HashSet<String>>>,
    /// File names whose encode panics.
    panic_names: Arc<RwLock<HashSet<String>>>,
    delay: Arc<RwLock<Duration>>,
    transcodes: Arc<RwLock<Vec<RecordedTranscode>>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl MockTranscoder {
    /// Create a mock MP3 transcoder writing artifacts into `scratch_dir`.
    pub fn new(scratch_dir: impl Into<PathBuf>) -> Self {
        Self::with_format(scratch_dir, AudioFormat::Mp3)
    }

    pub fn with_format(scratch_dir: impl Into<PathBuf>, format: AudioFormat) -> Self {
        Self {
            format,
            scratch_dir: scratch_dir.into(),
            output_ratio: Arc::new(RwLock::new(0.5)),
            fail_names: Arc::new(RwLock::new(HashSet::new())),
            panic_names: Arc::new(RwLock::new(HashSet::new())),
            delay: Arc::new(RwLock::new(Duration::ZERO)),
            transcodes: Arc::new(RwLock::new(Vec::new())),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    /// Set the output size relative to the source size.
    pub async fn set_output_ratio(&self, ratio: f64) {
        *self.output_ratio.write().await = ratio;
    }

    /// Make every source with this file name fail to encode.
    pub async fn fail_on(&self, file_name: impl Into<String>) {
        self.fail_names.write().await.insert(file_name.into());
    }

    /// Make the encode of every source with this file name panic.
    pub async fn panic_on(&self, file_name: impl Into<String>) {
        self.panic_names.write().await.insert(file_name.into());
    }

    /// Set the simulated encode duration.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = delay;
    }

    /// Get all recorded transcode calls.
    pub async fn recorded_transcodes(&self) -> Vec<RecordedTranscode> {
        self.transcodes.read().await.clone()
    }

    /// Get the number of transcode calls.
    pub async fn transcode_count(&self) -> usize {
        self.transcodes.read().await.len()
    }

    /// Highest number of encodes that ran at the same time.
    pub fn peak_concurrency(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    async fn record(&self, source: &Path, bitrate_kbps: u32, success: bool) {
        self.transcodes.write().await.push(RecordedTranscode {
            source: source.to_path_buf(),
            bitrate_kbps,
            success,
        });
    }

    async fn encode(&self, source: &Path, bitrate_kbps: u32) -> Result<Artifact, TranscodeError> {
        let name = source
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        if self.panic_names.read().await.contains(&name) {
            panic!("mock encoder crashed on {}", name);
        }

        let delay = *self.delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if self.fail_names.read().await.contains(&name) {
            return Err(TranscodeError::encoder_failed("mock: configured failure", None));
        }

        let source_size = tokio::fs::metadata(source)
            .await
            .map_err(|_| TranscodeError::SourceNotFound {
                path: source.to_path_buf(),
            })?
            .len();

        let decoded = FakeAudio::read(source).map_err(|e| TranscodeError::SourceUnreadable {
            reason: format!("Invalid data found when processing input: {}", e),
        })?;
        if decoded.corrupt {
            return Err(TranscodeError::SourceUnreadable {
                reason: "Invalid data found when processing input".to_string(),
            });
        }

        let ratio = *self.output_ratio.read().await;
        let payload_len = (source_size as f64 * ratio).round().max(0.0) as usize;

        tokio::fs::create_dir_all(&self.scratch_dir)
            .await
            .map_err(|source| TranscodeError::ScratchUnavailable {
                path: self.scratch_dir.clone(),
                source,
            })?;
        let output = self
            .scratch_dir
            .join(format!("{}.{}", Uuid::new_v4(), self.format.extension()));

        FakeAudio::new(bitrate_kbps)
            .with_payload_len(payload_len)
            .write(&output)?;
        let size_bytes = tokio::fs::metadata(&output).await?.len();

        Ok(Artifact {
            path: output,
            size_bytes,
        })
    }
}

/// Decrements the in-flight counter even when the encode panics.
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Transcoder for MockTranscoder {
    fn name(&self) -> &str {
        "mock"
    }

    fn target_format(&self) -> AudioFormat {
        self.format
    }

    async fn transcode(&self, source: &Path, bitrate_kbps: u32) -> Result<Artifact, TranscodeError> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = InFlight(&self.in_flight);
        self.peak_in_flight.fetch_max(current, Ordering::SeqCst);

        let result = self.encode(source, bitrate_kbps).await;
        self.record(source, bitrate_kbps, result.is_ok()).await;
        result
    }

    async fn validate(&self) -> Result<(), TranscodeError> {
        Ok(())
    }
}
