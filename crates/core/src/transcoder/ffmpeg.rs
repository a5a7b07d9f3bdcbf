//! FFmpeg-based transcoder implementation.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::debug;
use uuid::Uuid;

use super::config::TranscoderConfig;
use super::error::TranscodeError;
use super::traits::Transcoder;
use super::types::{Artifact, AudioFormat};

/// FFmpeg-based transcoder implementation.
pub struct FfmpegTranscoder {
    config: TranscoderConfig,
    format: AudioFormat,
}

impl FfmpegTranscoder {
    /// Creates a new FFmpeg transcoder encoding to `format`.
    pub fn new(config: TranscoderConfig, format: AudioFormat) -> Self {
        Self { config, format }
    }

    /// Creates an MP3 transcoder with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(TranscoderConfig::default(), AudioFormat::Mp3)
    }

    /// Picks a fresh artifact location inside the scratch directory.
    fn scratch_path(&self) -> PathBuf {
        self.config
            .scratch_dir
            .join(format!("{}.{}", Uuid::new_v4(), self.format.extension()))
    }

    /// Builds ffmpeg arguments for an audio-only encode.
    fn build_args(&self, input_path: &Path, output_path: &Path, bitrate_kbps: u32) -> Vec<String> {
        let mut args = vec![
            "-y".to_string(),
            "-nostdin".to_string(),
            "-i".to_string(),
            input_path.to_string_lossy().to_string(),
            // Audio only; embedded pictures travel with the tags instead.
            "-vn".to_string(),
            "-map_metadata".to_string(),
            "0".to_string(),
            "-c:a".to_string(),
            self.format.ffmpeg_codec().to_string(),
            "-b:a".to_string(),
            format!("{}k", bitrate_kbps),
            "-loglevel".to_string(),
            self.config.ffmpeg_log_level.clone(),
        ];

        args.extend(self.config.extra_ffmpeg_args.iter().cloned());
        args.push(output_path.to_string_lossy().to_string());

        args
    }

    fn map_spawn_error(&self, e: std::io::Error) -> TranscodeError {
        if e.kind() == std::io::ErrorKind::NotFound {
            TranscodeError::FfmpegNotFound {
                path: self.config.ffmpeg_path.clone(),
            }
        } else {
            TranscodeError::Io(e)
        }
    }

    async fn ensure_scratch_dir(&self) -> Result<(), TranscodeError> {
        tokio::fs::create_dir_all(&self.config.scratch_dir)
            .await
            .map_err(|source| TranscodeError::ScratchUnavailable {
                path: self.config.scratch_dir.clone(),
                source,
            })
    }

    /// Runs ffmpeg and verifies the artifact it produced.
    async fn run_encode(
        &self,
        source: &Path,
        output_path: &Path,
        bitrate_kbps: u32,
    ) -> Result<Artifact, TranscodeError> {
        let start = Instant::now();
        let args = self.build_args(source, output_path, bitrate_kbps);

        let child = Command::new(&self.config.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.map_spawn_error(e))?;

        let output = match self.config.timeout_secs {
            Some(secs) => timeout(Duration::from_secs(secs), child.wait_with_output())
                .await
                .map_err(|_| TranscodeError::Timeout { timeout_secs: secs })??,
            None => child.wait_with_output().await?,
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TranscodeError::from_ffmpeg_stderr(
                self.config.scratch_dir.clone(),
                output.status.code(),
                &stderr,
            ));
        }

        let meta = tokio::fs::metadata(output_path)
            .await
            .map_err(|_| TranscodeError::encoder_failed("Output file not created", None))?;
        if meta.len() == 0 {
            return Err(TranscodeError::encoder_failed("Output file is empty", None));
        }

        debug!(
            source = %source.display(),
            artifact = %output_path.display(),
            size_bytes = meta.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Encode finished"
        );

        Ok(Artifact {
            path: output_path.to_path_buf(),
            size_bytes: meta.len(),
        })
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    fn target_format(&self) -> AudioFormat {
        self.format
    }

    async fn transcode(
        &self,
        source: &Path,
        bitrate_kbps: u32,
    ) -> Result<Artifact, TranscodeError> {
        if !source.exists() {
            return Err(TranscodeError::SourceNotFound {
                path: source.to_path_buf(),
            });
        }

        self.ensure_scratch_dir().await?;
        let output_path = self.scratch_path();

        let result = self.run_encode(source, &output_path, bitrate_kbps).await;
        if result.is_err() {
            // ffmpeg may leave a truncated file behind
            let _ = tokio::fs::remove_file(&output_path).await;
        }
        result
    }

    async fn validate(&self) -> Result<(), TranscodeError> {
        let output = Command::new(&self.config.ffmpeg_path)
            .arg("-version")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| self.map_spawn_error(e))?;

        if !output.status.success() {
            return Err(TranscodeError::encoder_failed(
                "ffmpeg -version failed",
                Some(String::from_utf8_lossy(&output.stderr).to_string()),
            ));
        }

        self.ensure_scratch_dir().await
    }
}
