//! Configuration for the transcoder module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the FFmpeg-based transcoder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscoderConfig {
    /// Path to ffmpeg binary.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    /// Directory that receives encoded artifacts before they are committed.
    #[serde(default = "default_scratch_dir")]
    pub scratch_dir: PathBuf,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[serde(default = "default_log_level")]
    pub ffmpeg_log_level: String,

    /// Optional timeout for a single encode in seconds. Unset means no limit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Additional output arguments passed to ffmpeg.
    #[serde(default)]
    pub extra_ffmpeg_args: Vec<String>,
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_scratch_dir() -> PathBuf {
    std::env::temp_dir().join("camps-scratch")
}

fn default_log_level() -> String {
    "error".to_string()
}

impl Default for TranscoderConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            scratch_dir: default_scratch_dir(),
            ffmpeg_log_level: default_log_level(),
            timeout_secs: None,
            extra_ffmpeg_args: Vec::new(),
        }
    }
}

impl TranscoderConfig {
    /// Creates a new config with a custom ffmpeg path.
    pub fn with_ffmpeg_path(ffmpeg_path: PathBuf) -> Self {
        Self {
            ffmpeg_path,
            ..Default::default()
        }
    }

    /// Sets the scratch directory.
    pub fn with_scratch_dir(mut self, scratch_dir: PathBuf) -> Self {
        self.scratch_dir = scratch_dir;
        self
    }

    /// Sets the timeout in seconds.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }
}
