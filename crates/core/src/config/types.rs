use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::transcoder::{AudioFormat, TranscoderConfig};

/// Root configuration
///
/// Field names match the plain environment variables (`INPUT_DIR`,
/// `BITRATE`, `SLACK_WEBHOOK_URL`) so they can be merged without renaming.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Root of the tree to normalize.
    pub input_dir: PathBuf,
    /// Target bitrate in kbps.
    #[serde(default = "default_bitrate")]
    pub bitrate: u32,
    /// Codec every eligible file converges to.
    #[serde(default)]
    pub target_format: AudioFormat,
    /// Incoming webhook that receives notification text.
    #[serde(default)]
    pub slack_webhook_url: Option<String>,
    /// Worker pool size (default: available parallelism).
    #[serde(default)]
    pub workers: Option<usize>,
    /// Estimate missing artist/title on skipped target-format files in place.
    #[serde(default)]
    pub repair_skipped_tags: bool,
    #[serde(default)]
    pub transcoder: TranscoderConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
}

impl Config {
    /// Creates a configuration for `input_dir` with every other field defaulted.
    pub fn new(input_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            bitrate: default_bitrate(),
            target_format: AudioFormat::default(),
            slack_webhook_url: None,
            workers: None,
            repair_skipped_tags: false,
            transcoder: TranscoderConfig::default(),
            notifications: NotificationConfig::default(),
        }
    }

    /// Effective worker pool size.
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }

    /// Webhook URL, treating an empty string as unset.
    pub fn webhook_url(&self) -> Option<&str> {
        self.slack_webhook_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

fn default_bitrate() -> u32 {
    256
}

/// Notification delivery configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotificationConfig {
    /// Webhook request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Capacity of the channel between workers and the delivery task.
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            buffer_size: default_buffer_size(),
        }
    }
}

fn default_timeout() -> u64 {
    10
}

fn default_buffer_size() -> usize {
    256
}

/// Sanitized config for logging (webhook URL redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub input_dir: PathBuf,
    pub bitrate: u32,
    pub target_format: AudioFormat,
    pub webhook_configured: bool,
    pub workers: usize,
    pub repair_skipped_tags: bool,
    pub scratch_dir: PathBuf,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            input_dir: config.input_dir.clone(),
            bitrate: config.bitrate,
            target_format: config.target_format,
            webhook_configured: config.webhook_url().is_some(),
            workers: config.worker_count(),
            repair_skipped_tags: config.repair_skipped_tags,
            scratch_dir: config.transcoder.scratch_dir.clone(),
        }
    }
}
