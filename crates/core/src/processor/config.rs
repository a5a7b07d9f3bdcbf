//! Configuration for the processor module.

use serde::{Deserialize, Serialize};

use crate::config::Config;

/// Per-file processing settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// Target bitrate in kbps.
    pub bitrate_kbps: u32,

    /// Fill missing artist/title on skipped target-format files in place.
    #[serde(default)]
    pub repair_skipped_tags: bool,
}

impl ProcessorConfig {
    pub fn new(bitrate_kbps: u32) -> Self {
        Self {
            bitrate_kbps,
            repair_skipped_tags: false,
        }
    }

    pub fn with_repair_skipped_tags(mut self, enabled: bool) -> Self {
        self.repair_skipped_tags = enabled;
        self
    }
}

impl From<&Config> for ProcessorConfig {
    fn from(config: &Config) -> Self {
        Self {
            bitrate_kbps: config.bitrate,
            repair_skipped_tags: config.repair_skipped_tags,
        }
    }
}
