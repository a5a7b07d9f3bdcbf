//! Orchestrator configuration.

use serde::{Deserialize, Serialize};

use crate::config::Config;

/// Configuration for the batch orchestrator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Maximum number of files processed at the same time.
    /// Values below 1 are treated as 1.
    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
        }
    }
}

impl OrchestratorConfig {
    pub fn with_workers(workers: usize) -> Self {
        Self { workers }
    }

    /// Pool size actually used.
    pub fn pool_size(&self) -> usize {
        self.workers.max(1)
    }
}

impl From<&Config> for OrchestratorConfig {
    fn from(config: &Config) -> Self {
        Self {
            workers: config.worker_count(),
        }
    }
}
