//! Types for the processor module.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use crate::inspector::Eligibility;

/// Stage of the per-file state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStage {
    Inspecting,
    Transcoding,
    MetadataCopying,
    Committing,
    /// The worker stopped without reporting a stage, e.g. it panicked.
    Unknown,
}

impl fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Inspecting => "inspecting",
            Self::Transcoding => "transcoding",
            Self::MetadataCopying => "metadata_copying",
            Self::Committing => "committing",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Result of processing one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ConversionOutcome {
    /// The file was replaced by its converted version.
    Converted {
        new_path: PathBuf,
        /// Never negative; a larger output counts as no savings.
        bytes_saved: u64,
    },
    /// No conversion was needed.
    Skipped { reason: Eligibility },
    /// The file was left as it was.
    Failed {
        stage: ProcessingStage,
        reason: String,
    },
}

impl ConversionOutcome {
    pub fn bytes_saved(&self) -> u64 {
        match self {
            Self::Converted { bytes_saved, .. } => *bytes_saved,
            _ => 0,
        }
    }

    pub fn is_converted(&self) -> bool {
        matches!(self, Self::Converted { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Outcome of one file together with its path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    #[serde(flatten)]
    pub outcome: ConversionOutcome,
}
