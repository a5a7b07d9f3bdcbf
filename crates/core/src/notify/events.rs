use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Formats a byte count as megabytes with two decimals.
pub fn format_megabytes(bytes: u64) -> String {
    format!("{:.2}", bytes as f64 / BYTES_PER_MB)
}

/// Formats a duration as seconds with two decimals.
pub fn format_seconds(duration: Duration) -> String {
    format!("{:.2}", duration.as_secs_f64())
}

/// Notification event types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    /// A file could not be converted; it was left as it was.
    ConversionFailed {
        path: PathBuf,
        /// Human-readable target format, e.g. "MP3".
        format: String,
        reason: String,
    },

    // Metadata events, informational only
    MetadataEstimated {
        path: PathBuf,
        artist: String,
        title: String,
    },
    MetadataNotEstimable {
        path: PathBuf,
    },
    MetadataCopyFailed {
        path: PathBuf,
        reason: String,
    },

    /// End-of-run summary.
    BatchCompleted {
        converted: usize,
        total_bytes_saved: u64,
        duration: Duration,
    },
}

impl Notification {
    /// Get the event type as a string
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ConversionFailed { .. } => "conversion_failed",
            Self::MetadataEstimated { .. } => "metadata_estimated",
            Self::MetadataNotEstimable { .. } => "metadata_not_estimable",
            Self::MetadataCopyFailed { .. } => "metadata_copy_failed",
            Self::BatchCompleted { .. } => "batch_completed",
        }
    }

    /// Path of the file the event is about, if any
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::ConversionFailed { path, .. }
            | Self::MetadataEstimated { path, .. }
            | Self::MetadataNotEstimable { path }
            | Self::MetadataCopyFailed { path, .. } => Some(path),
            Self::BatchCompleted { .. } => None,
        }
    }

    /// Renders the complete, self-contained message text.
    pub fn render(&self) -> String {
        match self {
            Self::ConversionFailed {
                path,
                format,
                reason,
            } => format!("Error converting {} to {}: {}", path.display(), format, reason),
            Self::MetadataEstimated {
                path,
                artist,
                title,
            } => format!(
                "Estimated metadata for {}:\nArtist - {}, Title - {}",
                path.display(),
                artist,
                title
            ),
            Self::MetadataNotEstimable { path } => format!(
                "Could not estimate metadata for {}. Please check manually.",
                path.display()
            ),
            Self::MetadataCopyFailed { path, reason } => format!(
                "Could not copy metadata for {}: {}",
                path.display(),
                reason
            ),
            Self::BatchCompleted {
                converted,
                total_bytes_saved,
                duration,
            } => format!(
                "Audio Conversion Completed!\nFiles Converted: {}\nTime Taken: {} seconds.\nTotal Space Saved: {} MB",
                converted,
                format_seconds(*duration),
                format_megabytes(*total_bytes_saved)
            ),
        }
    }
}
