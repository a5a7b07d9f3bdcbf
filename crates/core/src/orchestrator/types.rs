//! Types for the batch orchestrator.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::notify::{format_megabytes, format_seconds, Notification};
use crate::processor::FileReport;
use crate::scanner::ScanError;

/// Errors that abort a whole run.
///
/// Per-file problems never show up here; they are `Failed` outcomes.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Failed to enumerate input: {0}")]
    Scan(#[from] ScanError),
}

/// Aggregate result of one run. Built once every task has finished.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    /// Number of `Converted` outcomes, including those that saved nothing.
    pub converted_count: usize,
    /// Sum of the non-negative savings of converted files.
    pub total_bytes_saved: u64,
    pub skipped: usize,
    pub failed: usize,
    /// Wall-clock time from scan start to the last finished task.
    pub duration: Duration,
    pub started_at: DateTime<Utc>,
    /// One entry per discovered file, in completion order.
    pub files: Vec<FileReport>,
}

impl BatchSummary {
    /// Reduces per-file reports into a summary.
    pub fn from_reports(
        files: Vec<FileReport>,
        started_at: DateTime<Utc>,
        duration: Duration,
    ) -> Self {
        let mut converted_count = 0;
        let mut total_bytes_saved: u64 = 0;
        let mut skipped = 0;
        let mut failed = 0;

        for report in &files {
            let outcome = &report.outcome;
            if outcome.is_converted() {
                converted_count += 1;
                total_bytes_saved = total_bytes_saved.saturating_add(outcome.bytes_saved());
            } else if outcome.is_skipped() {
                skipped += 1;
            } else {
                failed += 1;
            }
        }

        Self {
            converted_count,
            total_bytes_saved,
            skipped,
            failed,
            duration,
            started_at,
            files,
        }
    }

    pub fn total_files(&self) -> usize {
        self.files.len()
    }

    /// Final human-readable line printed at the end of every run.
    pub fn report_line(&self) -> String {
        format!(
            "Conversion completed! Files converted: {}, Total space saved: {} MB, Time taken: {} seconds.",
            self.converted_count,
            format_megabytes(self.total_bytes_saved),
            format_seconds(self.duration)
        )
    }

    /// Summary notification, only sent when something was converted.
    pub fn notification(&self) -> Option<Notification> {
        (self.converted_count > 0).then(|| Notification::BatchCompleted {
            converted: self.converted_count,
            total_bytes_saved: self.total_bytes_saved,
            duration: self.duration,
        })
    }
}
