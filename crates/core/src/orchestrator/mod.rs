//! Batch orchestrator.
//!
//! Enumerates the input tree, runs every file through the `FileProcessor`
//! on a bounded worker pool and reduces the outcomes to a `BatchSummary`.
//! A failing or panicking task only affects its own file.

mod config;
mod runner;
mod types;

pub use config::OrchestratorConfig;
pub use runner::BatchOrchestrator;
pub use types::{BatchError, BatchSummary};
