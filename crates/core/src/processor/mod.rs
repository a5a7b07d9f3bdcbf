//! Processor module for converting a single file.
//!
//! `FileProcessor` drives one file through
//! `Inspecting -> {Skipped | Transcoding -> MetadataCopying -> Committing -> Converted} | Failed`:
//! - Inspecting: eligibility by extension and bitrate
//! - Transcoding: encode into scratch space
//! - MetadataCopying: copy tags, fill missing artist/title from the file name
//! - Committing: replace the original, keeping owner and permissions
//!
//! # Example
//!
//! ```ignore
//! use camps_core::processor::{FileProcessor, ProcessorConfig};
//!
//! let processor = FileProcessor::new(
//!     ProcessorConfig::from(&config),
//!     transcoder,
//!     tags,
//!     replacer,
//!     notifications,
//! );
//! let outcome = processor.process(Path::new("/music/Artist - Song.flac")).await;
//! println!("Saved {} bytes", outcome.bytes_saved());
//! ```

mod config;
mod pipeline;
mod types;

pub use config::ProcessorConfig;
pub use pipeline::FileProcessor;
pub use types::{ConversionOutcome, FileReport, ProcessingStage};
