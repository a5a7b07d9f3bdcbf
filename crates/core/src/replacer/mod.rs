//! Replacer module for swapping original files for their converted artifacts.
//!
//! # Features
//!
//! - Atomic rename when the scratch artifact and the library share a volume
//! - Verified copy (SHA-256) through a hidden sibling when they do not
//! - Owner, group and permission bits carried over from the original
//! - Original deleted strictly last
//!
//! # Example
//!
//! ```ignore
//! use camps_core::replacer::{FsReplacer, Replacer};
//!
//! let replacer = FsReplacer::with_defaults();
//! let new_path = replacer
//!     .commit(Path::new("/music/track.flac"), &artifact.path, "mp3")
//!     .await?;
//! ```

mod config;
mod error;
mod fs_replacer;
mod traits;

pub use config::ReplacerConfig;
pub use error::ReplaceError;
pub use fs_replacer::FsReplacer;
pub use traits::{converted_path, Replacer};

/// Suffix of the hidden temporary file used during cross-volume commits.
pub const PARTIAL_SUFFIX: &str = ".camps-partial";
