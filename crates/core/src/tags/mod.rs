//! Tag access for audio files.
//!
//! The `TagAccessor` trait reads and writes a small, container-independent
//! set of fields and reports the stream bitrate. `LoftyTagAccessor` backs it
//! with lofty. When tags cannot be carried over, the `recovery` submodule
//! derives artist/title from the file name.

mod error;
mod lofty_accessor;
pub mod recovery;
mod traits;
mod types;

pub use error::TagError;
pub use lofty_accessor::LoftyTagAccessor;
pub use recovery::{
    recover_missing_fields, EstimatedTags, RecoveryOutcome, RecoveryPolicy, SeparatorPolicy,
};
pub use traits::TagAccessor;
pub use types::{TagField, TagSet};
