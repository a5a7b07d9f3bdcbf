//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the collaborator traits so
//! the pipeline can be exercised end to end on temporary directories without
//! ffmpeg, real codecs or a webhook.
//!
//! # Example
//!
//! ```rust,ignore
//! use camps_core::testing::{FakeAudio, MockTagAccessor, MockTranscoder, RecordingNotifier};
//!
//! FakeAudio::new(1411).with_payload_len(4096).write(&dir.join("Artist - Song.flac"))?;
//!
//! let transcoder = MockTranscoder::new(scratch);
//! transcoder.fail_on("broken.wav").await;
//! ```

mod fake_audio;
mod mock_tags;
mod mock_transcoder;
mod recording_notifier;

pub use fake_audio::FakeAudio;
pub use mock_tags::MockTagAccessor;
pub use mock_transcoder::{MockTranscoder, RecordedTranscode};
pub use recording_notifier::RecordingNotifier;

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::{Path, PathBuf};

    use super::FakeAudio;
    use crate::tags::{TagField, TagSet};

    /// Bitrate written into lossless fixtures.
    pub const LOSSLESS_KBPS: u32 = 1411;

    /// Write a lossless source file with artist and title tags.
    pub fn tagged_source(dir: &Path, name: &str, artist: &str, title: &str) -> PathBuf {
        let tags = TagSet::new()
            .with(TagField::Artist, artist)
            .with(TagField::Title, title);
        write_fixture(
            dir,
            name,
            FakeAudio::new(LOSSLESS_KBPS)
                .with_tags(tags)
                .with_payload_len(8 * 1024),
        )
    }

    /// Write an untagged lossless source file.
    pub fn untagged_source(dir: &Path, name: &str) -> PathBuf {
        write_fixture(dir, name, FakeAudio::new(LOSSLESS_KBPS).with_payload_len(8 * 1024))
    }

    /// Write an already-encoded file at `bitrate_kbps`.
    pub fn encoded_file(dir: &Path, name: &str, bitrate_kbps: u32) -> PathBuf {
        write_fixture(dir, name, FakeAudio::new(bitrate_kbps).with_payload_len(2 * 1024))
    }

    /// Write any `FakeAudio` under `dir`, creating parent directories.
    pub fn write_fixture(dir: &Path, name: &str, audio: FakeAudio) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .unwrap_or_else(|e| panic!("failed to create {}: {}", parent.display(), e));
        }
        audio
            .write(&path)
            .unwrap_or_else(|e| panic!("failed to write fixture {}: {}", path.display(), e));
        path
    }
}
