//! Mock tag accessor for testing.

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use super::FakeAudio;
use crate::tags::{TagAccessor, TagError, TagSet};

/// Tag accessor over [`FakeAudio`] files.
///
/// Files that are not `FakeAudio` documents have unreadable tags and no
/// readable bitrate. `set_unreadable(true)` makes every tag read fail.
#[derive(Debug, Default)]
pub struct MockTagAccessor {
    unreadable: AtomicBool,
    writes: AtomicUsize,
}

impl MockTagAccessor {
    /// Create a new mock tag accessor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `read_tags`/`copy_tags` call fail.
    pub fn set_unreadable(&self, unreadable: bool) {
        self.unreadable.store(unreadable, Ordering::SeqCst);
    }

    /// Number of successful tag writes.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn load(path: &Path) -> Result<FakeAudio, TagError> {
        FakeAudio::read(path).map_err(|e| TagError::unavailable(path, e))
    }

    fn store(&self, path: &Path, audio: &FakeAudio) -> Result<(), TagError> {
        audio
            .write(path)
            .map_err(|e| TagError::write_failed(path, e))?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl TagAccessor for MockTagAccessor {
    fn name(&self) -> &str {
        "mock"
    }

    fn read_bitrate(&self, path: &Path) -> Result<u32, TagError> {
        FakeAudio::read(path)
            .map(|audio| audio.bitrate_kbps)
            .map_err(|e| TagError::bitrate_unavailable(path, e))
    }

    fn read_tags(&self, path: &Path) -> Result<TagSet, TagError> {
        if self.unreadable.load(Ordering::SeqCst) {
            return Err(TagError::unavailable(path, "mock: tags unreadable"));
        }
        let audio = Self::load(path)?;
        if audio.tags_unreadable {
            return Err(TagError::unavailable(path, "corrupt tag header"));
        }
        Ok(audio.tags)
    }

    fn write_tags(&self, path: &Path, tags: &TagSet) -> Result<(), TagError> {
        let mut audio = FakeAudio::read(path).map_err(|e| TagError::write_failed(path, e))?;
        audio.tags.merge_from(tags);
        self.store(path, &audio)
    }

    fn copy_tags(&self, source: &Path, dest: &Path) -> Result<TagSet, TagError> {
        let source_tags = self.read_tags(source)?;
        let mut audio = FakeAudio::read(dest).map_err(|e| TagError::write_failed(dest, e))?;
        audio.tags.merge_from(&source_tags);
        self.store(dest, &audio)?;
        Ok(audio.tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::TagField;
    use tempfile::TempDir;

    #[test]
    fn test_copy_tags_source_wins() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("a.flac");
        let dest = temp.path().join("a.mp3");
        FakeAudio::new(1411)
            .with_tags(TagSet::new().with(TagField::Title, "Source"))
            .write(&source)
            .unwrap();
        FakeAudio::new(256)
            .with_tags(
                TagSet::new()
                    .with(TagField::Title, "Dest")
                    .with(TagField::Genre, "Ambient"),
            )
            .write(&dest)
            .unwrap();

        let accessor = MockTagAccessor::new();
        let merged = accessor.copy_tags(&source, &dest).unwrap();

        assert_eq!(merged.title(), Some("Source"));
        assert_eq!(merged.get(TagField::Genre), Some("Ambient"));
        assert_eq!(FakeAudio::read(&dest).unwrap().tags, merged);
        assert_eq!(accessor.write_count(), 1);
    }

    #[test]
    fn test_unreadable_switch() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a.mp3");
        FakeAudio::new(256).write(&path).unwrap();

        let accessor = MockTagAccessor::new();
        accessor.set_unreadable(true);
        assert!(matches!(
            accessor.read_tags(&path),
            Err(TagError::Unavailable { .. })
        ));
        // Bitrate is still readable
        assert_eq!(accessor.read_bitrate(&path).unwrap(), 256);
    }

    #[test]
    fn test_corrupt_tag_header() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a.flac");
        FakeAudio::new(1411).with_unreadable_tags().write(&path).unwrap();

        let accessor = MockTagAccessor::new();
        assert!(accessor.read_tags(&path).is_err());
    }
}
