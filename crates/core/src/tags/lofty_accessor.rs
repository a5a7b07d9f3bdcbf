//! lofty-backed tag accessor.

use std::path::Path;

use lofty::{AudioFile, ItemKey, Probe, Tag, TagExt, TaggedFile, TaggedFileExt};

use super::error::TagError;
use super::traits::TagAccessor;
use super::types::{TagField, TagSet};

/// Tag accessor for every container lofty understands.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoftyTagAccessor;

impl LoftyTagAccessor {
    pub fn new() -> Self {
        Self
    }

    fn item_key(field: TagField) -> ItemKey {
        match field {
            TagField::Artist => ItemKey::TrackArtist,
            TagField::Title => ItemKey::TrackTitle,
            TagField::Album => ItemKey::AlbumTitle,
            TagField::AlbumArtist => ItemKey::AlbumArtist,
            TagField::Genre => ItemKey::Genre,
            TagField::Year => ItemKey::Year,
            TagField::TrackNumber => ItemKey::TrackNumber,
            TagField::DiscNumber => ItemKey::DiscNumber,
            TagField::Composer => ItemKey::Composer,
            TagField::Comment => ItemKey::Comment,
        }
    }

    fn open(path: &Path) -> lofty::Result<TaggedFile> {
        Probe::open(path)?.read()
    }

    fn to_tag_set(tag: &Tag) -> TagSet {
        let mut tags = TagSet::new();
        for field in TagField::ALL {
            if let Some(value) = tag.get_string(&Self::item_key(field)) {
                tags.set(field, value);
            }
        }
        tags
    }

    /// Returns the primary tag, creating an empty one when the file has none.
    fn primary_tag_mut<'a>(path: &Path, file: &'a mut TaggedFile) -> Result<&'a mut Tag, TagError> {
        if file.primary_tag().is_none() {
            let tag_type = file.primary_tag_type();
            file.insert_tag(Tag::new(tag_type));
        }
        file.primary_tag_mut()
            .ok_or_else(|| TagError::write_failed(path, "Failed to create tag"))
    }
}

impl TagAccessor for LoftyTagAccessor {
    fn name(&self) -> &str {
        "lofty"
    }

    fn read_bitrate(&self, path: &Path) -> Result<u32, TagError> {
        let file = Self::open(path).map_err(|e| TagError::bitrate_unavailable(path, e))?;
        let properties = file.properties();

        properties
            .audio_bitrate()
            .or_else(|| properties.overall_bitrate())
            .filter(|kbps| *kbps > 0)
            .ok_or_else(|| TagError::bitrate_unavailable(path, "no bitrate in stream header"))
    }

    fn read_tags(&self, path: &Path) -> Result<TagSet, TagError> {
        let file = Self::open(path).map_err(|e| TagError::unavailable(path, e))?;

        Ok(file
            .primary_tag()
            .or_else(|| file.first_tag())
            .map(Self::to_tag_set)
            .unwrap_or_default())
    }

    fn write_tags(&self, path: &Path, tags: &TagSet) -> Result<(), TagError> {
        let mut file = Self::open(path).map_err(|e| TagError::write_failed(path, e))?;
        let tag = Self::primary_tag_mut(path, &mut file)?;

        for (field, value) in tags.iter() {
            tag.insert_text(Self::item_key(field), value.to_string());
        }

        tag.save_to_path(path)
            .map_err(|e| TagError::write_failed(path, e))
    }

    fn copy_tags(&self, source: &Path, dest: &Path) -> Result<TagSet, TagError> {
        let source_file = Self::open(source).map_err(|e| TagError::unavailable(source, e))?;
        let source_tag = source_file.primary_tag().or_else(|| source_file.first_tag());

        let mut dest_file = Self::open(dest).map_err(|e| TagError::write_failed(dest, e))?;
        let dest_tag = Self::primary_tag_mut(dest, &mut dest_file)?;

        if let Some(source_tag) = source_tag {
            // Items whose key has no mapping in the destination tag type are dropped
            for item in source_tag.items() {
                dest_tag.insert(item.clone());
            }

            if !source_tag.pictures().is_empty() {
                while !dest_tag.pictures().is_empty() {
                    dest_tag.remove_picture(0);
                }
                for picture in source_tag.pictures() {
                    dest_tag.push_picture(picture.clone());
                }
            }
        }

        dest_tag
            .save_to_path(dest)
            .map_err(|e| TagError::write_failed(dest, e))?;

        Ok(Self::to_tag_set(dest_tag))
    }
}
