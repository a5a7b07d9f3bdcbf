//! Tag set types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Container-independent tag fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagField {
    Artist,
    Title,
    Album,
    AlbumArtist,
    Genre,
    Year,
    TrackNumber,
    DiscNumber,
    Composer,
    Comment,
}

impl TagField {
    pub const ALL: [TagField; 10] = [
        Self::Artist,
        Self::Title,
        Self::Album,
        Self::AlbumArtist,
        Self::Genre,
        Self::Year,
        Self::TrackNumber,
        Self::DiscNumber,
        Self::Composer,
        Self::Comment,
    ];
}

/// Field name to value mapping for one file.
///
/// Empty values are never stored, so `get` returning `None` means the field
/// is absent or blank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet(BTreeMap<TagField, String>);

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field. Blank values clear it.
    pub fn set(&mut self, field: TagField, value: impl Into<String>) {
        let value = value.into();
        if value.trim().is_empty() {
            self.0.remove(&field);
        } else {
            self.0.insert(field, value);
        }
    }

    pub fn with(mut self, field: TagField, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn get(&self, field: TagField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn artist(&self) -> Option<&str> {
        self.get(TagField::Artist)
    }

    pub fn title(&self) -> Option<&str> {
        self.get(TagField::Title)
    }

    /// Whether either of the fields recovery can fill is missing.
    pub fn lacks_identity(&self) -> bool {
        self.artist().is_none() || self.title().is_none()
    }

    /// Copies every field of `other` over this set.
    pub fn merge_from(&mut self, other: &TagSet) {
        for (field, value) in other.iter() {
            self.0.insert(field, value.to_string());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (TagField, &str)> {
        self.0.iter().map(|(field, value)| (*field, value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_values_are_not_stored() {
        let mut tags = TagSet::new().with(TagField::Artist, "Nina Simone");
        tags.set(TagField::Title, "  ");
        assert_eq!(tags.len(), 1);
        assert!(tags.title().is_none());

        tags.set(TagField::Artist, "");
        assert!(tags.is_empty());
    }

    #[test]
    fn test_lacks_identity() {
        let tags = TagSet::new().with(TagField::Artist, "Nina Simone");
        assert!(tags.lacks_identity());
        let tags = tags.with(TagField::Title, "Sinnerman");
        assert!(!tags.lacks_identity());
    }

    #[test]
    fn test_merge_overwrites() {
        let mut target = TagSet::new()
            .with(TagField::Artist, "Unknown")
            .with(TagField::Album, "Pastel Blues");
        let source = TagSet::new()
            .with(TagField::Artist, "Nina Simone")
            .with(TagField::Title, "Sinnerman");

        target.merge_from(&source);
        assert_eq!(target.artist(), Some("Nina Simone"));
        assert_eq!(target.title(), Some("Sinnerman"));
        assert_eq!(target.get(TagField::Album), Some("Pastel Blues"));
    }

    #[test]
    fn test_json_shape() {
        let tags = TagSet::new().with(TagField::AlbumArtist, "Various");
        let json = serde_json::to_string(&tags).unwrap();
        assert_eq!(json, r#"{"album_artist":"Various"}"#);
    }
}
