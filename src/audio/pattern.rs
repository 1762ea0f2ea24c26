//! Filling tags from file names.

use std::path::Path;

use regex::Regex;

use crate::tags::{TagField, TagSet};

/// Capture group names a pattern may use.
const GROUPS: [&str; 3] = ["artist", "title", "track_number"];

#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    #[error("Invalid filename pattern: {0}")]
    Regex(#[from] regex::Error),

    #[error("Filename pattern needs at least one of the groups artist, title, track_number")]
    NoFields,
}

/// Regular expression over a file stem with named groups `artist`, `title`
/// and `track_number`.
#[derive(Debug, Clone)]
pub struct FilenamePattern {
    regex: Regex,
}

impl FilenamePattern {
    pub fn new(pattern: &str) -> Result<Self, PatternError> {
        let regex = Regex::new(pattern)?;
        if !regex.capture_names().flatten().any(|n| GROUPS.contains(&n)) {
            return Err(PatternError::NoFields);
        }
        Ok(Self { regex })
    }

    /// `Artist - Title`
    pub fn artist_title() -> Result<Self, PatternError> {
        Self::new(r"^(?P<artist>.+?) - (?P<title>.+)$")
    }

    /// `01 - Artist - Title` or `01. Artist - Title`
    pub fn track_artist_title() -> Result<Self, PatternError> {
        Self::new(r"^(?P<track_number>\d+)\s*[-.]\s*(?P<artist>.+?) - (?P<title>.+)$")
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Fill absent `artist`, `title` and `track_number` from the file stem.
    ///
    /// Returns the fields that were set.
    pub fn apply(&self, path: &Path, tags: &mut TagSet) -> Vec<TagField> {
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            return Vec::new();
        };
        let Some(caps) = self.regex.captures(stem) else {
            tracing::debug!("'{}' does not match {}", stem, self.regex.as_str());
            return Vec::new();
        };

        let mut filled = Vec::new();
        let value = |name: &str| caps.name(name).map(|m| m.as_str().trim().to_string());

        if tags.artist.is_none()
            && let Some(artist) = value("artist")
        {
            tags.artist = Some(artist);
            filled.push(TagField::Artist);
        }
        if tags.title.is_none()
            && let Some(title) = value("title")
        {
            tags.title = Some(title);
            filled.push(TagField::Title);
        }
        if tags.track_number.is_none()
            && let Some(n) = value("track_number").and_then(|s| s.parse::<u32>().ok())
        {
            tags.track_number = Some(n);
            filled.push(TagField::TrackNumber);
        }
        filled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fills_absent_fields() {
        let mut tags = TagSet::default();
        let filled = FilenamePattern::track_artist_title()
            .unwrap()
            .apply(Path::new("/music/01 - Spektrem - Shine.flac"), &mut tags);

        assert_eq!(filled, vec![TagField::Artist, TagField::Title, TagField::TrackNumber]);
        assert_eq!(tags.artist.as_deref(), Some("Spektrem"));
        assert_eq!(tags.title.as_deref(), Some("Shine"));
        assert_eq!(tags.track_number, Some(1));
    }

    #[test]
    fn test_existing_fields_win() {
        let mut tags = TagSet {
            title: Some("Shine (Original Mix)".to_string()),
            ..Default::default()
        };
        let filled = FilenamePattern::artist_title().unwrap().apply(Path::new("Spektrem - Shine.mp3"), &mut tags);

        assert_eq!(filled, vec![TagField::Artist]);
        assert_eq!(tags.title.as_deref(), Some("Shine (Original Mix)"));
    }

    #[test]
    fn test_non_matching_name() {
        let mut tags = TagSet::default();
        let filled = FilenamePattern::artist_title().unwrap().apply(Path::new("track01.mp3"), &mut tags);
        assert!(filled.is_empty());
        assert!(tags.is_empty());
    }

    #[test]
    fn test_custom_pattern() {
        let pattern = FilenamePattern::new(r"^(?P<title>.+) \[(?P<artist>.+)\]$").unwrap();
        let mut tags = TagSet::default();
        pattern.apply(Path::new("Shine [Spektrem].ogg"), &mut tags);
        assert_eq!(tags.artist.as_deref(), Some("Spektrem"));
    }

    #[test]
    fn test_pattern_needs_known_group() {
        assert!(matches!(FilenamePattern::new(r"(?P<album>.+)"), Err(PatternError::NoFields)));
        assert!(matches!(FilenamePattern::new(r"(?P<title>"), Err(PatternError::Regex(_))));
    }
}
