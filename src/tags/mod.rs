//! In-memory tag model shared by vendor adapters and audio file handlers.
//!
//! [`TagSet`] is the mutable record of one file's metadata. Every field is an
//! `Option`: `None` means "not yet known", while `Some(String::new())` means
//! the file genuinely carries an empty value. Vendor adapters never touch a
//! `TagSet` directly; they produce a [`FieldMap`] which is applied through
//! [`TagSet::merge`].

mod merge;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub use merge::{MergeError, MergeReport};

/// Embedded cover image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artwork {
    /// Raw image bytes
    pub data: Vec<u8>,
    /// MIME type (image/jpeg, image/png)
    pub mime_type: String,
}

impl Artwork {
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            data,
            mime_type: mime_type.into(),
        }
    }
}

/// Metadata fields of a single audio file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub album_artist: Option<String>,
    pub genre: Option<String>,
    /// Release date, either `YYYY`, `YYYY-MM-DD` or a full ISO 8601 timestamp
    pub date: Option<String>,
    /// Composers, lyricists and writers
    pub composer: Option<Vec<String>>,
    pub isrc: Option<String>,
    pub lyrics: Option<String>,
    pub artwork: Option<Artwork>,
    pub track_number: Option<u32>,
    pub track_count: Option<u32>,
    pub disc_number: Option<u32>,
    pub disc_count: Option<u32>,
    /// Beats per minute
    pub tempo: Option<u32>,
    pub compilation: Option<bool>,
    pub comment: Option<String>,
    pub copyright: Option<String>,
}

impl TagSet {
    /// True when no field is known.
    pub fn is_empty(&self) -> bool {
        TagField::ALL.iter().all(|f| self.get(*f).is_none())
    }

    /// Read a field as a [`FieldValue`].
    pub fn get(&self, field: TagField) -> Option<FieldValue> {
        match field {
            TagField::Title => self.title.clone().map(FieldValue::Text),
            TagField::Artist => self.artist.clone().map(FieldValue::Text),
            TagField::Album => self.album.clone().map(FieldValue::Text),
            TagField::AlbumArtist => self.album_artist.clone().map(FieldValue::Text),
            TagField::Genre => self.genre.clone().map(FieldValue::Text),
            TagField::Date => self.date.clone().map(FieldValue::Text),
            TagField::Composer => self.composer.clone().map(FieldValue::List),
            TagField::Isrc => self.isrc.clone().map(FieldValue::Text),
            TagField::Lyrics => self.lyrics.clone().map(FieldValue::Text),
            TagField::Artwork => self.artwork.clone().map(FieldValue::Binary),
            TagField::TrackNumber => self.track_number.map(FieldValue::Integer),
            TagField::TrackCount => self.track_count.map(FieldValue::Integer),
            TagField::DiscNumber => self.disc_number.map(FieldValue::Integer),
            TagField::DiscCount => self.disc_count.map(FieldValue::Integer),
            TagField::Tempo => self.tempo.map(FieldValue::Integer),
            TagField::Compilation => self.compilation.map(FieldValue::Bool),
            TagField::Comment => self.comment.clone().map(FieldValue::Text),
            TagField::Copyright => self.copyright.clone().map(FieldValue::Text),
        }
    }
}

/// The shape a field's value must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    List,
    Integer,
    Bool,
    Binary,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Text => "text",
            FieldKind::List => "list",
            FieldKind::Integer => "integer",
            FieldKind::Bool => "bool",
            FieldKind::Binary => "binary",
        };
        f.write_str(name)
    }
}

/// Recognized tag fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TagField {
    Title,
    Artist,
    Album,
    AlbumArtist,
    Genre,
    Date,
    Composer,
    Isrc,
    Lyrics,
    Artwork,
    TrackNumber,
    TrackCount,
    DiscNumber,
    DiscCount,
    Tempo,
    Compilation,
    Comment,
    Copyright,
}

impl TagField {
    pub const ALL: [TagField; 18] = [
        TagField::Title,
        TagField::Artist,
        TagField::Album,
        TagField::AlbumArtist,
        TagField::Genre,
        TagField::Date,
        TagField::Composer,
        TagField::Isrc,
        TagField::Lyrics,
        TagField::Artwork,
        TagField::TrackNumber,
        TagField::TrackCount,
        TagField::DiscNumber,
        TagField::DiscCount,
        TagField::Tempo,
        TagField::Compilation,
        TagField::Comment,
        TagField::Copyright,
    ];

    /// Key used in [`FieldMap`]s.
    pub fn name(self) -> &'static str {
        match self {
            TagField::Title => "title",
            TagField::Artist => "artist",
            TagField::Album => "album",
            TagField::AlbumArtist => "album_artist",
            TagField::Genre => "genre",
            TagField::Date => "date",
            TagField::Composer => "composer",
            TagField::Isrc => "isrc",
            TagField::Lyrics => "lyrics",
            TagField::Artwork => "artwork",
            TagField::TrackNumber => "track_number",
            TagField::TrackCount => "track_count",
            TagField::DiscNumber => "disc_number",
            TagField::DiscCount => "disc_count",
            TagField::Tempo => "tempo",
            TagField::Compilation => "compilation",
            TagField::Comment => "comment",
            TagField::Copyright => "copyright",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            TagField::Composer => FieldKind::List,
            TagField::Artwork => FieldKind::Binary,
            TagField::TrackNumber
            | TagField::TrackCount
            | TagField::DiscNumber
            | TagField::DiscCount
            | TagField::Tempo => FieldKind::Integer,
            TagField::Compilation => FieldKind::Bool,
            _ => FieldKind::Text,
        }
    }
}

impl fmt::Display for TagField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TagField {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TagField::ALL
            .iter()
            .copied()
            .find(|f| f.name() == s)
            .ok_or(())
    }
}

/// A value supplied for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
    Integer(u32),
    Bool(bool),
    Binary(Artwork),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Text(_) => FieldKind::Text,
            FieldValue::List(_) => FieldKind::List,
            FieldValue::Integer(_) => FieldKind::Integer,
            FieldValue::Bool(_) => FieldKind::Bool,
            FieldValue::Binary(_) => FieldKind::Binary,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::List(items) => f.write_str(&items.join("; ")),
            FieldValue::Integer(n) => write!(f, "{}", n),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Binary(art) => write!(f, "<{} bytes, {}>", art.data.len(), art.mime_type),
        }
    }
}

/// Field values sourced from one vendor response, keyed by field name.
///
/// Keys that don't name a [`TagField`] are carried along but ignored when
/// merging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    entries: BTreeMap<String, FieldValue>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value under an arbitrary key.
    pub fn insert(&mut self, key: impl Into<String>, value: FieldValue) {
        self.entries.insert(key.into(), value);
    }

    pub fn set(&mut self, field: TagField, value: FieldValue) {
        self.insert(field.name(), value);
    }

    pub fn set_text(&mut self, field: TagField, value: impl Into<String>) {
        self.set(field, FieldValue::Text(value.into()));
    }

    /// Set a text field only when a value is available.
    pub fn set_opt_text(&mut self, field: TagField, value: Option<impl Into<String>>) {
        if let Some(v) = value {
            self.set_text(field, v);
        }
    }

    pub fn set_opt_integer(&mut self, field: TagField, value: Option<u32>) {
        if let Some(v) = value {
            self.set(field, FieldValue::Integer(v));
        }
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.entries.get(key)
    }

    pub fn get_field(&self, field: TagField) -> Option<&FieldValue> {
        self.get(field.name())
    }

    pub fn contains(&self, field: TagField) -> bool {
        self.entries.contains_key(field.name())
    }

    pub fn remove(&mut self, field: TagField) -> Option<FieldValue> {
        self.entries.remove(field.name())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Join names into a single display string: `"A, B & C"`.
///
/// Used where a tag format or field doesn't support multiple values.
pub fn join_names<S: AsRef<str>>(names: &[S]) -> Option<String> {
    match names {
        [] => None,
        [only] => Some(only.as_ref().to_string()),
        [init @ .., last] => {
            let head = init
                .iter()
                .map(|s| s.as_ref())
                .collect::<Vec<_>>()
                .join(", ");
            Some(format!("{} & {}", head, last.as_ref()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tagset_is_empty() {
        assert!(TagSet::default().is_empty());
    }

    #[test]
    fn test_empty_string_is_not_absent() {
        let tags = TagSet {
            comment: Some(String::new()),
            ..Default::default()
        };
        assert!(!tags.is_empty());
        assert_eq!(tags.get(TagField::Comment), Some(FieldValue::Text(String::new())));
    }

    #[test]
    fn test_field_name_roundtrip() {
        for field in TagField::ALL {
            assert_eq!(field.name().parse::<TagField>(), Ok(field));
        }
        assert!("bitrate".parse::<TagField>().is_err());
    }

    #[test]
    fn test_field_kinds() {
        assert_eq!(TagField::Composer.kind(), FieldKind::List);
        assert_eq!(TagField::Tempo.kind(), FieldKind::Integer);
        assert_eq!(TagField::Compilation.kind(), FieldKind::Bool);
        assert_eq!(TagField::Artwork.kind(), FieldKind::Binary);
        assert_eq!(TagField::Genre.kind(), FieldKind::Text);
    }

    #[test]
    fn test_join_names() {
        assert_eq!(join_names::<&str>(&[]), None);
        assert_eq!(join_names(&["Queen"]), Some("Queen".to_string()));
        assert_eq!(join_names(&["A", "B"]), Some("A & B".to_string()));
        assert_eq!(join_names(&["A", "B", "C"]), Some("A, B & C".to_string()));
    }

    #[test]
    fn test_field_map_opt_setters() {
        let mut map = FieldMap::new();
        map.set_opt_text(TagField::Title, Some("Shine"));
        map.set_opt_text(TagField::Album, None::<String>);
        map.set_opt_integer(TagField::TrackNumber, Some(3));
        map.set_opt_integer(TagField::DiscNumber, None);

        assert_eq!(map.len(), 2);
        assert_eq!(map.get_field(TagField::Title), Some(&FieldValue::Text("Shine".into())));
        assert!(!map.contains(TagField::Album));
    }
}
