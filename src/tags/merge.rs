//! Field-by-field merge of vendor data into a [`TagSet`].
//!
//! Rules, per field:
//! - destination absent: take the source value
//! - destination present, no overwrite: keep it
//! - destination present, overwrite: replace it, except list fields which
//!   gain the source entries they don't already hold (case-insensitive exact
//!   comparison; alternate spellings of one name are kept side by side)
//!
//! Artwork follows the scalar rule. Empty image data never replaces anything.

use super::{Artwork, FieldKind, FieldMap, FieldValue, TagField, TagSet};

/// Raised when a source value has the wrong shape for its field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MergeError {
    #[error("Field '{field}' expects a {expected} value, got {found}")]
    TypeMismatch {
        field: TagField,
        expected: FieldKind,
        found: FieldKind,
    },
}

/// Summary of what a merge changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Fields that received a new value
    pub fields_updated: Vec<TagField>,
    /// Fields left alone because they already had a value
    pub fields_skipped: Vec<TagField>,
    /// Source keys that don't name a known field
    pub ignored_keys: Vec<String>,
}

impl MergeReport {
    pub fn changed(&self) -> bool {
        !self.fields_updated.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Updated,
    Skipped,
    Unchanged,
}

impl TagSet {
    /// Apply `source` onto this tag set.
    ///
    /// Shapes are checked for every recognized key before anything is
    /// written, so a rejected merge leaves the tag set untouched.
    pub fn merge(&mut self, source: &FieldMap, overwrite: bool) -> Result<MergeReport, MergeError> {
        let mut report = MergeReport::default();
        let mut accepted = Vec::with_capacity(source.len());

        for (key, value) in source.iter() {
            let Ok(field) = key.parse::<TagField>() else {
                tracing::debug!("Ignoring unrecognized field '{}'", key);
                report.ignored_keys.push(key.to_string());
                continue;
            };
            check_shape(field, value)?;
            accepted.push((field, value));
        }

        for (field, value) in accepted {
            match self.apply(field, value, overwrite) {
                Outcome::Updated => report.fields_updated.push(field),
                Outcome::Skipped => report.fields_skipped.push(field),
                Outcome::Unchanged => {}
            }
        }

        Ok(report)
    }

    fn apply(&mut self, field: TagField, value: &FieldValue, overwrite: bool) -> Outcome {
        match (field, value) {
            (TagField::Composer, FieldValue::List(items)) => {
                merge_list(&mut self.composer, items, overwrite)
            }
            (TagField::Composer, FieldValue::Text(item)) => {
                merge_list(&mut self.composer, std::slice::from_ref(item), overwrite)
            }
            (TagField::Artwork, FieldValue::Binary(art)) => merge_artwork(&mut self.artwork, art, overwrite),
            (TagField::Compilation, FieldValue::Bool(b)) => merge_scalar(&mut self.compilation, b, overwrite),
            (_, FieldValue::Integer(n)) => match self.integer_slot(field) {
                Some(slot) => merge_scalar(slot, n, overwrite),
                None => Outcome::Unchanged,
            },
            (_, FieldValue::Text(s)) => match self.text_slot(field) {
                Some(slot) => merge_scalar(slot, s, overwrite),
                None => Outcome::Unchanged,
            },
            // Shapes were validated up front
            _ => Outcome::Unchanged,
        }
    }

    fn text_slot(&mut self, field: TagField) -> Option<&mut Option<String>> {
        match field {
            TagField::Title => Some(&mut self.title),
            TagField::Artist => Some(&mut self.artist),
            TagField::Album => Some(&mut self.album),
            TagField::AlbumArtist => Some(&mut self.album_artist),
            TagField::Genre => Some(&mut self.genre),
            TagField::Date => Some(&mut self.date),
            TagField::Isrc => Some(&mut self.isrc),
            TagField::Lyrics => Some(&mut self.lyrics),
            TagField::Comment => Some(&mut self.comment),
            TagField::Copyright => Some(&mut self.copyright),
            _ => None,
        }
    }

    fn integer_slot(&mut self, field: TagField) -> Option<&mut Option<u32>> {
        match field {
            TagField::TrackNumber => Some(&mut self.track_number),
            TagField::TrackCount => Some(&mut self.track_count),
            TagField::DiscNumber => Some(&mut self.disc_number),
            TagField::DiscCount => Some(&mut self.disc_count),
            TagField::Tempo => Some(&mut self.tempo),
            _ => None,
        }
    }
}

fn check_shape(field: TagField, value: &FieldValue) -> Result<(), MergeError> {
    let expected = field.kind();
    let found = value.kind();
    // A lone name is a one-element list
    let promotable = expected == FieldKind::List && found == FieldKind::Text;
    if expected == found || promotable {
        Ok(())
    } else {
        Err(MergeError::TypeMismatch {
            field,
            expected,
            found,
        })
    }
}

fn merge_scalar<T: Clone + PartialEq>(slot: &mut Option<T>, value: &T, overwrite: bool) -> Outcome {
    match slot {
        None => {
            *slot = Some(value.clone());
            Outcome::Updated
        }
        Some(_) if !overwrite => Outcome::Skipped,
        Some(existing) if existing == value => Outcome::Unchanged,
        Some(existing) => {
            *existing = value.clone();
            Outcome::Updated
        }
    }
}

fn merge_list(slot: &mut Option<Vec<String>>, values: &[String], overwrite: bool) -> Outcome {
    match slot {
        None => {
            let mut list = Vec::with_capacity(values.len());
            push_unique(&mut list, values);
            *slot = Some(list);
            Outcome::Updated
        }
        Some(_) if !overwrite => Outcome::Skipped,
        Some(existing) => {
            if push_unique(existing, values) { Outcome::Updated } else { Outcome::Unchanged }
        }
    }
}

/// Append the values not already present, ignoring case. Returns whether any were added.
fn push_unique(list: &mut Vec<String>, values: &[String]) -> bool {
    let mut added = false;
    for value in values {
        let folded = value.to_lowercase();
        if !list.iter().any(|e| e.to_lowercase() == folded) {
            list.push(value.clone());
            added = true;
        }
    }
    added
}

fn merge_artwork(slot: &mut Option<Artwork>, art: &Artwork, overwrite: bool) -> Outcome {
    if art.data.is_empty() {
        return Outcome::Unchanged;
    }
    merge_scalar(slot, art, overwrite)
}
