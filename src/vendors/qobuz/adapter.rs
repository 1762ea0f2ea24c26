//! Adapter layer: Convert Qobuz DTOs to candidates and field maps
//!
//! Qobuz only exposes track credits as one free-text `performers` string,
//! so most of the work here is picking that apart.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;

use super::dto;
use crate::matching::{CandidateRecord, Identifier};
use crate::tags::{FieldMap, FieldValue, TagField, join_names};
use crate::vendors::domain::{Vendor, VendorMetadata};

const COMPOSER_ROLES: [&str; 4] = ["Composer", "ComposerLyricist", "Lyricist", "Writer"];

/// Splits one `"Name, Role, Role"` credit into name and roles. Names may
/// themselves contain ", " after an initial ("J. Doe") or an ampersand.
fn credit_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(^.*[A-Za-z]\.|^.*&.*|[\d\s\w].*?)(?:, )(.*)").ok())
        .as_ref()
}

/// Credits parsed from a `performers` string, in order of appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credits {
    people: Vec<(String, Vec<String>)>,
}

impl Credits {
    pub fn parse(performers: &str) -> Self {
        let Some(re) = credit_regex() else {
            return Self::default();
        };
        let people = performers
            .split(" - ")
            .filter_map(|entry| {
                let caps = re.captures(entry.trim_end())?;
                let name = caps.get(1)?.as_str().to_string();
                let roles = caps.get(2)?.as_str().split(", ").map(String::from).collect();
                Some((name, roles))
            })
            .collect();
        Self { people }
    }

    /// Everyone credited with `role`.
    pub fn with_role(&self, role: &str) -> Vec<String> {
        self.people
            .iter()
            .filter(|(_, roles)| roles.iter().any(|r| r == role))
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Songwriting credits, sorted and de-duplicated.
    pub fn composers(&self) -> Vec<String> {
        self.people
            .iter()
            .filter(|(_, roles)| roles.iter().any(|r| COMPOSER_ROLES.contains(&r.as_str())))
            .map(|(name, _)| name.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Append `extra` in parentheses, or brackets if the text already has some.
fn with_suffix(base: &str, extra: &str) -> String {
    if base.contains('(') {
        format!("{} [{}]", base, extra)
    } else {
        format!("{} ({})", base, extra)
    }
}

fn decorate(base: &str, featured: &[String], version: Option<&str>) -> String {
    let mut text = base.to_string();
    if !text.contains("feat.")
        && let Some(names) = join_names(featured)
    {
        text = with_suffix(&text, &format!("feat. {}", names));
    }
    if let Some(v) = version.map(str::trim).filter(|v| !v.is_empty()) {
        text = with_suffix(&text, v);
    }
    text.replace("  ", " ")
}

fn album_artists_with_role(album: &dto::Album, role: &str) -> Vec<String> {
    album
        .artists
        .iter()
        .flatten()
        .filter(|a| a.roles.iter().any(|r| r == role))
        .map(|a| a.name.clone())
        .collect()
}

fn album_title(album: &dto::Album) -> String {
    let featured = album_artists_with_role(album, "featured-artist");
    decorate(&album.title, &featured, album.version.as_deref())
}

/// Main album artists, with the headline artist first.
fn album_artist(album: &dto::Album) -> Option<String> {
    let headline = album.artist.as_ref().map(|a| a.name.clone());
    let mut mains = album_artists_with_role(album, "main-artist");

    match headline {
        Some(name) => match mains.iter().position(|m| *m == name) {
            Some(i) => {
                let first = mains.remove(i);
                mains.insert(0, first);
                join_names(&mains)
            }
            None => Some(name),
        },
        None => join_names(&mains),
    }
}

/// Earliest of the release timestamps, as `YYYY-MM-DDTHH:MM:SSZ`.
fn release_date(track: &dto::Track) -> Option<String> {
    let from_text = [
        &track.release_date_original,
        &track.release_date_download,
        &track.release_date_stream,
        &track.release_date_purchase,
    ]
    .into_iter()
    .flatten()
    .filter_map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
    .filter_map(|d| d.and_hms_opt(0, 0, 0));

    let from_unix = [track.purchasable_at, track.streamable_at]
        .into_iter()
        .flatten()
        .filter_map(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
        .map(|dt| dt.naive_utc());

    from_text
        .chain(from_unix)
        .min()
        .map(|dt: NaiveDateTime| dt.format("%Y-%m-%dT%H:%M:%SZ").to_string())
}

pub fn track_to_candidate(track: &dto::Track) -> CandidateRecord {
    CandidateRecord {
        vendor: Vendor::Qobuz,
        id: track.id.to_string(),
        title: Some(track.title.clone()),
        artist: track.performer.as_ref().map(|p| p.name.clone()),
        identifier: track.isrc.clone().map(Identifier::Isrc),
        count: track.album.as_ref().and_then(|a| a.tracks_count),
    }
}

pub fn album_to_candidate(album: &dto::Album) -> CandidateRecord {
    CandidateRecord {
        vendor: Vendor::Qobuz,
        id: album.id.clone(),
        title: Some(album.title.clone()),
        artist: album.artist.as_ref().map(|a| a.name.clone()),
        identifier: album.upc.clone().map(Identifier::Upc),
        count: album.tracks_count,
    }
}

fn album_fields(album: &dto::Album, fields: &mut FieldMap) {
    fields.set_opt_text(TagField::Copyright, album.copyright.clone());
    fields.set_opt_integer(TagField::DiscCount, album.media_count);
    fields.set_opt_text(TagField::Genre, album.genre.as_ref().map(|g| g.name.clone()));
    fields.set_opt_integer(TagField::TrackCount, album.tracks_count);
}

/// Map a track to tag fields.
pub fn track_to_metadata(track: &dto::Track) -> VendorMetadata {
    let mut fields = FieldMap::new();
    let credits = track.performers.as_deref().map(Credits::parse).unwrap_or_default();

    let artist = join_names(&credits.with_role("MainArtist"))
        .or_else(|| track.performer.as_ref().map(|p| p.name.clone()));
    let title = decorate(
        &track.title,
        &credits.with_role("FeaturedArtist"),
        track.version.as_deref(),
    );

    let mut album_name = track.album.as_ref().map(album_title);
    let mut album_artist_name = track.album.as_ref().and_then(album_artist);
    let mut artist_name = artist;

    // Singles named after their only track
    let is_single = track
        .album
        .as_ref()
        .is_some_and(|a| a.release_type.as_deref() == Some("single"));
    if is_single && album_name.as_deref() == Some(title.as_str()) {
        album_name = album_name.map(|a| format!("{} - Single", a));
        let longest = [artist_name.clone(), album_artist_name.clone()]
            .into_iter()
            .flatten()
            .max_by_key(|s| s.len());
        artist_name = longest.clone();
        album_artist_name = longest;
    }

    fields.set_opt_text(TagField::Album, album_name);
    fields.set_opt_text(TagField::AlbumArtist, album_artist_name);
    fields.set_opt_text(TagField::Artist, artist_name);

    let composers = credits.composers();
    if !composers.is_empty() {
        fields.set(TagField::Composer, FieldValue::List(composers));
    } else if let Some(c) = &track.composer {
        fields.set(TagField::Composer, FieldValue::List(vec![c.name.clone()]));
    }

    fields.set_opt_text(TagField::Date, release_date(track));
    fields.set_opt_integer(TagField::DiscNumber, track.media_number);
    fields.set_opt_text(TagField::Isrc, track.isrc.clone());
    fields.set_text(TagField::Title, title);
    fields.set_opt_integer(TagField::TrackNumber, track.track_number);

    if let Some(album) = &track.album {
        album_fields(album, &mut fields);
    }

    VendorMetadata {
        fields,
        artwork_url: track.album.as_ref().and_then(|a| a.image.large.clone()),
    }
}

pub fn album_to_metadata(album: &dto::Album) -> VendorMetadata {
    let mut fields = FieldMap::new();

    fields.set_text(TagField::Album, album_title(album));
    fields.set_opt_text(TagField::AlbumArtist, album_artist(album));
    fields.set_opt_text(
        TagField::Date,
        album
            .release_date_original
            .as_deref()
            .map(|d| format!("{}T00:00:00Z", d)),
    );
    album_fields(album, &mut fields);

    VendorMetadata {
        fields,
        artwork_url: album.image.large.clone(),
    }
}
