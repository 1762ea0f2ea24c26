//! Adapter layer: Convert Discogs DTOs to candidates and field maps
//!
//! Discogs catalogs releases rather than recordings, so everything here is
//! album-level.

use std::sync::OnceLock;

use regex::Regex;

use super::dto;
use crate::matching::{CandidateRecord, Identifier};
use crate::tags::{FieldMap, FieldValue, TagField};
use crate::vendors::domain::{Vendor, VendorMetadata};

/// Credit roles that count as songwriting
const COMPOSER_ROLES: [&str; 6] = [
    "Written-By",
    "Composed By",
    "Lyrics By",
    "Music By",
    "Words By",
    "Songwriter",
];

/// Discogs numbers artists that share a name: "Spektrem (2)".
fn disambiguation_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+\(\d+\)$").ok()).as_ref()
}

pub fn clean_name(name: &str) -> String {
    let trimmed = name.trim();
    match disambiguation_regex() {
        Some(re) => re.replace(trimmed, "").into_owned(),
        None => trimmed.to_string(),
    }
}

fn credited_name(artist: &dto::Artist) -> String {
    if artist.anv.trim().is_empty() {
        clean_name(&artist.name)
    } else {
        clean_name(&artist.anv)
    }
}

/// Join credited artists using the release's own join phrases.
fn artist_line(artists: &[dto::Artist]) -> Option<String> {
    if artists.is_empty() {
        return None;
    }
    let mut line = String::new();
    for (i, artist) in artists.iter().enumerate() {
        line.push_str(&credited_name(artist));
        if i + 1 < artists.len() {
            match artist.join.trim() {
                "" => line.push_str(" & "),
                "," => line.push_str(", "),
                join => {
                    line.push(' ');
                    line.push_str(join);
                    line.push(' ');
                }
            }
        }
    }
    Some(line)
}

/// Split a search title of the form "Artist - Title".
fn split_title(title: &str) -> (Option<String>, String) {
    match title.split_once(" - ") {
        Some((artist, album)) => (Some(clean_name(artist)), album.trim().to_string()),
        None => (None, title.trim().to_string()),
    }
}

/// `2013-04-00` becomes `2013-04`; an unknown date falls back to the year.
fn release_date(released: Option<&str>, year: Option<i32>) -> Option<String> {
    let cleaned = released.map(|r| {
        let mut s = r.trim();
        while let Some(stripped) = s.strip_suffix("-00") {
            s = stripped;
        }
        s.to_string()
    });
    match cleaned {
        Some(s) if !s.is_empty() && s != "0000" => Some(s),
        _ => year.filter(|y| *y > 0).map(|y| y.to_string()),
    }
}

fn genre(genres: &[String], styles: &[String]) -> Option<String> {
    genres.first().or_else(|| styles.first()).cloned()
}

fn track_count(tracklist: &[dto::TracklistEntry]) -> Option<u32> {
    let n = tracklist
        .iter()
        .filter(|t| t.kind.as_deref().is_none_or(|k| k == "track"))
        .count();
    (n > 0).then_some(n as u32)
}

fn artwork(images: &[dto::Image]) -> Option<String> {
    images
        .iter()
        .find(|i| i.kind == "primary")
        .or_else(|| images.first())
        .map(|i| i.uri.clone())
}

/// Songwriters credited on the release or on any of its tracks, in order
/// of appearance without repeats.
pub fn composers(release: &dto::Release) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let credits = release
        .extraartists
        .iter()
        .chain(release.tracklist.iter().flat_map(|t| t.extraartists.iter()));
    for credit in credits {
        if COMPOSER_ROLES.iter().any(|r| credit.role.contains(r)) {
            let name = credited_name(credit);
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

pub fn search_to_candidate(result: &dto::SearchResult) -> CandidateRecord {
    let (artist, title) = split_title(&result.title);
    let barcode = result
        .barcode
        .first()
        .map(|b| b.chars().filter(|c| !c.is_whitespace()).collect::<String>())
        .filter(|b| !b.is_empty());
    CandidateRecord {
        vendor: Vendor::Discogs,
        id: result.id.to_string(),
        title: Some(title),
        artist,
        identifier: barcode.map(Identifier::Upc),
        count: None,
    }
}

pub fn release_to_metadata(release: &dto::Release) -> VendorMetadata {
    let mut fields = FieldMap::new();

    fields.set_text(TagField::Album, release.title.clone());
    fields.set_opt_text(TagField::AlbumArtist, artist_line(&release.artists));
    let credits = composers(release);
    if !credits.is_empty() {
        fields.set(TagField::Composer, FieldValue::List(credits));
    }
    fields.set_opt_text(
        TagField::Copyright,
        release
            .companies
            .iter()
            .find(|c| c.entity_type_name == "Copyright (c)")
            .map(|c| clean_name(&c.name)),
    );
    fields.set_opt_text(TagField::Date, release_date(release.released.as_deref(), release.year));
    fields.set_opt_text(TagField::Genre, genre(&release.genres, &release.styles));
    fields.set_opt_integer(TagField::TrackCount, track_count(&release.tracklist));

    VendorMetadata {
        fields,
        artwork_url: artwork(&release.images),
    }
}

pub fn master_to_metadata(master: &dto::Master) -> VendorMetadata {
    let mut fields = FieldMap::new();

    fields.set_text(TagField::Album, master.title.clone());
    fields.set_opt_text(TagField::AlbumArtist, artist_line(&master.artists));
    fields.set_opt_text(TagField::Date, release_date(None, master.year));
    fields.set_opt_text(TagField::Genre, genre(&master.genres, &master.styles));
    fields.set_opt_integer(TagField::TrackCount, track_count(&master.tracklist));

    VendorMetadata {
        fields,
        artwork_url: artwork(&master.images),
    }
}
