//! Adapter layer: Convert TIDAL DTOs to candidates and field maps

use std::collections::BTreeSet;

use super::dto;
use crate::matching::{CandidateRecord, Identifier};
use crate::tags::{FieldMap, FieldValue, TagField, join_names};
use crate::vendors::domain::{Vendor, VendorMetadata};

/// Square sizes served by the image CDN, largest first
const ARTWORK_SIZES: [u32; 7] = [1280, 1080, 750, 640, 320, 160, 80];

/// Contributor roles that count as songwriting credits
const COMPOSER_ROLES: [&str; 3] = ["Composer", "Lyricist", "Writer"];

fn main_artists(artists: &[dto::Artist]) -> Option<String> {
    let names: Vec<&str> = artists
        .iter()
        .filter(|a| a.kind.as_deref().is_none_or(|k| k == "MAIN"))
        .map(|a| a.name.as_str())
        .collect();
    join_names(&names)
}

/// Cover URL at the largest available size not exceeding `max_size`.
pub fn artwork_url(cover: &str, max_size: u32) -> String {
    let size = ARTWORK_SIZES
        .iter()
        .copied()
        .find(|s| *s <= max_size)
        .unwrap_or(80);
    format!(
        "https://resources.tidal.com/images/{}/{}x{}.jpg",
        cover.replace('-', "/"),
        size,
        size
    )
}

/// `2013-04-29T00:00:00.000+0000` becomes `2013-04-29T00:00:00Z`.
fn stream_date(raw: &str) -> String {
    let base = raw.split('.').next().unwrap_or(raw);
    format!("{}Z", base.trim_end_matches('Z'))
}

pub fn track_to_candidate(track: &dto::Track) -> CandidateRecord {
    CandidateRecord {
        vendor: Vendor::Tidal,
        id: track.id.to_string(),
        title: Some(track.title.clone()),
        artist: main_artists(&track.artists),
        identifier: track.isrc.clone().map(Identifier::Isrc),
        count: None,
    }
}

pub fn album_to_candidate(album: &dto::Album) -> CandidateRecord {
    CandidateRecord {
        vendor: Vendor::Tidal,
        id: album.id.to_string(),
        title: Some(album.title.clone()),
        artist: main_artists(&album.artists),
        identifier: album.upc.clone().map(Identifier::Upc),
        count: album.number_of_tracks,
    }
}

/// Songwriting credits, sorted and de-duplicated.
pub fn composers(contributors: &[dto::Contributor]) -> Vec<String> {
    contributors
        .iter()
        .filter(|c| COMPOSER_ROLES.contains(&c.role.as_str()))
        .map(|c| c.name.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn album_fields(album: &dto::Album, fields: &mut FieldMap) {
    fields.set_opt_text(TagField::AlbumArtist, main_artists(&album.artists));
    fields.set_opt_text(TagField::Copyright, album.copyright.clone());
    fields.set_opt_integer(TagField::DiscCount, album.number_of_volumes);
    fields.set_opt_integer(TagField::TrackCount, album.number_of_tracks);
}

/// Map a track, optionally with its album, contributors and lyrics, to tag fields.
pub fn track_to_metadata(
    track: &dto::Track,
    album: Option<&dto::Album>,
    contributors: &[dto::Contributor],
    lyrics: Option<&dto::Lyrics>,
    artwork_size: u32,
) -> VendorMetadata {
    let mut fields = FieldMap::new();

    fields.set_text(TagField::Album, track.album.title.clone());
    fields.set_opt_text(TagField::Artist, main_artists(&track.artists));
    let credits = composers(contributors);
    if !credits.is_empty() {
        fields.set(TagField::Composer, FieldValue::List(credits));
    }
    fields.set_opt_text(TagField::Copyright, track.copyright.clone());
    fields.set_opt_text(TagField::Date, track.stream_start_date.as_deref().map(stream_date));
    fields.set_opt_integer(TagField::DiscNumber, track.volume_number);
    fields.set_opt_text(TagField::Isrc, track.isrc.clone());
    fields.set_opt_text(
        TagField::Lyrics,
        lyrics
            .and_then(|l| l.lyrics.as_deref())
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string),
    );
    fields.set_text(TagField::Title, track.title.clone());
    fields.set_opt_integer(TagField::TrackNumber, track.track_number);

    if let Some(album) = album {
        album_fields(album, &mut fields);
    }

    VendorMetadata {
        fields,
        artwork_url: track.album.cover.as_deref().map(|c| artwork_url(c, artwork_size)),
    }
}

pub fn album_to_metadata(album: &dto::Album, artwork_size: u32) -> VendorMetadata {
    let mut fields = FieldMap::new();

    fields.set_text(TagField::Album, album.title.clone());
    album_fields(album, &mut fields);
    fields.set_opt_text(
        TagField::Date,
        album.release_date.as_deref().map(|d| format!("{}T00:00:00Z", d)),
    );

    VendorMetadata {
        fields,
        artwork_url: album.cover.as_deref().map(|c| artwork_url(c, artwork_size)),
    }
}
