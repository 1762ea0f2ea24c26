//! Adapter layer: Convert iTunes results to candidates and field maps

use super::dto;
use crate::matching::CandidateRecord;
use crate::tags::{FieldMap, FieldValue, TagField};
use crate::vendors::domain::{Vendor, VendorMetadata};

const VARIOUS_ARTISTS: &str = "Various Artists";

/// Rewrite the 100px thumbnail URL to the requested size and format.
pub fn artwork_url(thumbnail: &str, size: u32, format: &str) -> String {
    thumbnail.replace("100x100bb.jpg", &format!("{}x{}bb.{}", size, size, format))
}

/// The uncensored name sorts after the censored one ("F**k" < "Fuck").
fn title(item: &dto::Item) -> Option<String> {
    match (&item.track_name, &item.track_censored_name) {
        (Some(a), Some(b)) => Some(a.max(b).clone()),
        (a, b) => a.clone().or_else(|| b.clone()),
    }
}

pub fn track_to_candidate(item: &dto::Item) -> Option<CandidateRecord> {
    Some(CandidateRecord {
        vendor: Vendor::Itunes,
        id: item.track_id?.to_string(),
        title: title(item),
        artist: item.artist_name.clone(),
        identifier: None,
        count: item.track_count,
    })
}

pub fn album_to_candidate(item: &dto::Item) -> Option<CandidateRecord> {
    Some(CandidateRecord {
        vendor: Vendor::Itunes,
        id: item.collection_id?.to_string(),
        title: item.collection_name.clone(),
        artist: item.artist_name.clone(),
        identifier: None,
        count: item.track_count,
    })
}

fn album_fields(album: &dto::Item, fields: &mut FieldMap) {
    let album_artist = album
        .collection_artist_name
        .clone()
        .or_else(|| album.artist_name.clone());
    if let Some(name) = &album_artist {
        fields.set(TagField::Compilation, FieldValue::Bool(name == VARIOUS_ARTISTS));
    }
    fields.set_opt_text(TagField::AlbumArtist, album_artist);
    fields.set_opt_text(TagField::Copyright, album.copyright.clone());
}

/// Map a track result, optionally with its collection, to tag fields.
pub fn track_to_metadata(
    item: &dto::Item,
    album: Option<&dto::Item>,
    artwork_size: u32,
    artwork_format: &str,
) -> VendorMetadata {
    let mut fields = FieldMap::new();

    fields.set_opt_text(TagField::Album, item.collection_name.clone());
    fields.set_opt_text(TagField::Artist, item.artist_name.clone());
    if let Some(album) = album {
        album_fields(album, &mut fields);
    } else if let Some(name) = &item.collection_artist_name {
        fields.set(TagField::Compilation, FieldValue::Bool(name == VARIOUS_ARTISTS));
    }
    fields.set_opt_text(TagField::Date, item.release_date.clone());
    fields.set_opt_integer(TagField::DiscNumber, item.disc_number);
    fields.set_opt_integer(TagField::DiscCount, item.disc_count);
    fields.set_opt_text(TagField::Genre, item.primary_genre_name.clone());
    fields.set_opt_text(TagField::Title, title(item));
    fields.set_opt_integer(TagField::TrackNumber, item.track_number);
    fields.set_opt_integer(TagField::TrackCount, item.track_count);

    VendorMetadata {
        fields,
        artwork_url: item
            .artwork_url_100
            .as_deref()
            .map(|u| artwork_url(u, artwork_size, artwork_format)),
    }
}

pub fn album_to_metadata(album: &dto::Item, artwork_size: u32, artwork_format: &str) -> VendorMetadata {
    let mut fields = FieldMap::new();

    fields.set_opt_text(TagField::Album, album.collection_name.clone());
    album_fields(album, &mut fields);
    fields.set_opt_text(TagField::Date, album.release_date.clone());
    fields.set_opt_text(TagField::Genre, album.primary_genre_name.clone());
    fields.set_opt_integer(TagField::TrackCount, album.track_count);

    VendorMetadata {
        fields,
        artwork_url: album
            .artwork_url_100
            .as_deref()
            .map(|u| artwork_url(u, artwork_size, artwork_format)),
    }
}
