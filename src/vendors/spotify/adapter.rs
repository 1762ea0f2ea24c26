//! Adapter layer: Convert Spotify DTOs to candidates and field maps
//!
//! This is the ONLY place where Spotify DTO types are converted to our types.

use super::dto;
use crate::matching::{CandidateRecord, Identifier};
use crate::tags::{FieldMap, FieldValue, TagField, join_names};
use crate::vendors::domain::{Vendor, VendorMetadata};

fn artist_names(artists: &[dto::ArtistRef]) -> Option<String> {
    let names: Vec<&str> = artists.iter().map(|a| a.name.as_str()).collect();
    join_names(&names)
}

pub fn track_to_candidate(track: &dto::Track) -> CandidateRecord {
    CandidateRecord {
        vendor: Vendor::Spotify,
        id: track.id.clone(),
        title: Some(track.name.clone()),
        artist: artist_names(&track.artists),
        identifier: track
            .external_ids
            .as_ref()
            .and_then(|ids| ids.isrc.clone())
            .map(Identifier::Isrc),
        count: track.album.total_tracks,
    }
}

pub fn album_to_candidate(album: &dto::Album) -> CandidateRecord {
    CandidateRecord {
        vendor: Vendor::Spotify,
        id: album.id.clone(),
        title: Some(album.name.clone()),
        artist: artist_names(&album.artists),
        identifier: album
            .external_ids
            .as_ref()
            .and_then(|ids| ids.upc.clone())
            .map(Identifier::Upc),
        count: album.total_tracks,
    }
}

/// Album title as shown in tags; singles get a " - Single" suffix.
fn album_title(album: &dto::Album) -> String {
    if album.album_type.as_deref() == Some("single") {
        format!("{} - Single", album.name)
    } else {
        album.name.clone()
    }
}

fn album_fields(album: &dto::Album, fields: &mut FieldMap) {
    fields.set_text(TagField::Album, album_title(album));
    fields.set_opt_text(TagField::AlbumArtist, artist_names(&album.artists));
    if let Some(kind) = &album.album_type {
        fields.set(TagField::Compilation, FieldValue::Bool(kind == "compilation"));
    }
    fields.set_opt_text(TagField::Date, album.release_date.clone());
    fields.set_opt_integer(TagField::TrackCount, album.total_tracks);
}

/// The first image is the largest one Spotify offers.
fn artwork_url(album: &dto::Album) -> Option<String> {
    album.images.first().map(|img| img.url.clone())
}

/// Map a track (plus optional audio features) to tag fields.
pub fn track_to_metadata(track: &dto::Track, features: Option<&dto::AudioFeatures>) -> VendorMetadata {
    let mut fields = FieldMap::new();

    album_fields(&track.album, &mut fields);
    fields.set_opt_text(TagField::Artist, artist_names(&track.artists));
    fields.set_opt_integer(TagField::DiscNumber, track.disc_number);
    fields.set_opt_text(
        TagField::Isrc,
        track.external_ids.as_ref().and_then(|ids| ids.isrc.clone()),
    );
    if let Some(f) = features
        && f.tempo.is_finite()
        && f.tempo > 0.0
    {
        fields.set(TagField::Tempo, FieldValue::Integer(f.tempo.round() as u32));
    }
    fields.set_text(TagField::Title, track.name.clone());
    fields.set_opt_integer(TagField::TrackNumber, track.track_number);

    VendorMetadata {
        fields,
        artwork_url: artwork_url(&track.album),
    }
}

/// Map a full album object to album-level tag fields.
pub fn album_to_metadata(album: &dto::Album) -> VendorMetadata {
    let mut fields = FieldMap::new();

    album_fields(album, &mut fields);
    fields.set_opt_text(TagField::Genre, album.genres.first().cloned());
    fields.set_opt_text(
        TagField::Copyright,
        album
            .copyrights
            .iter()
            .find(|c| c.kind == "C")
            .or_else(|| album.copyrights.first())
            .map(|c| c.text.clone()),
    );

    VendorMetadata {
        fields,
        artwork_url: artwork_url(album),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_album(album_type: &str) -> dto::Album {
        dto::Album {
            id: "alb1".to_string(),
            name: "Shine".to_string(),
            album_type: Some(album_type.to_string()),
            artists: vec![dto::ArtistRef {
                id: None,
                name: "Spektrem".to_string(),
            }],
            release_date: Some("2013-04-29".to_string()),
            total_tracks: Some(1),
            images: vec![
                dto::Image {
                    url: "https://i.scdn.co/image/640".to_string(),
                    width: Some(640),
                    height: Some(640),
                },
                dto::Image {
                    url: "https://i.scdn.co/image/64".to_string(),
                    width: Some(64),
                    height: Some(64),
                },
            ],
            external_ids: Some(dto::ExternalIds {
                isrc: None,
                upc: Some("0859711361358".to_string()),
            }),
            genres: vec![],
            copyrights: vec![],
            label: None,
        }
    }

    fn make_track(album_type: &str) -> dto::Track {
        dto::Track {
            id: "trk1".to_string(),
            name: "Shine".to_string(),
            artists: vec![
                dto::ArtistRef {
                    id: None,
                    name: "Spektrem".to_string(),
                },
                dto::ArtistRef {
                    id: None,
                    name: "Guest".to_string(),
                },
            ],
            album: make_album(album_type),
            disc_number: Some(1),
            track_number: Some(1),
            duration_ms: Some(209_000),
            explicit: Some(false),
            external_ids: Some(dto::ExternalIds {
                isrc: Some("GB2LD0901581".to_string()),
                upc: None,
            }),
        }
    }

    #[test]
    fn test_track_candidate() {
        let candidate = track_to_candidate(&make_track("album"));

        assert_eq!(candidate.vendor, Vendor::Spotify);
        assert_eq!(candidate.artist.as_deref(), Some("Spektrem & Guest"));
        assert_eq!(candidate.identifier, Some(Identifier::Isrc("GB2LD0901581".into())));
        assert_eq!(candidate.count, Some(1));
    }

    #[test]
    fn test_album_candidate_uses_upc() {
        let candidate = album_to_candidate(&make_album("album"));
        assert_eq!(candidate.identifier, Some(Identifier::Upc("0859711361358".into())));
    }

    #[test]
    fn test_single_gets_suffix() {
        let meta = track_to_metadata(&make_track("single"), None);

        assert_eq!(
            meta.fields.get_field(TagField::Album),
            Some(&FieldValue::Text("Shine - Single".into()))
        );
        assert_eq!(
            meta.fields.get_field(TagField::Compilation),
            Some(&FieldValue::Bool(false))
        );
    }

    #[test]
    fn test_compilation_flag() {
        let meta = track_to_metadata(&make_track("compilation"), None);
        assert_eq!(
            meta.fields.get_field(TagField::Compilation),
            Some(&FieldValue::Bool(true))
        );
    }

    #[test]
    fn test_tempo_is_rounded() {
        let features = dto::AudioFeatures {
            id: "trk1".to_string(),
            tempo: 127.6,
        };

        let meta = track_to_metadata(&make_track("album"), Some(&features));

        assert_eq!(meta.fields.get_field(TagField::Tempo), Some(&FieldValue::Integer(128)));
    }

    #[test]
    fn test_track_metadata_fields() {
        let meta = track_to_metadata(&make_track("album"), None);

        assert_eq!(meta.artwork_url.as_deref(), Some("https://i.scdn.co/image/640"));
        assert_eq!(meta.fields.get_field(TagField::Isrc), Some(&FieldValue::Text("GB2LD0901581".into())));
        assert_eq!(meta.fields.get_field(TagField::TrackCount), Some(&FieldValue::Integer(1)));
        assert_eq!(meta.fields.get_field(TagField::Date), Some(&FieldValue::Text("2013-04-29".into())));
        assert!(!meta.fields.contains(TagField::Tempo));
    }

    #[test]
    fn test_album_metadata_prefers_c_copyright() {
        let mut album = make_album("album");
        album.copyrights = vec![
            dto::Copyright {
                text: "(P) 2013 Label".to_string(),
                kind: "P".to_string(),
            },
            dto::Copyright {
                text: "(C) 2013 Label".to_string(),
                kind: "C".to_string(),
            },
        ];
        album.genres = vec!["electro house".to_string()];

        let meta = album_to_metadata(&album);

        assert_eq!(
            meta.fields.get_field(TagField::Copyright),
            Some(&FieldValue::Text("(C) 2013 Label".into()))
        );
        assert_eq!(meta.fields.get_field(TagField::Genre), Some(&FieldValue::Text("electro house".into())));
    }
}
