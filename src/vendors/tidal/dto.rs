//! TIDAL API Data Transfer Objects
//!
//! Shapes of the v1 catalog API. Field names are camelCase on the wire.
//! DO NOT use these types outside the tidal module - convert via the adapter.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SearchResponse {
    pub tracks: Option<Page<Track>>,
    pub albums: Option<Page<Album>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    pub total_number_of_items: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Artist {
    pub id: Option<u64>,
    pub name: String,
    /// "MAIN" or "FEATURED"
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// Album reference embedded in a track
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AlbumRef {
    pub id: u64,
    pub title: String,
    /// Image id, e.g. `d3b0e3e1-2a5b-4b3e-9c5e-6b7a2d9f1c7e`
    pub cover: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: u64,
    pub title: String,
    pub duration: Option<u32>,
    pub track_number: Option<u32>,
    pub volume_number: Option<u32>,
    pub isrc: Option<String>,
    pub copyright: Option<String>,
    /// e.g. `2013-04-29T00:00:00.000+0000`
    pub stream_start_date: Option<String>,
    pub version: Option<String>,
    #[serde(default)]
    pub artists: Vec<Artist>,
    pub album: AlbumRef,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub id: u64,
    pub title: String,
    pub number_of_tracks: Option<u32>,
    pub number_of_volumes: Option<u32>,
    /// `YYYY-MM-DD`
    pub release_date: Option<String>,
    pub copyright: Option<String>,
    pub upc: Option<String>,
    pub cover: Option<String>,
    #[serde(default)]
    pub artists: Vec<Artist>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Contributor {
    pub name: String,
    pub role: String,
}

/// `/tracks/{id}/contributors` response
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ContributorsResponse {
    #[serde(default)]
    pub items: Vec<Contributor>,
}

/// `/tracks/{id}/lyrics` response
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Lyrics {
    pub track_id: Option<u64>,
    pub lyrics: Option<String>,
    /// Time-synced LRC text
    pub subtitles: Option<String>,
}
