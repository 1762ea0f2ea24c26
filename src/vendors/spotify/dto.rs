//! Spotify Web API Data Transfer Objects
//!
//! These types match what the Web API returns. Only the fields we read are
//! declared; serde ignores the rest.
//! DO NOT use these types outside the spotify module - convert via the adapter.
//!
//! API Reference: https://developer.spotify.com/documentation/web-api

use serde::{Deserialize, Serialize};

/// Client-credentials token response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    /// Lifetime in seconds
    pub expires_in: i64,
}

/// `/search` response; only the requested type is present
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SearchResponse {
    pub tracks: Option<Paging<Track>>,
    pub albums: Option<Paging<Album>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Paging<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    pub total: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArtistRef {
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Image {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ExternalIds {
    pub isrc: Option<String>,
    pub upc: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Copyright {
    pub text: String,
    /// "C" for copyright, "P" for sound recording copyright
    #[serde(rename = "type")]
    pub kind: String,
}

/// Album object. Search results and track objects carry the simplified
/// form, so everything beyond id and name is optional.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Album {
    pub id: String,
    pub name: String,
    /// "album", "single" or "compilation"
    pub album_type: Option<String>,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    /// `YYYY`, `YYYY-MM` or `YYYY-MM-DD` depending on precision
    pub release_date: Option<String>,
    pub total_tracks: Option<u32>,
    #[serde(default)]
    pub images: Vec<Image>,
    pub external_ids: Option<ExternalIds>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub copyrights: Vec<Copyright>,
    pub label: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    pub album: Album,
    pub disc_number: Option<u32>,
    pub track_number: Option<u32>,
    pub duration_ms: Option<u64>,
    pub explicit: Option<bool>,
    pub external_ids: Option<ExternalIds>,
}

/// `/audio-features/{id}` response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AudioFeatures {
    pub id: String,
    /// Estimated tempo in BPM
    pub tempo: f64,
}
