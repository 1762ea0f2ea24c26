//! Discogs API Data Transfer Objects
//!
//! DO NOT use these types outside the discogs module - convert via the adapter.
//!
//! API Reference: https://www.discogs.com/developers

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchResult {
    pub id: u64,
    /// "release", "master", "artist" or "label"
    #[serde(rename = "type")]
    pub kind: String,
    /// `"Artist - Title"`
    pub title: String,
    pub year: Option<String>,
    #[serde(default)]
    pub barcode: Vec<String>,
    #[serde(default)]
    pub genre: Vec<String>,
    #[serde(default)]
    pub style: Vec<String>,
    pub cover_image: Option<String>,
    pub master_id: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Artist {
    pub name: String,
    /// Artist name variation as credited on this release
    #[serde(default)]
    pub anv: String,
    #[serde(default)]
    pub join: String,
    /// Only set in `extraartists`
    #[serde(default)]
    pub role: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TracklistEntry {
    pub position: String,
    pub title: String,
    /// "track", "heading" or "index"
    #[serde(rename = "type_")]
    pub kind: Option<String>,
    #[serde(default)]
    pub extraartists: Vec<Artist>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Company {
    pub name: String,
    /// e.g. "Copyright (c)", "Phonographic Copyright (p)", "Distributed By"
    pub entity_type_name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Image {
    /// "primary" or "secondary"
    #[serde(rename = "type")]
    pub kind: String,
    pub uri: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Release {
    pub id: u64,
    pub title: String,
    pub master_id: Option<u64>,
    #[serde(default)]
    pub artists: Vec<Artist>,
    #[serde(default)]
    pub extraartists: Vec<Artist>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub styles: Vec<String>,
    pub year: Option<i32>,
    /// `YYYY-MM-DD`, with `00` for unknown parts
    pub released: Option<String>,
    #[serde(default)]
    pub tracklist: Vec<TracklistEntry>,
    #[serde(default)]
    pub companies: Vec<Company>,
    #[serde(default)]
    pub images: Vec<Image>,
}

/// Master releases group the versions of one album.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Master {
    pub id: u64,
    pub title: String,
    pub main_release: Option<u64>,
    #[serde(default)]
    pub artists: Vec<Artist>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub styles: Vec<String>,
    pub year: Option<i32>,
    #[serde(default)]
    pub tracklist: Vec<TracklistEntry>,
    #[serde(default)]
    pub images: Vec<Image>,
}

#[cfg(test)]
mod contract_tests {
    use super::*;

    #[test]
    fn test_parse_release() {
        let json = r#"{
            "id": 4495452,
            "title": "Shine",
            "artists": [{"name": "Spektrem (2)", "anv": "", "join": "", "role": "", "id": 1}],
            "extraartists": [{"name": "Jane Doe", "anv": "", "join": "", "role": "Written-By", "tracks": ""}],
            "genres": ["Electronic"],
            "styles": ["Electro House"],
            "year": 2013,
            "released": "2013-04-29",
            "tracklist": [{"position": "1", "title": "Shine", "type_": "track", "duration": "3:29"}],
            "companies": [{"name": "Monstercat", "entity_type_name": "Copyright (c)", "catno": ""}],
            "images": [{"type": "primary", "uri": "https://i.discogs.com/a.jpg", "width": 600, "height": 600}]
        }"#;

        let release: Release = serde_json::from_str(json).expect("Should parse release");

        assert_eq!(release.artists[0].name, "Spektrem (2)");
        assert_eq!(release.extraartists[0].role, "Written-By");
        assert_eq!(release.tracklist[0].kind.as_deref(), Some("track"));
    }

    #[test]
    fn test_parse_search() {
        let json = r#"{
            "pagination": {"page": 1, "pages": 1, "items": 1},
            "results": [{"id": 4495452, "type": "release", "title": "Spektrem - Shine", "barcode": ["8 59711 36135 8"]}]
        }"#;

        let response: SearchResponse = serde_json::from_str(json).expect("Should parse search");

        assert_eq!(response.results[0].kind, "release");
        assert!(response.results[0].genre.is_empty());
    }
}
