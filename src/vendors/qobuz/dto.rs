//! Qobuz API Data Transfer Objects
//!
//! DO NOT use these types outside the qobuz module - convert via the adapter.

use serde::{Deserialize, Serialize};

/// `catalog/search` response. Both sections are returned for every query.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SearchResponse {
    pub tracks: Option<Page<Track>>,
    pub albums: Option<Page<Album>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    pub total: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Named {
    pub name: String,
}

/// Album artist with its credited roles ("main-artist", "featured-artist")
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RoledArtist {
    pub name: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Images {
    pub large: Option<String>,
    pub small: Option<String>,
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Album {
    pub id: String,
    pub title: String,
    pub version: Option<String>,
    pub artist: Option<Named>,
    pub artists: Option<Vec<RoledArtist>>,
    #[serde(default)]
    pub image: Images,
    pub copyright: Option<String>,
    pub genre: Option<Named>,
    pub media_count: Option<u32>,
    pub tracks_count: Option<u32>,
    /// "album", "single", "epmini", ...
    pub release_type: Option<String>,
    pub upc: Option<String>,
    pub release_date_original: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Track {
    pub id: u64,
    pub title: String,
    pub version: Option<String>,
    pub isrc: Option<String>,
    pub track_number: Option<u32>,
    pub media_number: Option<u32>,
    pub duration: Option<u32>,
    /// Free-text credits: `"Name, Role, Role - Name, Role"`
    pub performers: Option<String>,
    pub performer: Option<Named>,
    pub composer: Option<Named>,
    pub album: Option<Album>,
    pub release_date_original: Option<String>,
    pub release_date_download: Option<String>,
    pub release_date_stream: Option<String>,
    pub release_date_purchase: Option<String>,
    /// Unix timestamps
    pub purchasable_at: Option<i64>,
    pub streamable_at: Option<i64>,
}

#[cfg(test)]
mod contract_tests {
    use super::*;

    #[test]
    fn test_parse_track() {
        let json = r#"{
            "id": 19763914,
            "title": "Shine",
            "version": null,
            "isrc": "GB2LD0901581",
            "track_number": 1,
            "media_number": 1,
            "performers": "Spektrem, MainArtist - Jane Doe, Composer, Lyricist",
            "performer": {"id": 1, "name": "Spektrem"},
            "album": {
                "id": "0859711361358",
                "title": "Shine",
                "artist": {"name": "Spektrem"},
                "image": {"large": "https://static.qobuz.com/images/covers/58/13/0859711361358_600.jpg"},
                "genre": {"name": "Electronic"},
                "media_count": 1,
                "tracks_count": 1,
                "release_type": "single"
            },
            "release_date_original": "2013-04-29",
            "streamable_at": 1367193600
        }"#;

        let track: Track = serde_json::from_str(json).expect("Should parse track");

        assert_eq!(track.isrc.as_deref(), Some("GB2LD0901581"));
        let album = track.album.expect("album");
        assert_eq!(album.genre.map(|g| g.name).as_deref(), Some("Electronic"));
        assert!(album.artists.is_none());
        assert_eq!(track.streamable_at, Some(1367193600));
    }
}
