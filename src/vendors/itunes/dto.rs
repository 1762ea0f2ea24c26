//! iTunes Search API Data Transfer Objects
//!
//! Search and lookup share one response shape; which fields are present
//! depends on `wrapperType` ("track" or "collection").
//!
//! API Reference: https://performance-partners.apple.com/search-api

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub result_count: u32,
    #[serde(default)]
    pub results: Vec<Item>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub wrapper_type: Option<String>,
    pub track_id: Option<u64>,
    pub collection_id: Option<u64>,
    pub artist_name: Option<String>,
    pub collection_name: Option<String>,
    pub collection_artist_name: Option<String>,
    pub track_name: Option<String>,
    pub track_censored_name: Option<String>,
    #[serde(rename = "artworkUrl100")]
    pub artwork_url_100: Option<String>,
    /// ISO 8601 timestamp
    pub release_date: Option<String>,
    pub disc_number: Option<u32>,
    pub disc_count: Option<u32>,
    pub track_number: Option<u32>,
    pub track_count: Option<u32>,
    pub primary_genre_name: Option<String>,
    pub copyright: Option<String>,
}
