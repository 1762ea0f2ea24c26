//! TIDAL HTTP client
//!
//! Authenticates with a client token sent in the `x-tidal-token` header.
//! Every catalog request must carry a `countryCode`.

use super::{adapter, dto};
use crate::matching::{CandidateRecord, MatchQuery};
use crate::vendors::domain::{EntityKind, VendorError, VendorMetadata};
use crate::vendors::http;

/// TIDAL API client
pub struct TidalClient {
    http_client: reqwest::Client,
    token: String,
    country_code: String,
    artwork_size: u32,
    base_url: String,
}

impl TidalClient {
    pub fn new(token: impl Into<String>, country_code: impl Into<String>) -> Self {
        Self {
            http_client: http::build_client(),
            token: token.into(),
            country_code: country_code.into(),
            artwork_size: 1280,
            base_url: "https://api.tidal.com/v1".to_string(),
        }
    }

    /// Create a client for testing with custom base URL
    #[cfg(test)]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::new("test-token", "US")
        }
    }

    /// Largest cover size to request, in pixels
    pub fn with_artwork_size(mut self, size: u32) -> Self {
        self.artwork_size = size;
        self
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, VendorError> {
        let mut all = vec![("countryCode", self.country_code.clone())];
        all.extend(params.iter().cloned());
        let url = format!("{}/{}?{}", self.base_url, path, http::query_string(&all));

        http::send_json(self.http_client.get(&url).header("x-tidal-token", &self.token)).await
    }

    pub async fn search(
        &self,
        query: &MatchQuery,
        kind: EntityKind,
        limit: u32,
    ) -> Result<Vec<CandidateRecord>, VendorError> {
        let types = match kind {
            EntityKind::Track => "TRACKS",
            EntityKind::Album => "ALBUMS",
        };
        let response: dto::SearchResponse = self
            .get(
                "search",
                &[
                    ("query", query.search_text()),
                    ("types", types.to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;

        Ok(match kind {
            EntityKind::Track => response
                .tracks
                .map(|p| p.items.iter().map(adapter::track_to_candidate).collect())
                .unwrap_or_default(),
            EntityKind::Album => response
                .albums
                .map(|p| p.items.iter().map(adapter::album_to_candidate).collect())
                .unwrap_or_default(),
        })
    }

    pub async fn get_track(&self, id: &str) -> Result<dto::Track, VendorError> {
        self.get(&format!("tracks/{}", id), &[]).await
    }

    pub async fn get_album(&self, id: &str) -> Result<dto::Album, VendorError> {
        self.get(&format!("albums/{}", id), &[]).await
    }

    pub async fn get_track_contributors(&self, id: &str) -> Result<Vec<dto::Contributor>, VendorError> {
        let response: dto::ContributorsResponse = self
            .get(&format!("tracks/{}/contributors", id), &[("limit", "100".to_string())])
            .await?;
        Ok(response.items)
    }

    /// Lyrics of a track. Not every track has them; TIDAL answers 404 then.
    pub async fn get_track_lyrics(&self, id: &str) -> Result<dto::Lyrics, VendorError> {
        self.get(&format!("tracks/{}/lyrics", id), &[]).await
    }

    pub async fn fetch_metadata(
        &self,
        candidate: &CandidateRecord,
        kind: EntityKind,
    ) -> Result<VendorMetadata, VendorError> {
        match kind {
            EntityKind::Track => {
                let track = self.get_track(&candidate.id).await?;
                let album = match self.get_album(&track.album.id.to_string()).await {
                    Ok(album) => Some(album),
                    Err(e) => {
                        tracing::debug!("Album lookup failed for track {}: {}", track.id, e);
                        None
                    }
                };
                let contributors = self
                    .get_track_contributors(&candidate.id)
                    .await
                    .unwrap_or_else(|e| {
                        tracing::debug!("No contributors for track {}: {}", candidate.id, e);
                        Vec::new()
                    });
                let lyrics = match self.get_track_lyrics(&candidate.id).await {
                    Ok(lyrics) => Some(lyrics),
                    Err(e) => {
                        tracing::debug!("No lyrics for track {}: {}", candidate.id, e);
                        None
                    }
                };
                Ok(adapter::track_to_metadata(
                    &track,
                    album.as_ref(),
                    &contributors,
                    lyrics.as_ref(),
                    self.artwork_size,
                ))
            }
            EntityKind::Album => {
                let album = self.get_album(&candidate.id).await?;
                Ok(adapter::album_to_metadata(&album, self.artwork_size))
            }
        }
    }
}
