//! iTunes Search API HTTP client
//!
//! No authentication. Apple throttles at roughly 20 calls per minute.

use super::{adapter, dto};
use crate::matching::{CandidateRecord, MatchQuery};
use crate::vendors::domain::{EntityKind, VendorError, VendorMetadata};
use crate::vendors::http;

/// iTunes Search API client
pub struct ItunesClient {
    http_client: reqwest::Client,
    country: Option<String>,
    artwork_size: u32,
    artwork_format: String,
    base_url: String,
}

impl ItunesClient {
    pub fn new() -> Self {
        Self {
            http_client: http::build_client(),
            country: None,
            artwork_size: 1400,
            artwork_format: "jpg".to_string(),
            base_url: "https://itunes.apple.com".to_string(),
        }
    }

    /// Create a client for testing with custom base URL
    #[cfg(test)]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::new()
        }
    }

    /// Storefront to search, e.g. "US"
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn with_artwork(mut self, size: u32, format: impl Into<String>) -> Self {
        self.artwork_size = size;
        self.artwork_format = format.into();
        self
    }

    async fn get(&self, endpoint: &str, mut params: Vec<(&str, String)>) -> Result<dto::SearchResponse, VendorError> {
        if let Some(country) = &self.country {
            params.push(("country", country.clone()));
        }
        let url = format!("{}/{}?{}", self.base_url, endpoint, http::query_string(&params));
        http::send_json(self.http_client.get(&url)).await
    }

    pub async fn search(
        &self,
        query: &MatchQuery,
        kind: EntityKind,
        limit: u32,
    ) -> Result<Vec<CandidateRecord>, VendorError> {
        let entity = match kind {
            EntityKind::Track => "song",
            EntityKind::Album => "album",
        };
        let response = self
            .get(
                "search",
                vec![
                    ("term", query.search_text()),
                    ("media", "music".to_string()),
                    ("entity", entity.to_string()),
                    ("limit", limit.clamp(1, 200).to_string()),
                ],
            )
            .await?;

        let convert = match kind {
            EntityKind::Track => adapter::track_to_candidate,
            EntityKind::Album => adapter::album_to_candidate,
        };
        Ok(response.results.iter().filter_map(convert).collect())
    }

    /// Look up a track or collection by id.
    pub async fn lookup(&self, id: &str) -> Result<dto::Item, VendorError> {
        let response = self.get("lookup", vec![("id", id.to_string())]).await?;
        response
            .results
            .into_iter()
            .next()
            .ok_or_else(|| VendorError::NotFound(format!("iTunes id {}", id)))
    }

    pub async fn fetch_metadata(
        &self,
        candidate: &CandidateRecord,
        kind: EntityKind,
    ) -> Result<VendorMetadata, VendorError> {
        let item = self.lookup(&candidate.id).await?;
        match kind {
            EntityKind::Track => {
                let album = match item.collection_id {
                    Some(id) => self.lookup(&id.to_string()).await.ok(),
                    None => None,
                };
                Ok(adapter::track_to_metadata(
                    &item,
                    album.as_ref(),
                    self.artwork_size,
                    &self.artwork_format,
                ))
            }
            EntityKind::Album => Ok(adapter::album_to_metadata(
                &item,
                self.artwork_size,
                &self.artwork_format,
            )),
        }
    }
}

impl Default for ItunesClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = ItunesClient::new().with_country("GB").with_artwork(600, "png");
        assert_eq!(client.base_url, "https://itunes.apple.com");
        assert_eq!(client.country.as_deref(), Some("GB"));
        assert_eq!(client.artwork_format, "png");
    }

    #[test]
    fn test_client_with_custom_url() {
        let client = ItunesClient::with_base_url("http://localhost:8080");
        assert_eq!(client.base_url, "http://localhost:8080");
    }
}
