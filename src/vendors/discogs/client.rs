//! Discogs HTTP client
//!
//! Release and master lookups are public. Database search needs a personal
//! access token.

use super::{adapter, dto};
use crate::matching::{CandidateRecord, MatchQuery};
use crate::vendors::domain::{EntityKind, Vendor, VendorError, VendorMetadata};
use crate::vendors::http;

/// Discogs API client
pub struct DiscogsClient {
    http_client: reqwest::Client,
    token: Option<String>,
    base_url: String,
}

impl DiscogsClient {
    pub fn new(token: Option<String>) -> Self {
        Self {
            http_client: http::build_client(),
            token,
            base_url: "https://api.discogs.com".to_string(),
        }
    }

    /// Create a client for testing with custom base URL
    #[cfg(test)]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::new(Some("test-token".to_string()))
        }
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, VendorError> {
        let url = format!("{}/{}", self.base_url, path);
        let mut request = self.http_client.get(&url);
        if let Some(token) = &self.token {
            request = request.header(reqwest::header::AUTHORIZATION, format!("Discogs token={}", token));
        }
        http::send_json(request).await
    }

    /// Search releases. Discogs has no track entities, so track searches
    /// come back empty.
    pub async fn search(
        &self,
        query: &MatchQuery,
        kind: EntityKind,
        limit: u32,
    ) -> Result<Vec<CandidateRecord>, VendorError> {
        if kind == EntityKind::Track {
            tracing::debug!("Discogs has no track search; skipping");
            return Ok(Vec::new());
        }
        if self.token.is_none() {
            return Err(VendorError::MissingCredentials(Vendor::Discogs));
        }

        let qs = http::query_string(&[
            ("type", "release".to_string()),
            ("release_title", query.title.trim().to_string()),
            ("artist", query.artist.trim().to_string()),
            ("per_page", limit.clamp(1, 100).to_string()),
        ]);
        let response: dto::SearchResponse = self.get(&format!("database/search?{}", qs)).await?;

        Ok(response
            .results
            .iter()
            .filter(|r| r.kind == "release")
            .map(adapter::search_to_candidate)
            .collect())
    }

    pub async fn get_release(&self, id: &str) -> Result<dto::Release, VendorError> {
        self.get(&format!("releases/{}", id)).await
    }

    pub async fn get_master_release(&self, id: &str) -> Result<dto::Master, VendorError> {
        self.get(&format!("masters/{}", id)).await
    }

    pub async fn fetch_metadata(
        &self,
        candidate: &CandidateRecord,
        _kind: EntityKind,
    ) -> Result<VendorMetadata, VendorError> {
        let release = self.get_release(&candidate.id).await?;
        let mut metadata = adapter::release_to_metadata(&release);

        // Fill gaps from the master release
        if let Some(master_id) = release.master_id {
            match self.get_master_release(&master_id.to_string()).await {
                Ok(master) => {
                    let extra = adapter::master_to_metadata(&master);
                    for (key, value) in extra.fields.iter() {
                        if metadata.fields.get(key).is_none() {
                            metadata.fields.insert(key, value.clone());
                        }
                    }
                    if metadata.artwork_url.is_none() {
                        metadata.artwork_url = extra.artwork_url;
                    }
                }
                Err(e) => tracing::debug!("Master {} lookup failed: {}", master_id, e),
            }
        }

        Ok(metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = DiscogsClient::new(None);
        assert_eq!(client.base_url, "https://api.discogs.com");
        assert!(client.token.is_none());
    }

    #[tokio::test]
    async fn test_search_without_token_fails() {
        let client = DiscogsClient::new(None);
        let query = MatchQuery::new("Shine", "Spektrem").unwrap();

        let result = client.search(&query, EntityKind::Album, 5).await;

        assert_eq!(result, Err(VendorError::MissingCredentials(Vendor::Discogs)));
    }

    #[tokio::test]
    async fn test_track_search_is_empty() {
        let client = DiscogsClient::with_base_url("http://localhost:9");
        let query = MatchQuery::new("Shine", "Spektrem").unwrap();

        let result = client.search(&query, EntityKind::Track, 5).await;

        assert_eq!(result, Ok(vec![]));
    }
}
