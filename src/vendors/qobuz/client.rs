//! Qobuz HTTP client
//!
//! Requests are identified by an app id. A user auth token is optional and
//! only widens what the catalog returns.

use super::{adapter, dto};
use crate::matching::{CandidateRecord, MatchQuery};
use crate::vendors::domain::{EntityKind, VendorError, VendorMetadata};
use crate::vendors::http;

/// Qobuz API client
pub struct QobuzClient {
    http_client: reqwest::Client,
    app_id: String,
    user_token: Option<String>,
    base_url: String,
}

impl QobuzClient {
    pub fn new(app_id: impl Into<String>, user_token: Option<String>) -> Self {
        Self {
            http_client: http::build_client(),
            app_id: app_id.into(),
            user_token,
            base_url: "https://www.qobuz.com/api.json/0.2".to_string(),
        }
    }

    /// Create a client for testing with custom base URL
    #[cfg(test)]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::new("test-app", None)
        }
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T, VendorError> {
        let url = format!("{}/{}?{}", self.base_url, endpoint, http::query_string(params));
        let mut request = self.http_client.get(&url).header("X-App-Id", &self.app_id);
        if let Some(token) = &self.user_token {
            request = request.header("X-User-Auth-Token", token);
        }
        http::send_json(request).await
    }

    pub async fn search(
        &self,
        query: &MatchQuery,
        kind: EntityKind,
        limit: u32,
    ) -> Result<Vec<CandidateRecord>, VendorError> {
        let response: dto::SearchResponse = self
            .get(
                "catalog/search",
                &[("query", query.search_text()), ("limit", limit.to_string())],
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
        self.get("track/get", &[("track_id", id.to_string())]).await
    }

    pub async fn get_album(&self, id: &str) -> Result<dto::Album, VendorError> {
        self.get("album/get", &[("album_id", id.to_string())]).await
    }

    pub async fn fetch_metadata(
        &self,
        candidate: &CandidateRecord,
        kind: EntityKind,
    ) -> Result<VendorMetadata, VendorError> {
        match kind {
            EntityKind::Track => {
                let track = self.get_track(&candidate.id).await?;
                Ok(adapter::track_to_metadata(&track))
            }
            EntityKind::Album => {
                let album = self.get_album(&candidate.id).await?;
                Ok(adapter::album_to_metadata(&album))
            }
        }
    }
}
