//! Spotify Web API HTTP client
//!
//! Uses the client-credentials grant, which is enough for catalog lookups.
//! Tokens live for an hour; we keep one in memory and renew it shortly
//! before it runs out.

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

use super::{adapter, dto};
use crate::matching::{CandidateRecord, Identifier, MatchQuery};
use crate::vendors::domain::{EntityKind, VendorError, VendorMetadata};
use crate::vendors::http;

const API_URL: &str = "https://api.spotify.com/v1";
const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Renew this long before the reported expiry
const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn from_response(response: dto::TokenResponse, now: DateTime<Utc>) -> Self {
        Self {
            access_token: response.access_token,
            expires_at: now + Duration::seconds(response.expires_in),
        }
    }

    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_MARGIN_SECS) < self.expires_at
    }
}

/// Spotify Web API client
pub struct SpotifyClient {
    http_client: reqwest::Client,
    client_id: String,
    client_secret: String,
    base_url: String,
    token_url: String,
    token: Mutex<Option<CachedToken>>,
}

impl SpotifyClient {
    /// Create a client from app credentials
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            http_client: http::build_client(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            base_url: API_URL.to_string(),
            token_url: TOKEN_URL.to_string(),
            token: Mutex::new(None),
        }
    }

    /// Create a client for testing with custom endpoints
    #[cfg(test)]
    pub fn with_base_url(base_url: impl Into<String>, token_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token_url: token_url.into(),
            ..Self::new("test-id", "test-secret")
        }
    }

    /// Return a valid access token, requesting a new one when needed.
    async fn access_token(&self) -> Result<String, VendorError> {
        let mut guard = self.token.lock().await;
        let now = Utc::now();

        if let Some(token) = guard.as_ref()
            && token.is_fresh(now)
        {
            return Ok(token.access_token.clone());
        }

        tracing::debug!("Requesting Spotify access token");
        let request = self
            .http_client
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")]);
        let response: dto::TokenResponse = http::send_json(request).await?;

        let token = CachedToken::from_response(response, now);
        let access_token = token.access_token.clone();
        *guard = Some(token);
        Ok(access_token)
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path_and_query: &str) -> Result<T, VendorError> {
        let token = self.access_token().await?;
        let url = format!("{}/{}", self.base_url, path_and_query);
        http::send_json(self.http_client.get(&url).bearer_auth(token)).await
    }

    /// Search the catalog.
    pub async fn search(
        &self,
        query: &MatchQuery,
        kind: EntityKind,
        limit: u32,
    ) -> Result<Vec<CandidateRecord>, VendorError> {
        let (type_name, field) = match kind {
            EntityKind::Track => ("track", "track"),
            EntityKind::Album => ("album", "album"),
        };
        let q = search_terms(query, field);
        let qs = http::query_string(&[
            ("q", q),
            ("type", type_name.to_string()),
            ("limit", limit.clamp(1, 50).to_string()),
        ]);

        let response: dto::SearchResponse = self.get(&format!("search?{}", qs)).await?;

        let candidates = match kind {
            EntityKind::Track => response
                .tracks
                .map(|p| p.items.iter().map(adapter::track_to_candidate).collect())
                .unwrap_or_default(),
            EntityKind::Album => response
                .albums
                .map(|p| p.items.iter().map(adapter::album_to_candidate).collect())
                .unwrap_or_default(),
        };
        Ok(candidates)
    }

    pub async fn get_track(&self, id: &str) -> Result<dto::Track, VendorError> {
        self.get(&format!("tracks/{}", id)).await
    }

    pub async fn get_album(&self, id: &str) -> Result<dto::Album, VendorError> {
        self.get(&format!("albums/{}", id)).await
    }

    pub async fn get_audio_features(&self, id: &str) -> Result<dto::AudioFeatures, VendorError> {
        self.get(&format!("audio-features/{}", id)).await
    }

    /// Fetch everything needed to tag a matched candidate.
    pub async fn fetch_metadata(
        &self,
        candidate: &CandidateRecord,
        kind: EntityKind,
    ) -> Result<VendorMetadata, VendorError> {
        match kind {
            EntityKind::Track => {
                let track = self.get_track(&candidate.id).await?;
                // Audio features are unavailable to some apps; tempo is optional
                let features = match self.get_audio_features(&candidate.id).await {
                    Ok(f) => Some(f),
                    Err(e) => {
                        tracing::debug!("No audio features for {}: {}", candidate.id, e);
                        None
                    }
                };
                Ok(adapter::track_to_metadata(&track, features.as_ref()))
            }
            EntityKind::Album => {
                let album = self.get_album(&candidate.id).await?;
                Ok(adapter::album_to_metadata(&album))
            }
        }
    }
}

/// Field-filtered search string. Identifiers are searched directly.
fn search_terms(query: &MatchQuery, field: &str) -> String {
    match &query.identifier {
        Some(Identifier::Isrc(code)) if field == "track" => format!("isrc:{}", code.trim()),
        Some(Identifier::Upc(code)) if field == "album" => format!("upc:{}", code.trim()),
        _ => format!("{}:{} artist:{}", field, query.title.trim(), query.artist.trim()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = SpotifyClient::new("id", "secret");
        assert_eq!(client.base_url, "https://api.spotify.com/v1");
        assert_eq!(client.token_url, "https://accounts.spotify.com/api/token");
    }

    #[test]
    fn test_client_with_custom_url() {
        let client = SpotifyClient::with_base_url("http://localhost:8080", "http://localhost:8080/token");
        assert_eq!(client.base_url, "http://localhost:8080");
    }

    #[test]
    fn test_token_freshness() {
        let now = Utc::now();
        let token = CachedToken::from_response(
            dto::TokenResponse {
                access_token: "abc".to_string(),
                token_type: "Bearer".to_string(),
                expires_in: 3600,
            },
            now,
        );

        assert!(token.is_fresh(now));
        assert!(token.is_fresh(now + Duration::seconds(3500)));
        assert!(!token.is_fresh(now + Duration::seconds(3541)));
    }

    #[test]
    fn test_search_terms() {
        let query = MatchQuery::new("Shine", "Spektrem").unwrap();
        assert_eq!(search_terms(&query, "track"), "track:Shine artist:Spektrem");

        let query = query.with_identifier(Identifier::Isrc("GB2LD0901581".into()));
        assert_eq!(search_terms(&query, "track"), "isrc:GB2LD0901581");
        // ISRCs don't identify albums
        assert_eq!(search_terms(&query, "album"), "album:Shine artist:Spektrem");
    }
}
