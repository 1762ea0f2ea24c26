//! Shared HTTP plumbing for the vendor clients.

use serde::de::DeserializeOwned;

use super::domain::VendorError;

/// User agent sent with every request. Discogs rejects requests without one.
pub const USER_AGENT: &str = concat!(
    env!("CARGO_PKG_NAME"),
    "/",
    env!("CARGO_PKG_VERSION"),
    " +https://github.com/tunelink/tunelink"
);

/// Build a client that accepts gzip and identifies itself.
pub fn build_client() -> reqwest::Client {
    reqwest::Client::builder()
        .gzip(true)
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!("Falling back to default HTTP client: {}", e);
            reqwest::Client::new()
        })
}

/// Map a non-success status to a [`VendorError`].
pub fn status_error(status: reqwest::StatusCode, url: &str, body: String) -> VendorError {
    match status {
        reqwest::StatusCode::NOT_FOUND => VendorError::NotFound(url.to_string()),
        reqwest::StatusCode::TOO_MANY_REQUESTS => VendorError::RateLimited,
        reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
            VendorError::Unauthorized(if body.is_empty() {
                status.to_string()
            } else {
                body
            })
        }
        _ => VendorError::Http {
            status: status.as_u16(),
            body: if body.is_empty() {
                status.canonical_reason().unwrap_or("Unknown").to_string()
            } else {
                body
            },
        },
    }
}

/// Send a prepared request and decode the JSON body.
pub async fn send_json<T: DeserializeOwned>(request: reqwest::RequestBuilder) -> Result<T, VendorError> {
    let response = request
        .send()
        .await
        .map_err(|e| VendorError::Network(e.to_string()))?;

    let status = response.status();
    let url = response.url().to_string();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::debug!("{} returned {}: {}", url, status, body);
        return Err(status_error(status, &url, body));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| VendorError::Parse(e.to_string()))
}

/// Build a query string, percent-encoding each value.
pub fn query_string(params: &[(&str, String)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}
