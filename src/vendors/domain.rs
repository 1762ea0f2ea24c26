//! Vendor-independent types shared by every client.
//!
//! Everything in here is ours; DTOs from the individual APIs are converted
//! into these by each vendor's adapter.

use std::fmt;
use std::str::FromStr;

use crate::tags::FieldMap;

/// Supported metadata vendors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vendor {
    Spotify,
    Tidal,
    Qobuz,
    Itunes,
    Discogs,
}

impl Vendor {
    pub const ALL: [Vendor; 5] = [
        Vendor::Spotify,
        Vendor::Tidal,
        Vendor::Qobuz,
        Vendor::Itunes,
        Vendor::Discogs,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Vendor::Spotify => "spotify",
            Vendor::Tidal => "tidal",
            Vendor::Qobuz => "qobuz",
            Vendor::Itunes => "itunes",
            Vendor::Discogs => "discogs",
        }
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Vendor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Vendor::ALL
            .iter()
            .copied()
            .find(|v| v.name() == wanted)
            .ok_or_else(|| format!("Unknown vendor '{}'", s))
    }
}

/// Whether a search targets tracks or albums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntityKind {
    #[default]
    Track,
    Album,
}

/// Detailed metadata fetched for a matched candidate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VendorMetadata {
    /// Field values ready to merge into a `TagSet`
    pub fields: FieldMap,
    /// Cover image location, downloaded separately
    pub artwork_url: Option<String>,
}

/// Errors returned by vendor clients
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VendorError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limited - try again later")]
    RateLimited,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Missing credentials for {0}")]
    MissingCredentials(Vendor),
}
