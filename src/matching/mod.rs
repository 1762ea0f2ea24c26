//! Picking the vendor search result that corresponds to a local track or album.
//!
//! Vendors return several loosely-ranked results per search. The [`Matcher`]
//! first looks for an exact ISRC/UPC hit, then falls back to text similarity
//! over title and artist. A weak best score is reported as
//! [`MatchResult::NoMatch`] rather than a guess, so callers can move on to the
//! next vendor.
//!
//! # Usage
//!
//! ```ignore
//! use tunelink::matching::{Matcher, MatchQuery, Identifier};
//!
//! let query = MatchQuery::new("Shine", "Spektrem")?
//!     .with_identifier(Identifier::Isrc("GB2LD0901581".into()));
//! let result = Matcher::default().best_match(&query, &candidates);
//! if let Some(best) = result.candidate() {
//!     println!("{} via {:?}", best.id, result.method());
//! }
//! ```

mod matcher;

use std::fmt;

use crate::vendors::Vendor;

pub use matcher::{DEFAULT_THRESHOLD, Matcher, similarity};

/// Errors raised when building a query.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchError {
    #[error("Match query needs a non-empty {0}")]
    EmptyQuery(&'static str),
}

/// External identifier carried by a track or album.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    /// International Standard Recording Code (tracks)
    Isrc(String),
    /// Universal Product Code / barcode (albums)
    Upc(String),
}

impl Identifier {
    pub fn value(&self) -> &str {
        match self {
            Identifier::Isrc(v) | Identifier::Upc(v) => v,
        }
    }

    /// Whether both identifiers are of the same kind.
    pub fn same_kind(&self, other: &Identifier) -> bool {
        matches!(
            (self, other),
            (Identifier::Isrc(_), Identifier::Isrc(_)) | (Identifier::Upc(_), Identifier::Upc(_))
        )
    }

    /// Normalized form used for comparison.
    pub fn normalized(&self) -> String {
        normalize_identifier(self.value())
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Isrc(v) => write!(f, "ISRC {}", v),
            Identifier::Upc(v) => write!(f, "UPC {}", v),
        }
    }
}

/// Trim, case-fold and drop leading zeros.
///
/// Vendors disagree on zero padding for barcodes (`0602537...` vs
/// `602537...`). A code made only of zeros normalizes to `"0"`; blank input
/// normalizes to an empty string.
pub fn normalize_identifier(raw: &str) -> String {
    let folded = raw.trim().to_lowercase();
    if folded.is_empty() {
        return folded;
    }
    let stripped = folded.trim_start_matches('0');
    if stripped.is_empty() {
        "0".to_string()
    } else {
        stripped.to_string()
    }
}

/// One search result from one vendor, reduced to what matching needs.
///
/// Absent fields stay `None`; an empty string is a real (empty) value.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateRecord {
    /// Vendor the result came from
    pub vendor: Vendor,
    /// Vendor's id for the track or album, used to fetch details afterwards
    pub id: String,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub identifier: Option<Identifier>,
    /// Secondary tie-breaker, usually the album's track count
    pub count: Option<u32>,
}

impl CandidateRecord {
    pub fn new(vendor: Vendor, id: impl Into<String>) -> Self {
        Self {
            vendor,
            id: id.into(),
            title: None,
            artist: None,
            identifier: None,
            count: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    pub fn with_identifier(mut self, identifier: Identifier) -> Self {
        self.identifier = Some(identifier);
        self
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }
}

/// What we are looking for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchQuery {
    pub title: String,
    pub artist: String,
    pub identifier: Option<Identifier>,
    pub expected_count: Option<u32>,
}

impl MatchQuery {
    /// Build a query. Title and artist must contain something other than whitespace.
    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Result<Self, MatchError> {
        let title = title.into();
        let artist = artist.into();
        if title.trim().is_empty() {
            return Err(MatchError::EmptyQuery("title"));
        }
        if artist.trim().is_empty() {
            return Err(MatchError::EmptyQuery("artist"));
        }
        Ok(Self {
            title,
            artist,
            identifier: None,
            expected_count: None,
        })
    }

    pub fn with_identifier(mut self, identifier: Identifier) -> Self {
        self.identifier = Some(identifier);
        self
    }

    pub fn with_expected_count(mut self, count: u32) -> Self {
        self.expected_count = Some(count);
        self
    }

    /// Free-text search string sent to vendor search endpoints.
    pub fn search_text(&self) -> String {
        format!("{} {}", self.title.trim(), self.artist.trim())
    }
}

/// How a candidate was chosen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchMethod {
    Identifier,
    Fuzzy { score: f64 },
}

/// Outcome of matching one vendor's results.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchResult {
    /// A candidate carried the query's identifier
    Identifier(CandidateRecord),
    /// Best text similarity at or above the threshold
    Fuzzy { candidate: CandidateRecord, score: f64 },
    /// Nothing acceptable. `best_score` is `None` when no candidate could be scored.
    NoMatch { best_score: Option<f64> },
}

impl MatchResult {
    pub fn none() -> Self {
        MatchResult::NoMatch { best_score: None }
    }

    pub fn is_match(&self) -> bool {
        !matches!(self, MatchResult::NoMatch { .. })
    }

    pub fn candidate(&self) -> Option<&CandidateRecord> {
        match self {
            MatchResult::Identifier(c) | MatchResult::Fuzzy { candidate: c, .. } => Some(c),
            MatchResult::NoMatch { .. } => None,
        }
    }

    pub fn into_candidate(self) -> Option<CandidateRecord> {
        match self {
            MatchResult::Identifier(c) | MatchResult::Fuzzy { candidate: c, .. } => Some(c),
            MatchResult::NoMatch { .. } => None,
        }
    }

    pub fn method(&self) -> Option<MatchMethod> {
        match self {
            MatchResult::Identifier(_) => Some(MatchMethod::Identifier),
            MatchResult::Fuzzy { score, .. } => Some(MatchMethod::Fuzzy { score: *score }),
            MatchResult::NoMatch { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_identifier() {
        assert_eq!(normalize_identifier(" GB2LD0901581 "), "gb2ld0901581");
        assert_eq!(normalize_identifier("00602537"), "602537");
        assert_eq!(normalize_identifier("0000"), "0");
        assert_eq!(normalize_identifier("   "), "");
    }

    #[test]
    fn test_identifier_kinds() {
        let isrc = Identifier::Isrc("A".into());
        assert!(isrc.same_kind(&Identifier::Isrc("B".into())));
        assert!(!isrc.same_kind(&Identifier::Upc("A".into())));
    }

    #[test]
    fn test_query_rejects_blank_fields() {
        assert_eq!(MatchQuery::new("", "Spektrem"), Err(MatchError::EmptyQuery("title")));
        assert_eq!(MatchQuery::new("Shine", "  "), Err(MatchError::EmptyQuery("artist")));
        assert!(MatchQuery::new("Shine", "Spektrem").is_ok());
    }

    #[test]
    fn test_no_match_has_no_candidate() {
        let result = MatchResult::none();
        assert!(!result.is_match());
        assert!(result.candidate().is_none());
        assert!(result.method().is_none());
    }
}
