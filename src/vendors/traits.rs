//! Trait definitions for vendor catalog clients.
//!
//! [`CatalogApi`] lets the lookup service treat every vendor the same way and
//! lets tests substitute canned responses for real HTTP calls.

use async_trait::async_trait;

use super::domain::{EntityKind, Vendor, VendorError, VendorMetadata};
use super::{discogs, itunes, qobuz, spotify, tidal};
use crate::matching::{CandidateRecord, MatchQuery};

/// A vendor that can be searched and asked for details about a result.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    fn vendor(&self) -> Vendor;

    /// Whether this vendor has entities of the given kind.
    fn supports(&self, _kind: EntityKind) -> bool {
        true
    }

    /// Search and return normalized candidates in the vendor's own ranking.
    async fn search(
        &self,
        query: &MatchQuery,
        kind: EntityKind,
        limit: u32,
    ) -> Result<Vec<CandidateRecord>, VendorError>;

    /// Fetch taggable metadata for a previously returned candidate.
    async fn fetch_metadata(
        &self,
        candidate: &CandidateRecord,
        kind: EntityKind,
    ) -> Result<VendorMetadata, VendorError>;
}

// Implement the trait for the real clients

#[async_trait]
impl CatalogApi for spotify::SpotifyClient {
    fn vendor(&self) -> Vendor {
        Vendor::Spotify
    }

    async fn search(
        &self,
        query: &MatchQuery,
        kind: EntityKind,
        limit: u32,
    ) -> Result<Vec<CandidateRecord>, VendorError> {
        self.search(query, kind, limit).await
    }

    async fn fetch_metadata(
        &self,
        candidate: &CandidateRecord,
        kind: EntityKind,
    ) -> Result<VendorMetadata, VendorError> {
        self.fetch_metadata(candidate, kind).await
    }
}

#[async_trait]
impl CatalogApi for tidal::TidalClient {
    fn vendor(&self) -> Vendor {
        Vendor::Tidal
    }

    async fn search(
        &self,
        query: &MatchQuery,
        kind: EntityKind,
        limit: u32,
    ) -> Result<Vec<CandidateRecord>, VendorError> {
        self.search(query, kind, limit).await
    }

    async fn fetch_metadata(
        &self,
        candidate: &CandidateRecord,
        kind: EntityKind,
    ) -> Result<VendorMetadata, VendorError> {
        self.fetch_metadata(candidate, kind).await
    }
}

#[async_trait]
impl CatalogApi for qobuz::QobuzClient {
    fn vendor(&self) -> Vendor {
        Vendor::Qobuz
    }

    async fn search(
        &self,
        query: &MatchQuery,
        kind: EntityKind,
        limit: u32,
    ) -> Result<Vec<CandidateRecord>, VendorError> {
        self.search(query, kind, limit).await
    }

    async fn fetch_metadata(
        &self,
        candidate: &CandidateRecord,
        kind: EntityKind,
    ) -> Result<VendorMetadata, VendorError> {
        self.fetch_metadata(candidate, kind).await
    }
}

#[async_trait]
impl CatalogApi for itunes::ItunesClient {
    fn vendor(&self) -> Vendor {
        Vendor::Itunes
    }

    async fn search(
        &self,
        query: &MatchQuery,
        kind: EntityKind,
        limit: u32,
    ) -> Result<Vec<CandidateRecord>, VendorError> {
        self.search(query, kind, limit).await
    }

    async fn fetch_metadata(
        &self,
        candidate: &CandidateRecord,
        kind: EntityKind,
    ) -> Result<VendorMetadata, VendorError> {
        self.fetch_metadata(candidate, kind).await
    }
}

#[async_trait]
impl CatalogApi for discogs::DiscogsClient {
    fn vendor(&self) -> Vendor {
        Vendor::Discogs
    }

    fn supports(&self, kind: EntityKind) -> bool {
        kind == EntityKind::Album
    }

    async fn search(
        &self,
        query: &MatchQuery,
        kind: EntityKind,
        limit: u32,
    ) -> Result<Vec<CandidateRecord>, VendorError> {
        self.search(query, kind, limit).await
    }

    async fn fetch_metadata(
        &self,
        candidate: &CandidateRecord,
        kind: EntityKind,
    ) -> Result<VendorMetadata, VendorError> {
        self.fetch_metadata(candidate, kind).await
    }
}
