//! Vendor catalogs - searches streaming and metadata services and turns their
//! responses into tag data.
//!
//! # Architecture
//!
//! Each vendor lives in its own module with the same split:
//! - **DTOs** (`*/dto.rs`) - Exact API response shapes
//! - **Adapters** - Convert DTOs into [`CandidateRecord`](crate::matching::CandidateRecord)s
//!   for matching and [`FieldMap`](crate::tags::FieldMap)s for merging
//! - **Clients** - HTTP clients mapping 1:1 onto REST endpoints
//!
//! On top of those:
//! - **Domain** (`domain.rs`) - Vendor-independent types and errors
//! - **Traits** (`traits.rs`) - [`CatalogApi`], implemented by every client
//! - **Artwork** - Cover download and image normalization
//! - **Service** - Search, match, fetch and merge across vendors
//!
//! # Usage
//!
//! ```ignore
//! use tunelink::vendors::{LookupService, Vendor};
//!
//! let service = LookupService::from_config(&tunelink::config::load());
//! let mut file = AudioFile::open("Spektrem - Shine.flac")?;
//! let outcomes = service.tag_file(&mut file, &[Vendor::Tidal, Vendor::Itunes], false).await?;
//! file.flush()?;
//! ```

pub mod domain;
mod http;
pub mod spotify;
pub mod tidal;
pub mod qobuz;
pub mod itunes;
pub mod discogs;
pub mod traits;
pub mod artwork;
pub mod service;

pub use artwork::ArtworkFetcher;
pub use discogs::DiscogsClient;
pub use domain::{EntityKind, Vendor, VendorError, VendorMetadata};
pub use itunes::ItunesClient;
pub use qobuz::QobuzClient;
pub use service::{LookupOutcome, LookupService, LookupStatus};
pub use spotify::SpotifyClient;
pub use tidal::TidalClient;
pub use traits::CatalogApi;
