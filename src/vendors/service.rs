//! Lookup service - orchestrates vendor search, matching and tag merging
//!
//! This is the high-level API for tagging a file:
//! 1. Build a match query from the tags the file already has
//! 2. Search every requested vendor (concurrently)
//! 3. Pick the best candidate per vendor with the [`Matcher`]
//! 4. Fetch detailed metadata and cover art for each match
//! 5. Merge the results into the tags, in the caller's vendor order

use futures::future::join_all;

use super::artwork::ArtworkFetcher;
use super::domain::{EntityKind, Vendor, VendorError};
use super::traits::CatalogApi;
use super::{discogs, itunes, qobuz, spotify, tidal};
use crate::audio::AudioFile;
use crate::config::Config;
use crate::error::Result;
use crate::matching::{CandidateRecord, Identifier, MatchMethod, MatchQuery, MatchResult, Matcher};
use crate::tags::{FieldValue, MergeReport, TagField, TagSet};

/// What happened with one vendor during a lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupStatus {
    /// A candidate was chosen and its metadata merged
    Merged { method: MatchMethod, report: MergeReport },
    /// Results came back but none was close enough
    NoMatch { best_score: Option<f64> },
    /// The vendor wasn't consulted
    Skipped(String),
    /// The vendor or the merge failed
    Failed(String),
}

/// Per-vendor outcome of a lookup, in the order vendors were requested.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupOutcome {
    pub vendor: Vendor,
    pub status: LookupStatus,
}

impl LookupOutcome {
    fn new(vendor: Vendor, status: LookupStatus) -> Self {
        Self { vendor, status }
    }

    pub fn merged(&self) -> bool {
        matches!(self.status, LookupStatus::Merged { .. })
    }
}

/// Service for tagging files from vendor catalogs
pub struct LookupService {
    clients: Vec<Box<dyn CatalogApi>>,
    matcher: Matcher,
    artwork: Option<ArtworkFetcher>,
    search_limit: u32,
}

impl LookupService {
    /// Build a service with every vendor the config has credentials for.
    ///
    /// iTunes needs no credentials and Discogs can fetch releases without a
    /// token, so both are always present.
    pub fn from_config(config: &Config) -> Self {
        let creds = &config.credentials;
        let mut clients: Vec<Box<dyn CatalogApi>> = Vec::new();

        if let (Some(id), Some(secret)) = (&creds.spotify_client_id, &creds.spotify_client_secret) {
            clients.push(Box::new(spotify::SpotifyClient::new(id, secret)));
        }
        if let Some(token) = &creds.tidal_token {
            clients.push(Box::new(
                tidal::TidalClient::new(token, &config.matching.country)
                    .with_artwork_size(config.artwork.size),
            ));
        }
        if let Some(app_id) = &creds.qobuz_app_id {
            clients.push(Box::new(qobuz::QobuzClient::new(
                app_id,
                creds.qobuz_user_token.clone(),
            )));
        }
        clients.push(Box::new(
            itunes::ItunesClient::new()
                .with_country(config.matching.country.to_lowercase())
                .with_artwork(config.artwork.size, &config.artwork.format),
        ));
        clients.push(Box::new(discogs::DiscogsClient::new(creds.discogs_token.clone())));

        let names: Vec<_> = clients.iter().map(|c| c.vendor().name()).collect();
        tracing::debug!("Lookup service configured with: {}", names.join(", "));

        Self {
            clients,
            matcher: Matcher::new(config.matching.threshold),
            artwork: config.artwork.enabled.then(ArtworkFetcher::new),
            search_limit: config.matching.search_limit.max(1),
        }
    }

    /// Build a service from explicit clients. Artwork download is off.
    pub fn with_clients(clients: Vec<Box<dyn CatalogApi>>, matcher: Matcher) -> Self {
        Self {
            clients,
            matcher,
            artwork: None,
            search_limit: 10,
        }
    }

    pub fn with_artwork(mut self, fetcher: ArtworkFetcher) -> Self {
        self.artwork = Some(fetcher);
        self
    }

    pub fn with_search_limit(mut self, limit: u32) -> Self {
        self.search_limit = limit.max(1);
        self
    }

    /// Vendors this service can consult, in configuration order.
    pub fn vendors(&self) -> Vec<Vendor> {
        self.clients.iter().map(|c| c.vendor()).collect()
    }

    fn client(&self, vendor: Vendor) -> Option<&dyn CatalogApi> {
        self.clients.iter().find(|c| c.vendor() == vendor).map(|c| c.as_ref())
    }

    /// Search one vendor and match its results, without fetching or merging.
    pub async fn search(
        &self,
        vendor: Vendor,
        query: &MatchQuery,
        kind: EntityKind,
    ) -> Result<(Vec<CandidateRecord>, MatchResult)> {
        let client = self
            .client(vendor)
            .ok_or(VendorError::MissingCredentials(vendor))?;
        if !client.supports(kind) {
            return Err(VendorError::NotFound(format!("{} has no {:?} search", vendor, kind)).into());
        }

        let candidates = client.search(query, kind, self.search_limit).await?;
        let result = self.matcher.best_match(query, &candidates);
        Ok((candidates, result))
    }

    /// Look up a file's tags and merge what the vendors know into it.
    ///
    /// Nothing is written to disk; call [`AudioFile::flush`] afterwards.
    pub async fn tag_file(
        &self,
        file: &mut AudioFile,
        vendors: &[Vendor],
        overwrite: bool,
    ) -> Result<Vec<LookupOutcome>> {
        tracing::info!("Looking up {}", file.path().display());
        self.enrich_tags(file.tags_mut(), vendors, overwrite).await
    }

    /// Same as [`tag_file`](Self::tag_file) for a bare tag set.
    ///
    /// An empty `vendors` slice means every configured vendor. Fails only
    /// when the tags don't carry enough to search with.
    pub async fn enrich_tags(
        &self,
        tags: &mut TagSet,
        vendors: &[Vendor],
        overwrite: bool,
    ) -> Result<Vec<LookupOutcome>> {
        let track_query = track_query(tags);
        let album_query = album_query(tags);
        if album_query.is_none()
            && let Err(e) = &track_query
        {
            return Err(e.clone().into());
        }

        let order: Vec<Vendor> = if vendors.is_empty() {
            self.vendors()
        } else {
            vendors.to_vec()
        };

        // Decide what to ask each vendor before going to the network
        let mut planned = Vec::new();
        let mut outcomes: Vec<Option<LookupOutcome>> = Vec::with_capacity(order.len());
        for vendor in &order {
            let Some(client) = self.client(*vendor) else {
                tracing::info!("{} is not configured; skipping", vendor);
                outcomes.push(Some(LookupOutcome::new(
                    *vendor,
                    LookupStatus::Skipped("not configured".to_string()),
                )));
                continue;
            };

            let request = if client.supports(EntityKind::Track) {
                track_query.as_ref().ok().map(|q| (q, EntityKind::Track))
            } else {
                album_query.as_ref().map(|q| (q, EntityKind::Album))
            };
            match request {
                Some((query, kind)) => {
                    planned.push((outcomes.len(), client, query, kind));
                    outcomes.push(None);
                }
                None => {
                    tracing::info!("Not enough tags to search {}; skipping", vendor);
                    outcomes.push(Some(LookupOutcome::new(
                        *vendor,
                        LookupStatus::Skipped("missing tags for query".to_string()),
                    )));
                }
            }
        }

        let searches = planned
            .iter()
            .map(|(_, client, query, kind)| client.search(query, *kind, self.search_limit));
        let results = join_all(searches).await;

        // Fetch and merge one vendor at a time so merge order is the caller's
        for ((slot, client, query, kind), found) in planned.into_iter().zip(results) {
            let vendor = client.vendor();
            let status = match found {
                Ok(candidates) => {
                    self.apply_best(client, query, kind, &candidates, tags, overwrite)
                        .await
                }
                Err(e) => {
                    tracing::warn!("{} search failed: {}", vendor, e);
                    LookupStatus::Failed(e.to_string())
                }
            };
            outcomes[slot] = Some(LookupOutcome::new(vendor, status));
        }

        Ok(outcomes.into_iter().flatten().collect())
    }

    async fn apply_best(
        &self,
        client: &dyn CatalogApi,
        query: &MatchQuery,
        kind: EntityKind,
        candidates: &[CandidateRecord],
        tags: &mut TagSet,
        overwrite: bool,
    ) -> LookupStatus {
        let vendor = client.vendor();
        let result = self.matcher.best_match(query, candidates);
        let (candidate, method) = match &result {
            MatchResult::Identifier(c) => (c, MatchMethod::Identifier),
            MatchResult::Fuzzy { candidate, score } => (candidate, MatchMethod::Fuzzy { score: *score }),
            MatchResult::NoMatch { best_score } => {
                match best_score {
                    Some(score) => tracing::info!(
                        "{}: no match for '{}' (best score {:.2})",
                        vendor,
                        query.search_text(),
                        score
                    ),
                    None => tracing::info!("{}: no results for '{}'", vendor, query.search_text()),
                }
                return LookupStatus::NoMatch { best_score: *best_score };
            }
        };
        tracing::debug!("{}: matched {} via {:?}", vendor, candidate.id, method);

        let mut metadata = match client.fetch_metadata(candidate, kind).await {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!("{}: fetching {} failed: {}", vendor, candidate.id, e);
                return LookupStatus::Failed(e.to_string());
            }
        };

        if let Some(url) = metadata.artwork_url.as_deref()
            && (tags.artwork.is_none() || overwrite)
            && let Some(fetcher) = &self.artwork
        {
            match fetcher.fetch(url).await {
                Ok(art) => metadata.fields.set(TagField::Artwork, FieldValue::Binary(art)),
                Err(e) => tracing::warn!("{}: artwork download failed: {}", vendor, e),
            }
        }

        match tags.merge(&metadata.fields, overwrite) {
            Ok(report) => {
                tracing::info!(
                    "{}: updated {} field(s), kept {}",
                    vendor,
                    report.fields_updated.len(),
                    report.fields_skipped.len()
                );
                LookupStatus::Merged { method, report }
            }
            Err(e) => {
                tracing::warn!("{}: {}", vendor, e);
                LookupStatus::Failed(e.to_string())
            }
        }
    }
}

/// Track query from title, artist and ISRC.
fn track_query(tags: &TagSet) -> std::result::Result<MatchQuery, crate::matching::MatchError> {
    let query = MatchQuery::new(
        tags.title.clone().unwrap_or_default(),
        tags.artist.clone().unwrap_or_default(),
    )?;
    Ok(match tags.isrc.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(isrc) => query.with_identifier(Identifier::Isrc(isrc.to_string())),
        None => query,
    })
}

/// Album query for vendors that only catalog releases.
fn album_query(tags: &TagSet) -> Option<MatchQuery> {
    let artist = tags.album_artist.clone().or_else(|| tags.artist.clone())?;
    let query = MatchQuery::new(tags.album.clone()?, artist).ok()?;
    Some(match tags.track_count {
        Some(n) => query.with_expected_count(n),
        None => query,
    })
}
