//! Identifier short-circuit plus edit-distance scoring.

use super::{CandidateRecord, MatchQuery, MatchResult};

/// Minimum similarity accepted when no threshold is configured.
pub const DEFAULT_THRESHOLD: f64 = 0.8;

/// Chooses the best candidate for a query. Stateless apart from its threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matcher {
    threshold: f64,
}

impl Default for Matcher {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

/// Similarity of two strings in `[0, 1]`, 1 meaning identical.
pub fn similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b)
}

fn comparison_key(title: &str, artist: &str) -> String {
    format!("{} {}", title.trim(), artist.trim()).to_lowercase()
}

impl Matcher {
    /// Create a matcher. The threshold is clamped into `[0, 1]`.
    pub fn new(threshold: f64) -> Self {
        let threshold = if threshold.is_nan() {
            DEFAULT_THRESHOLD
        } else {
            threshold.clamp(0.0, 1.0)
        };
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Pick the best candidate from one vendor's ordered results.
    pub fn best_match(&self, query: &MatchQuery, candidates: &[CandidateRecord]) -> MatchResult {
        if candidates.is_empty() {
            return MatchResult::none();
        }

        if let Some(found) = self.match_identifier(query, candidates) {
            return MatchResult::Identifier(found.clone());
        }

        let target = comparison_key(&query.title, &query.artist);
        let mut best: Option<(&CandidateRecord, f64)> = None;

        for candidate in candidates {
            let (Some(title), Some(artist)) = (&candidate.title, &candidate.artist) else {
                tracing::debug!(
                    "Skipping {} candidate {} without title or artist",
                    candidate.vendor,
                    candidate.id
                );
                continue;
            };

            let score = similarity(&target, &comparison_key(title, artist));
            tracing::trace!("{} candidate {} scored {:.3}", candidate.vendor, candidate.id, score);

            best = match best {
                None => Some((candidate, score)),
                Some((_, best_score)) if score > best_score => Some((candidate, score)),
                Some((current, best_score))
                    if score == best_score && prefers_count(query, candidate, current) =>
                {
                    Some((candidate, score))
                }
                keep => keep,
            };
        }

        match best {
            Some((candidate, score)) if score >= self.threshold => MatchResult::Fuzzy {
                candidate: candidate.clone(),
                score,
            },
            Some((_, score)) => {
                tracing::debug!(
                    "Best score {:.3} below threshold {:.2} for '{}'",
                    score,
                    self.threshold,
                    target
                );
                MatchResult::NoMatch {
                    best_score: Some(score),
                }
            }
            None => MatchResult::none(),
        }
    }

    /// First candidate whose identifier equals the query's, if any candidate
    /// exposes an identifier of the same kind.
    fn match_identifier<'a>(
        &self,
        query: &MatchQuery,
        candidates: &'a [CandidateRecord],
    ) -> Option<&'a CandidateRecord> {
        let wanted = query.identifier.as_ref()?;
        let wanted_norm = wanted.normalized();
        if wanted_norm.is_empty() {
            return None;
        }

        candidates.iter().find(|c| {
            c.identifier
                .as_ref()
                .is_some_and(|id| id.same_kind(wanted) && id.normalized() == wanted_norm)
        })
    }
}

/// On equal scores, a challenger wins only if its count matches the expected
/// count and the current best's doesn't.
fn prefers_count(query: &MatchQuery, challenger: &CandidateRecord, current: &CandidateRecord) -> bool {
    match query.expected_count {
        Some(expected) => challenger.count == Some(expected) && current.count != Some(expected),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::{Identifier, MatchMethod};
    use crate::vendors::Vendor;

    fn candidate(id: &str, title: &str, artist: &str) -> CandidateRecord {
        CandidateRecord::new(Vendor::Spotify, id)
            .with_title(title)
            .with_artist(artist)
    }

    fn spektrem_candidates() -> Vec<CandidateRecord> {
        vec![
            candidate("1", "Shine", "Spektrem").with_identifier(Identifier::Isrc("GB2LD0901581".into())),
            candidate("2", "Shine On", "Spektrem").with_identifier(Identifier::Isrc("GB2LD0901582".into())),
        ]
    }

    #[test]
    fn test_fuzzy_match_without_identifier() {
        let query = MatchQuery::new("Shine", "Spektrem").unwrap();

        let result = Matcher::default().best_match(&query, &spektrem_candidates());

        assert_eq!(result.candidate().map(|c| c.id.as_str()), Some("1"));
        assert_eq!(result.method(), Some(MatchMethod::Fuzzy { score: 1.0 }));
    }

    #[test]
    fn test_identifier_match_wins_over_text() {
        let query = MatchQuery::new("Shine On", "Spektrem")
            .unwrap()
            .with_identifier(Identifier::Isrc("GB2LD0901581".into()));

        let result = Matcher::default().best_match(&query, &spektrem_candidates());

        // Text favours the second candidate, the ISRC points at the first
        assert_eq!(result.candidate().map(|c| c.id.as_str()), Some("1"));
        assert_eq!(result.method(), Some(MatchMethod::Identifier));
    }

    #[test]
    fn test_identifier_comparison_is_normalized() {
        let query = MatchQuery::new("Album", "Artist")
            .unwrap()
            .with_identifier(Identifier::Upc("602537518357".into()));
        let candidates = vec![
            candidate("a", "Something Else", "Nobody").with_identifier(Identifier::Upc("00602537518357".into())),
        ];

        let result = Matcher::default().best_match(&query, &candidates);

        assert_eq!(result.method(), Some(MatchMethod::Identifier));
    }

    #[test]
    fn test_identifier_kinds_do_not_cross() {
        let query = MatchQuery::new("Shine", "Spektrem")
            .unwrap()
            .with_identifier(Identifier::Upc("GB2LD0901582".into()));

        let result = Matcher::default().best_match(&query, &spektrem_candidates());

        assert!(matches!(result, MatchResult::Fuzzy { .. }));
        assert_eq!(result.candidate().map(|c| c.id.as_str()), Some("1"));
    }

    #[test]
    fn test_unmatched_identifier_falls_back_to_text() {
        let query = MatchQuery::new("Shine", "Spektrem")
            .unwrap()
            .with_identifier(Identifier::Isrc("USXXX0000001".into()));

        let result = Matcher::default().best_match(&query, &spektrem_candidates());

        assert!(matches!(result, MatchResult::Fuzzy { .. }));
    }

    #[test]
    fn test_empty_candidates_is_no_match() {
        let query = MatchQuery::new("Shine", "Spektrem").unwrap();
        assert_eq!(Matcher::default().best_match(&query, &[]), MatchResult::none());
    }

    #[test]
    fn test_low_score_is_no_match() {
        let query = MatchQuery::new("Shine", "Spektrem").unwrap();
        let candidates = vec![candidate("x", "Bohemian Rhapsody", "Queen")];

        let result = Matcher::default().best_match(&query, &candidates);

        match result {
            MatchResult::NoMatch { best_score: Some(score) } => assert!(score < DEFAULT_THRESHOLD),
            other => panic!("Expected no match, got {:?}", other),
        }
    }

    #[test]
    fn test_case_is_ignored() {
        let query = MatchQuery::new("SHINE", "spektrem").unwrap();
        let candidates = vec![candidate("1", "Shine", "Spektrem")];

        let result = Matcher::default().best_match(&query, &candidates);

        assert_eq!(result.method(), Some(MatchMethod::Fuzzy { score: 1.0 }));
    }

    #[test]
    fn test_malformed_candidates_are_skipped() {
        let query = MatchQuery::new("Shine", "Spektrem").unwrap();
        let candidates = vec![
            CandidateRecord::new(Vendor::Tidal, "no-artist").with_title("Shine"),
            candidate("ok", "Shine", "Spektrem"),
        ];

        let result = Matcher::default().best_match(&query, &candidates);

        assert_eq!(result.candidate().map(|c| c.id.as_str()), Some("ok"));
    }

    #[test]
    fn test_only_malformed_candidates_is_no_match() {
        let query = MatchQuery::new("Shine", "Spektrem").unwrap();
        let candidates = vec![CandidateRecord::new(Vendor::Qobuz, "bare")];

        assert_eq!(Matcher::default().best_match(&query, &candidates), MatchResult::none());
    }

    #[test]
    fn test_tie_prefers_first_without_expected_count() {
        let query = MatchQuery::new("Album", "Artist").unwrap();
        let candidates = vec![
            candidate("first", "Album", "Artist").with_count(10),
            candidate("second", "Album", "Artist").with_count(12),
        ];

        let result = Matcher::default().best_match(&query, &candidates);

        assert_eq!(result.candidate().map(|c| c.id.as_str()), Some("first"));
    }

    #[test]
    fn test_tie_prefers_expected_count() {
        let query = MatchQuery::new("Album", "Artist").unwrap().with_expected_count(12);
        let candidates = vec![
            candidate("deluxe", "Album", "Artist").with_count(18),
            candidate("standard", "Album", "Artist").with_count(12),
            candidate("reissue", "Album", "Artist").with_count(12),
        ];

        let result = Matcher::default().best_match(&query, &candidates);

        assert_eq!(result.candidate().map(|c| c.id.as_str()), Some("standard"));
    }

    #[test]
    fn test_threshold_is_clamped() {
        assert_eq!(Matcher::new(1.5).threshold(), 1.0);
        assert_eq!(Matcher::new(-0.1).threshold(), 0.0);
        assert_eq!(Matcher::new(f64::NAN).threshold(), DEFAULT_THRESHOLD);
    }

    #[test]
    fn test_similarity_bounds() {
        assert_eq!(similarity("shine spektrem", "shine spektrem"), 1.0);
        assert!(similarity("shine spektrem", "shine on spektrem") < 1.0);
        assert_eq!(similarity("", ""), 1.0);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::matching::Identifier;
    use crate::vendors::Vendor;
    use proptest::prelude::*;

    fn word() -> impl Strategy<Value = String> {
        prop::string::string_regex("[a-zA-Z]{1,8}( [a-zA-Z]{1,8})?").unwrap()
    }

    fn candidates() -> impl Strategy<Value = Vec<CandidateRecord>> {
        prop::collection::vec((word(), word(), proptest::option::of(1u32..20)), 1..8).prop_map(|rows| {
            rows.into_iter()
                .enumerate()
                .map(|(i, (title, artist, count))| CandidateRecord {
                    vendor: Vendor::Itunes,
                    id: i.to_string(),
                    title: Some(title),
                    artist: Some(artist),
                    identifier: None,
                    count,
                })
                .collect()
        })
    }

    proptest! {
        /// No candidate scores strictly higher than the chosen one
        #[test]
        fn chosen_candidate_has_max_score(
            title in word(),
            artist in word(),
            cands in candidates(),
            expected in proptest::option::of(1u32..20),
        ) {
            let mut query = MatchQuery::new(title.clone(), artist.clone()).unwrap();
            query.expected_count = expected;

            let result = Matcher::new(0.0).best_match(&query, &cands);
            let MatchResult::Fuzzy { score, .. } = result else {
                return Err(TestCaseError::fail("zero threshold must always pick a candidate"));
            };

            let target = comparison_key(&title, &artist);
            for c in &cands {
                let other = similarity(
                    &target,
                    &comparison_key(c.title.as_deref().unwrap(), c.artist.as_deref().unwrap()),
                );
                prop_assert!(other <= score);
            }
        }

        /// Identical title and artist always score 1.0
        #[test]
        fn identical_text_scores_one(title in word(), artist in word()) {
            let query = MatchQuery::new(title.clone(), artist.clone()).unwrap();
            let cands = vec![CandidateRecord::new(Vendor::Discogs, "x").with_title(title).with_artist(artist)];

            let result = Matcher::default().best_match(&query, &cands);

            prop_assert_eq!(result.method(), Some(crate::matching::MatchMethod::Fuzzy { score: 1.0 }));
        }

        /// A single identifier hit is returned regardless of text
        #[test]
        fn identifier_hit_short_circuits(cands in candidates(), pick in any::<prop::sample::Index>(), pad in 0usize..3) {
            let mut cands = cands;
            let target = pick.index(cands.len());
            for (i, c) in cands.iter_mut().enumerate() {
                c.identifier = Some(Identifier::Isrc(format!("QZ{:010}", i + 1)));
            }
            let code = format!("{}{}", "0".repeat(pad), cands[target].identifier.as_ref().unwrap().value().to_lowercase());
            let query = MatchQuery::new("zzz", "zzz").unwrap().with_identifier(Identifier::Isrc(code));

            let result = Matcher::default().best_match(&query, &cands);

            prop_assert_eq!(result, MatchResult::Identifier(cands[target].clone()));
        }
    }
}
