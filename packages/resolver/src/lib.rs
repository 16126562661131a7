#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Location resolution for incident records.
//!
//! [`LocationResolver::resolve`] turns a `(city, country)` pair into a
//! [`ResolvedLocation`]:
//!
//! 1. Geocode `"{city}, {country}"`.
//! 2. On no result, ask the gazetteer for the top `candidate_limit` names
//!    scoring at least `min_score` against the city.
//! 3. Geocode each candidate with the same country, in rank order. The
//!    first hit wins and its name replaces the city.
//! 4. Otherwise the pair is [`ResolvedLocation::Unresolved`].
//!
//! Geocoder failures never escape: they count as "no result" for that
//! query. Every resolution and every geocoder query is memoized in a
//! [`SessionCache`] owned by the resolver, so repeated pairs cost no
//! network calls. The cache is single-writer through `&mut self`.

pub mod cache;
pub mod progress;

use cbrne_map_gazetteer::Gazetteer;
use cbrne_map_gazetteer::matcher::{FuzzyMatcher, WeightedRatioMatcher};
use cbrne_map_geocoder::{Geocoder, LookupOutcome, freeform_query};
use cbrne_map_incident_models::{IncidentRecord, MatchSource, ResolvedLocation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use cache::{LocationKey, SessionCache};
use progress::ProgressCallback;

/// Errors that prevent a resolution pass from starting.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The gazetteer has no names, so fuzzy correction cannot be attempted.
    #[error("Gazetteer is empty; refusing to resolve without a fallback pool")]
    EmptyGazetteer,
}

/// Tuning for the fuzzy fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Maximum number of gazetteer candidates tried per city.
    pub candidate_limit: usize,
    /// Minimum similarity (0-100) for a candidate to be tried.
    pub min_score: u8,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            candidate_limit: 5,
            min_score: 70,
        }
    }
}

/// Counters for a resolution pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveStats {
    /// Records visited.
    pub total: usize,
    /// Records that already had coordinates and were left alone.
    pub already_located: usize,
    /// Resolved with the original city name.
    pub exact: usize,
    /// Resolved through a gazetteer correction.
    pub corrected: usize,
    /// Left without coordinates.
    pub unresolved: usize,
    /// Geocoder calls issued during the pass.
    pub network_lookups: usize,
    /// Geocoder calls that failed (network, rate limit, bad response).
    pub failed_lookups: usize,
    /// Resolutions answered from the session cache.
    pub cache_hits: usize,
}

/// Resolves city/country pairs with exact lookup and fuzzy fallback.
pub struct LocationResolver {
    geocoder: Box<dyn Geocoder>,
    gazetteer: Gazetteer,
    matcher: Box<dyn FuzzyMatcher>,
    config: ResolverConfig,
    cache: SessionCache,
    network_lookups: usize,
    failed_lookups: usize,
    cache_hits: usize,
}

impl LocationResolver {
    /// Creates a resolver using the default [`WeightedRatioMatcher`].
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::EmptyGazetteer`] if the gazetteer has no
    /// names.
    pub fn new(
        geocoder: Box<dyn Geocoder>,
        gazetteer: Gazetteer,
        config: ResolverConfig,
    ) -> Result<Self, ResolveError> {
        if gazetteer.is_empty() {
            return Err(ResolveError::EmptyGazetteer);
        }

        Ok(Self {
            geocoder,
            gazetteer,
            matcher: Box::new(WeightedRatioMatcher),
            config,
            cache: SessionCache::new(),
            network_lookups: 0,
            failed_lookups: 0,
            cache_hits: 0,
        })
    }

    /// Replaces the candidate matcher.
    #[must_use]
    pub fn with_matcher(mut self, matcher: Box<dyn FuzzyMatcher>) -> Self {
        self.matcher = matcher;
        self
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> ResolverConfig {
        self.config
    }

    /// The session cache.
    #[must_use]
    pub const fn cache(&self) -> &SessionCache {
        &self.cache
    }

    /// Total geocoder calls issued since construction or the last reset.
    #[must_use]
    pub const fn network_lookups(&self) -> usize {
        self.network_lookups
    }

    /// Forgets all memoized results; call when the dataset is reloaded.
    pub fn reset_session(&mut self) {
        log::debug!(
            "Dropping {} memoized resolutions and {} geocoder answers",
            self.cache.len(),
            self.cache.lookup_count()
        );
        self.cache.clear();
        self.network_lookups = 0;
        self.failed_lookups = 0;
        self.cache_hits = 0;
    }

    /// Resolves a `(city, country)` pair.
    ///
    /// Returns the memoized result for pairs seen earlier in the session.
    pub async fn resolve(&mut self, city: &str, country: &str) -> ResolvedLocation {
        let key = LocationKey::new(city, country);
        if let Some(hit) = self.cache.location(&key) {
            log::debug!("Cache hit for '{city}, {country}'");
            self.cache_hits += 1;
            return hit.clone();
        }

        let resolved = self.resolve_uncached(city, country).await;
        self.cache.insert_location(key, resolved.clone());
        resolved
    }

    async fn resolve_uncached(&mut self, city: &str, country: &str) -> ResolvedLocation {
        if let Some(coordinates) = self.lookup(&freeform_query(city, country)).await.coordinates() {
            return ResolvedLocation::Resolved {
                city: city.to_string(),
                coordinates,
                source: MatchSource::Exact,
            };
        }

        let candidates = self.gazetteer.candidates(
            self.matcher.as_ref(),
            city,
            self.config.candidate_limit,
            self.config.min_score,
        );

        // Rank order, not best final result: stop at the first hit.
        for candidate in candidates {
            let outcome = self.lookup(&freeform_query(&candidate.name, country)).await;
            if let Some(coordinates) = outcome.coordinates() {
                log::info!(
                    "Corrected '{city}' to '{}' in {country} (score {})",
                    candidate.name,
                    candidate.score
                );
                return ResolvedLocation::Resolved {
                    city: candidate.name,
                    coordinates,
                    source: MatchSource::Fuzzy {
                        score: candidate.score,
                    },
                };
            }
        }

        log::warn!("Could not resolve '{city}, {country}'");
        ResolvedLocation::Unresolved
    }

    async fn lookup(&mut self, query: &str) -> LookupOutcome {
        if let Some(outcome) = self.cache.lookup(query) {
            return outcome.clone();
        }

        self.network_lookups += 1;
        let outcome = cbrne_map_geocoder::lookup(self.geocoder.as_ref(), query).await;
        if outcome.is_unreachable() {
            self.failed_lookups += 1;
        }
        self.cache.insert_lookup(query.to_string(), outcome.clone());
        outcome
    }

    /// Resolves every record that does not yet have coordinates, writing
    /// the result back onto the record.
    ///
    /// Records that already carry coordinates are skipped so each record
    /// is resolved at most once. Unresolved records keep their original
    /// city.
    pub async fn resolve_records(
        &mut self,
        records: &mut [IncidentRecord],
        progress: &dyn ProgressCallback,
    ) -> ResolveStats {
        let lookups_before = self.network_lookups;
        let failed_before = self.failed_lookups;
        let hits_before = self.cache_hits;
        let mut stats = ResolveStats {
            total: records.len(),
            ..ResolveStats::default()
        };

        progress.set_total(records.len() as u64);
        progress.set_message("Resolving locations".to_string());

        for record in records.iter_mut() {
            if record.is_located() {
                stats.already_located += 1;
                progress.inc(1);
                continue;
            }

            let resolved = self.resolve(&record.city, &record.country).await;
            match &resolved {
                ResolvedLocation::Resolved {
                    source: MatchSource::Exact,
                    ..
                } => stats.exact += 1,
                ResolvedLocation::Resolved {
                    source: MatchSource::Fuzzy { .. },
                    ..
                } => stats.corrected += 1,
                ResolvedLocation::Unresolved => stats.unresolved += 1,
            }
            record.apply_resolution(&resolved);
            progress.inc(1);
        }

        stats.network_lookups = self.network_lookups - lookups_before;
        stats.failed_lookups = self.failed_lookups - failed_before;
        stats.cache_hits = self.cache_hits - hits_before;

        progress.finish(format!(
            "Resolved {} exact, {} corrected, {} unresolved",
            stats.exact, stats.corrected, stats.unresolved
        ));
        log::info!(
            "Resolution pass: {} records, {} exact, {} corrected, {} unresolved, \
             {} already located, {} geocoder calls ({} failed), {} cache hits",
            stats.total,
            stats.exact,
            stats.corrected,
            stats.unresolved,
            stats.already_located,
            stats.network_lookups,
            stats.failed_lookups,
            stats.cache_hits
        );

        stats
    }
}
