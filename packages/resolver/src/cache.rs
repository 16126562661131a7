//! Session-scoped memoization of resolution results.
//!
//! Lives for one dataset load and is owned by the resolver. Two maps are
//! kept: finished `(city, country)` resolutions, and the raw outcome of
//! every geocoder query issued, so a candidate name shared by several
//! misspellings is only looked up once.

use std::collections::BTreeMap;

use cbrne_map_geocoder::LookupOutcome;
use cbrne_map_incident_models::ResolvedLocation;

/// Cache key for a resolution request. Compared verbatim.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct LocationKey {
    /// City as given by the caller.
    pub city: String,
    /// Country as given by the caller.
    pub country: String,
}

impl LocationKey {
    #[must_use]
    pub fn new(city: &str, country: &str) -> Self {
        Self {
            city: city.to_string(),
            country: country.to_string(),
        }
    }
}

/// Memoized resolutions and lookups for one session. No eviction.
#[derive(Debug, Default)]
pub struct SessionCache {
    locations: BTreeMap<LocationKey, ResolvedLocation>,
    lookups: BTreeMap<String, LookupOutcome>,
}

impl SessionCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the memoized resolution for a key.
    #[must_use]
    pub fn location(&self, key: &LocationKey) -> Option<&ResolvedLocation> {
        self.locations.get(key)
    }

    /// Stores a finished resolution.
    pub fn insert_location(&mut self, key: LocationKey, location: ResolvedLocation) {
        self.locations.insert(key, location);
    }

    /// Returns the memoized outcome of a geocoder query.
    #[must_use]
    pub fn lookup(&self, query: &str) -> Option<&LookupOutcome> {
        self.lookups.get(query)
    }

    /// Stores the outcome of a geocoder query.
    pub fn insert_lookup(&mut self, query: String, outcome: LookupOutcome) {
        self.lookups.insert(query, outcome);
    }

    /// Number of memoized `(city, country)` resolutions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    /// Whether nothing has been resolved yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Number of memoized geocoder queries.
    #[must_use]
    pub fn lookup_count(&self) -> usize {
        self.lookups.len()
    }

    /// Drops everything; call when the dataset is reloaded.
    pub fn clear(&mut self) {
        self.locations.clear();
        self.lookups.clear();
    }
}
