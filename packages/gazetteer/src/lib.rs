#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Reference gazetteer of known city names.
//!
//! The gazetteer is the candidate pool for correcting misspelled or
//! partial city names (e.g. "York" → "New York") when the exact
//! geocode of an incident location fails. It is loaded once per session
//! from a `worldcities`-style CSV and never mutated afterwards.
//!
//! Matching is done through the [`matcher::FuzzyMatcher`] trait; the
//! default [`matcher::WeightedRatioMatcher`] scores names with the
//! `WRatio`-style similarity in [`similarity`], built on `rapidfuzz`.

pub mod matcher;
pub mod normalize;
pub mod similarity;

use std::collections::BTreeSet;
use std::path::Path;

use thiserror::Error;

/// Column holding the city name in the gazetteer CSV.
pub const CITY_COLUMN: &str = "city";

/// Errors from loading a gazetteer.
#[derive(Debug, Error)]
pub enum GazetteerError {
    /// CSV reading failed (includes I/O errors opening the file).
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The header row has no city column.
    #[error("Gazetteer has no '{column}' column")]
    MissingColumn {
        /// Name of the expected column.
        column: String,
    },

    /// The file parsed but contained no usable names.
    #[error("Gazetteer contains no city names")]
    Empty,
}

/// A known city name with its normalized form precomputed for matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GazetteerEntry {
    name: String,
    normalized: String,
}

impl GazetteerEntry {
    /// Creates an entry, normalizing the name once up front.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let normalized = normalize::normalize(&name);
        Self { name, normalized }
    }

    /// The name as it appears in the gazetteer.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The normalized form used for scoring.
    #[must_use]
    pub fn normalized(&self) -> &str {
        &self.normalized
    }
}

/// An immutable, deduplicated list of known city names.
#[derive(Debug, Clone, Default)]
pub struct Gazetteer {
    entries: Vec<GazetteerEntry>,
}

impl Gazetteer {
    /// Builds a gazetteer from names, dropping blanks and duplicates while
    /// keeping first-occurrence order.
    #[must_use]
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = BTreeSet::new();
        let mut entries = Vec::new();

        for name in names {
            let name: String = name.into();
            let trimmed = name.trim();
            if trimmed.is_empty() || !seen.insert(trimmed.to_string()) {
                continue;
            }
            entries.push(GazetteerEntry::new(trimmed));
        }

        Self { entries }
    }

    /// Loads the `city` column of a CSV file.
    ///
    /// # Errors
    ///
    /// Returns [`GazetteerError`] if the file cannot be read, has no `city`
    /// column, or yields no names. An empty gazetteer is an error because
    /// resolving against it would silently report every fallback as
    /// unresolved.
    pub fn load(path: &Path) -> Result<Self, GazetteerError> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;

        let column = reader
            .headers()?
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(CITY_COLUMN))
            .ok_or_else(|| GazetteerError::MissingColumn {
                column: CITY_COLUMN.to_string(),
            })?;

        let mut names = Vec::new();
        for row in reader.records() {
            let row = row?;
            if let Some(name) = row.get(column) {
                names.push(name.to_string());
            }
        }

        let gazetteer = Self::from_names(names);
        if gazetteer.is_empty() {
            return Err(GazetteerError::Empty);
        }

        log::info!(
            "Loaded {} gazetteer names from {}",
            gazetteer.len(),
            path.display()
        );

        Ok(gazetteer)
    }

    /// All entries in load order.
    #[must_use]
    pub fn entries(&self) -> &[GazetteerEntry] {
        &self.entries
    }

    /// Number of distinct names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the gazetteer has no names.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns up to `limit` candidates scoring at least `min_score`
    /// against `query`, best first.
    #[must_use]
    pub fn candidates(
        &self,
        matcher: &dyn matcher::FuzzyMatcher,
        query: &str,
        limit: usize,
        min_score: u8,
    ) -> Vec<matcher::Candidate> {
        matcher.top_matches(query, &self.entries, limit, min_score)
    }
}
