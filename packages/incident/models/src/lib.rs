#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CBRNE incident record types and category taxonomy.
//!
//! Defines the shared data model used across the cbrne-map toolchain:
//! the [`IncidentCategory`] taxonomy, validated [`Coordinates`], the
//! [`IncidentRecord`] loaded from the source dataset, and the
//! [`ResolvedLocation`] produced by the location resolver.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// CBRNE incident category.
///
/// Parsing is case-insensitive. Labels outside the CBRNE taxonomy map to
/// [`IncidentCategory::Other`] via [`IncidentCategory::parse_lenient`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum IncidentCategory {
    /// Explosive devices and blasts
    Explosive,
    /// Biological agents and outbreaks
    Biological,
    /// Radiological material and dispersal
    Radiological,
    /// Chemical agents and releases
    Chemical,
    /// Nuclear material and facilities
    Nuclear,
    /// Anything not fitting the CBRNE taxonomy
    Other,
}

impl IncidentCategory {
    /// Parses a dataset category label, falling back to [`Self::Other`]
    /// for unknown or empty labels.
    #[must_use]
    pub fn parse_lenient(label: &str) -> Self {
        label.trim().parse().unwrap_or(Self::Other)
    }

    /// Marker color used by map renderers.
    #[must_use]
    pub const fn marker_color(self) -> &'static str {
        match self {
            Self::Explosive => "black",
            Self::Biological => "green",
            Self::Radiological => "red",
            Self::Chemical => "orange",
            Self::Nuclear => "blue",
            Self::Other => "gray",
        }
    }

    /// Font Awesome icon name used by map renderers.
    #[must_use]
    pub const fn marker_icon(self) -> &'static str {
        match self {
            Self::Explosive => "bomb",
            Self::Biological => "bug",
            Self::Radiological => "radiation",
            Self::Chemical => "flask",
            Self::Nuclear => "atom",
            Self::Other => "info-sign",
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Explosive,
            Self::Biological,
            Self::Radiological,
            Self::Chemical,
            Self::Nuclear,
            Self::Other,
        ]
    }
}

/// Error returned when a latitude/longitude pair is out of range or not
/// finite.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("invalid coordinates ({latitude}, {longitude})")]
pub struct InvalidCoordinatesError {
    /// The rejected latitude.
    pub latitude: f64,
    /// The rejected longitude.
    pub longitude: f64,
}

/// A validated WGS84 coordinate pair.
///
/// Can only be built through [`Coordinates::new`], so a value of this type
/// is always a complete, in-range pair. Deserialization goes through the
/// same check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinates")]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct RawCoordinates {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawCoordinates> for Coordinates {
    type Error = InvalidCoordinatesError;

    fn try_from(raw: RawCoordinates) -> Result<Self, Self::Error> {
        Self::new(raw.latitude, raw.longitude)
    }
}

impl Coordinates {
    /// Creates a coordinate pair.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCoordinatesError`] if either value is not finite,
    /// the latitude is outside `[-90, 90]` or the longitude is outside
    /// `[-180, 180]`.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, InvalidCoordinatesError> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);

        if valid {
            Ok(Self {
                latitude,
                longitude,
            })
        } else {
            Err(InvalidCoordinatesError {
                latitude,
                longitude,
            })
        }
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn latitude(self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn longitude(self) -> f64 {
        self.longitude
    }
}

/// How a [`ResolvedLocation`] was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchSource {
    /// The original city name geocoded directly.
    Exact,
    /// A gazetteer candidate replaced the original city name.
    Fuzzy {
        /// Similarity score of the winning candidate (0-100).
        score: u8,
    },
}

/// Outcome of resolving a `(city, country)` pair.
///
/// Either a full result or an explicit unresolved marker, never partial.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedLocation {
    /// The pair resolved to a coordinate.
    Resolved {
        /// City name to store on the record (corrected when fuzzy).
        city: String,
        /// Resolved coordinate.
        coordinates: Coordinates,
        /// Whether the original name or a gazetteer candidate matched.
        source: MatchSource,
    },
    /// Neither the exact lookup nor any candidate produced a coordinate.
    Unresolved,
}

impl ResolvedLocation {
    /// Returns the coordinate if resolved.
    #[must_use]
    pub const fn coordinates(&self) -> Option<Coordinates> {
        match self {
            Self::Resolved { coordinates, .. } => Some(*coordinates),
            Self::Unresolved => None,
        }
    }

    /// Returns the (possibly corrected) city name if resolved.
    #[must_use]
    pub fn city(&self) -> Option<&str> {
        match self {
            Self::Resolved { city, .. } => Some(city),
            Self::Unresolved => None,
        }
    }

    /// Whether the city name was replaced by a gazetteer candidate.
    #[must_use]
    pub const fn is_corrected(&self) -> bool {
        matches!(
            self,
            Self::Resolved {
                source: MatchSource::Fuzzy { .. },
                ..
            }
        )
    }

    /// Whether the pair resolved to a coordinate.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved { .. })
    }
}

/// A single reported CBRNE incident.
#[derive(Debug, Clone, PartialEq)]
pub struct IncidentRecord {
    /// Headline of the report.
    pub title: String,
    /// CBRNE category.
    pub category: IncidentCategory,
    /// Free-form incident type label.
    pub incident_type: String,
    /// Country name as reported.
    pub country: String,
    /// City name; may be corrected once by the resolver.
    pub city: String,
    /// Date of the incident.
    pub date: NaiveDate,
    /// Number of casualties.
    pub casualties: u32,
    /// Number of injuries.
    pub injuries: u32,
    /// Impact rating (ordinal text).
    pub impact: String,
    /// Severity rating (ordinal text).
    pub severity: String,
    /// Source article URL.
    pub link: String,
    /// Resolved coordinate, absent until the resolver pass succeeds.
    pub coordinates: Option<Coordinates>,
}

impl IncidentRecord {
    /// Writes a resolver result onto this record.
    ///
    /// A resolved location sets the coordinate and overwrites the city with
    /// the resolved name. An unresolved location leaves the record
    /// untouched. Returns whether coordinates were set.
    pub fn apply_resolution(&mut self, location: &ResolvedLocation) -> bool {
        match location {
            ResolvedLocation::Resolved {
                city, coordinates, ..
            } => {
                city.clone_into(&mut self.city);
                self.coordinates = Some(*coordinates);
                true
            }
            ResolvedLocation::Unresolved => false,
        }
    }

    /// Whether the record carries a coordinate.
    #[must_use]
    pub const fn is_located(&self) -> bool {
        self.coordinates.is_some()
    }
}
