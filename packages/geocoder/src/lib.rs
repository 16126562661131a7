#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geocoding of free-form `"city, country"` queries.
//!
//! Providers are configured via TOML files in `services/` and implement
//! the [`Geocoder`] trait:
//!
//! 1. **Nominatim / OpenStreetMap** (priority 1): free, 1 req/sec rate
//!    limit on the public instance.
//! 2. **Photon** (priority 2): OSM-based, returns `GeoJSON`.
//!
//! Callers that need to tell "the service said no" apart from "the
//! service could not be reached" use [`lookup`], which folds a provider
//! result into a [`LookupOutcome`]. The location resolver treats both
//! non-found outcomes identically but keeps the distinction for logging.

pub mod nominatim;
pub mod photon;
pub mod service_registry;
mod throttle;

use async_trait::async_trait;
use cbrne_map_incident_models::Coordinates;
use thiserror::Error;

/// Default `User-Agent` sent to geocoding services. Nominatim's usage
/// policy rejects requests without an identifying agent.
pub const DEFAULT_USER_AGENT: &str = concat!("cbrne_map/", env!("CARGO_PKG_VERSION"));

/// Errors from geocoding operations.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed (connection, timeout, TLS, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,

    /// The service configuration cannot be used to build a client.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration problem.
        message: String,
    },
}

/// A geocoding provider that resolves a free-form address to a single
/// coordinate.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Identifier of the backing service (e.g. `"nominatim"`).
    fn id(&self) -> &str;

    /// Geocodes a free-form query, returning the best match if any.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the service cannot be reached or its
    /// response cannot be understood.
    async fn geocode(&self, query: &str) -> Result<Option<Coordinates>, GeocodeError>;
}

/// Classified result of a single geocoding call.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    /// The service returned a coordinate.
    Found(Coordinates),
    /// The service answered but had no match.
    NoMatch,
    /// The service failed (network, rate limit, malformed response).
    Unreachable {
        /// Rendered error, kept for diagnostics.
        reason: String,
    },
}

impl LookupOutcome {
    /// Returns the coordinate when found; both failure variants collapse
    /// to `None`.
    #[must_use]
    pub const fn coordinates(&self) -> Option<Coordinates> {
        match self {
            Self::Found(coordinates) => Some(*coordinates),
            Self::NoMatch | Self::Unreachable { .. } => None,
        }
    }

    /// Whether the call failed rather than returning an answer.
    #[must_use]
    pub const fn is_unreachable(&self) -> bool {
        matches!(self, Self::Unreachable { .. })
    }
}

/// Builds the free-form query string for a city within a country.
#[must_use]
pub fn freeform_query(city: &str, country: &str) -> String {
    format!("{}, {}", city.trim(), country.trim())
}

/// Runs one geocoding call and classifies the result.
///
/// Never returns an error: provider failures become
/// [`LookupOutcome::Unreachable`] and are logged.
pub async fn lookup(geocoder: &dyn Geocoder, query: &str) -> LookupOutcome {
    match geocoder.geocode(query).await {
        Ok(Some(coordinates)) => LookupOutcome::Found(coordinates),
        Ok(None) => LookupOutcome::NoMatch,
        Err(e) => {
            log::warn!("Geocoder '{}' failed for '{query}': {e}", geocoder.id());
            LookupOutcome::Unreachable {
                reason: e.to_string(),
            }
        }
    }
}

/// Builds an HTTP client with the given timeout and user agent.
///
/// # Errors
///
/// Returns [`GeocodeError::Http`] if the client cannot be constructed
/// (e.g. TLS backend initialization failure).
pub fn build_client(timeout_secs: u64, user_agent: &str) -> Result<reqwest::Client, GeocodeError> {
    let mut builder = reqwest::Client::builder().user_agent(user_agent);
    if timeout_secs > 0 {
        builder = builder.timeout(std::time::Duration::from_secs(timeout_secs));
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedGeocoder {
        result: Result<Option<Coordinates>, ()>,
    }

    #[async_trait]
    impl Geocoder for FixedGeocoder {
        fn id(&self) -> &str {
            "fixed"
        }

        async fn geocode(&self, _query: &str) -> Result<Option<Coordinates>, GeocodeError> {
            self.result.map_err(|()| GeocodeError::RateLimited)
        }
    }

    #[test]
    fn freeform_query_joins_city_and_country() {
        assert_eq!(freeform_query(" Paris ", "France"), "Paris, France");
    }

    #[tokio::test]
    async fn lookup_classifies_found() {
        let coords = Coordinates::new(48.8566, 2.3522).unwrap();
        let geocoder = FixedGeocoder {
            result: Ok(Some(coords)),
        };
        let outcome = lookup(&geocoder, "Paris, France").await;
        assert_eq!(outcome, LookupOutcome::Found(coords));
        assert_eq!(outcome.coordinates(), Some(coords));
    }

    #[tokio::test]
    async fn lookup_classifies_no_match() {
        let geocoder = FixedGeocoder { result: Ok(None) };
        let outcome = lookup(&geocoder, "Atlantis, Nowhere").await;
        assert_eq!(outcome, LookupOutcome::NoMatch);
        assert!(!outcome.is_unreachable());
        assert!(outcome.coordinates().is_none());
    }

    #[tokio::test]
    async fn lookup_suppresses_errors() {
        let geocoder = FixedGeocoder { result: Err(()) };
        let outcome = lookup(&geocoder, "Paris, France").await;
        assert!(outcome.is_unreachable());
        assert!(outcome.coordinates().is_none());
    }
}
