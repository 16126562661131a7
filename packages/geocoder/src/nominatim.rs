//! Nominatim / OpenStreetMap geocoder client.
//!
//! The public instance has strict rate limits: **1 request per second**
//! maximum. The client enforces the interval configured by
//! `rate_limit_ms` in the service TOML.
//!
//! See <https://nominatim.org/release-docs/develop/api/Search/>

use std::time::Duration;

use async_trait::async_trait;
use cbrne_map_incident_models::Coordinates;

use crate::throttle::Throttle;
use crate::{GeocodeError, Geocoder};

/// Free-form search against a Nominatim `/search` endpoint.
#[derive(Debug)]
pub struct NominatimGeocoder {
    id: String,
    client: reqwest::Client,
    base_url: String,
    throttle: Throttle,
}

impl NominatimGeocoder {
    /// Creates a client for the given endpoint.
    #[must_use]
    pub fn new(id: &str, client: reqwest::Client, base_url: &str, rate_limit_ms: u64) -> Self {
        Self {
            id: id.to_string(),
            client,
            base_url: base_url.to_string(),
            throttle: Throttle::new(Duration::from_millis(rate_limit_ms)),
        }
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    fn id(&self) -> &str {
        &self.id
    }

    async fn geocode(&self, query: &str) -> Result<Option<Coordinates>, GeocodeError> {
        self.throttle.wait().await;

        let resp = self
            .client
            .get(&self.base_url)
            .query(&[("q", query), ("format", "jsonv2"), ("limit", "1")])
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GeocodeError::RateLimited);
        }

        let body: serde_json::Value = resp.error_for_status()?.json().await?;
        parse_response(&body)
    }
}

/// Parses a Nominatim `jsonv2` response, taking the first result.
fn parse_response(body: &serde_json::Value) -> Result<Option<Coordinates>, GeocodeError> {
    let results = body.as_array().ok_or_else(|| GeocodeError::Parse {
        message: "Nominatim response is not an array".to_string(),
    })?;

    let Some(first) = results.first() else {
        return Ok(None);
    };

    let lat = first["lat"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing lat in Nominatim response".to_string(),
        })?;

    let lon = first["lon"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing lon in Nominatim response".to_string(),
        })?;

    Coordinates::new(lat, lon)
        .map(Some)
        .map_err(|e| GeocodeError::Parse {
            message: format!("Nominatim returned {e}"),
        })
}
