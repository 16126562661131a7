//! Photon geocoder client.
//!
//! Photon is an OSM-based search engine that answers with a `GeoJSON`
//! `FeatureCollection`; the first `Point` feature is taken as the match.
//!
//! See <https://photon.komoot.io/>

use std::time::Duration;

use async_trait::async_trait;
use cbrne_map_incident_models::Coordinates;
use geojson::{FeatureCollection, GeoJson};

use crate::throttle::Throttle;
use crate::{GeocodeError, Geocoder};

/// Free-form search against a Photon `/api` endpoint.
#[derive(Debug)]
pub struct PhotonGeocoder {
    id: String,
    client: reqwest::Client,
    base_url: String,
    throttle: Throttle,
}

impl PhotonGeocoder {
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
impl Geocoder for PhotonGeocoder {
    fn id(&self) -> &str {
        &self.id
    }

    async fn geocode(&self, query: &str) -> Result<Option<Coordinates>, GeocodeError> {
        self.throttle.wait().await;

        let resp = self
            .client
            .get(&self.base_url)
            .query(&[("q", query), ("limit", "1")])
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GeocodeError::RateLimited);
        }

        let body = resp.error_for_status()?.text().await?;
        parse_response(&body)
    }
}

/// Parses a Photon response body.
fn parse_response(body: &str) -> Result<Option<Coordinates>, GeocodeError> {
    let geojson: GeoJson = body.parse().map_err(|e| GeocodeError::Parse {
        message: format!("Photon response is not GeoJSON: {e}"),
    })?;

    let collection = FeatureCollection::try_from(geojson).map_err(|e| GeocodeError::Parse {
        message: format!("Photon response is not a FeatureCollection: {e}"),
    })?;

    let point = collection
        .features
        .iter()
        .filter_map(|f| f.geometry.as_ref())
        .find_map(|g| match &g.value {
            geojson::Value::Point(position) => Some(position.clone()),
            _ => None,
        });

    let Some(position) = point else {
        return Ok(None);
    };

    // GeoJSON positions are [lon, lat].
    let (Some(&lon), Some(&lat)) = (position.first(), position.get(1)) else {
        return Err(GeocodeError::Parse {
            message: "Photon point has fewer than two ordinates".to_string(),
        });
    };

    Coordinates::new(lat, lon)
        .map(Some)
        .map_err(|e| GeocodeError::Parse {
            message: format!("Photon returned {e}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_first_point_feature() {
        let body = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [2.3483915, 48.8534951] },
                "properties": { "name": "Paris", "country": "France" }
            }]
        }"#;

        let coords = parse_response(body).unwrap().unwrap();
        assert!((coords.latitude() - 48.853_495_1).abs() < 1e-6);
        assert!((coords.longitude() - 2.348_391_5).abs() < 1e-6);
    }

    #[test]
    fn empty_collection_is_no_match() {
        let body = r#"{ "type": "FeatureCollection", "features": [] }"#;
        assert!(parse_response(body).unwrap().is_none());
    }

    #[test]
    fn rejects_non_geojson() {
        assert!(matches!(
            parse_response("<html>busy</html>"),
            Err(GeocodeError::Parse { .. })
        ));
    }
}
