//! Geocoding services known to the toolchain.
//!
//! Each service is a TOML file under `services/`, embedded into the binary:
//!
//! ```toml
//! id = "photon"
//! name = "Photon (Komoot)"
//! enabled = true
//! priority = 2
//!
//! [endpoint]
//! kind = "photon"
//! base_url = "https://photon.komoot.io/api/"
//! rate_limit_ms = 200
//! ```
//!
//! [`select_service`] picks one by id (or the best enabled one) and
//! [`build_geocoder`] turns it into a [`Geocoder`].

use serde::Deserialize;

use crate::nominatim::NominatimGeocoder;
use crate::photon::PhotonGeocoder;
use crate::{GeocodeError, Geocoder, build_client};

/// Response format spoken by a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Nominatim `/search` with `format=jsonv2`.
    Nominatim,
    /// Photon `/api`, answering with a `GeoJSON` feature collection.
    Photon,
}

/// Where and how fast a service may be queried.
#[derive(Debug, Clone, Deserialize)]
pub struct Endpoint {
    pub kind: ProviderKind,
    pub base_url: String,
    /// Minimum delay between requests in milliseconds.
    #[serde(default)]
    pub rate_limit_ms: u64,
    /// Per-request timeout in seconds; 0 disables it.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// One configured geocoding service.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingService {
    pub id: String,
    pub name: String,
    /// Disabled services are only used when requested by id.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Lower is preferred when no id is requested.
    pub priority: u32,
    pub endpoint: Endpoint,
}

const fn default_true() -> bool {
    true
}

const fn default_timeout_secs() -> u64 {
    30
}

const SERVICE_TOMLS: &[(&str, &str)] = &[
    ("nominatim", include_str!("../services/nominatim.toml")),
    ("photon", include_str!("../services/photon.toml")),
    (
        "nominatim_local",
        include_str!("../services/nominatim_local.toml"),
    ),
];

/// Every embedded service, enabled or not, in file order.
///
/// # Panics
///
/// Panics if an embedded TOML file is malformed.
#[must_use]
pub fn all_services() -> Vec<GeocodingService> {
    SERVICE_TOMLS
        .iter()
        .map(|(file, text)| {
            toml::de::from_str(text)
                .unwrap_or_else(|e| panic!("Invalid geocoding service file '{file}.toml': {e}"))
        })
        .collect()
}

/// Enabled services, best first.
#[must_use]
pub fn enabled_services() -> Vec<GeocodingService> {
    let mut enabled: Vec<GeocodingService> =
        all_services().into_iter().filter(|s| s.enabled).collect();
    enabled.sort_by_key(|s| s.priority);
    enabled
}

/// Looks up a service by id, including disabled ones.
///
/// # Errors
///
/// Returns [`GeocodeError::Config`] if no service has the given id.
pub fn find_service(id: &str) -> Result<GeocodingService, GeocodeError> {
    all_services()
        .into_iter()
        .find(|s| s.id == id)
        .ok_or_else(|| GeocodeError::Config {
            message: format!("Unknown geocoding service '{id}'"),
        })
}

/// Returns the explicitly requested service, or the highest-priority
/// enabled one when `id` is `None`.
///
/// # Errors
///
/// Returns [`GeocodeError::Config`] if the requested id is unknown or no
/// service is enabled.
pub fn select_service(id: Option<&str>) -> Result<GeocodingService, GeocodeError> {
    match id {
        Some(id) => find_service(id),
        None => enabled_services()
            .into_iter()
            .next()
            .ok_or_else(|| GeocodeError::Config {
                message: "No geocoding service is enabled".to_string(),
            }),
    }
}

/// Builds a throttled [`Geocoder`] for a service.
///
/// # Errors
///
/// Returns [`GeocodeError`] if the HTTP client cannot be constructed.
pub fn build_geocoder(
    service: &GeocodingService,
    user_agent: &str,
) -> Result<Box<dyn Geocoder>, GeocodeError> {
    let Endpoint {
        kind,
        base_url,
        rate_limit_ms,
        timeout_secs,
    } = &service.endpoint;

    log::info!(
        "Geocoding with '{}' ({}), at most one request per {rate_limit_ms}ms",
        service.id,
        service.name
    );

    let client = build_client(*timeout_secs, user_agent)?;

    Ok(match kind {
        ProviderKind::Nominatim => Box::new(NominatimGeocoder::new(
            &service.id,
            client,
            base_url,
            *rate_limit_ms,
        )),
        ProviderKind::Photon => Box::new(PhotonGeocoder::new(
            &service.id,
            client,
            base_url,
            *rate_limit_ms,
        )),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn embedded_services_parse() {
        let ids: Vec<String> = all_services().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["nominatim", "photon", "nominatim_local"]);

        let unique: BTreeSet<&String> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn public_nominatim_respects_usage_policy() {
        let svc = find_service("nominatim").unwrap();
        assert_eq!(svc.endpoint.kind, ProviderKind::Nominatim);
        assert!(svc.endpoint.rate_limit_ms >= 1000);
    }

    #[test]
    fn enabled_services_are_best_first() {
        let ids: Vec<String> = enabled_services().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["nominatim", "photon"]);
    }

    #[test]
    fn default_selection_is_highest_priority() {
        assert_eq!(select_service(None).unwrap().id, "nominatim");
    }

    #[test]
    fn disabled_service_can_be_selected_explicitly() {
        let svc = select_service(Some("nominatim_local")).unwrap();
        assert!(!svc.enabled);
        assert_eq!(svc.endpoint.timeout_secs, 10);
    }

    #[test]
    fn unknown_service_is_config_error() {
        assert!(matches!(
            select_service(Some("google")),
            Err(GeocodeError::Config { .. })
        ));
    }

    #[test]
    fn omitted_endpoint_settings_use_defaults() {
        let svc: GeocodingService = toml::de::from_str(
            "id = \"x\"\nname = \"X\"\npriority = 9\n\n[endpoint]\nkind = \"photon\"\nbase_url = \"http://x\"\n",
        )
        .unwrap();
        assert!(svc.enabled);
        assert_eq!(svc.endpoint.rate_limit_ms, 0);
        assert_eq!(svc.endpoint.timeout_secs, 30);
    }

    #[tokio::test]
    async fn builds_every_service() {
        for svc in &all_services() {
            let geocoder = build_geocoder(svc, crate::DEFAULT_USER_AGENT).unwrap();
            assert_eq!(geocoder.id(), svc.id);
        }
    }
}
