#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Plot layouts for resolved incidents.
//!
//! Several incidents often resolve to the same city coordinate and would
//! render as a single indistinguishable marker. [`declutter`] spreads each
//! such group into a "spider": a centroid marker at the shared location
//! carrying the group size, one satellite marker per incident on a circle
//! around it, and a leg from the centroid to each satellite.
//!
//! Also provides per-location heatmap weights ([`heat`]) and `GeoJSON`
//! rendering of both ([`render`]).

pub mod heat;
pub mod render;

pub use heat::{HeatPoint, heat_points};
pub use render::{heat_to_geojson, layout_to_geojson, write_geojson};

use std::collections::BTreeMap;
use std::f64::consts::TAU;

use cbrne_map_incident_models::{Coordinates, IncidentRecord};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from writing spatial outputs.
#[derive(Debug, Error)]
pub enum SpatialError {
    /// I/O error writing an output file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Spider layout settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpiderConfig {
    /// Distance from centroid to satellites, in degrees. Independent of
    /// group size and zoom.
    pub radius_deg: f64,
}

impl Default for SpiderConfig {
    fn default() -> Self {
        Self { radius_deg: 0.3 }
    }
}

/// A plotted position. Satellites near the poles or the antimeridian may
/// fall slightly outside the valid coordinate range, so this is not a
/// [`Coordinates`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    /// Plotted latitude in degrees.
    pub latitude: f64,
    /// Plotted longitude in degrees.
    pub longitude: f64,
}

impl From<Coordinates> for Position {
    fn from(c: Coordinates) -> Self {
        Self {
            latitude: c.latitude(),
            longitude: c.longitude(),
        }
    }
}

/// One marker in a [`SpiderLayout`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Marker<'a> {
    /// The only incident at its coordinate, plotted where it is.
    Single {
        /// The incident.
        record: &'a IncidentRecord,
        /// Its true coordinate.
        position: Position,
    },
    /// Synthetic aggregate at the shared coordinate of a group.
    Centroid {
        /// The shared coordinate.
        position: Position,
        /// Number of incidents in the group.
        count: usize,
    },
    /// One incident of a group, offset from the centroid.
    Satellite {
        /// The incident.
        record: &'a IncidentRecord,
        /// Offset plotting position.
        position: Position,
        /// The group's true coordinate.
        anchor: Position,
        /// Angle of the offset in radians, counter-clockwise from east.
        angle: f64,
    },
}

impl<'a> Marker<'a> {
    /// The incident behind this marker; `None` for centroids.
    #[must_use]
    pub const fn record(&self) -> Option<&'a IncidentRecord> {
        match self {
            Self::Single { record, .. } | Self::Satellite { record, .. } => Some(record),
            Self::Centroid { .. } => None,
        }
    }

    /// Where the marker is drawn.
    #[must_use]
    pub const fn position(&self) -> Position {
        match self {
            Self::Single { position, .. }
            | Self::Centroid { position, .. }
            | Self::Satellite { position, .. } => *position,
        }
    }

    /// Whether this is a group centroid.
    #[must_use]
    pub const fn is_centroid(&self) -> bool {
        matches!(self, Self::Centroid { .. })
    }
}

/// Line from a group centroid to one of its satellites.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpiderLeg {
    /// Centroid end.
    pub from: Position,
    /// Satellite end.
    pub to: Position,
}

/// Plot-ready markers and legs for a set of incidents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpiderLayout<'a> {
    /// Markers in group order; a group's centroid precedes its satellites.
    pub markers: Vec<Marker<'a>>,
    /// One leg per satellite.
    pub legs: Vec<SpiderLeg>,
    /// Incidents left out because they have no coordinates.
    pub skipped: usize,
}

impl<'a> SpiderLayout<'a> {
    /// Incidents in the layout, in marker order.
    pub fn records(&self) -> impl Iterator<Item = &'a IncidentRecord> + '_ {
        self.markers.iter().filter_map(Marker::record)
    }

    /// Number of centroid markers (groups with more than one incident).
    #[must_use]
    pub fn centroid_count(&self) -> usize {
        self.markers.iter().filter(|m| m.is_centroid()).count()
    }
}

/// Exact-equality key for a coordinate. `-0.0` and `0.0` compare equal.
fn coordinate_key(c: Coordinates) -> (u64, u64) {
    ((c.latitude() + 0.0).to_bits(), (c.longitude() + 0.0).to_bits())
}

/// Groups incidents by identical coordinate and lays each group out.
///
/// Groups keep the order in which their first incident appears. A group of
/// one yields a single [`Marker::Single`]. A group of `k > 1` yields a
/// [`Marker::Centroid`], then `k` [`Marker::Satellite`]s at angles
/// `2π·i/k` and distance `radius_deg`, and `k` legs. Incidents without
/// coordinates are skipped.
#[must_use]
pub fn declutter<'a>(records: &[&'a IncidentRecord], config: SpiderConfig) -> SpiderLayout<'a> {
    let mut index: BTreeMap<(u64, u64), usize> = BTreeMap::new();
    let mut groups: Vec<(Coordinates, Vec<&'a IncidentRecord>)> = Vec::new();
    let mut layout = SpiderLayout::default();

    for &record in records {
        let Some(coordinates) = record.coordinates else {
            layout.skipped += 1;
            continue;
        };

        let slot = *index.entry(coordinate_key(coordinates)).or_insert_with(|| {
            groups.push((coordinates, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(record);
    }

    for (coordinates, members) in groups {
        let anchor = Position::from(coordinates);

        if let [record] = *members.as_slice() {
            layout.markers.push(Marker::Single {
                record,
                position: anchor,
            });
            continue;
        }

        let k = members.len();
        layout.markers.push(Marker::Centroid {
            position: anchor,
            count: k,
        });

        for (i, record) in members.into_iter().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let angle = TAU * i as f64 / k as f64;
            let position = Position {
                latitude: config.radius_deg.mul_add(angle.sin(), anchor.latitude),
                longitude: config.radius_deg.mul_add(angle.cos(), anchor.longitude),
            };

            layout.markers.push(Marker::Satellite {
                record,
                position,
                anchor,
                angle,
            });
            layout.legs.push(SpiderLeg {
                from: anchor,
                to: position,
            });
        }
    }

    log::debug!(
        "Decluttered {} incidents into {} markers ({} groups spidered, {} skipped)",
        records.len(),
        layout.markers.len(),
        layout.centroid_count(),
        layout.skipped
    );

    layout
}

#[cfg(test)]
mod tests {
    use cbrne_map_incident_models::IncidentCategory;
    use chrono::NaiveDate;

    use super::*;

    const EPS: f64 = 1e-9;

    fn record(title: &str, at: Option<(f64, f64)>) -> IncidentRecord {
        IncidentRecord {
            title: title.to_string(),
            category: IncidentCategory::Explosive,
            incident_type: "IED".to_string(),
            country: "France".to_string(),
            city: "Paris".to_string(),
            date: NaiveDate::from_ymd_opt(2015, 11, 13).unwrap(),
            casualties: 0,
            injuries: 0,
            impact: "High".to_string(),
            severity: "Severe".to_string(),
            link: String::new(),
            coordinates: at.map(|(lat, lon)| Coordinates::new(lat, lon).unwrap()),
        }
    }

    fn offset_degrees(marker: &Marker<'_>) -> f64 {
        let Marker::Satellite {
            position, anchor, ..
        } = marker
        else {
            panic!("not a satellite: {marker:?}");
        };
        let deg = (position.latitude - anchor.latitude)
            .atan2(position.longitude - anchor.longitude)
            .to_degrees();
        if deg < -EPS { deg + 360.0 } else { deg }
    }

    #[test]
    fn single_record_is_plotted_in_place() {
        let r = record("a", Some((51.5074, -0.1278)));
        let layout = declutter(&[&r], SpiderConfig::default());

        assert_eq!(layout.markers.len(), 1);
        assert!(layout.legs.is_empty());
        assert_eq!(layout.centroid_count(), 0);
        assert_eq!(
            layout.markers[0],
            Marker::Single {
                record: &r,
                position: Position {
                    latitude: 51.5074,
                    longitude: -0.1278,
                },
            }
        );
    }

    #[test]
    fn three_records_at_paris_form_a_spider() {
        let records: Vec<IncidentRecord> = (0..3)
            .map(|i| record(&format!("r{i}"), Some((48.8566, 2.3522))))
            .collect();
        let refs: Vec<&IncidentRecord> = records.iter().collect();
        let config = SpiderConfig { radius_deg: 0.5 };

        let layout = declutter(&refs, config);

        assert_eq!(layout.markers.len(), 4);
        assert_eq!(layout.legs.len(), 3);
        assert_eq!(
            layout.markers[0],
            Marker::Centroid {
                position: Position {
                    latitude: 48.8566,
                    longitude: 2.3522,
                },
                count: 3,
            }
        );

        let angles: Vec<f64> = layout.markers[1..].iter().map(offset_degrees).collect();
        for (actual, expected) in angles.iter().zip([0.0, 120.0, 240.0]) {
            assert!((actual - expected).abs() < 1e-6, "{actual} != {expected}");
        }

        for (marker, leg) in layout.markers[1..].iter().zip(&layout.legs) {
            let p = marker.position();
            let dist = (p.latitude - 48.8566).hypot(p.longitude - 2.3522);
            assert!((dist - 0.5).abs() < EPS);
            assert_eq!(leg.to, p);
            assert_eq!(leg.from, layout.markers[0].position());
        }
    }

    #[test]
    fn satellites_are_evenly_spaced_for_any_group_size() {
        let records: Vec<IncidentRecord> =
            (0..4).map(|i| record(&i.to_string(), Some((10.0, 20.0)))).collect();
        let refs: Vec<&IncidentRecord> = records.iter().collect();

        let layout = declutter(&refs, SpiderConfig::default());
        let angles: Vec<f64> = layout.markers[1..].iter().map(offset_degrees).collect();

        for (actual, expected) in angles.iter().zip([0.0, 90.0, 180.0, 270.0]) {
            assert!((actual - expected).abs() < 1e-6, "{actual} != {expected}");
        }
    }

    #[test]
    fn every_record_appears_exactly_once() {
        let records = [
            record("a", Some((48.8566, 2.3522))),
            record("b", Some((40.7128, -74.006))),
            record("c", Some((48.8566, 2.3522))),
            record("d", None),
            record("e", Some((35.6762, 139.6503))),
            record("f", Some((40.7128, -74.006))),
            record("g", Some((48.8566, 2.3522))),
        ];
        let refs: Vec<&IncidentRecord> = records.iter().collect();

        let layout = declutter(&refs, SpiderConfig::default());

        assert_eq!(layout.skipped, 1);
        assert_eq!(layout.centroid_count(), 2);
        assert_eq!(layout.legs.len(), 5);

        let plotted: Vec<&IncidentRecord> = layout.records().collect();
        assert_eq!(plotted.len(), 6);
        for r in records.iter().filter(|r| r.is_located()) {
            let hits = plotted.iter().filter(|p| std::ptr::eq(**p, r)).count();
            assert_eq!(hits, 1, "record {} plotted {hits} times", r.title);
        }
    }

    #[test]
    fn groups_keep_first_appearance_order() {
        let records = [
            record("tokyo", Some((35.6762, 139.6503))),
            record("paris-1", Some((48.8566, 2.3522))),
            record("paris-2", Some((48.8566, 2.3522))),
        ];
        let refs: Vec<&IncidentRecord> = records.iter().collect();

        let layout = declutter(&refs, SpiderConfig::default());

        assert_eq!(layout.markers[0].record().map(|r| r.title.as_str()), Some("tokyo"));
        assert!(layout.markers[1].is_centroid());
    }

    #[test]
    fn signed_zero_is_one_coordinate() {
        let records = [record("a", Some((0.0, 0.0))), record("b", Some((-0.0, -0.0)))];
        let refs: Vec<&IncidentRecord> = records.iter().collect();

        let layout = declutter(&refs, SpiderConfig::default());
        assert_eq!(layout.centroid_count(), 1);
    }

    #[test]
    fn nearby_but_unequal_coordinates_are_not_grouped() {
        let records = [
            record("a", Some((48.8566, 2.3522))),
            record("b", Some((48.856_600_1, 2.3522))),
        ];
        let refs: Vec<&IncidentRecord> = records.iter().collect();

        let layout = declutter(&refs, SpiderConfig::default());
        assert_eq!(layout.centroid_count(), 0);
        assert_eq!(layout.markers.len(), 2);
    }
}
