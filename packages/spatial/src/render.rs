//! `GeoJSON` output for spider layouts and heatmaps.
//!
//! Coordinates are written `[longitude, latitude]`.

use std::path::Path;

use cbrne_map_incident_models::IncidentRecord;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue, Value};

use crate::heat::HeatPoint;
use crate::{Marker, Position, SpatialError, SpiderLayout};

fn point(position: Position) -> Geometry {
    Geometry::new(Value::Point(vec![position.longitude, position.latitude]))
}

fn feature(geometry: Geometry, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(geometry),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

fn collection(features: Vec<Feature>) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// Popup and styling fields for one incident.
fn record_properties(kind: &str, record: &IncidentRecord) -> JsonObject {
    let mut props = JsonObject::new();
    props.insert("kind".to_string(), JsonValue::from(kind));
    props.insert("title".to_string(), JsonValue::from(record.title.as_str()));
    props.insert(
        "category".to_string(),
        JsonValue::from(record.category.as_ref()),
    );
    props.insert(
        "color".to_string(),
        JsonValue::from(record.category.marker_color()),
    );
    props.insert(
        "icon".to_string(),
        JsonValue::from(record.category.marker_icon()),
    );
    props.insert(
        "type".to_string(),
        JsonValue::from(record.incident_type.as_str()),
    );
    props.insert("country".to_string(), JsonValue::from(record.country.as_str()));
    props.insert("city".to_string(), JsonValue::from(record.city.as_str()));
    props.insert(
        "date".to_string(),
        JsonValue::from(record.date.format("%Y-%m-%d").to_string()),
    );
    props.insert("casualties".to_string(), JsonValue::from(record.casualties));
    props.insert("injuries".to_string(), JsonValue::from(record.injuries));
    props.insert("impact".to_string(), JsonValue::from(record.impact.as_str()));
    props.insert(
        "severity".to_string(),
        JsonValue::from(record.severity.as_str()),
    );
    props.insert("link".to_string(), JsonValue::from(record.link.as_str()));
    props
}

/// Converts a spider layout into a feature collection.
///
/// Markers become Point features with a `kind` of `single`, `centroid`, or
/// `satellite`; centroids carry `count`. Legs follow as LineString features
/// with `kind` `leg`.
#[must_use]
pub fn layout_to_geojson(layout: &SpiderLayout<'_>) -> FeatureCollection {
    let mut features = Vec::with_capacity(layout.markers.len() + layout.legs.len());

    for marker in &layout.markers {
        let properties = match marker {
            Marker::Single { record, .. } => record_properties("single", record),
            Marker::Satellite { record, angle, .. } => {
                let mut props = record_properties("satellite", record);
                props.insert("angle".to_string(), JsonValue::from(*angle));
                props
            }
            Marker::Centroid { count, .. } => {
                let mut props = JsonObject::new();
                props.insert("kind".to_string(), JsonValue::from("centroid"));
                props.insert("count".to_string(), JsonValue::from(*count));
                props.insert("color".to_string(), JsonValue::from("purple"));
                props
            }
        };
        features.push(feature(point(marker.position()), properties));
    }

    for leg in &layout.legs {
        let mut props = JsonObject::new();
        props.insert("kind".to_string(), JsonValue::from("leg"));
        let line = Geometry::new(Value::LineString(vec![
            vec![leg.from.longitude, leg.from.latitude],
            vec![leg.to.longitude, leg.to.latitude],
        ]));
        features.push(feature(line, props));
    }

    collection(features)
}

/// Converts heat samples into Point features carrying `weight`.
#[must_use]
pub fn heat_to_geojson(points: &[HeatPoint]) -> FeatureCollection {
    collection(
        points
            .iter()
            .map(|p| {
                let mut props = JsonObject::new();
                props.insert("weight".to_string(), JsonValue::from(p.weight));
                feature(point(p.coordinates.into()), props)
            })
            .collect(),
    )
}

/// Writes a feature collection as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`SpatialError`] if serialization or the write fails.
pub fn write_geojson(path: &Path, collection: &FeatureCollection) -> Result<(), SpatialError> {
    let json = serde_json::to_string_pretty(collection)?;
    std::fs::write(path, json)?;

    log::info!(
        "Wrote {} features to {}",
        collection.features.len(),
        path.display()
    );
    Ok(())
}
