//! Heatmap intensity per resolved location.

use std::collections::BTreeMap;

use cbrne_map_incident_models::{Coordinates, IncidentRecord};

/// One heatmap sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatPoint {
    /// Where the sample is drawn.
    pub coordinates: Coordinates,
    /// Number of linked incidents reported at the same `(country, city)`.
    pub weight: usize,
}

/// Builds heatmap samples from the given incidents.
///
/// Emits one sample per resolved incident, in input order. Its weight is the
/// number of incidents in the given set that share its `(country, city)` and
/// carry a non-empty link. Unresolved incidents add to their group's weight
/// but produce no sample of their own.
#[must_use]
pub fn heat_points(records: &[&IncidentRecord]) -> Vec<HeatPoint> {
    let mut link_counts: BTreeMap<(&str, &str), usize> = BTreeMap::new();

    for record in records {
        let count = link_counts
            .entry((record.country.as_str(), record.city.as_str()))
            .or_insert(0);
        if !record.link.trim().is_empty() {
            *count += 1;
        }
    }

    records
        .iter()
        .filter_map(|record| {
            let coordinates = record.coordinates?;
            let weight = link_counts
                .get(&(record.country.as_str(), record.city.as_str()))
                .copied()
                .unwrap_or_default();
            Some(HeatPoint {
                coordinates,
                weight,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use cbrne_map_incident_models::IncidentCategory;
    use chrono::NaiveDate;

    use super::*;

    fn record(country: &str, city: &str, link: &str, at: Option<(f64, f64)>) -> IncidentRecord {
        IncidentRecord {
            title: format!("{city} incident"),
            category: IncidentCategory::Biological,
            incident_type: "Outbreak".to_string(),
            country: country.to_string(),
            city: city.to_string(),
            date: NaiveDate::from_ymd_opt(2019, 12, 1).unwrap(),
            casualties: 0,
            injuries: 0,
            impact: "Low".to_string(),
            severity: "Low".to_string(),
            link: link.to_string(),
            coordinates: at.map(|(lat, lon)| Coordinates::new(lat, lon).unwrap()),
        }
    }

    #[test]
    fn weights_count_linked_incidents_per_city() {
        let data = [
            record("China", "Wuhan", "https://a", Some((30.59, 114.31))),
            record("China", "Wuhan", "https://b", Some((30.59, 114.31))),
            record("China", "Wuhan", "", Some((30.59, 114.31))),
            record("Italy", "Milan", "https://c", Some((45.46, 9.19))),
        ];
        let refs: Vec<&IncidentRecord> = data.iter().collect();

        let points = heat_points(&refs);

        assert_eq!(
            points.iter().map(|p| p.weight).collect::<Vec<_>>(),
            vec![2, 2, 2, 1]
        );
        assert!((points[3].coordinates.latitude() - 45.46).abs() < f64::EPSILON);
    }

    #[test]
    fn unresolved_records_weigh_in_without_a_sample() {
        let data = [
            record("Peru", "Lima", "https://x", Some((-12.05, -77.04))),
            record("Peru", "Lima", "https://y", None),
            record("Nowhere", "Atlantis", "https://z", None),
        ];
        let refs: Vec<&IncidentRecord> = data.iter().collect();

        let points = heat_points(&refs);

        assert_eq!(points.len(), 1);
        assert_eq!(points[0].weight, 2);
    }

    #[test]
    fn empty_input_has_no_samples() {
        assert!(heat_points(&[]).is_empty());
    }
}
