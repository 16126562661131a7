//! Aggregates behind the dashboard charts: category distribution, country
//! distribution, and incidents per day.

use std::collections::BTreeMap;

use cbrne_map_incident_models::{IncidentCategory, IncidentRecord};
use chrono::NaiveDate;

/// Chart-ready aggregates over a (filtered) set of incidents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    /// Number of incidents.
    pub total: usize,
    /// Incidents with coordinates.
    pub located: usize,
    /// Sum of casualties.
    pub casualties: u64,
    /// Sum of injuries.
    pub injuries: u64,
    /// Counts per category, most frequent first.
    pub by_category: Vec<(IncidentCategory, usize)>,
    /// Counts per country, most frequent first.
    pub by_country: Vec<(String, usize)>,
    /// Counts per date, chronological.
    pub by_date: BTreeMap<NaiveDate, usize>,
}

impl Summary {
    #[must_use]
    pub fn from_records(records: &[&IncidentRecord]) -> Self {
        Self {
            total: records.len(),
            located: records.iter().filter(|r| r.is_located()).count(),
            casualties: records.iter().map(|r| u64::from(r.casualties)).sum(),
            injuries: records.iter().map(|r| u64::from(r.injuries)).sum(),
            by_category: category_counts(records),
            by_country: country_counts(records),
            by_date: daily_counts(records),
        }
    }
}

/// Sorts counts descending, ties by key ascending.
fn ranked<K: Ord>(counts: BTreeMap<K, usize>) -> Vec<(K, usize)> {
    let mut ranked: Vec<(K, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked
}

/// Incidents per category, most frequent first.
#[must_use]
pub fn category_counts(records: &[&IncidentRecord]) -> Vec<(IncidentCategory, usize)> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(record.category).or_insert(0) += 1;
    }
    ranked(counts)
}

/// Incidents per country, most frequent first.
#[must_use]
pub fn country_counts(records: &[&IncidentRecord]) -> Vec<(String, usize)> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(record.country.clone()).or_insert(0) += 1;
    }
    ranked(counts)
}

/// Incidents per date.
#[must_use]
pub fn daily_counts(records: &[&IncidentRecord]) -> BTreeMap<NaiveDate, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(record.date).or_insert(0) += 1;
    }
    counts
}
