//! The filter stage between resolution and rendering.
//!
//! Every multi-select field is an allow-list: an empty set means "no
//! constraint". The date range is inclusive on both ends. The search term
//! matches case-insensitively against title, country, and city.

use std::collections::BTreeSet;

use cbrne_map_incident_models::{IncidentCategory, IncidentRecord};
use chrono::NaiveDate;

/// Predicate chain selecting the incidents to render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncidentFilter {
    /// Allowed incident type labels.
    pub types: BTreeSet<String>,
    /// Allowed categories.
    pub categories: BTreeSet<IncidentCategory>,
    /// Allowed countries.
    pub countries: BTreeSet<String>,
    /// Allowed impact ratings.
    pub impacts: BTreeSet<String>,
    /// Allowed severity ratings.
    pub severities: BTreeSet<String>,
    /// Earliest date to keep (inclusive).
    pub start_date: Option<NaiveDate>,
    /// Latest date to keep (inclusive).
    pub end_date: Option<NaiveDate>,
    /// Free-text search term.
    pub search: Option<String>,
}

fn allowed(set: &BTreeSet<String>, value: &str) -> bool {
    set.is_empty() || set.contains(value)
}

impl IncidentFilter {
    /// Whether a single record passes every constraint.
    #[must_use]
    pub fn matches(&self, record: &IncidentRecord) -> bool {
        allowed(&self.types, &record.incident_type)
            && (self.categories.is_empty() || self.categories.contains(&record.category))
            && allowed(&self.countries, &record.country)
            && allowed(&self.impacts, &record.impact)
            && allowed(&self.severities, &record.severity)
            && self.start_date.is_none_or(|start| record.date >= start)
            && self.end_date.is_none_or(|end| record.date <= end)
            && self.matches_search(record)
    }

    fn matches_search(&self, record: &IncidentRecord) -> bool {
        let Some(term) = self.search.as_deref().map(str::trim) else {
            return true;
        };
        if term.is_empty() {
            return true;
        }

        let term = term.to_lowercase();
        [&record.title, &record.country, &record.city]
            .iter()
            .any(|field| field.to_lowercase().contains(&term))
    }

    /// Returns the matching records in input order.
    #[must_use]
    pub fn apply<'a>(&self, records: &'a [IncidentRecord]) -> Vec<&'a IncidentRecord> {
        let filtered: Vec<&IncidentRecord> = records.iter().filter(|r| self.matches(r)).collect();
        log::debug!("Filter kept {} of {} incidents", filtered.len(), records.len());
        filtered
    }
}

/// Distinct values available to each filter field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    /// Distinct incident types.
    pub types: BTreeSet<String>,
    /// Distinct categories.
    pub categories: BTreeSet<IncidentCategory>,
    /// Distinct countries.
    pub countries: BTreeSet<String>,
    /// Distinct impact ratings.
    pub impacts: BTreeSet<String>,
    /// Distinct severity ratings.
    pub severities: BTreeSet<String>,
    /// Earliest and latest date, if there are any records.
    pub date_bounds: Option<(NaiveDate, NaiveDate)>,
}

impl FilterOptions {
    /// Collects the distinct values present in a dataset.
    #[must_use]
    pub fn from_records(records: &[IncidentRecord]) -> Self {
        let mut options = Self::default();

        for record in records {
            options.types.insert(record.incident_type.clone());
            options.categories.insert(record.category);
            options.countries.insert(record.country.clone());
            options.impacts.insert(record.impact.clone());
            options.severities.insert(record.severity.clone());

            options.date_bounds = Some(match options.date_bounds {
                Some((min, max)) => (min.min(record.date), max.max(record.date)),
                None => (record.date, record.date),
            });
        }

        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        title: &str,
        category: IncidentCategory,
        country: &str,
        city: &str,
        date: &str,
    ) -> IncidentRecord {
        IncidentRecord {
            title: title.to_string(),
            category,
            incident_type: "Attack".to_string(),
            country: country.to_string(),
            city: city.to_string(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            casualties: 0,
            injuries: 0,
            impact: "High".to_string(),
            severity: "Severe".to_string(),
            link: String::new(),
            coordinates: None,
        }
    }

    fn dataset() -> Vec<IncidentRecord> {
        vec![
            record("Sarin release", IncidentCategory::Chemical, "Japan", "Tokyo", "1995-03-20"),
            record("Anthrax letters", IncidentCategory::Biological, "United States", "Washington", "2001-10-15"),
            record("Reactor meltdown", IncidentCategory::Nuclear, "Japan", "Okuma", "2011-03-11"),
            record("Port explosion", IncidentCategory::Explosive, "Lebanon", "Beirut", "2020-08-04"),
        ]
    }

    fn titles(records: &[&IncidentRecord]) -> Vec<String> {
        records.iter().map(|r| r.title.clone()).collect()
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let data = dataset();
        assert_eq!(IncidentFilter::default().apply(&data).len(), data.len());
    }

    #[test]
    fn filters_by_country_and_category() {
        let data = dataset();
        let filter = IncidentFilter {
            countries: BTreeSet::from(["Japan".to_string()]),
            categories: BTreeSet::from([IncidentCategory::Nuclear]),
            ..IncidentFilter::default()
        };
        assert_eq!(titles(&filter.apply(&data)), vec!["Reactor meltdown"]);
    }

    #[test]
    fn date_range_is_inclusive() {
        let data = dataset();
        let filter = IncidentFilter {
            start_date: NaiveDate::from_ymd_opt(2001, 10, 15),
            end_date: NaiveDate::from_ymd_opt(2011, 3, 11),
            ..IncidentFilter::default()
        };
        assert_eq!(
            titles(&filter.apply(&data)),
            vec!["Anthrax letters", "Reactor meltdown"]
        );
    }

    #[test]
    fn search_is_case_insensitive_over_title_country_city() {
        let data = dataset();
        let by_title = IncidentFilter {
            search: Some("SARIN".to_string()),
            ..IncidentFilter::default()
        };
        assert_eq!(titles(&by_title.apply(&data)), vec!["Sarin release"]);

        let by_city = IncidentFilter {
            search: Some("beir".to_string()),
            ..IncidentFilter::default()
        };
        assert_eq!(titles(&by_city.apply(&data)), vec!["Port explosion"]);

        let by_country = IncidentFilter {
            search: Some("japan".to_string()),
            ..IncidentFilter::default()
        };
        assert_eq!(by_country.apply(&data).len(), 2);
    }

    #[test]
    fn blank_search_is_ignored() {
        let data = dataset();
        let filter = IncidentFilter {
            search: Some("   ".to_string()),
            ..IncidentFilter::default()
        };
        assert_eq!(filter.apply(&data).len(), data.len());
    }

    #[test]
    fn options_collect_distinct_values_and_bounds() {
        let options = FilterOptions::from_records(&dataset());
        assert_eq!(options.countries.len(), 3);
        assert_eq!(options.categories.len(), 4);
        assert_eq!(
            options.date_bounds,
            Some((
                NaiveDate::from_ymd_opt(1995, 3, 20).unwrap(),
                NaiveDate::from_ymd_opt(2020, 8, 4).unwrap()
            ))
        );
        assert!(FilterOptions::from_records(&[]).date_bounds.is_none());
    }
}
