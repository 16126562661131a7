//! CSV reading and writing of incident records.
//!
//! The source dataset uses the columns `Title, Type, Category, Country,
//! City, Date, Casualty, Injury, Impact, Severity, Link`. Enriched files
//! written by [`write_incidents`] add `Latitude` and `Longitude`, which
//! [`load_incidents`] reads back so resolution does not have to be
//! repeated.

use std::path::Path;

use cbrne_map_incident_models::{Coordinates, IncidentCategory, IncidentRecord};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::DatasetError;

/// Date formats accepted in the `Date` column, tried in order.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d.%m.%Y"];

/// Date-time formats accepted in the `Date` column; the time is dropped.
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// One CSV row as stored on disk.
#[derive(Debug, Deserialize, Serialize)]
struct IncidentRow {
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Type", default)]
    incident_type: String,
    #[serde(rename = "Category", default)]
    category: String,
    #[serde(rename = "Country", default)]
    country: String,
    #[serde(rename = "City", default)]
    city: String,
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Casualty", default)]
    casualty: String,
    #[serde(rename = "Injury", default)]
    injury: String,
    #[serde(rename = "Impact", default)]
    impact: String,
    #[serde(rename = "Severity", default)]
    severity: String,
    #[serde(rename = "Link", default)]
    link: String,
    #[serde(rename = "Latitude", default)]
    latitude: Option<f64>,
    #[serde(rename = "Longitude", default)]
    longitude: Option<f64>,
}

impl IncidentRow {
    fn into_record(self) -> Result<IncidentRecord, String> {
        let date = parse_date(&self.date).ok_or_else(|| format!("unparseable date '{}'", self.date))?;
        let casualties = parse_count(&self.casualty)
            .ok_or_else(|| format!("invalid casualty count '{}'", self.casualty))?;
        let injuries = parse_count(&self.injury)
            .ok_or_else(|| format!("invalid injury count '{}'", self.injury))?;

        let coordinates = match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon).map_err(|e| e.to_string())?),
            (None, None) => None,
            _ => return Err("only one of Latitude/Longitude is set".to_string()),
        };

        Ok(IncidentRecord {
            title: self.title.trim().to_string(),
            category: IncidentCategory::parse_lenient(&self.category),
            incident_type: self.incident_type.trim().to_string(),
            country: self.country.trim().to_string(),
            city: self.city.trim().to_string(),
            date,
            casualties,
            injuries,
            impact: self.impact.trim().to_string(),
            severity: self.severity.trim().to_string(),
            link: self.link.trim().to_string(),
            coordinates,
        })
    }

    fn from_record(record: &IncidentRecord) -> Self {
        Self {
            title: record.title.clone(),
            incident_type: record.incident_type.clone(),
            category: record.category.to_string(),
            country: record.country.clone(),
            city: record.city.clone(),
            date: record.date.format("%Y-%m-%d").to_string(),
            casualty: record.casualties.to_string(),
            injury: record.injuries.to_string(),
            impact: record.impact.clone(),
            severity: record.severity.clone(),
            link: record.link.clone(),
            latitude: record.coordinates.map(Coordinates::latitude),
            longitude: record.coordinates.map(Coordinates::longitude),
        }
    }
}

/// Parses a dataset date, accepting plain dates and date-times.
#[must_use]
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Parses a non-negative count. Blank means zero; spreadsheet exports may
/// render integers as `"3.0"`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_count(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some(0);
    }

    if let Ok(n) = raw.parse::<u32>() {
        return Some(n);
    }

    let f = raw.parse::<f64>().ok()?;
    (f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= f64::from(u32::MAX)).then_some(f as u32)
}

/// Loads incident records from a CSV file.
///
/// # Errors
///
/// Returns [`DatasetError`] if the file cannot be read or any row is
/// malformed (bad date, negative or non-numeric count, half-set
/// coordinates).
pub fn load_incidents(path: &Path) -> Result<Vec<IncidentRecord>, DatasetError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_path(path)?;
    let mut records = Vec::new();

    for (idx, row) in reader.deserialize::<IncidentRow>().enumerate() {
        let line = idx + 2;
        let record = row?
            .into_record()
            .map_err(|message| DatasetError::Record { line, message })?;
        records.push(record);
    }

    let located = records.iter().filter(|r| r.is_located()).count();
    log::info!(
        "Loaded {} incidents ({located} with coordinates) from {}",
        records.len(),
        path.display()
    );

    Ok(records)
}

/// Writes records to CSV including `Latitude`/`Longitude` columns (blank
/// for unresolved records).
///
/// # Errors
///
/// Returns [`DatasetError`] if the file cannot be created or written.
pub fn write_incidents(path: &Path, records: &[IncidentRecord]) -> Result<(), DatasetError> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(IncidentRow::from_record(record))?;
    }
    writer.flush()?;

    log::info!("Wrote {} incidents to {}", records.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Title,Type,Category,Country,City,Date,Casualty,Injury,Impact,Severity,Link";

    fn write_tmp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn parses_supported_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(parse_date("2024-02-29"), Some(expected));
        assert_eq!(parse_date("02/29/2024"), Some(expected));
        assert_eq!(parse_date("2024-02-29 13:45:00"), Some(expected));
        assert_eq!(parse_date("2024-02-29T00:00:00"), Some(expected));
        assert_eq!(parse_date("yesterday"), None);
    }

    #[test]
    fn parses_counts() {
        assert_eq!(parse_count(""), Some(0));
        assert_eq!(parse_count("12"), Some(12));
        assert_eq!(parse_count("3.0"), Some(3));
        assert_eq!(parse_count("-1"), None);
        assert_eq!(parse_count("2.5"), None);
        assert_eq!(parse_count("many"), None);
    }

    #[test]
    fn loads_source_dataset_without_coordinates() {
        let path = write_tmp(
            "cbrne_dataset_source.csv",
            &format!(
                "{HEADER}\n\
                 Chlorine leak at plant,Industrial,chemical,India,Vizag,2020-05-07,12,,High,Severe,https://example.com/1\n\
                 \"Parcel bomb, embassy\",IED,Explosive,Greece,Athens,01/15/2021,0,2,Medium,Moderate,https://example.com/2\n"
            ),
        );

        let records = load_incidents(&path).unwrap();
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].category, IncidentCategory::Chemical);
        assert_eq!(records[0].casualties, 12);
        assert_eq!(records[0].injuries, 0);
        assert!(records[0].coordinates.is_none());

        assert_eq!(records[1].title, "Parcel bomb, embassy");
        assert_eq!(records[1].date, NaiveDate::from_ymd_opt(2021, 1, 15).unwrap());

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn rejects_half_set_coordinates() {
        let path = write_tmp(
            "cbrne_dataset_half_coords.csv",
            &format!(
                "{HEADER},Latitude,Longitude\n\
                 A,T,Nuclear,Japan,Fukushima,2011-03-11,0,0,High,Severe,x,37.42,\n"
            ),
        );

        let err = load_incidents(&path).unwrap_err();
        assert!(matches!(err, DatasetError::Record { line: 2, .. }));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn rejects_bad_date_with_line_number() {
        let path = write_tmp(
            "cbrne_dataset_bad_date.csv",
            &format!(
                "{HEADER}\n\
                 A,T,Nuclear,Japan,Tokyo,2011-03-11,0,0,High,Severe,x\n\
                 B,T,Nuclear,Japan,Tokyo,sometime,0,0,High,Severe,x\n"
            ),
        );

        match load_incidents(&path).unwrap_err() {
            DatasetError::Record { line, message } => {
                assert_eq!(line, 3);
                assert!(message.contains("sometime"));
            }
            other => panic!("unexpected error: {other}"),
        }

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn written_file_reloads_with_coordinates() {
        let source = write_tmp(
            "cbrne_dataset_roundtrip_in.csv",
            &format!(
                "{HEADER}\n\
                 A,Leak,Chemical,France,Paris,2022-09-01,1,4,Low,Minor,https://example.com/a\n\
                 B,Leak,Chemical,Nowhere,Atlantis,2022-09-02,0,0,Low,Minor,https://example.com/b\n"
            ),
        );
        let mut records = load_incidents(&source).unwrap();
        records[0].coordinates = Some(Coordinates::new(48.8566, 2.3522).unwrap());

        let out = std::env::temp_dir().join("cbrne_dataset_roundtrip_out.csv");
        write_incidents(&out, &records).unwrap();
        let reloaded = load_incidents(&out).unwrap();

        assert_eq!(reloaded, records);

        let _ = std::fs::remove_file(&source);
        let _ = std::fs::remove_file(&out);
    }
}
