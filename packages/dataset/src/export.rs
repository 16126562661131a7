//! Tabular export of the filtered incident view.
//!
//! Unresolved records are kept: only spatial views drop them.

use std::io::Write;

use cbrne_map_incident_models::IncidentRecord;

use crate::DatasetError;

/// Columns of the exported table, in order.
pub const TABLE_COLUMNS: &[&str] = &[
    "Title", "Country", "City", "Date", "Casualty", "Injury", "Impact", "Severity", "Link",
];

/// Writes the display table as CSV to any writer.
///
/// # Errors
///
/// Returns [`DatasetError`] if writing fails.
pub fn export_table<W: Write>(writer: W, records: &[&IncidentRecord]) -> Result<(), DatasetError> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(TABLE_COLUMNS)?;

    for record in records {
        let date = record.date.format("%Y-%m-%d").to_string();
        let casualties = record.casualties.to_string();
        let injuries = record.injuries.to_string();

        csv.write_record([
            record.title.as_str(),
            record.country.as_str(),
            record.city.as_str(),
            date.as_str(),
            casualties.as_str(),
            injuries.as_str(),
            record.impact.as_str(),
            record.severity.as_str(),
            record.link.as_str(),
        ])?;
    }

    csv.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use cbrne_map_incident_models::{Coordinates, IncidentCategory};
    use chrono::NaiveDate;

    use super::*;

    fn record(title: &str, located: bool) -> IncidentRecord {
        IncidentRecord {
            title: title.to_string(),
            category: IncidentCategory::Radiological,
            incident_type: "Theft".to_string(),
            country: "Brazil".to_string(),
            city: "Goiânia".to_string(),
            date: NaiveDate::from_ymd_opt(1987, 9, 13).unwrap(),
            casualties: 4,
            injuries: 249,
            impact: "High".to_string(),
            severity: "Severe".to_string(),
            link: "https://example.com/goiania".to_string(),
            coordinates: located.then(|| Coordinates::new(-16.68, -49.25).unwrap()),
        }
    }

    #[test]
    fn exports_display_columns_including_unresolved() {
        let a = record("Caesium source, scrapyard", true);
        let b = record("Follow-up", false);

        let mut out = Vec::new();
        export_table(&mut out, &[&a, &b]).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "Title,Country,City,Date,Casualty,Injury,Impact,Severity,Link"
        );
        assert_eq!(
            lines[1],
            "\"Caesium source, scrapyard\",Brazil,Goiânia,1987-09-13,4,249,High,Severe,https://example.com/goiania"
        );
        assert_eq!(lines.len(), 3);
    }
}
