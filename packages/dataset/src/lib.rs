#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CBRNE incident dataset handling.
//!
//! Loads the incident spreadsheet export (CSV) into [`IncidentRecord`]s,
//! writes enriched copies with resolved coordinates, and provides the
//! filter stage, chart summaries, and tabular export that sit between
//! location resolution and rendering.
//!
//! [`IncidentRecord`]: cbrne_map_incident_models::IncidentRecord

pub mod export;
pub mod filter;
pub mod load;
pub mod summary;

use thiserror::Error;

pub use filter::{FilterOptions, IncidentFilter};
pub use load::{load_incidents, write_incidents};

/// Errors from reading or writing incident data.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// CSV reading or writing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error (file create, flush).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A row could not be turned into a valid record.
    #[error("Invalid record on line {line}: {message}")]
    Record {
        /// 1-based line number in the file (the header is line 1).
        line: usize,
        /// Description of the problem.
        message: String,
    },
}
