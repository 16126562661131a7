//! Argument groups shared between subcommands.

use std::collections::BTreeSet;
use std::path::PathBuf;

use cbrne_map_dataset::IncidentFilter;
use cbrne_map_dataset::load::parse_date;
use cbrne_map_incident_models::IncidentCategory;
use cbrne_map_resolver::ResolverConfig;
use clap::Args;

/// Incident filter flags. List values are comma-separated.
#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// Incident types to keep (e.g., "IED,Chemical attack")
    #[arg(long)]
    pub types: Option<String>,
    /// Categories to keep (e.g., "chemical,nuclear")
    #[arg(long)]
    pub categories: Option<String>,
    /// Countries to keep
    #[arg(long)]
    pub countries: Option<String>,
    /// Impact ratings to keep
    #[arg(long)]
    pub impacts: Option<String>,
    /// Severity ratings to keep
    #[arg(long)]
    pub severities: Option<String>,
    /// Earliest incident date, inclusive
    #[arg(long)]
    pub from: Option<String>,
    /// Latest incident date, inclusive
    #[arg(long)]
    pub to: Option<String>,
    /// Case-insensitive text matched against title, country, and city
    #[arg(long)]
    pub search: Option<String>,
}

fn split_list(raw: Option<&str>) -> BTreeSet<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

fn date_arg(flag: &str, raw: Option<&str>) -> Result<Option<chrono::NaiveDate>, String> {
    raw.map(|s| parse_date(s).ok_or_else(|| format!("--{flag}: unparseable date '{s}'")))
        .transpose()
}

impl FilterArgs {
    /// Builds the filter these flags describe.
    ///
    /// # Errors
    ///
    /// Returns a message naming the flag if a date or category is invalid.
    pub fn to_filter(&self) -> Result<IncidentFilter, String> {
        let categories = split_list(self.categories.as_deref())
            .iter()
            .map(|c| {
                c.parse::<IncidentCategory>()
                    .map_err(|_| format!("--categories: unknown category '{c}'"))
            })
            .collect::<Result<BTreeSet<_>, _>>()?;

        Ok(IncidentFilter {
            types: split_list(self.types.as_deref()),
            categories,
            countries: split_list(self.countries.as_deref()),
            impacts: split_list(self.impacts.as_deref()),
            severities: split_list(self.severities.as_deref()),
            start_date: date_arg("from", self.from.as_deref())?,
            end_date: date_arg("to", self.to.as_deref())?,
            search: self.search.clone(),
        })
    }
}

/// Location resolution flags.
#[derive(Debug, Clone, Default, Args)]
pub struct ResolveArgs {
    /// Gazetteer CSV with a `city` column; enables resolution of incidents
    /// that have no coordinates yet
    #[arg(long)]
    pub gazetteer: Option<PathBuf>,
    /// Geocoding service id (overrides `CBRNE_MAP_GEOCODER`)
    #[arg(long)]
    pub service: Option<String>,
    /// Maximum gazetteer candidates tried per city
    #[arg(long)]
    pub candidate_limit: Option<usize>,
    /// Minimum similarity (0-100) for a candidate to be tried
    #[arg(long)]
    pub min_score: Option<u8>,
}

impl ResolveArgs {
    /// Overlays any flags given onto `base`.
    #[must_use]
    pub fn apply(&self, base: ResolverConfig) -> ResolverConfig {
        ResolverConfig {
            candidate_limit: self.candidate_limit.unwrap_or(base.candidate_limit),
            min_score: self.min_score.unwrap_or(base.min_score),
        }
    }
}
