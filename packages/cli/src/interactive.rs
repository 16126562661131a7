//! Interactive menu for the incident map tools.
//!
//! Provides a menu-driven interface using `dialoguer` for running the
//! subcommands without memorizing flags.

use std::collections::BTreeSet;
use std::path::PathBuf;

use cbrne_map_cli_utils::MultiProgress;
use cbrne_map_dataset::{FilterOptions, IncidentFilter};
use cbrne_map_geocoder::service_registry::enabled_services;
use cbrne_map_incident_models::IncidentRecord;
use dialoguer::{Confirm, Input, MultiSelect, Select};

use crate::args::ResolveArgs;
use crate::commands;
use crate::config::AppConfig;

/// Top-level actions available in the interactive menu.
enum Action {
    Resolve,
    Layout,
    Heatmap,
    Summary,
    Export,
    ListServices,
}

impl Action {
    const ALL: &[Self] = &[
        Self::Resolve,
        Self::Layout,
        Self::Heatmap,
        Self::Summary,
        Self::Export,
        Self::ListServices,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Resolve => "Resolve incident locations",
            Self::Layout => "Write spider layout (GeoJSON)",
            Self::Heatmap => "Write heatmap (GeoJSON)",
            Self::Summary => "Show summary",
            Self::Export => "Export filtered table (CSV)",
            Self::ListServices => "List geocoding services",
        }
    }
}

/// Runs the interactive menu, prompting for an action and its inputs.
///
/// # Errors
///
/// Returns an error if a prompt fails or the selected operation fails.
pub async fn run(multi: &MultiProgress, config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    println!("CBRNE Incident Map");
    println!();

    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Action::ALL[idx] {
        Action::Resolve => {
            let input = prompt_path("Incident CSV")?;
            let output = prompt_path("Write enriched CSV to")?;
            let gazetteer = prompt_path("Gazetteer CSV")?;
            let args = ResolveArgs {
                gazetteer: Some(gazetteer.clone()),
                service: prompt_service()?,
                ..ResolveArgs::default()
            };
            commands::resolve(multi, &input, &output, &gazetteer, &args, config).await?;
        }
        Action::Layout => {
            let records = prompt_records(multi, config, true).await?;
            let filter = prompt_filter(&records)?;
            let output = prompt_path("Write GeoJSON to")?;
            commands::layout(&records, &filter, config.spider, &output)?;
        }
        Action::Heatmap => {
            let records = prompt_records(multi, config, true).await?;
            let filter = prompt_filter(&records)?;
            let output = prompt_path("Write GeoJSON to")?;
            commands::heatmap(&records, &filter, &output)?;
        }
        Action::Summary => {
            let records = prompt_records(multi, config, false).await?;
            let filter = prompt_filter(&records)?;
            commands::summary(&records, &filter);
        }
        Action::Export => {
            let records = prompt_records(multi, config, false).await?;
            let filter = prompt_filter(&records)?;
            let output = prompt_path("Write CSV to")?;
            commands::export_table(&records, &filter, Some(&output))?;
        }
        Action::ListServices => commands::services(),
    }

    Ok(())
}

fn prompt_path(prompt: &str) -> Result<PathBuf, dialoguer::Error> {
    let raw: String = Input::new().with_prompt(prompt).interact_text()?;
    Ok(PathBuf::from(raw.trim()))
}

/// Lets the user pick an enabled geocoding service; `None` keeps the
/// environment/config default.
fn prompt_service() -> Result<Option<String>, dialoguer::Error> {
    let services = enabled_services();
    let mut labels = vec!["Default".to_string()];
    labels.extend(services.iter().map(|s| format!("{} ({})", s.id, s.name)));

    let idx = Select::new()
        .with_prompt("Geocoding service")
        .items(&labels)
        .default(0)
        .interact()?;

    Ok(idx.checked_sub(1).map(|i| services[i].id.clone()))
}

/// Loads incidents, offering on-the-fly resolution for spatial outputs.
async fn prompt_records(
    multi: &MultiProgress,
    config: &AppConfig,
    spatial: bool,
) -> Result<Vec<IncidentRecord>, Box<dyn std::error::Error>> {
    let input = prompt_path("Incident CSV")?;

    let mut args = ResolveArgs::default();
    if spatial
        && Confirm::new()
            .with_prompt("Resolve incidents without coordinates?")
            .default(false)
            .interact()?
    {
        args.gazetteer = Some(prompt_path("Gazetteer CSV")?);
        args.service = prompt_service()?;
    }

    commands::load_and_resolve(multi, &input, &args, config).await
}

/// Checkbox selection over the values present; selecting nothing means no
/// constraint.
fn select_values<T: Clone + Ord + ToString>(
    prompt: &str,
    values: &BTreeSet<T>,
) -> Result<BTreeSet<T>, dialoguer::Error> {
    if values.len() < 2 {
        return Ok(BTreeSet::new());
    }

    let values: Vec<&T> = values.iter().collect();
    let labels: Vec<String> = values.iter().map(|v| (*v).to_string()).collect();

    let selected = MultiSelect::new()
        .with_prompt(format!("{prompt} (space=toggle, enter=confirm, none=all)"))
        .items(&labels)
        .max_length(20)
        .interact()?;

    Ok(selected.into_iter().map(|i| values[i].clone()).collect())
}

fn prompt_filter(records: &[IncidentRecord]) -> Result<IncidentFilter, Box<dyn std::error::Error>> {
    let options = FilterOptions::from_records(records);

    if !Confirm::new()
        .with_prompt("Filter incidents?")
        .default(false)
        .interact()?
    {
        return Ok(IncidentFilter::default());
    }

    let mut filter = IncidentFilter {
        categories: select_values("Categories", &options.categories)?,
        types: select_values("Incident types", &options.types)?,
        countries: select_values("Countries", &options.countries)?,
        impacts: select_values("Impact", &options.impacts)?,
        severities: select_values("Severity", &options.severities)?,
        ..IncidentFilter::default()
    };

    if let Some((min, max)) = options.date_bounds {
        let start: String = Input::new()
            .with_prompt("From date")
            .default(min.format("%Y-%m-%d").to_string())
            .interact_text()?;
        let end: String = Input::new()
            .with_prompt("To date")
            .default(max.format("%Y-%m-%d").to_string())
            .interact_text()?;

        filter.start_date = Some(
            cbrne_map_dataset::load::parse_date(&start)
                .ok_or_else(|| format!("Unparseable date '{start}'"))?,
        );
        filter.end_date = Some(
            cbrne_map_dataset::load::parse_date(&end)
                .ok_or_else(|| format!("Unparseable date '{end}'"))?,
        );
    }

    let search: String = Input::new()
        .with_prompt("Search (title, country, city; empty for none)")
        .allow_empty(true)
        .interact_text()?;
    if !search.trim().is_empty() {
        filter.search = Some(search);
    }

    Ok(filter)
}
