//! Implementations behind each subcommand, shared with the interactive
//! menu.

use std::io::Write;
use std::path::Path;

use cbrne_map_cli_utils::{MultiProgress, ResolutionBar};
use cbrne_map_dataset::summary::Summary;
use cbrne_map_dataset::{IncidentFilter, export, load_incidents, write_incidents};
use cbrne_map_gazetteer::Gazetteer;
use cbrne_map_geocoder::service_registry::{all_services, build_geocoder, select_service};
use cbrne_map_incident_models::IncidentRecord;
use cbrne_map_resolver::{LocationResolver, ResolveStats};
use cbrne_map_spatial::{
    SpiderConfig, declutter, heat_points, heat_to_geojson, layout_to_geojson, write_geojson,
};

use crate::args::ResolveArgs;
use crate::config::AppConfig;

type CommandResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Builds a resolver from the gazetteer at `gazetteer`, the selected
/// geocoding service, and the effective resolver settings.
fn build_resolver(
    gazetteer: &Path,
    args: &ResolveArgs,
    config: &AppConfig,
) -> CommandResult<LocationResolver> {
    let gazetteer = Gazetteer::load(gazetteer)?;
    let service = select_service(config.service_id(args.service.as_deref()).as_deref())?;
    let geocoder = build_geocoder(&service, &config.user_agent())?;

    let resolver = LocationResolver::new(geocoder, gazetteer, args.apply(config.resolver))?;
    let settings = resolver.config();
    log::debug!(
        "Resolving with service '{}': up to {} candidates scoring at least {}",
        service.id,
        settings.candidate_limit,
        settings.min_score
    );
    Ok(resolver)
}

/// Resolves every record without coordinates.
async fn resolve_in_place(
    multi: &MultiProgress,
    records: &mut [IncidentRecord],
    gazetteer: &Path,
    args: &ResolveArgs,
    config: &AppConfig,
) -> CommandResult<ResolveStats> {
    let mut resolver = build_resolver(gazetteer, args, config)?;
    let progress = ResolutionBar::add_to(multi, "Resolving locations");
    Ok(resolver.resolve_records(records, progress.as_ref()).await)
}

/// Loads incidents and, when a gazetteer is given, resolves the ones that
/// still lack coordinates.
pub async fn load_and_resolve(
    multi: &MultiProgress,
    input: &Path,
    args: &ResolveArgs,
    config: &AppConfig,
) -> CommandResult<Vec<IncidentRecord>> {
    let mut records = load_incidents(input)?;

    if let Some(gazetteer) = &args.gazetteer {
        resolve_in_place(multi, &mut records, gazetteer, args, config).await?;
    } else if records.iter().any(|r| !r.is_located()) {
        log::warn!(
            "{} incidents have no coordinates and will be left off the map (pass --gazetteer to resolve them)",
            records.iter().filter(|r| !r.is_located()).count()
        );
    }

    Ok(records)
}

/// Resolves `input` and writes an enriched copy with coordinates to
/// `output`.
pub async fn resolve(
    multi: &MultiProgress,
    input: &Path,
    output: &Path,
    gazetteer: &Path,
    args: &ResolveArgs,
    config: &AppConfig,
) -> CommandResult {
    let mut records = load_incidents(input)?;
    let stats = resolve_in_place(multi, &mut records, gazetteer, args, config).await?;
    write_incidents(output, &records)?;

    println!("{:<18} {}", "Incidents", stats.total);
    println!("{:<18} {}", "Already located", stats.already_located);
    println!("{:<18} {}", "Exact", stats.exact);
    println!("{:<18} {}", "Corrected", stats.corrected);
    println!("{:<18} {}", "Unresolved", stats.unresolved);
    println!("{:<18} {}", "Network lookups", stats.network_lookups);
    println!("{:<18} {}", "Failed lookups", stats.failed_lookups);
    println!("{:<18} {}", "Cache hits", stats.cache_hits);

    Ok(())
}

/// Writes the spider layout of the filtered incidents as `GeoJSON`.
pub fn layout(
    records: &[IncidentRecord],
    filter: &IncidentFilter,
    spider: SpiderConfig,
    output: &Path,
) -> CommandResult {
    let filtered = filter.apply(records);
    let layout = declutter(&filtered, spider);

    if layout.skipped > 0 {
        log::info!("{} filtered incidents have no coordinates", layout.skipped);
    }

    write_geojson(output, &layout_to_geojson(&layout))?;
    println!(
        "{} markers ({} spidered groups) written to {}",
        layout.markers.len(),
        layout.centroid_count(),
        output.display()
    );
    Ok(())
}

/// Writes heatmap samples of the filtered incidents as `GeoJSON`.
pub fn heatmap(records: &[IncidentRecord], filter: &IncidentFilter, output: &Path) -> CommandResult {
    let filtered = filter.apply(records);
    let points = heat_points(&filtered);

    write_geojson(output, &heat_to_geojson(&points))?;
    println!("{} heat points written to {}", points.len(), output.display());
    Ok(())
}

/// Prints chart aggregates for the filtered incidents.
pub fn summary(records: &[IncidentRecord], filter: &IncidentFilter) {
    let filtered = filter.apply(records);
    let summary = Summary::from_records(&filtered);

    println!("{:<12} {}", "Incidents", summary.total);
    println!("{:<12} {}", "Located", summary.located);
    println!("{:<12} {}", "Casualties", summary.casualties);
    println!("{:<12} {}", "Injuries", summary.injuries);

    println!();
    println!("{:<20} COUNT", "CATEGORY");
    println!("{}", "-".repeat(30));
    for (category, count) in &summary.by_category {
        println!("{:<20} {count}", category.to_string());
    }

    println!();
    println!("{:<20} COUNT", "COUNTRY");
    println!("{}", "-".repeat(30));
    for (country, count) in &summary.by_country {
        println!("{country:<20} {count}");
    }

    println!();
    println!("{:<20} COUNT", "DATE");
    println!("{}", "-".repeat(30));
    for (date, count) in &summary.by_date {
        println!("{:<20} {count}", date.format("%Y-%m-%d").to_string());
    }
}

/// Writes the display table of the filtered incidents as CSV, to `output`
/// or stdout.
pub fn export_table(
    records: &[IncidentRecord],
    filter: &IncidentFilter,
    output: Option<&Path>,
) -> CommandResult {
    let filtered = filter.apply(records);

    match output {
        Some(path) => {
            export::export_table(std::fs::File::create(path)?, &filtered)?;
            log::info!("Exported {} incidents to {}", filtered.len(), path.display());
        }
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            export::export_table(&mut lock, &filtered)?;
            lock.flush()?;
        }
    }

    Ok(())
}

/// Lists the configured geocoding services.
pub fn services() {
    println!("{:<18} {:<8} {:<9} NAME", "ID", "ENABLED", "PRIORITY");
    println!("{}", "-".repeat(60));
    for service in all_services() {
        println!(
            "{:<18} {:<8} {:<9} {}",
            service.id, service.enabled, service.priority, service.name
        );
    }
}
