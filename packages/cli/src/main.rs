#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the CBRNE incident map.
//!
//! Resolves incident locations against a geocoder with gazetteer fallback,
//! then filters and renders them as spider layouts, heatmaps, summaries,
//! and tables. Runs an interactive menu when no subcommand is given.
//!
//! Uses `indicatif-log-bridge` (via [`cbrne_map_cli_utils::init_logger`])
//! so that log lines and progress bars never fight for the terminal.

mod args;
mod commands;
mod config;
mod interactive;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::args::{FilterArgs, ResolveArgs};
use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "cbrne_map", about = "CBRNE incident map toolchain")]
struct Cli {
    /// TOML settings file (resolver, spider, and geocoder sections)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve incident locations and write an enriched CSV with coordinates
    Resolve {
        /// Incident CSV
        input: PathBuf,
        /// Where to write the enriched CSV
        #[arg(long, short)]
        output: PathBuf,
        #[command(flatten)]
        resolve: ResolveArgs,
    },
    /// Write a spider layout of co-located incidents as `GeoJSON`
    Layout {
        /// Incident CSV (enriched, or resolved on the fly with --gazetteer)
        input: PathBuf,
        /// Where to write the `GeoJSON`
        #[arg(long, short)]
        output: PathBuf,
        /// Satellite distance from the shared location, in degrees
        #[arg(long)]
        radius: Option<f64>,
        #[command(flatten)]
        filter: FilterArgs,
        #[command(flatten)]
        resolve: ResolveArgs,
    },
    /// Write weighted heatmap points as `GeoJSON`
    Heatmap {
        /// Incident CSV (enriched, or resolved on the fly with --gazetteer)
        input: PathBuf,
        /// Where to write the `GeoJSON`
        #[arg(long, short)]
        output: PathBuf,
        #[command(flatten)]
        filter: FilterArgs,
        #[command(flatten)]
        resolve: ResolveArgs,
    },
    /// Print category, country, and per-day counts
    Summary {
        /// Incident CSV
        input: PathBuf,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Export the filtered incident table as CSV
    Export {
        /// Incident CSV
        input: PathBuf,
        /// Output file (stdout if omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// List configured geocoding services
    Services,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = cbrne_map_cli_utils::init_logger();
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;

    let Some(command) = cli.command else {
        return interactive::run(&multi, &config).await;
    };

    match command {
        Commands::Resolve {
            input,
            output,
            resolve,
        } => {
            let Some(gazetteer) = resolve.gazetteer.clone() else {
                return Err("resolve requires --gazetteer".into());
            };
            commands::resolve(&multi, &input, &output, &gazetteer, &resolve, &config).await?;
        }
        Commands::Layout {
            input,
            output,
            radius,
            filter,
            resolve,
        } => {
            let filter = filter.to_filter()?;
            let mut spider = config.spider;
            if let Some(radius) = radius {
                spider.radius_deg = radius;
            }
            let records = commands::load_and_resolve(&multi, &input, &resolve, &config).await?;
            commands::layout(&records, &filter, spider, &output)?;
        }
        Commands::Heatmap {
            input,
            output,
            filter,
            resolve,
        } => {
            let filter = filter.to_filter()?;
            let records = commands::load_and_resolve(&multi, &input, &resolve, &config).await?;
            commands::heatmap(&records, &filter, &output)?;
        }
        Commands::Summary { input, filter } => {
            let filter = filter.to_filter()?;
            let records = cbrne_map_dataset::load_incidents(&input)?;
            commands::summary(&records, &filter);
        }
        Commands::Export {
            input,
            output,
            filter,
        } => {
            let filter = filter.to_filter()?;
            let records = cbrne_map_dataset::load_incidents(&input)?;
            commands::export_table(&records, &filter, output.as_deref())?;
        }
        Commands::Services => commands::services(),
    }

    Ok(())
}
