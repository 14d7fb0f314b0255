//! Canopy CLI
//!
//! Drives the two pipelines over a GCBM output pair: ingest the spatial
//! results into a raster index for the external tile server, then extract
//! the annual indicator series for the visualization frontend.

use anyhow::Context;
use canopy::config::{self, Config};
use canopy::ingest::ingest_into;
use canopy::metadata::build_metadata_with;
use canopy::StaticResolver;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "canopy")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Interactive visualization backend for GCBM")]
struct Cli {
    /// Path to JSON indicator config file
    #[arg(required_unless_present = "print_config")]
    config: Option<PathBuf>,

    /// Path to GCBM spatial output directory
    #[arg(required_unless_present = "print_config")]
    spatial_results: Option<PathBuf>,

    /// Path to the compiled GCBM results database
    #[arg(long)]
    results_db: Option<PathBuf>,

    /// Directory for the generated raster index (default: temporary)
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// File for the metadata payload (default: stdout)
    #[arg(long)]
    metadata_out: Option<PathBuf>,

    /// Print a default config file and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.print_config {
        print!("{}", config::generate_default_config());
        return Ok(());
    }

    let app_config = Config::load_default();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| format!("canopy={}", app_config.logging.level)),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Canopy v{}", env!("CARGO_PKG_VERSION"));

    let config_path = cli.config.context("missing indicator config path")?;
    let spatial_results = cli
        .spatial_results
        .context("missing spatial results path")?;

    let indicators = config::load_indicators(&config_path)
        .with_context(|| format!("loading indicator config {:?}", config_path))?;

    // The scratch directory must outlive the handoff.
    let (output_dir, _scratch) = match &cli.output_dir {
        Some(dir) => (dir.clone(), None),
        None => {
            let tmp = tempfile::TempDir::new()?;
            (tmp.path().to_path_buf(), Some(tmp))
        }
    };

    let handoff = ingest_into(&app_config.ingest, &spatial_results, &output_dir)
        .with_context(|| format!("ingesting rasters from {:?}", spatial_results))?;
    tracing::info!(
        "Raster index at {:?} ready for tile server (provider {})",
        handoff.db_path,
        handoff.provider
    );

    // Extract the metadata payload when a results database is supplied.
    if let Some(results_db) = &cli.results_db {
        let conn = rusqlite::Connection::open_with_flags(
            results_db,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
        )
        .with_context(|| format!("opening results database {:?}", results_db))?;

        let metadata = build_metadata_with(
            &conn,
            &indicators,
            &StaticResolver::default(),
            app_config.metadata.units,
            app_config.metadata.year_range(),
        )?;

        let payload = serde_json::to_string_pretty(&metadata)?;
        match &cli.metadata_out {
            Some(path) => {
                std::fs::write(path, payload)
                    .with_context(|| format!("writing metadata to {:?}", path))?;
                tracing::info!("Metadata payload written to {:?}", path);
            }
            None => println!("{}", payload),
        }
    }

    Ok(())
}
