//! # Canopy
//!
//! GCBM visualization backend - ingests forest-carbon simulation rasters
//! into a queryable keyed index and extracts annual indicator time series
//! from the simulation's relational results database.
//!
//! ## Pipelines
//!
//! - **Raster ingestion**: parse `<title>_<year>.tiff` filenames into
//!   structured keys, register each raster in a SQLite-backed keyed index,
//!   fail fast on any non-conforming file. The populated index is handed
//!   to the external tile server by path.
//! - **Metadata extraction**: map configured indicator names to results
//!   tables, sum values per simulated year, apply unit conversion, and
//!   assemble the title → series payload for the visualization frontend.
//!
//! The two pipelines share no runtime state and run sequentially,
//! single-threaded, over the same input directory/database pair.
//!
//! ## Modules
//!
//! - [`ingest`]: filename grammar and the directory ingestion loop
//! - [`index`]: keyed raster index and tile-server handoff
//! - [`metadata`]: indicator resolution, annual aggregation, orchestration
//! - [`config`]: TOML/env configuration and the JSON indicator list
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use canopy::config::{IndicatorConfig, IngestConfig};
//! use canopy::ingest::ingest_into;
//! use canopy::metadata::build_metadata;
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Index the spatial output for the tile server
//!     let handoff = ingest_into(
//!         &IngestConfig::default(),
//!         Path::new("spatial_results"),
//!         Path::new("out"),
//!     )?;
//!     println!("index at {:?} (provider {})", handoff.db_path, handoff.provider);
//!
//!     // Extract annual series for the frontend
//!     let conn = rusqlite::Connection::open("compiled_results.sqlite")?;
//!     let configs = vec![IndicatorConfig {
//!         database_indicator: "flux".to_string(),
//!         title: Some("Carbon Flux".to_string()),
//!     }];
//!     let metadata = build_metadata(&conn, &configs)?;
//!     println!("{}", serde_json::to_string_pretty(&metadata)?);
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod index;
pub mod ingest;
pub mod metadata;

// Re-export top-level types for convenience
pub use config::{Config, ConfigError, IndicatorConfig, IngestConfig, MetadataConfig};

pub use index::{IndexError, IndexHandoff, IndexResult, KeySpec, RasterIndex, SQLITE_PROVIDER};

pub use ingest::{
    ingest_directory, ingest_into, IngestError, IngestResult, KeyParser, RasterKey,
};

pub use metadata::{
    aggregate_annual, build_metadata, build_metadata_with, simulation_years, AnnualSeries,
    IndicatorResolver, Metadata, MetadataError, MetadataResult, ResolvedQuery, StaticResolver,
    Units, ViewScanResolver,
};
