//! Metadata extraction from the GCBM results database
//!
//! The non-spatial half of the backend: maps configured indicator names to
//! results tables, aggregates annual values, and assembles the
//! title → series payload consumed by the visualization frontend.
//!
//! ```text
//! IndicatorConfig ("flux", title "Carbon Flux")
//!        ↓
//! Resolver: flux → (flux_reporting_results, flux)
//!        ↓
//! Aggregator: SUM per year over [1999, 2020], divided by unit factor
//!        ↓
//! { "Carbon Flux": { "1999": 0, "2000": 10.0, ... } }
//! ```

mod aggregate;
mod error;
mod resolver;
mod units;

pub use aggregate::{aggregate_annual, AnnualSeries};
pub use error::{MetadataError, MetadataResult};
pub use resolver::{IndicatorResolver, ResolvedQuery, StaticResolver, ViewScanResolver};
pub use units::Units;

use crate::config::IndicatorConfig;
use rusqlite::Connection;
use std::collections::BTreeMap;

/// Default simulation span of the GCBM runs this backend serves
pub const DEFAULT_YEAR_RANGE: (i32, i32) = (1999, 2020);

/// Metadata payload: display title → annual series
pub type Metadata = BTreeMap<String, AnnualSeries>;

/// Extract all metadata with the default resolver, units and year range.
///
/// One entry per config; a config without a title is recorded under its
/// indicator name. Duplicate titles overwrite: last config wins.
pub fn build_metadata(
    conn: &Connection,
    configs: &[IndicatorConfig],
) -> MetadataResult<Metadata> {
    build_metadata_with(
        conn,
        configs,
        &StaticResolver::default(),
        Units::default(),
        DEFAULT_YEAR_RANGE,
    )
}

/// Extract all metadata with explicit strategy and parameters.
///
/// Any unresolvable indicator fails the whole run; no partial payload is
/// returned.
pub fn build_metadata_with(
    conn: &Connection,
    configs: &[IndicatorConfig],
    resolver: &dyn IndicatorResolver,
    units: Units,
    year_range: (i32, i32),
) -> MetadataResult<Metadata> {
    let mut metadata = Metadata::new();

    for config in configs {
        let indicator = config.database_indicator.as_str();
        let title = config.title.clone().unwrap_or_else(|| indicator.to_string());

        let query = resolver.resolve(conn, indicator)?;
        tracing::debug!(
            "Resolved indicator {} to {}.{}",
            indicator,
            query.table,
            query.value_column
        );

        let series = aggregate_annual(conn, &query, units, year_range)?;

        if metadata.insert(title.clone(), series).is_some() {
            tracing::warn!("Duplicate indicator title {:?}, keeping the later series", title);
        }
    }

    tracing::info!("Extracted metadata for {} indicators", configs.len());
    Ok(metadata)
}

/// Span of simulated years recorded in the results database
pub fn simulation_years(conn: &Connection) -> MetadataResult<(i32, i32)> {
    let years = conn.query_row(
        "SELECT MIN(year), MAX(year) FROM v_age_indicators",
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    Ok(years)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE flux_reporting_results (
                date_dimension_id_fk INTEGER NOT NULL,
                flux REAL NOT NULL
            );
            CREATE TABLE stock_reporting_results (
                date_dimension_id_fk INTEGER NOT NULL,
                stock REAL NOT NULL
            );
            INSERT INTO flux_reporting_results VALUES (2000, 10.0);
            INSERT INTO flux_reporting_results VALUES (2001, 20.0);
            INSERT INTO stock_reporting_results VALUES (2000, 100.0);",
        )
        .unwrap();
        conn
    }

    fn config(indicator: &str, title: Option<&str>) -> IndicatorConfig {
        IndicatorConfig {
            database_indicator: indicator.to_string(),
            title: title.map(String::from),
        }
    }

    #[test]
    fn test_one_entry_per_config() {
        let conn = results_db();
        let configs = vec![
            config("flux", Some("Carbon Flux")),
            config("stock", Some("Carbon Stock")),
        ];

        let metadata = build_metadata(&conn, &configs).unwrap();

        assert_eq!(metadata.len(), 2);
        assert_eq!(metadata["Carbon Flux"]["2000"], 10.0);
        assert_eq!(metadata["Carbon Stock"]["2000"], 100.0);
    }

    #[test]
    fn test_title_defaults_to_indicator() {
        let conn = results_db();
        let metadata = build_metadata(&conn, &[config("flux", None)]).unwrap();

        assert_eq!(metadata.len(), 1);
        assert!(metadata.contains_key("flux"));
    }

    #[test]
    fn test_duplicate_title_last_write_wins() {
        let conn = results_db();
        let configs = vec![
            config("flux", Some("Carbon Flux")),
            config("stock", Some("Carbon Flux")),
        ];

        let metadata = build_metadata(&conn, &configs).unwrap();

        assert_eq!(metadata.len(), 1);
        // Stock series, not flux: 100.0 in 2000 and nothing in 2001.
        assert_eq!(metadata["Carbon Flux"]["2000"], 100.0);
        assert_eq!(metadata["Carbon Flux"]["2001"], 0.0);
    }

    #[test]
    fn test_unknown_indicator_fails_run() {
        let conn = results_db();
        let configs = vec![
            config("flux", Some("Carbon Flux")),
            config("biomass", Some("Biomass")),
        ];

        let err = build_metadata(&conn, &configs).unwrap_err();
        assert!(matches!(
            err,
            MetadataError::UnknownIndicator { indicator } if indicator == "biomass"
        ));
    }

    #[test]
    fn test_rerun_is_byte_identical() {
        let conn = results_db();
        let configs = vec![
            config("flux", Some("Carbon Flux")),
            config("stock", None),
        ];

        let first = serde_json::to_string(&build_metadata(&conn, &configs).unwrap()).unwrap();
        let second = serde_json::to_string(&build_metadata(&conn, &configs).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_simulation_years() {
        let conn = results_db();
        conn.execute_batch(
            "CREATE TABLE v_age_indicators (year INTEGER NOT NULL);
             INSERT INTO v_age_indicators VALUES (1999), (2005), (2020);",
        )
        .unwrap();

        assert_eq!(simulation_years(&conn).unwrap(), (1999, 2020));
    }
}
