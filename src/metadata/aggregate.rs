//! Annual aggregation
//!
//! Runs the per-indicator aggregation query against the GCBM results
//! database: one `SUM` per distinct year, summed in the engine, divided by
//! the unit conversion factor after summation. The returned series has one
//! entry for every year of the requested inclusive range; years with no
//! rows in the results table report 0.

use crate::metadata::error::{MetadataError, MetadataResult};
use crate::metadata::resolver::ResolvedQuery;
use crate::metadata::units::Units;
use rusqlite::Connection;
use std::collections::BTreeMap;

/// Year-ordered series of aggregated values, keyed by 4-digit year string
pub type AnnualSeries = BTreeMap<String, f64>;

/// Aggregate an indicator's annual values over `year_range` (inclusive).
///
/// The resolved table and column are interpolated into the statement (they
/// come from a closed resolver, not user input); the divisor and year
/// bounds are bound parameters.
pub fn aggregate_annual(
    conn: &Connection,
    query: &ResolvedQuery,
    units: Units,
    year_range: (i32, i32),
) -> MetadataResult<AnnualSeries> {
    let (start_year, end_year) = year_range;

    let sql = format!(
        "SELECT DISTINCT date_dimension_id_fk AS year,
                COALESCE(SUM({col}), 0) / ?1 AS value
         FROM {table}
         WHERE year BETWEEN ?2 AND ?3
         GROUP BY year
         ORDER BY year",
        col = query.value_column,
        table = query.table,
    );

    let data_access = |source: rusqlite::Error| MetadataError::DataAccess {
        table: query.table.clone(),
        column: query.value_column.clone(),
        source,
    };

    let mut stmt = conn.prepare(&sql).map_err(data_access)?;

    let rows = stmt
        .query_map(
            rusqlite::params![units.divisor(), start_year, end_year],
            |row| {
                let year: i64 = row.get(0)?;
                let value: f64 = row.get(1)?;
                Ok((year, value))
            },
        )
        .map_err(data_access)?;

    // Every year in range reports a value, even with no underlying rows.
    let mut series: AnnualSeries = (start_year..=end_year)
        .map(|year| (year.to_string(), 0.0))
        .collect();

    for row in rows {
        let (year, value) = row.map_err(data_access)?;
        series.insert(year.to_string(), value);
    }

    Ok(series)
}
