//! Indicator query resolution
//!
//! Maps a logical indicator name from configuration to the concrete results
//! table and value column holding its annual values. Resolution strategies
//! implement [`IndicatorResolver`] so new indicator families can be added
//! without touching the aggregation code:
//!
//! - [`StaticResolver`]: closed registry of indicator → (table, column)
//!   mappings. The default registry covers the two GCBM reporting tables.
//! - [`ViewScanResolver`]: probes the known results views for one that
//!   contains the indicator, for schemas that report through views rather
//!   than per-indicator tables.

use crate::metadata::error::MetadataError;
use rusqlite::Connection;
use std::collections::HashMap;

/// Concrete target of an indicator aggregation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedQuery {
    /// Results table (or view) name
    pub table: String,
    /// Numeric column summed per year
    pub value_column: String,
}

impl ResolvedQuery {
    pub fn new(table: &str, value_column: &str) -> Self {
        Self {
            table: table.to_string(),
            value_column: value_column.to_string(),
        }
    }
}

/// Strategy for mapping an indicator name to a results table and column
pub trait IndicatorResolver {
    /// Resolve `indicator` to a query target.
    ///
    /// Must return [`MetadataError::UnknownIndicator`] for any indicator the
    /// strategy cannot map; never a silent default.
    fn resolve(&self, conn: &Connection, indicator: &str) -> Result<ResolvedQuery, MetadataError>;
}

/// Fixed indicator → (table, column) registry
pub struct StaticResolver {
    entries: HashMap<String, ResolvedQuery>,
}

impl StaticResolver {
    /// Create an empty registry
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Register an indicator mapping, replacing any existing one
    pub fn register(&mut self, indicator: &str, table: &str, value_column: &str) {
        self.entries
            .insert(indicator.to_string(), ResolvedQuery::new(table, value_column));
    }

    /// Registered indicator names
    pub fn indicators(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }
}

impl Default for StaticResolver {
    /// Registry for the GCBM reporting schema: `flux` and `stock`, each in
    /// its own reporting table with a value column named after the indicator.
    fn default() -> Self {
        let mut resolver = Self::empty();
        resolver.register("flux", "flux_reporting_results", "flux");
        resolver.register("stock", "stock_reporting_results", "stock");
        resolver
    }
}

impl IndicatorResolver for StaticResolver {
    fn resolve(&self, _conn: &Connection, indicator: &str) -> Result<ResolvedQuery, MetadataError> {
        self.entries
            .get(indicator)
            .cloned()
            .ok_or_else(|| MetadataError::UnknownIndicator {
                indicator: indicator.to_string(),
            })
    }
}

/// Resolver that scans the known results views for the indicator
///
/// Some GCBM compilations expose indicators through shared views keyed by an
/// `indicator` column instead of per-indicator tables. This strategy probes
/// each view in order and returns the first that contains a row for the
/// indicator.
pub struct ViewScanResolver {
    /// (view name, value column) pairs, probed in order
    views: Vec<(String, String)>,
}

impl Default for ViewScanResolver {
    fn default() -> Self {
        Self {
            views: vec![
                ("v_flux_indicator_aggregates".to_string(), "flux_tc".to_string()),
                ("v_flux_indicators".to_string(), "flux_tc".to_string()),
                ("v_pool_indicators".to_string(), "pool_tc".to_string()),
                ("v_stock_change_indicators".to_string(), "flux_tc".to_string()),
            ],
        }
    }
}

impl ViewScanResolver {
    pub fn new(views: Vec<(String, String)>) -> Self {
        Self { views }
    }
}

impl IndicatorResolver for ViewScanResolver {
    fn resolve(&self, conn: &Connection, indicator: &str) -> Result<ResolvedQuery, MetadataError> {
        for (view, value_column) in &self.views {
            let found: Option<i64> = conn
                .query_row(
                    &format!("SELECT 1 FROM {} WHERE indicator = ?1 LIMIT 1", view),
                    rusqlite::params![indicator],
                    |row| row.get(0),
                )
                .map(Some)
                .or_else(|e| match e {
                    rusqlite::Error::QueryReturnedNoRows => Ok(None),
                    other => Err(other),
                })?;

            if found.is_some() {
                return Ok(ResolvedQuery::new(view, value_column));
            }
        }

        Err(MetadataError::UnknownIndicator {
            indicator: indicator.to_string(),
        })
    }
}
