//! Metadata extraction error types
//!
//! Defines all errors that can occur while extracting annual series from
//! the GCBM results database.

use thiserror::Error;

/// Errors that can occur during metadata extraction
#[derive(Error, Debug)]
pub enum MetadataError {
    /// Configured indicator has no resolvable table/column mapping
    #[error("Unknown indicator: {indicator}")]
    UnknownIndicator { indicator: String },

    /// Aggregation query failed against a resolved table/column
    #[error("Query against {table}.{column} failed: {source}")]
    DataAccess {
        table: String,
        column: String,
        source: rusqlite::Error,
    },

    /// Results database error outside a resolved aggregation
    #[error("Results database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Result type for metadata operations
pub type MetadataResult<T> = Result<T, MetadataError>;
