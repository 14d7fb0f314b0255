//! Ingestion error types

use crate::index::IndexError;
use thiserror::Error;

/// Errors that can occur during raster ingestion
#[derive(Error, Debug)]
pub enum IngestError {
    /// Raster filename does not match the naming grammar; aborts the run
    #[error("Input file {filename} does not match raster naming pattern")]
    NamingConvention { filename: String },

    /// Raster name pattern failed to compile
    #[error("Invalid raster name pattern: {0}")]
    InvalidNamePattern(#[from] regex::Error),

    /// Directory glob pattern failed to compile
    #[error("Invalid glob pattern {pattern}: {source}")]
    InvalidGlobPattern {
        pattern: String,
        source: glob::PatternError,
    },

    /// Raster index error
    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for ingestion operations
pub type IngestResult<T> = Result<T, IngestError>;
