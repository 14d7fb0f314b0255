//! Raster index error types

use thiserror::Error;

/// Errors that can occur in the raster index
#[derive(Error, Debug)]
pub enum IndexError {
    /// Underlying SQLite failure
    #[error("Index database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Key name is not a valid identifier
    #[error("Invalid key name: {0}")]
    InvalidKeyName(String),

    /// Key name declared more than once
    #[error("Duplicate key name: {0}")]
    DuplicateKeyName(String),

    /// Insert or lookup supplied the wrong number of key values
    #[error("Key count mismatch: index declares {expected} keys, got {actual}")]
    KeyMismatch { expected: usize, actual: usize },
}

/// Result type alias for index operations
pub type IndexResult<T> = Result<T, IndexError>;
