//! Keyed raster index
//!
//! A file-backed store associating structured attribute tuples with raster
//! file locations, queryable by key. The schema is declared once (ordered
//! key names plus per-key descriptions), then one entry is registered per
//! conforming raster file. After ingestion the index is handed to the
//! external tile server read-only, by filesystem path.
//!
//! ```text
//! create(["title", "year"])          →  empty schema-bound index
//! insert(("forest", "2010"), path)   →  one dataset row, own transaction
//! handoff()                          →  (index.sqlite, provider "sqlite")
//! ```

mod error;
mod raster_index;

pub use error::{IndexError, IndexResult};
pub use raster_index::RasterIndex;

use std::path::PathBuf;

/// Storage backend identifier the external tile server expects
pub const SQLITE_PROVIDER: &str = "sqlite";

/// Declaration of one index key
#[derive(Debug, Clone)]
pub struct KeySpec {
    /// Key name; must be a valid identifier, unique within the index
    pub name: String,
    /// Human-readable description, possibly empty
    pub description: String,
}

impl KeySpec {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
        }
    }
}

/// Read-only handoff of a populated index to the external tile server
#[derive(Debug, Clone)]
pub struct IndexHandoff {
    /// Filesystem path of the populated index database
    pub db_path: PathBuf,
    /// Storage backend identifier, one of the server's supported providers
    pub provider: &'static str,
}

impl IndexHandoff {
    pub fn new(db_path: PathBuf) -> Self {
        Self {
            db_path,
            provider: SQLITE_PROVIDER,
        }
    }
}
