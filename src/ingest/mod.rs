//! Raster ingestion pipeline
//!
//! Walks a flat directory of GCBM spatial output files, derives the index
//! key for each raster from its filename, and registers every conforming
//! file in the keyed raster index. Ingestion is all-or-nothing over a
//! directory: the first non-conforming filename aborts the run.
//!
//! ```text
//! spatial_results/*.tiff
//!        ↓  KeyParser: forest_2010.tiff → (forest, 2010)
//! RasterIndex: (forest, 2010) → spatial_results/forest_2010.tiff
//!        ↓
//! IndexHandoff { index.sqlite, provider "sqlite" }
//! ```

mod error;
mod key;

pub use error::{IngestError, IngestResult};
pub use key::{KeyParser, RasterKey, DEFAULT_RASTER_NAME_PATTERN};

use crate::config::IngestConfig;
use crate::index::{IndexHandoff, KeySpec, RasterIndex};
use std::path::{Path, PathBuf};

/// Key schema for GCBM rasters: indicator title, then 4-digit year
// TODO: Add key descriptions.
pub fn raster_key_specs() -> Vec<KeySpec> {
    vec![KeySpec::new("title", ""), KeySpec::new("year", "")]
}

/// Register every raster in `raster_dir` matching `glob_pattern` into the
/// index, keyed by parsed filename.
///
/// Listing is non-recursive. Each insertion runs in its own scoped
/// transaction, so a failure partway leaves earlier entries on disk while
/// the run as a whole fails. Returns the resolved index location.
pub fn ingest_directory(
    index: &mut RasterIndex,
    parser: &KeyParser,
    raster_dir: &Path,
    glob_pattern: &str,
) -> IngestResult<PathBuf> {
    let pattern =
        glob::Pattern::new(glob_pattern).map_err(|source| IngestError::InvalidGlobPattern {
            pattern: glob_pattern.to_string(),
            source,
        })?;

    let mut raster_paths = Vec::new();
    for entry in std::fs::read_dir(raster_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let filename = entry.file_name();
        if pattern.matches(&filename.to_string_lossy()) {
            raster_paths.push(entry.path());
        }
    }
    raster_paths.sort();

    for raster_path in &raster_paths {
        let filename = raster_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let key = parser.parse(&filename)?;
        tracing::debug!("Registering raster ({}, {})", key.title, key.year);

        index.insert(&key.values(), raster_path)?;
    }

    tracing::info!(
        "Ingested {} rasters into {:?}",
        raster_paths.len(),
        index.path()
    );

    Ok(index.path().to_path_buf())
}

/// Create a fresh index in `output_dir` and ingest `raster_dir` into it.
///
/// The populated index is checkpointed and described by an [`IndexHandoff`]
/// for the external tile server.
pub fn ingest_into(
    config: &IngestConfig,
    raster_dir: &Path,
    output_dir: &Path,
) -> IngestResult<IndexHandoff> {
    let db_path = output_dir.join(&config.index_db_name);
    let mut index = RasterIndex::create(&db_path, &raster_key_specs())?;
    let parser = KeyParser::new(&config.raster_name_pattern)?;

    let path = ingest_directory(&mut index, &parser, raster_dir, &config.raster_glob)?;
    index.checkpoint()?;

    Ok(IndexHandoff::new(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), b"raster").unwrap();
    }

    #[test]
    fn test_ingest_directory() {
        let rasters = tempdir().unwrap();
        let out = tempdir().unwrap();
        touch(rasters.path(), "forest_2010.tiff");
        touch(rasters.path(), "soil_2015.tiff");

        let mut index =
            RasterIndex::create(&out.path().join("index.sqlite"), &raster_key_specs()).unwrap();
        let parser = KeyParser::default();

        let db_path =
            ingest_directory(&mut index, &parser, rasters.path(), "*.tiff").unwrap();

        assert_eq!(db_path, out.path().join("index.sqlite"));
        assert_eq!(index.count(), 2);
        assert_eq!(
            index.get(&["forest", "2010"]).unwrap(),
            Some(rasters.path().join("forest_2010.tiff"))
        );
        assert_eq!(
            index.get(&["soil", "2015"]).unwrap(),
            Some(rasters.path().join("soil_2015.tiff"))
        );
    }

    #[test]
    fn test_nonconforming_file_aborts() {
        let rasters = tempdir().unwrap();
        let out = tempdir().unwrap();
        touch(rasters.path(), "bad-name.tiff");

        let mut index =
            RasterIndex::create(&out.path().join("index.sqlite"), &raster_key_specs()).unwrap();
        let parser = KeyParser::default();

        let err =
            ingest_directory(&mut index, &parser, rasters.path(), "*.tiff").unwrap_err();
        assert!(matches!(err, IngestError::NamingConvention { .. }));
        assert_eq!(index.count(), 0);
    }

    #[test]
    fn test_glob_filters_other_files() {
        let rasters = tempdir().unwrap();
        let out = tempdir().unwrap();
        touch(rasters.path(), "forest_2010.tiff");
        touch(rasters.path(), "notes.txt");
        touch(rasters.path(), "forest_2011.tif");

        let mut index =
            RasterIndex::create(&out.path().join("index.sqlite"), &raster_key_specs()).unwrap();
        let parser = KeyParser::default();

        ingest_directory(&mut index, &parser, rasters.path(), "*.tiff").unwrap();
        assert_eq!(index.count(), 1);
    }

    #[test]
    fn test_listing_is_not_recursive() {
        let rasters = tempdir().unwrap();
        let out = tempdir().unwrap();
        touch(rasters.path(), "forest_2010.tiff");
        std::fs::create_dir(rasters.path().join("nested")).unwrap();
        touch(&rasters.path().join("nested"), "soil_2015.tiff");

        let mut index =
            RasterIndex::create(&out.path().join("index.sqlite"), &raster_key_specs()).unwrap();
        let parser = KeyParser::default();

        ingest_directory(&mut index, &parser, rasters.path(), "*.tiff").unwrap();
        assert_eq!(index.count(), 1);
    }

    #[test]
    fn test_ingest_into_handoff() {
        let rasters = tempdir().unwrap();
        let out = tempdir().unwrap();
        touch(rasters.path(), "forest_2010.tiff");

        let config = IngestConfig::default();
        let handoff = ingest_into(&config, rasters.path(), out.path()).unwrap();

        assert_eq!(handoff.provider, "sqlite");
        assert!(handoff.db_path.exists());

        let index = RasterIndex::open(&handoff.db_path).unwrap();
        assert_eq!(index.count(), 1);
    }

    #[test]
    fn test_invalid_glob_pattern() {
        let rasters = tempdir().unwrap();
        let out = tempdir().unwrap();

        let mut index =
            RasterIndex::create(&out.path().join("index.sqlite"), &raster_key_specs()).unwrap();
        let parser = KeyParser::default();

        let err =
            ingest_directory(&mut index, &parser, rasters.path(), "[").unwrap_err();
        assert!(matches!(err, IngestError::InvalidGlobPattern { .. }));
    }
}
