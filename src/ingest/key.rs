//! Raster filename grammar
//!
//! GCBM spatial output files are named `<title>_<year>.tiff`, where the
//! title is one or more word characters and the year is exactly four
//! digits. The parser derives the index key from the filename alone; the
//! raster contents are opaque to this backend.

use crate::ingest::error::{IngestError, IngestResult};
use regex::Regex;

/// Default grammar for GCBM raster filenames
pub const DEFAULT_RASTER_NAME_PATTERN: &str = r"^(?P<title>\w+)_(?P<year>\d{4})\.tiff$";

/// Structured attribute key derived from a raster filename
///
/// Derived once per file at ingestion time; immutable thereafter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterKey {
    pub title: String,
    pub year: String,
}

impl RasterKey {
    /// Key values in index schema order
    pub fn values(&self) -> [&str; 2] {
        [&self.title, &self.year]
    }
}

/// Parses raster filenames against the naming grammar
#[derive(Debug)]
pub struct KeyParser {
    pattern: Regex,
}

impl KeyParser {
    /// Compile a parser from a pattern with `title` and `year` capture groups
    pub fn new(pattern: &str) -> IngestResult<Self> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }

    /// Parse a filename into its key, or fail the run.
    ///
    /// No partial-directory tolerance: one bad name aborts ingestion.
    pub fn parse(&self, filename: &str) -> IngestResult<RasterKey> {
        let captures =
            self.pattern
                .captures(filename)
                .ok_or_else(|| IngestError::NamingConvention {
                    filename: filename.to_string(),
                })?;

        let group = |name: &str| {
            captures
                .name(name)
                .map(|m| m.as_str().to_string())
                .ok_or_else(|| IngestError::NamingConvention {
                    filename: filename.to_string(),
                })
        };

        Ok(RasterKey {
            title: group("title")?,
            year: group("year")?,
        })
    }
}

impl Default for KeyParser {
    fn default() -> Self {
        Self {
            pattern: Regex::new(DEFAULT_RASTER_NAME_PATTERN).expect("default pattern compiles"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_names() {
        let parser = KeyParser::default();

        let key = parser.parse("forest_2010.tiff").unwrap();
        assert_eq!(key.title, "forest");
        assert_eq!(key.year, "2010");

        let key = parser.parse("soil_2015.tiff").unwrap();
        assert_eq!(key.values(), ["soil", "2015"]);
    }

    #[test]
    fn test_title_may_contain_underscores() {
        let parser = KeyParser::default();
        let key = parser.parse("above_ground_biomass_2003.tiff").unwrap();
        assert_eq!(key.title, "above_ground_biomass");
        assert_eq!(key.year, "2003");
    }

    #[test]
    fn test_rejects_missing_year() {
        let parser = KeyParser::default();
        let err = parser.parse("bad-name.tiff").unwrap_err();
        assert!(matches!(
            err,
            IngestError::NamingConvention { filename } if filename == "bad-name.tiff"
        ));
    }

    #[test]
    fn test_rejects_short_year() {
        let parser = KeyParser::default();
        assert!(parser.parse("forest_201.tiff").is_err());
    }

    #[test]
    fn test_rejects_wrong_extension() {
        let parser = KeyParser::default();
        assert!(parser.parse("forest_2010.tif").is_err());
        assert!(parser.parse("forest_2010.tiff.bak").is_err());
    }

    #[test]
    fn test_rejects_hyphenated_title() {
        let parser = KeyParser::default();
        assert!(parser.parse("old-growth_2010.tiff").is_err());
    }

    #[test]
    fn test_custom_pattern() {
        let parser = KeyParser::new(r"^(?P<title>\w+)-(?P<year>\d{4})\.tif$").unwrap();
        let key = parser.parse("forest-2010.tif").unwrap();
        assert_eq!(key.title, "forest");
        assert_eq!(key.year, "2010");
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(matches!(
            KeyParser::new("(unclosed").unwrap_err(),
            IngestError::InvalidNamePattern(_)
        ));
    }
}
