//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides, plus the
//! JSON indicator list that drives metadata extraction.

use crate::ingest::DEFAULT_RASTER_NAME_PATTERN;
use crate::metadata::{Units, DEFAULT_YEAR_RANGE};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ingest: IngestConfig,

    #[serde(default)]
    pub metadata: MetadataConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Raster ingestion configuration
#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    /// Glob selecting raster files in the spatial results directory
    #[serde(default = "default_raster_glob")]
    pub raster_glob: String,

    /// Filename grammar with `title` and `year` capture groups
    #[serde(default = "default_raster_name_pattern")]
    pub raster_name_pattern: String,

    /// File name of the generated index database
    #[serde(default = "default_index_db_name")]
    pub index_db_name: String,
}

fn default_raster_glob() -> String {
    "*.tiff".to_string()
}

fn default_raster_name_pattern() -> String {
    DEFAULT_RASTER_NAME_PATTERN.to_string()
}

fn default_index_db_name() -> String {
    "rasters.sqlite".to_string()
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            raster_glob: default_raster_glob(),
            raster_name_pattern: default_raster_name_pattern(),
            index_db_name: default_index_db_name(),
        }
    }
}

/// Metadata extraction configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MetadataConfig {
    /// First simulated year included in every series
    #[serde(default = "default_start_year")]
    pub start_year: i32,

    /// Last simulated year included in every series
    #[serde(default = "default_end_year")]
    pub end_year: i32,

    /// Reporting unit for aggregated values
    #[serde(default)]
    pub units: Units,
}

fn default_start_year() -> i32 {
    DEFAULT_YEAR_RANGE.0
}

fn default_end_year() -> i32 {
    DEFAULT_YEAR_RANGE.1
}

impl MetadataConfig {
    /// Inclusive year range as a pair
    pub fn year_range(&self) -> (i32, i32) {
        (self.start_year, self.end_year)
    }
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            start_year: default_start_year(),
            end_year: default_end_year(),
            units: Units::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

/// One configured indicator: which database quantity to extract and the
/// display title the frontend shows for it
#[derive(Debug, Clone, Deserialize)]
pub struct IndicatorConfig {
    /// Logical indicator key resolved against the results schema
    pub database_indicator: String,

    /// Display name; defaults to the indicator key when absent
    #[serde(default)]
    pub title: Option<String>,
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("canopy").join("config.toml")),
            Some(PathBuf::from("/etc/canopy/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        // Ingest overrides
        if let Ok(glob) = std::env::var("CANOPY_RASTER_GLOB") {
            self.ingest.raster_glob = glob;
        }
        if let Ok(db_name) = std::env::var("CANOPY_INDEX_DB") {
            self.ingest.index_db_name = db_name;
        }

        // Metadata overrides
        if let Ok(year) = std::env::var("CANOPY_START_YEAR") {
            if let Ok(y) = year.parse() {
                self.metadata.start_year = y;
            }
        }
        if let Ok(year) = std::env::var("CANOPY_END_YEAR") {
            if let Ok(y) = year.parse() {
                self.metadata.end_year = y;
            }
        }

        // Logging overrides
        if let Ok(level) = std::env::var("CANOPY_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("CANOPY_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ingest: IngestConfig::default(),
            metadata: MetadataConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid indicator config {path:?}: {error}")]
    Invalid { path: PathBuf, error: String },
}

/// Load the ordered indicator list from a JSON file.
///
/// The file holds an array of records with a required `database_indicator`
/// and an optional `title`.
pub fn load_indicators(path: &Path) -> Result<Vec<IndicatorConfig>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;

    let indicators: Vec<IndicatorConfig> =
        serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

    for indicator in &indicators {
        if indicator.database_indicator.is_empty() {
            return Err(ConfigError::Invalid {
                path: path.to_path_buf(),
                error: "database_indicator must not be empty".to_string(),
            });
        }
    }

    Ok(indicators)
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Canopy Configuration
#
# Environment variables override these settings:
# - CANOPY_RASTER_GLOB
# - CANOPY_INDEX_DB
# - CANOPY_START_YEAR
# - CANOPY_END_YEAR
# - CANOPY_LOG_LEVEL
# - CANOPY_LOG_FORMAT

[ingest]
# Glob selecting raster files in the spatial results directory
raster_glob = "*.tiff"

# Filename grammar with `title` and `year` capture groups
raster_name_pattern = '^(?P<title>\w+)_(?P<year>\d{4})\.tiff$'

# File name of the generated index database
index_db_name = "rasters.sqlite"

[metadata]
# Inclusive simulation year range reported in every series
start_year = 1999
end_year = 2020

# Reporting unit: tc (tonnes), ktc (kilotonnes), mtc (megatonnes)
units = "tc"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"

# Optional log file path
# file = "/var/log/canopy/canopy.log"
"#
    .to_string()
}
