//! Grouping configuration.
//!
//! The defaults live in `config/default.toml` and are embedded at compile
//! time. A user-supplied file only needs to list the values it overrides;
//! every missing field falls back to [`GroupingConfig::default`].

use std::path::{Path, PathBuf};

use realty_address::{AddressConfig, CoordinateConfig, LocalityConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_TOML: &str = include_str!("../config/default.toml");

/// Largest supported coordinate-bucket precision. Eight or more decimal
/// places is millimetre resolution and would never merge anything.
pub const MAX_COORDINATE_PRECISION: u32 = 7;

/// Errors loading grouping or tuning configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupingConfig {
    /// Decimal places coordinates are rounded to for the coordinate-bucket
    /// fallback key.
    pub coordinate_precision: u32,
    /// Distance in metres above which a cluster is reported as a likely
    /// mis-grouping.
    pub spread_warning_m: f64,
    pub address: AddressConfig,
    pub locality: LocalityConfig,
    pub coordinates: CoordinateConfig,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            coordinate_precision: 3,
            spread_warning_m: 1000.0,
            address: AddressConfig::default(),
            locality: LocalityConfig::default(),
            coordinates: CoordinateConfig::default(),
        }
    }
}

impl GroupingConfig {
    /// Returns the configuration embedded from `config/default.toml`.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is malformed (covered by tests).
    #[must_use]
    pub fn embedded() -> Self {
        Self::from_toml_str(DEFAULT_TOML)
            .unwrap_or_else(|e| panic!("Failed to parse default.toml: {e}"))
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// * If the document is not valid TOML for this schema
    /// * If a value is out of range
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// * If the file cannot be read
    /// * If the contents fail [`Self::from_toml_str`]
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let toml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loaded grouping config from {}", path.display());
        Self::from_toml_str(&toml)
    }

    /// Loads `path` when given, otherwise the embedded defaults.
    ///
    /// # Errors
    ///
    /// * If `path` is given and fails [`Self::load`]
    pub fn load_or_embedded(path: Option<&Path>) -> Result<Self, ConfigError> {
        path.map_or_else(|| Ok(Self::embedded()), Self::load)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// * If `coordinate_precision` exceeds [`MAX_COORDINATE_PRECISION`]
    /// * If `spread_warning_m` is not a positive finite number
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.coordinate_precision > MAX_COORDINATE_PRECISION {
            return Err(ConfigError::Invalid(format!(
                "coordinate_precision must be at most {MAX_COORDINATE_PRECISION}, got {}",
                self.coordinate_precision
            )));
        }
        if !(self.spread_warning_m.is_finite() && self.spread_warning_m > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "spread_warning_m must be positive, got {}",
                self.spread_warning_m
            )));
        }
        Ok(())
    }
}
