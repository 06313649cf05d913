//! Dashboard configuration loaded from `hotspot_map.toml`.
//!
//! Every field is optional; anything missing falls back to the dashboard
//! defaults. The dataset path can be overridden with `ACCIDENTS_CSV` and
//! the config file location with `HOTSPOT_MAP_CONFIG`.

use std::path::{Path, PathBuf};

use hotspot_map_accident_models::TimeWindow;
use hotspot_map_hotspot_models::{
    ClusterParams, ClusterParamsError, DEFAULT_MIN_SAMPLES, DEFAULT_RADIUS_METERS, HotspotQuery,
};
use serde::{Deserialize, Serialize};

/// Config file read when `HOTSPOT_MAP_CONFIG` is unset.
pub const DEFAULT_CONFIG_FILE: &str = "hotspot_map.toml";

/// Accident table read when neither the config nor the environment names
/// one.
pub const DEFAULT_DATASET_PATH: &str = "Miami_Accidents_Cleaned.csv";

/// Environment variable pointing at the config file.
pub const CONFIG_PATH_ENV: &str = "HOTSPOT_MAP_CONFIG";

/// Environment variable overriding [`DashboardConfig::dataset_path`].
pub const DATASET_PATH_ENV: &str = "ACCIDENTS_CSV";

/// Errors reading the dashboard configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("Failed to read config {path}: {source}")]
    Io {
        /// Config file path.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`DashboardConfig`].
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configured default clustering parameters are out of range.
    #[error("Invalid default parameters: {0}")]
    InvalidDefaults(#[from] ClusterParamsError),
}

/// Initial values for the dashboard controls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryDefaults {
    /// Starting time-of-day window.
    pub time_window: TimeWindow,
    /// Starting search radius in meters.
    pub radius_meters: f64,
    /// Starting minimum cluster size.
    pub min_samples: usize,
}

impl Default for QueryDefaults {
    fn default() -> Self {
        Self {
            time_window: TimeWindow::AllDay,
            radius_meters: DEFAULT_RADIUS_METERS,
            min_samples: DEFAULT_MIN_SAMPLES,
        }
    }
}

impl QueryDefaults {
    /// The defaults as a query.
    #[must_use]
    pub const fn query(&self) -> HotspotQuery {
        HotspotQuery {
            time_window: self.time_window,
            params: ClusterParams {
                radius_meters: self.radius_meters,
                min_samples: self.min_samples,
            },
        }
    }
}

/// Top-level dashboard configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Accident table to load.
    pub dataset_path: PathBuf,
    /// Initial control values.
    pub defaults: QueryDefaults,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from(DEFAULT_DATASET_PATH),
            defaults: QueryDefaults::default(),
        }
    }
}

impl DashboardConfig {
    /// Parses a config from TOML text and validates the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the text is not valid TOML or the
    /// defaults are out of range.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::de::from_str(text)?;
        config.defaults.query().params.validate()?;
        Ok(config)
    }

    /// Reads the config file at `path`.
    ///
    /// A missing file yields the defaults unless `required` is set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn from_file(path: &Path, required: bool) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(text) => {
                log::debug!("Reading config from {}", path.display());
                Self::from_toml_str(&text)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => {
                log::debug!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Io {
                path: path.display().to_string(),
                source,
            }),
        }
    }

    /// Loads the config from `HOTSPOT_MAP_CONFIG` (which must exist) or
    /// `hotspot_map.toml` (which may be absent), then applies the
    /// `ACCIDENTS_CSV` override.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the config file cannot be read or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let config = match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => Self::from_file(Path::new(&path), true)?,
            None => Self::from_file(Path::new(DEFAULT_CONFIG_FILE), false)?,
        };
        Ok(config.with_dataset_override(std::env::var_os(DATASET_PATH_ENV).map(PathBuf::from)))
    }

    /// Replaces the dataset path when `dataset` is set.
    #[must_use]
    pub fn with_dataset_override(mut self, dataset: Option<PathBuf>) -> Self {
        if let Some(dataset) = dataset {
            self.dataset_path = dataset;
        }
        self
    }
}
