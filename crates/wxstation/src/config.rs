//! Configuration management for wxstation.
//!
//! Configuration loading and validation using figment, supporting TOML
//! config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "wxstation";

/// Default archive database file name.
const DATABASE_FILE_NAME: &str = "wx-data.db";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `WXSTATION_`)
/// 2. TOML config file at `~/.config/wxstation/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Station configuration.
    pub station: StationConfig,
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Report configuration.
    pub report: ReportConfig,
}

/// Station-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StationConfig {
    /// Station elevation above sea level, in meters.
    ///
    /// Used for the sea-level pressure correction; 0 disables it.
    pub elevation: f64,
    /// Seconds between polling cycles.
    pub poll_interval_secs: u64,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the archive database.
    /// Defaults to `~/.local/share/wxstation/wx-data.db`
    pub database_path: Option<PathBuf>,
    /// Create the archive database if it does not exist yet.
    ///
    /// When false, a missing archive makes the station run without
    /// persistence instead.
    pub create_missing: bool,
}

/// Report-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Include the indoor section in generated reports.
    pub include_indoor: bool,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            elevation: 0.0,
            poll_interval_secs: 60,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: None, // Will be resolved to default at runtime
            create_missing: true,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            include_indoor: false,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file).nested())
            .merge(Env::prefixed("WXSTATION_").split("_"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.station.poll_interval_secs == 0 {
            return Err(Error::ConfigValidation {
                message: "poll_interval_secs must be greater than 0".to_string(),
            });
        }

        // Dead Sea shore to the highest inhabited settlements
        if !self.station.elevation.is_finite()
            || !(-500.0..=9000.0).contains(&self.station.elevation)
        {
            return Err(Error::ConfigValidation {
                message: format!(
                    "elevation ({}) must be between -500 and 9000 meters",
                    self.station.elevation
                ),
            });
        }

        Ok(())
    }

    /// Get the archive database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the polling interval as a Duration.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.station.poll_interval_secs)
    }
}
