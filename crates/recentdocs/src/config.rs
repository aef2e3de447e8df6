//! Configuration management for recentdocs.
//!
//! This module provides configuration loading and validation using figment,
//! supporting a TOML config file, environment variables, and defaults.

use std::path::PathBuf;

use chrono::format::{Item, StrftimeItems};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::registry::Hive;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name under the platform config directory.
const APP_DIR_NAME: &str = "recentdocs";

/// Prefix for environment variable overrides.
const ENV_PREFIX: &str = "RECENTDOCS_";

/// Key holding the Open/Save dialog history, one subkey per extension.
pub const DEFAULT_KEY_PATH: &str =
    r"Software\Microsoft\Windows\CurrentVersion\Explorer\ComDlg32\OpenSavePidlMRU";

/// Timestamp format used in reports.
pub const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (`RECENTDOCS_`, sections split on `__`, e.g.
///    `RECENTDOCS_REGISTRY__KEY_PATH`)
/// 2. TOML config file at `<config dir>/recentdocs/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where to read recent entries from.
    pub registry: RegistryConfig,
    /// How to turn id lists into paths.
    pub decode: DecodeConfig,
    /// How to print the report.
    pub report: ReportConfig,
}

/// Registry location configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Hive containing the key.
    pub hive: Hive,
    /// Key path below the hive.
    pub key_path: String,
    /// Also read values from subkeys.
    pub recursive: bool,
}

/// Id list decoding configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeConfig {
    /// Which resolver turns id lists into paths.
    pub backend: Backend,
}

/// Id list to path resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// The Windows shell (`SHGetPathFromIDListEx`).
    #[default]
    Shell,
    /// The built-in parser (My Computer rooted lists only).
    Builtin,
}

/// Report output configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Print a block for entries failing the structure check.
    pub show_invalid: bool,
    /// strftime format for timestamps (UTC).
    pub time_format: String,
    /// Print a totals line after the entries.
    pub summary: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            hive: Hive::CurrentUser,
            key_path: DEFAULT_KEY_PATH.to_string(),
            recursive: true,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            show_invalid: true,
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            summary: true,
        }
    }
}

impl Config {
    /// Load configuration, reading `config_path` or the default config file.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);
        Self::from_figment(Figment::new().merge(Toml::file(&config_file)))
    }

    fn from_figment(sources: Figment) -> Result<Self> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(sources)
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(APP_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.registry.key_path.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "registry.key_path must not be empty".to_string(),
            });
        }

        if self.report.time_format.is_empty()
            || StrftimeItems::new(&self.report.time_format).any(|item| matches!(item, Item::Error))
        {
            return Err(Error::ConfigValidation {
                message: format!(
                    "invalid report.time_format: {:?}",
                    self.report.time_format
                ),
            });
        }

        Ok(())
    }

    /// Full path of the configured key, hive included.
    #[must_use]
    pub fn key_display(&self) -> String {
        format!("{}\\{}", self.registry.hive, self.registry.key_path)
    }
}
