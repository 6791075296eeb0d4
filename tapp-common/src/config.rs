//! Configuration loading and resolution
//!
//! Config file resolution priority:
//! 1. Command-line argument (highest priority)
//! 2. `TAPP_CONFIG` environment variable
//! 3. `<config dir>/tapp/import.toml`
//! 4. Compiled defaults (fallback)
//!
//! A missing config file is never fatal: a warning is logged and the
//! compiled defaults are used.

use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "TAPP_CONFIG";

/// Default fuzzy header-matching threshold
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.7;

/// Default wage-chunk split boundary (January 1st)
pub const DEFAULT_WAGE_CHUNK_BOUNDARY: &str = "01-01";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Import behaviour (optional)
    #[serde(default)]
    pub import: ImportSettings,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Import settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportSettings {
    /// Minimum similarity for a fuzzy column-header match, in (0, 1]
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,

    /// Calendar boundary (`MM-DD`) at which assignment hours are split
    /// into separate wage chunks
    #[serde(default = "default_wage_chunk_boundary")]
    pub wage_chunk_boundary: String,

    /// Extra header aliases per entity: `entity -> (header -> field)`
    #[serde(default)]
    pub key_aliases: BTreeMap<String, BTreeMap<String, String>>,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            similarity_threshold: default_similarity_threshold(),
            wage_chunk_boundary: default_wage_chunk_boundary(),
            key_aliases: BTreeMap::new(),
        }
    }
}

impl ImportSettings {
    /// Parse `wage_chunk_boundary` into `(month, day)`
    pub fn boundary_month_day(&self) -> Result<(u32, u32)> {
        parse_month_day(&self.wage_chunk_boundary)
    }

    /// Aliases configured for one entity (empty if none)
    pub fn aliases_for(&self, entity: &str) -> impl Iterator<Item = (&str, &str)> {
        self.key_aliases
            .get(entity)
            .into_iter()
            .flat_map(|m| m.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }
}

impl TomlConfig {
    /// Reject values the import pipeline cannot work with
    pub fn validate(&self) -> Result<()> {
        let threshold = self.import.similarity_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(Error::Config(format!(
                "similarity_threshold must be in (0, 1], got {}",
                threshold
            )));
        }
        self.import.boundary_month_day()?;
        Ok(())
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_similarity_threshold() -> f64 {
    DEFAULT_SIMILARITY_THRESHOLD
}

fn default_wage_chunk_boundary() -> String {
    DEFAULT_WAGE_CHUNK_BOUNDARY.to_string()
}

/// Parse a `MM-DD` calendar boundary
///
/// February 29th is rejected since it does not occur every year.
pub fn parse_month_day(text: &str) -> Result<(u32, u32)> {
    let invalid = || Error::Config(format!("Invalid month-day boundary \"{}\"", text));

    let (month, day) = text.trim().split_once('-').ok_or_else(invalid)?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    let day: u32 = day.parse().map_err(|_| invalid())?;

    // 2001 is not a leap year
    NaiveDate::from_ymd_opt(2001, month, day).ok_or_else(invalid)?;
    Ok((month, day))
}

/// Platform config file location (`~/.config/tapp/import.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tapp").join("import.toml"))
}

/// Pick the config file to read, following the priority order above
///
/// Returns `None` when no candidate exists.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Platform config directory
    default_config_path().filter(|p| p.exists())
}

/// Read and validate a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))?;
    config.validate()?;
    Ok(config)
}

/// Resolve and load configuration, degrading to defaults if the file is missing
///
/// A file that exists but fails to parse or validate is an error.
pub fn load_config(cli_arg: Option<&Path>) -> Result<TomlConfig> {
    match resolve_config_path(cli_arg) {
        Some(path) if path.exists() => {
            let config = load_toml_config(&path)?;
            info!("Loaded configuration from {}", path.display());
            Ok(config)
        }
        Some(path) => {
            warn!(
                "Config file {} not found, using compiled defaults",
                path.display()
            );
            Ok(TomlConfig::default())
        }
        None => {
            debug!("No config file found, using compiled defaults");
            Ok(TomlConfig::default())
        }
    }
}

/// Write a config file atomically (temp file + rename)
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut temp_name = OsString::from(path.as_os_str());
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    std::fs::write(&temp_path, content)?;
    std::fs::rename(&temp_path, path)?;
    Ok(())
}
