//src/config.rs
use comfy_table::Color;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use strum::IntoEnumIterator;
use strum_macros::EnumIter;
use thiserror::Error;

const CONFIG_FILE_NAME: &str = "config.toml";
const APP_CONFIG_DIR: &str = "fitness-tracker";
const CONFIG_ENV_VAR: &str = "FITNESS_TRACKER_CONFIG_DIR"; // Environment variable name

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not determine configuration directory.")]
    CannotDetermineConfigDir,
    #[error("I/O error accessing config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file (TOML): {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("Failed to serialize config data (TOML): {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Invalid color name: {0}")]
    InvalidColor(String),
}

/// Where records are kept.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Sqlite, // Durable file under the data dir
    Memory, // Lost on exit, handy for demos
}

// Define standard colors using strum for easy iteration/parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum StandardColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    DarkGrey,
    Grey,
}

// Helper to convert our enum to comfy_table::Color
impl From<StandardColor> for Color {
    fn from(value: StandardColor) -> Self {
        match value {
            StandardColor::Black => Self::Black,
            StandardColor::Red => Self::Red,
            StandardColor::Green => Self::Green,
            StandardColor::Yellow => Self::Yellow,
            StandardColor::Blue => Self::Blue,
            StandardColor::Magenta => Self::Magenta,
            StandardColor::Cyan => Self::Cyan,
            StandardColor::White => Self::White,
            StandardColor::DarkGrey => Self::DarkGrey,
            StandardColor::Grey => Self::Grey,
        }
    }
}

// Helper to parse a string into our StandardColor enum
pub fn parse_color(color_str: &str) -> Result<StandardColor, ConfigError> {
    for color in StandardColor::iter() {
        if format!("{color:?}").eq_ignore_ascii_case(color_str) {
            return Ok(color);
        }
    }
    Err(ConfigError::InvalidColor(color_str.to_string()))
}

/// Artificial delay before each workout service operation completes.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct LatencyConfig {
    pub fetch_ms: u64,
    pub add_ms: u64,
    pub delete_ms: u64,
    pub stats_ms: u64,
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            fetch_ms: 500,
            add_ms: 500,
            delete_ms: 500,
            stats_ms: 300,
        }
    }
}

impl LatencyConfig {
    pub const fn none() -> Self {
        Self {
            fetch_ms: 0,
            add_ms: 0,
            delete_ms: 0,
            stats_ms: 0,
        }
    }

    pub const fn fetch(&self) -> Duration {
        Duration::from_millis(self.fetch_ms)
    }
    pub const fn add(&self) -> Duration {
        Duration::from_millis(self.add_ms)
    }
    pub const fn delete(&self) -> Duration {
        Duration::from_millis(self.delete_ms)
    }
    pub const fn stats(&self) -> Duration {
        Duration::from_millis(self.stats_ms)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)] // Ensure defaults are used if fields are missing
pub struct AppearanceConfig {
    /// Stand-in for the OS "prefers dark" signal, used until a theme is stored
    pub system_prefers_dark: bool,
    pub header_color: String,      // Table headers in light mode
    pub dark_header_color: String, // Table headers in dark mode
}

impl Default for AppearanceConfig {
    fn default() -> Self {
        Self {
            system_prefers_dark: false,
            header_color: "Green".to_string(),
            dark_header_color: "Cyan".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)] // Ensure defaults are used if fields are missing
pub struct Config {
    pub storage: StorageBackend,
    pub database_path: Option<PathBuf>, // None = data dir default
    pub serialize_writes: bool,         // Guard read-modify-write of the workout list
    pub log_filter: String,             // tracing EnvFilter directive, RUST_LOG wins
    pub latency: LatencyConfig,
    pub appearance: AppearanceConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageBackend::default(),
            database_path: None,
            serialize_writes: true,
            log_filter: "warn".to_string(),
            latency: LatencyConfig::default(),
            appearance: AppearanceConfig::default(),
        }
    }
}

/// Determines the path to the configuration file.
/// Exposed at crate root as `get_config_path_util`
pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    let config_dir_override = std::env::var(CONFIG_ENV_VAR).ok();

    let config_dir_path = if let Some(path_str) = config_dir_override {
        let path = PathBuf::from(path_str);
        if !path.is_dir() {
            tracing::warn!(
                env_var = CONFIG_ENV_VAR,
                path = %path.display(),
                "Config directory override is not a directory, trying to create it"
            );
            fs::create_dir_all(&path)?;
        }
        path
    } else {
        let base_config_dir = dirs::config_dir().ok_or(ConfigError::CannotDetermineConfigDir)?;
        base_config_dir.join(APP_CONFIG_DIR)
    };

    if !config_dir_path.exists() {
        fs::create_dir_all(&config_dir_path)?;
    }

    Ok(config_dir_path.join(CONFIG_FILE_NAME))
}

/// Loads the configuration from the TOML file at the given path.
/// A missing file is created with defaults.
/// Exposed at crate root as `load_config_util`
pub fn load(config_path: &Path) -> Result<Config, ConfigError> {
    if config_path.exists() {
        let config_content = fs::read_to_string(config_path)?;
        // serde(default) fills anything missing
        let config: Config = toml::from_str(&config_content).map_err(ConfigError::TomlParse)?;
        Ok(config)
    } else {
        let default_config = Config::default();
        save(config_path, &default_config)?;
        Ok(default_config)
    }
}

/// Saves the configuration to the TOML file.
/// Exposed at crate root as `save_config_util`
pub fn save(config_path: &Path, config: &Config) -> Result<(), ConfigError> {
    if let Some(parent_dir) = config_path.parent() {
        if !parent_dir.exists() {
            fs::create_dir_all(parent_dir)?;
        }
    }
    let config_content = toml::to_string_pretty(config).map_err(ConfigError::TomlSerialize)?;
    fs::write(config_path, config_content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color_is_case_insensitive() {
        assert_eq!(parse_color("cyan").unwrap(), StandardColor::Cyan);
        assert_eq!(parse_color("DarkGrey").unwrap(), StandardColor::DarkGrey);
        assert!(matches!(
            parse_color("ultraviolet"),
            Err(ConfigError::InvalidColor(_))
        ));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            storage = "memory"

            [latency]
            add_ms = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.latency.add_ms, 10);
        assert_eq!(config.latency.fetch_ms, 500);
        assert_eq!(config.latency.stats_ms, 300);
        assert!(config.serialize_writes);
        assert_eq!(config.appearance, AppearanceConfig::default());
    }

    #[test]
    fn test_latency_durations() {
        let latency = LatencyConfig::default();
        assert_eq!(latency.fetch(), Duration::from_millis(500));
        assert_eq!(latency.stats(), Duration::from_millis(300));
        assert_eq!(LatencyConfig::none().add(), Duration::ZERO);
    }
}
