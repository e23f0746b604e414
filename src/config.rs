//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use crate::temporal::{parse_weekday, AggregationWindowPreferences};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub aggregation: AggregationConfig,

    #[serde(default)]
    pub axis: AxisConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Calendar conventions used by alignment and histograms
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AggregationConfig {
    #[serde(default = "default_week_start")]
    pub week_start: String,

    #[serde(default)]
    pub day_boundary_offset_minutes: i64,
}

fn default_week_start() -> String {
    "mon".to_string()
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            week_start: default_week_start(),
            day_boundary_offset_minutes: 0,
        }
    }
}

/// Axis solver behaviour
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AxisConfig {
    #[serde(default)]
    pub throw_if_none_found: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
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
        }
    }
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

        config.validate()?;
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
        config.validate()?;
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("graphstat").join("config.toml")),
            Some(PathBuf::from("./graphstat.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::debug!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Load an explicit file if given, else search the default locations
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_with_env(path),
            None => Ok(Self::load_default()),
        }
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // Aggregation overrides
        if let Some(week_start) = lookup("GRAPHSTAT_WEEK_START") {
            self.aggregation.week_start = week_start;
        }
        if let Some(offset) = lookup("GRAPHSTAT_DAY_OFFSET_MINUTES") {
            match offset.trim().parse() {
                Ok(minutes) => self.aggregation.day_boundary_offset_minutes = minutes,
                Err(_) => tracing::warn!("Ignoring invalid GRAPHSTAT_DAY_OFFSET_MINUTES: {}", offset),
            }
        }

        // Logging overrides
        if let Some(level) = lookup("GRAPHSTAT_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("GRAPHSTAT_LOG_FORMAT") {
            self.logging.format = format;
        }
    }

    /// Check values that TOML types alone cannot
    pub fn validate(&self) -> Result<(), ConfigError> {
        parse_weekday(&self.aggregation.week_start)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        let minutes = self.aggregation.day_boundary_offset_minutes;
        if !(0..24 * 60).contains(&minutes) {
            return Err(ConfigError::Invalid(format!(
                "day_boundary_offset_minutes must be within 0..1440, got {}",
                minutes
            )));
        }

        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::Invalid(format!(
                "logging.format must be \"pretty\" or \"json\", got {:?}",
                self.logging.format
            )));
        }
        Ok(())
    }

    /// Aggregation preferences described by this config
    pub fn preferences(&self) -> Result<AggregationWindowPreferences, ConfigError> {
        self.validate()?;
        let week_start = parse_weekday(&self.aggregation.week_start)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Ok(AggregationWindowPreferences::new(
            week_start,
            Duration::minutes(self.aggregation.day_boundary_offset_minutes),
        ))
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Graphstat Configuration
#
# Environment variables override these settings:
# - GRAPHSTAT_WEEK_START
# - GRAPHSTAT_DAY_OFFSET_MINUTES
# - GRAPHSTAT_LOG_LEVEL
# - GRAPHSTAT_LOG_FORMAT

[aggregation]
# First day of the week: mon, tue, wed, thu, fri, sat, sun
week_start = "mon"

# Minutes after local midnight at which a new day begins (0..1440)
day_boundary_offset_minutes = 0

[axis]
# Fail instead of falling back to the raw range when no nice axis fits
throw_if_none_found = false

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_parses() {
        let config: Config = toml::from_str(&generate_default_config()).unwrap();
        config.validate().unwrap();

        let prefs = config.preferences().unwrap();
        assert_eq!(prefs, AggregationWindowPreferences::default());
        assert!(!config.axis.throw_if_none_found);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[aggregation]\nweek_start = \"sun\"\nday_boundary_offset_minutes = 240\n\n[axis]\nthrow_if_none_found = true"
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        let prefs = config.preferences().unwrap();
        assert_eq!(prefs.week_start, Weekday::Sun);
        assert_eq!(prefs.day_boundary_offset, Duration::hours(4));
        assert!(config.axis.throw_if_none_found);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.aggregation.week_start, "mon");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[aggregation]\nweek_start = \"someday\"").unwrap();
        assert!(matches!(
            Config::load(file.path()),
            Err(ConfigError::Invalid(_))
        ));

        let mut config = Config::default();
        config.aggregation.day_boundary_offset_minutes = 1440;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[aggregation\nweek_start = ").unwrap();
        assert!(matches!(
            Config::load(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load(&dir.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_overrides() {
        let vars = HashMap::from([
            ("GRAPHSTAT_WEEK_START", "wed"),
            ("GRAPHSTAT_DAY_OFFSET_MINUTES", "90"),
            ("GRAPHSTAT_LOG_FORMAT", "json"),
        ]);

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        let prefs = config.preferences().unwrap();
        assert_eq!(prefs.week_start, Weekday::Wed);
        assert_eq!(prefs.day_boundary_offset, Duration::minutes(90));
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_invalid_offset_override_ignored() {
        let mut config = Config::default();
        config.apply_overrides(|key| {
            (key == "GRAPHSTAT_DAY_OFFSET_MINUTES").then(|| "soon".to_string())
        });
        assert_eq!(config.aggregation.day_boundary_offset_minutes, 0);
    }
}
