/// Configuration loading
///
/// Configuration is read from a TOML file, by default
/// `<config_dir>/monkpoint/config.toml`. A missing file means defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::calendar::TimezonePolicy;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Main configuration struct
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub calendar: CalendarConfig,

    #[serde(default)]
    pub user: UserConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub database: DatabaseConfig,
}

/// Calendar and analytics settings
#[derive(Debug, Clone, Deserialize)]
pub struct CalendarConfig {
    /// Timezone used when neither the request nor the user profile has one
    #[serde(default = "default_timezone")]
    pub default_timezone: String,

    /// Days of history materialized for streak recomputation
    #[serde(default = "default_streak_lookback_days")]
    pub streak_lookback_days: u32,

    #[serde(default)]
    pub timezone_policy: TimezonePolicy,

    /// Default window length for the dashboard
    #[serde(default = "default_dashboard_period_days")]
    pub dashboard_period_days: u32,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            default_timezone: default_timezone(),
            streak_lookback_days: default_streak_lookback_days(),
            timezone_policy: TimezonePolicy::default(),
            dashboard_period_days: default_dashboard_period_days(),
        }
    }
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_streak_lookback_days() -> u32 {
    30
}

fn default_dashboard_period_days() -> u32 {
    7
}

/// The local profile the server acts for
#[derive(Debug, Clone, Deserialize)]
pub struct UserConfig {
    #[serde(default = "default_display_name")]
    pub display_name: String,

    /// Overrides `calendar.default_timezone` for this profile
    pub timezone: Option<String>,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            display_name: default_display_name(),
            timezone: None,
        }
    }
}

fn default_display_name() -> String {
    "MonkPoint user".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct DatabaseConfig {
    /// SQLite file; `--database` on the command line wins
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load from `path`, or from the default location when `None`
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::config_path() {
                Some(path) => path,
                None => return Ok(Config::default()),
            },
        };

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&config_path).map_err(|source| ConfigError::Read {
            path: config_path.clone(),
            source,
        })?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.calendar.streak_lookback_days == 0 {
            return Err(ConfigError::Invalid(
                "calendar.streak_lookback_days must be at least 1".to_string(),
            ));
        }
        if !(1..=365).contains(&self.calendar.dashboard_period_days) {
            return Err(ConfigError::Invalid(
                "calendar.dashboard_period_days must be between 1 and 365".to_string(),
            ));
        }
        Ok(())
    }

    /// Timezone for the local profile
    pub fn user_timezone(&self) -> &str {
        self.user
            .timezone
            .as_deref()
            .unwrap_or(&self.calendar.default_timezone)
    }

    /// `<config_dir>/monkpoint/config.toml`
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("monkpoint").join("config.toml"))
    }
}
