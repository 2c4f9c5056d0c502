//! Application configuration.
//!
//! Values are looked up by section and key, first in the environment
//! (`LIVELY_LIGHTS_<SECTION>_<KEY>`), then in an optional TOML file
//! (`~/.lively-lights.toml` by default):
//!
//! ```toml
//! [bridge]
//! ip = "192.168.1.2"
//! username = "abcdef0123456789"
//!
//! [location]
//! latitude = 49.455556
//! longitude = 11.078611
//! timezone = "Europe/Berlin"
//! elevation = 309
//!
//! [logging]
//! level = "info"
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing_subscriber::filter::LevelFilter;

use crate::environment::Location;
use crate::errors::Error;

type Result<T> = std::result::Result<T, Error>;

pub const DEFAULT_ENV_PREFIX: &str = "LIVELY_LIGHTS";
const DEFAULT_FILE_NAME: &str = ".lively-lights.toml";

#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// One step more verbose per `verbosity`, stopping at trace.
    pub fn raised(self, verbosity: u8) -> Self {
        let mut level = self;
        for _ in 0..verbosity {
            level = match level {
                LogLevel::Error => LogLevel::Warn,
                LogLevel::Warn => LogLevel::Info,
                LogLevel::Info => LogLevel::Debug,
                LogLevel::Debug | LogLevel::Trace => LogLevel::Trace,
            };
        }
        level
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

/// Configuration from the environment and an optional file.
#[derive(Debug, Clone, Default)]
pub struct Configuration {
    file: toml::Table,
    prefix: String,
    environment: HashMap<String, String>,
}

impl Configuration {
    /// Load from `path`, or from `~/.lively-lights.toml` if it exists.
    ///
    /// An explicitly given file must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let environment = std::env::vars().collect();
        let text = match path {
            Some(path) => Some(read(path)?),
            None => match default_path() {
                Some(path) if path.exists() => Some(read(&path)?),
                _ => None,
            },
        };
        Self::from_parts(text.as_deref(), DEFAULT_ENV_PREFIX, environment)
    }

    /// Build from file contents and an environment snapshot.
    pub fn from_parts(
        text: Option<&str>,
        prefix: &str,
        environment: HashMap<String, String>,
    ) -> Result<Self> {
        let file = match text {
            Some(text) => toml::from_str(text).map_err(Error::TomlLoad)?,
            None => toml::Table::new(),
        };
        Ok(Configuration {
            file,
            prefix: prefix.to_string(),
            environment,
        })
    }

    fn env_key(&self, section: &str, key: &str) -> String {
        format!(
            "{}_{}_{}",
            self.prefix,
            section.to_uppercase(),
            key.to_uppercase()
        )
    }

    /// The value as a string, environment first.
    pub fn get_str(&self, section: &str, key: &str) -> Result<String> {
        if let Some(value) = self.environment.get(&self.env_key(section, key)) {
            return Ok(value.clone());
        }
        let value = self
            .file
            .get(section)
            .and_then(|section| section.get(key))
            .ok_or_else(|| Error::missing_config(section, key))?;
        Ok(match value {
            toml::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    pub fn get_f64(&self, section: &str, key: &str) -> Result<f64> {
        let value = self.get_str(section, key)?;
        value.trim().parse().map_err(|_| {
            Error::invalid_parameter(&format!("{section}.{key}"), "a number", &value)
        })
    }

    pub fn bridge_address(&self) -> Result<String> {
        self.get_str("bridge", "ip")
    }

    pub fn bridge_username(&self) -> Result<String> {
        self.get_str("bridge", "username")
    }

    /// Elevation is optional and defaults to sea level.
    pub fn location(&self) -> Result<Location> {
        let elevation = match self.get_f64("location", "elevation") {
            Err(Error::MissingConfigValue { .. }) => 0.0,
            other => other?,
        };
        Ok(Location {
            latitude: self.get_f64("location", "latitude")?,
            longitude: self.get_f64("location", "longitude")?,
            timezone: self.get_str("location", "timezone")?,
            elevation,
        })
    }

    /// Info unless configured.
    pub fn log_level(&self) -> Result<LogLevel> {
        match self.get_str("logging", "level") {
            Ok(level) => level.trim().to_lowercase().parse().map_err(|_| {
                Error::invalid_parameter(
                    "logging.level",
                    "one of trace, debug, info, warn, error",
                    &level,
                )
            }),
            Err(Error::MissingConfigValue { .. }) => Ok(LogLevel::default()),
            Err(e) => Err(e),
        }
    }
}

fn default_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(DEFAULT_FILE_NAME))
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| Error::io(&format!("read {}", path.display()), e))
}
