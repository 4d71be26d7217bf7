use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 8086;
pub const DEFAULT_AREAS: [&str; 4] = ["SE1", "SE2", "SE3", "SE4"];
pub const DEFAULT_CURRENCY: &str = "SEK";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Connection settings for the InfluxDB target plus the price areas and
/// currency to request from Nord Pool.
#[derive(Clone, PartialEq, Deserialize)]
pub struct Config {
    pub hostname: String,
    pub username: String,
    pub password: String,
    pub database: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_areas")]
    pub areas: Vec<String>,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_areas() -> Vec<String> {
    DEFAULT_AREAS.iter().map(|e| e.to_string()).collect()
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

impl Config {
    /// Read and validate a json config file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        contents.parse()
    }

    /// The connection is always made over TLS.
    pub fn influx_url(&self) -> String {
        format!("https://{}:{}", self.hostname, self.port)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("hostname", &self.hostname),
            ("username", &self.username),
            ("database", &self.database),
            ("currency", &self.currency),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("'{}' must not be empty", key)));
            }
        }
        if self.areas.is_empty() {
            return Err(ConfigError::Invalid(
                "'areas' needs at least one price area".to_string(),
            ));
        }
        Ok(())
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let config: Config = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}

// Keep the password out of debug logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Config")
            .field("hostname", &self.hostname)
            .field("username", &self.username)
            .field("password", &"***")
            .field("database", &self.database)
            .field("port", &self.port)
            .field("areas", &self.areas)
            .field("currency", &self.currency)
            .finish()
    }
}
