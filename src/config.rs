use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const CONFIG_ENV: &str = "MOVIEDEKHO_CONFIG";
const API_KEY_ENV: &str = "OMDB_API_KEY";
const DEFAULT_CONFIG_FILE: &str = "moviedekho.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address the HTTP server binds to.
    pub bind_addr: String,
    /// Where the preferences database lives. A temporary database is used when unset.
    pub data_dir: Option<PathBuf>,
    pub omdb: OmdbConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OmdbConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub movies_per_page: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind_addr: "127.0.0.1:8080".to_owned(),
            data_dir: None,
            omdb: OmdbConfig::default(),
            ui: UiConfig::default(),
        }
    }
}

impl Default for OmdbConfig {
    fn default() -> Self {
        OmdbConfig {
            base_url: "https://www.omdbapi.com/".to_owned(),
            api_key: String::new(),
            timeout_seconds: 10,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig { movies_per_page: 3 }
    }
}

impl Config {
    /// `$MOVIEDEKHO_CONFIG`, or `moviedekho.toml` in the working directory.
    pub fn config_path() -> PathBuf {
        std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    /// Loads the config file if present, applies `$OMDB_API_KEY` and validates.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(&Self::config_path())?;
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            config.omdb.api_key = key;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::info!("no config at {}, using defaults", path.display());
            return Ok(Config::default());
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_owned(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bind_addr.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "bind_addr must not be empty".to_owned(),
            });
        }
        if self.omdb.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError {
                message: "omdb.timeout_seconds must be positive".to_owned(),
            });
        }
        if self.ui.movies_per_page == 0 {
            return Err(ConfigError::ValidationError {
                message: "ui.movies_per_page must be positive".to_owned(),
            });
        }
        if self.omdb.api_key.is_empty() {
            log::warn!("no OMDb API key configured, every lookup will come back empty");
        }
        Ok(())
    }
}
