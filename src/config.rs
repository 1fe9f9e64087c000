use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use crate::cache::CacheStore;
use crate::directory::AtletaRepository;
use crate::remote::ApiClient;
use crate::session::SessionStore;

/// Where record operations are served from. Resolved once at start-up and
/// fixed for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Cache only; no network calls are ever attempted.
    Local,
    /// Remote-backed with the cache as fallback.
    Remote,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::Local => write!(f, "local"),
            Provider::Remote => write!(f, "remote"),
        }
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Provider::Local),
            "remote" => Ok(Provider::Remote),
            other => Err(format!("unknown provider: {}", other)),
        }
    }
}

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the local cache files
    pub data_dir: PathBuf,
    /// Base URL of the registry API; empty means none configured
    pub api_url: String,
    /// Explicit provider choice; inferred from `api_url` when unset
    pub provider: Option<Provider>,
}

impl Default for Config {
    fn default() -> Self {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        Self {
            data_dir: PathBuf::from(&home).join(".estrelas"),
            api_url: String::new(),
            provider: None,
        }
    }
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            config = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;
        }

        if let Ok(data_dir) = std::env::var("ESTRELAS_DATA_DIR") {
            config.data_dir = PathBuf::from(data_dir);
        }
        if let Ok(api_url) = std::env::var("ESTRELAS_API_URL") {
            config.api_url = api_url;
        }
        if let Ok(provider) = std::env::var("ESTRELAS_PROVIDER") {
            config.provider = Some(
                provider
                    .parse()
                    .map_err(|e: String| ConfigError::InvalidValue(e))?,
            );
        }

        Ok(config)
    }

    /// Default config file path: ~/.config/estrelas/config.yaml
    pub fn default_config_path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home)
            .join(".config")
            .join("estrelas")
            .join("config.yaml")
    }

    /// The effective provider: an explicit setting wins, otherwise remote
    /// when an API URL is configured.
    pub fn resolved_provider(&self) -> Provider {
        self.provider.unwrap_or(if self.api_url.is_empty() {
            Provider::Local
        } else {
            Provider::Remote
        })
    }

    /// Wires up the repository for this configuration.
    pub fn repository(&self) -> AtletaRepository {
        let cache = CacheStore::new(&self.data_dir);
        let session = SessionStore::new(cache.clone());
        let remote = match self.resolved_provider() {
            Provider::Remote => Some(ApiClient::new(self.api_url.clone())),
            Provider::Local => None,
        };
        AtletaRepository::new(cache, session, remote)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
    InvalidValue(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::InvalidValue(e) => write!(f, "Invalid config value: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}
