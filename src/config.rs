//! Resolver configuration loaded from `~/.config/vidresolve/config.toml`.
//!
//! The configuration is read once at startup and shared read-only behind an
//! `Arc` by every resolution; nothing mutates it per request.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::fingerprint::DEFAULT_USER_AGENT;

/// Referer the catalog site sends with embed requests.
pub const DEFAULT_REFERER: &str = "https://allmanga.to";

/// Upper bound for `max_redirects`.
pub const MAX_REDIRECTS_CAP: usize = 10;

/// Errors raised while loading a config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Limits and identity used for every outbound fetch.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Whole-request deadline in seconds.
    pub timeout_secs: u64,
    /// TCP/TLS connect deadline in seconds.
    pub connect_timeout_secs: u64,
    /// Redirects followed before giving up with `TOO_MANY_REDIRECTS`.
    pub max_redirects: usize,
    /// Default User-Agent for page fetches and playback headers.
    pub user_agent: String,
    /// Referer sent when fetching embed pages of unknown hosts.
    pub referer: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            connect_timeout_secs: 5,
            max_redirects: 5,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            referer: DEFAULT_REFERER.to_string(),
        }
    }
}

impl ResolverConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from an explicit path, or from the default location.
    ///
    /// Returns defaults if no path was given and the default file doesn't
    /// exist (the config file is optional).
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let default = config_path();
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;

        Self::from_toml_str(&content, &path)
    }

    /// Check limits after loading or applying overrides.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "timeout_secs",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.connect_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "connect_timeout_secs",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.max_redirects > MAX_REDIRECTS_CAP {
            return Err(ConfigError::Invalid {
                field: "max_redirects",
                reason: format!("must be at most {MAX_REDIRECTS_CAP}"),
            });
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "user_agent",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Return the path to the default config file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vidresolve")
        .join("config.toml")
}
