//! Configuration management for iksm-token

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

/// How concurrent misses for one token are resolved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CacheStrategy {
    /// Lock winner fetches, everybody else polls the cache
    #[default]
    SingleFlight,
    /// Waiters wait out the lock, then re-check the cache before fetching
    Mutex,
}

impl std::fmt::Display for CacheStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheStrategy::SingleFlight => write!(f, "single-flight"),
            CacheStrategy::Mutex => write!(f, "mutex"),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Shared Redis server (REDIS_URL takes precedence)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redis_url: Option<String>,

    /// Base URL of the login upstream; `/bullet` is appended
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_url: Option<String>,

    /// Cache strategy for token requests
    #[serde(default)]
    pub strategy: CacheStrategy,
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".iksm-token").join("config.yaml"))
    }

    /// Load configuration from `path`, or the default location.
    ///
    /// A missing file is not an error: everything can come from flags and
    /// environment.
    pub fn load_at(path: Option<&str>) -> Result<Self> {
        let path = match path {
            Some(p) => PathBuf::from(p),
            None => Self::default_path()?,
        };

        if !path.exists() {
            log::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents =
            serde_yaml::to_string(self).map_err(|e| ConfigError::SaveError(e.to_string()))?;
        std::fs::write(path, contents)?;

        // The Redis URL may embed a password
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(path, perms)?;
        }

        Ok(())
    }

    /// Apply a runtime Redis URL (flag or REDIS_URL) over the file value.
    pub fn with_redis_url(mut self, redis_url: Option<&str>) -> Self {
        if let Some(url) = redis_url {
            self.redis_url = Some(url.to_string());
        }
        self
    }

    /// Apply a runtime upstream URL over the file value.
    pub fn with_upstream_url(mut self, upstream_url: Option<&str>) -> Self {
        if let Some(url) = upstream_url {
            self.upstream_url = Some(url.to_string());
        }
        self
    }

    /// Redis URL, required whenever the cache is used
    pub fn require_redis_url(&self) -> Result<&str> {
        self.redis_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .ok_or_else(|| ConfigError::MissingRedisUrl.into())
    }

    /// Upstream base URL, required whenever a token is fetched
    pub fn require_upstream_url(&self) -> Result<&str> {
        self.upstream_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .ok_or_else(|| ConfigError::MissingUpstreamUrl.into())
    }
}
