//! Command execution context
//!
//! Merges flags over the config file and builds the clients commands need.

use std::sync::Arc;

use crate::cache::CachedBulletClient;
use crate::cli::{GlobalOptions, OutputFormat};
use crate::client::BulletClient;
use crate::config::Config;
use crate::error::Result;
use crate::store::RedisStore;

/// Context for command execution containing config and runtime options.
pub struct CommandContext {
    /// Config file merged with flag and environment overrides
    pub config: Config,
    /// Output format preference
    pub format: OutputFormat,
    /// Whether to bypass the shared cache
    pub no_cache: bool,
}

impl CommandContext {
    /// Load the config file and apply runtime overrides.
    ///
    /// Nothing is connected yet; commands ask for what they use.
    pub fn new(opts: &GlobalOptions) -> Result<Self> {
        let config = Config::load_at(opts.config_ref())?
            .with_redis_url(opts.redis_url_ref())
            .with_upstream_url(opts.upstream_url_ref());

        Ok(Self {
            config,
            format: opts.format,
            no_cache: opts.no_cache,
        })
    }

    /// Client for the login upstream
    pub fn upstream(&self) -> Result<BulletClient> {
        BulletClient::new(self.config.require_upstream_url()?)
    }

    /// Connect to the shared Redis store
    pub async fn store(&self) -> Result<RedisStore> {
        let url = self.config.require_redis_url()?;
        Ok(RedisStore::connect(url).await?)
    }

    /// Wrap `upstream` with the Redis-backed token cache
    pub async fn cached(&self, upstream: BulletClient) -> Result<CachedBulletClient<BulletClient>> {
        let store = self.store().await?;
        Ok(CachedBulletClient::new(upstream, Arc::new(store)).with_strategy(self.config.strategy))
    }
}
