//! Global CLI options shared across all commands

use crate::cli::{Cli, OutputFormat};

/// Global CLI options passed to all command handlers.
///
/// Precedence is CLI flag > environment variable > config file > default.
/// This struct captures the CLI/env layer; the config file is merged in
/// `CommandContext`.
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    /// Output format (pretty, json)
    pub format: OutputFormat,

    /// Custom config file path (defaults to ~/.iksm-token/config.yaml)
    pub config: Option<String>,

    /// Redis URL override
    pub redis_url: Option<String>,

    /// Login upstream override
    pub upstream_url: Option<String>,

    /// Skip the shared cache and always call the upstream
    pub no_cache: bool,
}

impl GlobalOptions {
    /// Create GlobalOptions from a parsed CLI struct.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            format: cli.format,
            config: cli.config.clone(),
            redis_url: cli.redis_url.clone(),
            upstream_url: cli.upstream_url.clone(),
            no_cache: cli.no_cache,
        }
    }

    /// Get config path as `Option<&str>`.
    pub fn config_ref(&self) -> Option<&str> {
        self.config.as_deref()
    }

    /// Get Redis URL override as `Option<&str>`.
    pub fn redis_url_ref(&self) -> Option<&str> {
        self.redis_url.as_deref()
    }

    /// Get upstream override as `Option<&str>`.
    pub fn upstream_url_ref(&self) -> Option<&str> {
        self.upstream_url.as_deref()
    }
}
