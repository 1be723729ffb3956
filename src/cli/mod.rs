//! CLI command definitions and handlers

use clap::{Parser, Subcommand};

pub mod args;
pub mod context;
pub mod crypt;
pub mod status;
pub mod token;

pub use args::{GlobalOptions, OutputFormat};
pub use context::CommandContext;

/// iksm-token - cached bullet tokens over a shared Redis
#[derive(Parser, Debug)]
#[command(name = "iksm-token")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (pretty, json)
    #[arg(
        long,
        global = true,
        env = "IKSM_FORMAT",
        default_value = "pretty",
        hide_env = true
    )]
    pub format: OutputFormat,

    /// Override config file location
    #[arg(long, global = true, env = "IKSM_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Redis server holding the shared cache
    #[arg(long, global = true, env = "REDIS_URL", hide_env_values = true)]
    pub redis_url: Option<String>,

    /// Login upstream base URL (serves /bullet)
    #[arg(long, global = true, env = "IKSM_UPSTREAM_URL", hide_env = true)]
    pub upstream_url: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true, env = "IKSM_DEBUG", hide_env = true)]
    pub debug: bool,

    /// Bypass the shared cache, always call the upstream
    #[arg(long, global = true, env = "IKSM_NO_CACHE", hide_env = true)]
    pub no_cache: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Exchange a session token for a bullet token, through the cache
    Token {
        /// Session token to exchange
        #[arg(long, env = "IKSM_SESSION_TOKEN", hide_env_values = true)]
        session_token: String,

        /// Session id; without one the cache is skipped
        #[arg(long)]
        session_id: Option<String>,
    },

    /// Print the SHA-256 hex digest of INPUT
    Hash {
        /// Text to hash
        input: String,
    },

    /// Encrypt stdin, print the blob as base64
    Encrypt {
        /// Secret the key is derived from
        #[arg(long, env = "IKSM_SECRET", hide_env_values = true)]
        secret: String,
    },

    /// Decrypt a base64 blob from stdin
    Decrypt {
        /// Secret the key is derived from
        #[arg(long, env = "IKSM_SECRET", hide_env_values = true)]
        secret: String,
    },

    /// Show configuration and Redis reachability
    Status,

    /// Display version information
    Version,
}
