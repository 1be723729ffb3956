//! Status command implementation

use std::path::PathBuf;
use std::time::Duration;

use colored::Colorize;
use reqwest::Url;

use crate::cli::{CommandContext, GlobalOptions};
use crate::config::Config;
use crate::error::Result;

/// Upper bound on the Redis reachability check
const PING_TIMEOUT: Duration = Duration::from_secs(5);

/// Run the status command to display configuration status
pub async fn run(opts: &GlobalOptions) -> Result<()> {
    println!("{}\n", "iksm-token Configuration Status".bold());

    let config_path = match opts.config_ref() {
        Some(path) => PathBuf::from(path),
        None => Config::default_path()?,
    };
    let ctx = CommandContext::new(opts)?;

    if config_path.exists() {
        println!("Config file: {}", config_path.display().to_string().cyan());
    } else {
        println!(
            "Config file: {} {}",
            config_path.display().to_string().cyan(),
            "(not found, using defaults)".dimmed()
        );
    }
    println!("Strategy: {}", ctx.config.strategy.to_string().bold());
    println!();

    match ctx.config.upstream_url.as_deref() {
        Some(url) => println!("{} Upstream: {}", "✓".green(), url),
        None => {
            println!("{} Upstream not configured", "✗".red());
            println!("  → Set upstream_url in the config file or pass --upstream-url");
        }
    }

    match ctx.config.redis_url.as_deref() {
        Some(url) => {
            let shown = redact(url);
            match tokio::time::timeout(PING_TIMEOUT, ctx.store()).await {
                Ok(Ok(store)) => match store.ping().await {
                    Ok(()) => println!("{} Redis reachable: {}", "✓".green(), shown),
                    Err(e) => println!("{} Redis {} did not answer: {}", "✗".red(), shown, e),
                },
                Ok(Err(e)) => println!("{} Redis unreachable: {} ({})", "✗".red(), shown, e),
                Err(_) => println!(
                    "{} Redis unreachable: {} (no answer within {}s)",
                    "✗".red(),
                    shown,
                    PING_TIMEOUT.as_secs()
                ),
            }
        }
        None => {
            println!("{} Redis not configured", "○".dimmed());
            println!("  → Set REDIS_URL to share tokens between processes");
        }
    }

    Ok(())
}

/// Hide any password embedded in a Redis URL
fn redact(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) if parsed.password().is_some() => {
            let _ = parsed.set_password(Some("****"));
            parsed.to_string()
        }
        _ => url.to_string(),
    }
}
