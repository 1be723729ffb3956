//! iksm-token - bullet tokens shared through a Redis cache

use clap::Parser;

mod cache;
mod cli;
mod client;
mod config;
mod crypto;
mod error;
mod output;
mod store;

use cli::{Cli, Commands, GlobalOptions, OutputFormat};
use error::Result;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let format = cli.format;
    if let Err(err) = run(cli).await {
        match format {
            OutputFormat::Json => println!("{}", output::json::format_errors(err.to_string())),
            OutputFormat::Pretty => eprintln!("Error: {}", err),
        }
        std::process::exit(1);
    }
}

/// `RUST_LOG` wins over `--debug`
fn init_logging(debug: bool) {
    let default_filter = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let opts = GlobalOptions::from_cli(&cli);

    match cli.command {
        Commands::Token {
            session_token,
            session_id,
        } => cli::token::run(&opts, &session_token, session_id.as_deref()).await,
        Commands::Hash { input } => cli::crypt::hash(&opts, &input),
        Commands::Encrypt { secret } => cli::crypt::encrypt(&secret),
        Commands::Decrypt { secret } => cli::crypt::decrypt(&secret),
        Commands::Status => cli::status::run(&opts).await,
        Commands::Version => {
            println!("iksm-token version {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
