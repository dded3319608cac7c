use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use gauth_agent::config::bootstrap::build_store;
use gauth_agent::config::loader::file_to_config;
use gauth_agent::observability::metrics::get_metrics;
use gauth_agent::utils::logging::{self, LogLevel};
use gauth_agent::{AuthOptions, ServiceConfig};
use tracing::{debug, info};

const DEFAULT_CONFIG_PATH: &str = "gauth-agent.yaml";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: String,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
    /// print the metrics registry after the command
    #[arg(long)]
    metrics: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print an access token
    Token {
        #[arg(short, long)]
        scope: Option<String>,
        /// skip the cache
        #[arg(long)]
        force: bool,
    },
    /// Print an Authorization header for the default scope
    Header,
    /// Print the result envelope as JSON
    Json {
        #[arg(short, long)]
        scope: Option<String>,
    },
    /// Print which scopes are known and whether defaults are configured
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // -------------------------------
    // 1. Load YAML config (the default path may be absent)
    // -------------------------------

    let service_config = load_service_config(&args.config)?;
    logging::run(&service_config, args.log_level);

    // -------------------------------
    // 2. Build the token store
    // -------------------------------

    let store = build_store(&service_config).await?;

    // -------------------------------
    // 3. Run the command
    // -------------------------------

    match args.command {
        Command::Token { scope, force } => {
            let options = scope.map(AuthOptions::for_scope);
            let token = if force {
                store.force_refresh(options.as_ref()).await?
            } else {
                store.get_access_token(options.as_ref()).await?
            };
            println!("{token}");
        }
        Command::Header => {
            println!("{}", store.authorization_header().await?);
        }
        Command::Json { scope } => {
            let options = scope.map(AuthOptions::for_scope);
            let envelope = store.get_token(options.as_ref()).await;
            println!("{}", serde_json::to_string_pretty(&envelope)?);
            if !envelope.is_ok() {
                std::process::exit(1);
            }
        }
        Command::Status => {
            println!("{}", serde_json::to_string_pretty(&store.to_json().await)?);
        }
    }

    // -------------------------------
    // METRICS
    // -------------------------------

    if args.metrics {
        let metrics = get_metrics().await;
        print!("{}", metrics.encode()?);
    }
    info!("done");
    Ok(())
}

fn load_service_config(path: &str) -> Result<ServiceConfig> {
    let path = Path::new(path);
    if path.exists() {
        return file_to_config(path).context("invalid config");
    }
    if path != Path::new(DEFAULT_CONFIG_PATH) {
        bail!("config file '{}' not found", path.display());
    }
    debug!("no config file at '{}', using environment only", path.display());
    Ok(ServiceConfig::default())
}
