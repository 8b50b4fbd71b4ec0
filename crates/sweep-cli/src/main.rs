mod cmd;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use anyhow::Context;
use sweep_core::{ApiClient, RenameMapStore};

#[derive(Parser)]
#[command(
    name = "sweep",
    about = "Resolve backtest strategy aliases and cascade-delete strategies with their job history",
    version,
    propagate_version = true
)]
struct Cli {
    /// Backend base URL
    #[arg(
        long,
        global = true,
        env = "SWEEP_API_URL",
        default_value = "http://127.0.0.1:5000"
    )]
    api_url: String,

    /// Bearer token passed through to the backend
    #[arg(long, global = true, env = "SWEEP_API_TOKEN")]
    token: Option<String>,

    /// Directory for persisted local state (default: ~/.backtest-sweep)
    #[arg(long, global = true, env = "SWEEP_STATE_DIR")]
    state_dir: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Delete a strategy together with every job under it or any of its
    /// historical aliases
    Delete {
        /// Strategy id, canonical or any former name
        strategy_id: String,
    },

    /// Show the canonical id and full alias set for a strategy id
    Resolve {
        /// Strategy id, canonical or any former name
        strategy_id: String,
    },

    /// Refresh the local rename map from the backend
    Sync,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let state_dir = match cli.state_dir {
        Some(dir) => dir,
        None => home::home_dir()
            .context("cannot determine home directory; pass --state-dir")?
            .join(".backtest-sweep"),
    };

    let mut client = ApiClient::new(&cli.api_url)?;
    if let Some(token) = cli.token {
        client = client.with_bearer_token(token);
    }
    let store = RenameMapStore::new(&state_dir);

    match cli.command {
        Commands::Delete { strategy_id } => {
            cmd::delete::run(&client, &store, &strategy_id, cli.json).await
        }
        Commands::Resolve { strategy_id } => {
            cmd::resolve::run(&client, &store, &strategy_id, cli.json).await
        }
        Commands::Sync => cmd::sync::run(&client, &store, cli.json).await,
    }
}
