mod cli;
mod commands;
mod config;
mod observability;
mod output;

use anyhow::Result;
use clap::Parser;
use scorestack_setup::{HttpTransport, SetupConfig};

use cli::{Cli, Commands};
use output::print_error;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    observability::init_tracing_with_level(&cli.log_level);

    let cfg = config::resolve(&cli)?;
    let (storage, dashboard) = make_transports(&cfg)?;

    match &cli.command {
        Commands::Wait => commands::wait::wait(&cfg, &storage, &dashboard).await?,
        Commands::Check => commands::check::check(&cfg, &storage, &dashboard).await?,
        Commands::Apply(args) => {
            commands::apply::apply(&cfg, &storage, &dashboard, args).await?;
        }
    }

    Ok(())
}

fn make_transports(cfg: &SetupConfig) -> Result<(HttpTransport, HttpTransport)> {
    let timeout = cfg.request_timeout();
    let storage = HttpTransport::with_timeout(cfg.storage_endpoint(), timeout)?;
    let dashboard = HttpTransport::with_timeout(cfg.dashboard_endpoint(), timeout)?;
    Ok((storage, dashboard))
}
