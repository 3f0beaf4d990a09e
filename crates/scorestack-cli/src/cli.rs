use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "scorestack-setup")]
#[command(about = "Wait for Elasticsearch and Kibana, then provision Scorestack resources")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (defaults to ~/.scorestack/setup.toml when present)
    #[arg(short, long, global = true, env = "SCORESTACK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Elasticsearch base URL
    #[arg(long, global = true, env = "SCORESTACK_ELASTICSEARCH")]
    pub elasticsearch: Option<String>,

    /// Kibana base URL
    #[arg(long, global = true, env = "SCORESTACK_KIBANA")]
    pub kibana: Option<String>,

    /// Username for both services
    #[arg(short, long, global = true, env = "SCORESTACK_USERNAME")]
    pub username: Option<String>,

    /// Password for both services
    #[arg(short, long, global = true, env = "SCORESTACK_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Seconds between health checks
    #[arg(long, global = true)]
    pub poll_interval: Option<u64>,

    /// Give up after this many health checks per service (default: never)
    #[arg(long, global = true)]
    pub max_attempts: Option<u32>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Block until both services report green
    Wait,
    /// Wait for both services, then apply a provisioning manifest
    Apply(ApplyArgs),
    /// Check each service once and print its state
    Check,
}

#[derive(clap::Args)]
pub struct ApplyArgs {
    /// Path to the provisioning manifest (TOML)
    pub manifest: PathBuf,
    /// Skip the health gate
    #[arg(long)]
    pub no_wait: bool,
}
