use anyhow::{Context, Result};
use scorestack_setup::SetupConfig;

use crate::cli::Cli;

/// Builds the effective configuration.
///
/// Precedence: flags / env vars, then `--config`, then
/// `~/.scorestack/setup.toml`, then built-in defaults.
pub fn resolve(cli: &Cli) -> Result<SetupConfig> {
    let base = match &cli.config {
        Some(path) => SetupConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SetupConfig::load_default().context("Failed to load default config")?,
    };
    let cfg = apply_overrides(base, cli);
    cfg.validate()?;
    Ok(cfg)
}

fn apply_overrides(mut cfg: SetupConfig, cli: &Cli) -> SetupConfig {
    if let Some(url) = &cli.elasticsearch {
        cfg.elasticsearch = url.clone();
    }
    if let Some(url) = &cli.kibana {
        cfg.kibana = url.clone();
    }
    if let Some(username) = &cli.username {
        cfg.username = username.clone();
    }
    if let Some(password) = &cli.password {
        cfg.password = password.clone();
    }
    if let Some(secs) = cli.poll_interval {
        cfg.health.poll_interval_secs = secs;
    }
    if cli.max_attempts.is_some() {
        cfg.health.max_attempts = cli.max_attempts;
    }
    cfg
}
