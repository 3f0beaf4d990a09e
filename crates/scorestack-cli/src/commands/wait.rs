use anyhow::{Context, Result};
use scorestack_setup::{HealthGate, SetupConfig, Transport};

use crate::output::print_success;

pub async fn wait(
    cfg: &SetupConfig,
    storage: &dyn Transport,
    dashboard: &dyn Transport,
) -> Result<()> {
    HealthGate::new(storage, dashboard, cfg.health.gate_config())
        .wait_until_ready()
        .await
        .context("Cluster did not become ready")?;
    print_success("Elasticsearch and Kibana are green");
    Ok(())
}
