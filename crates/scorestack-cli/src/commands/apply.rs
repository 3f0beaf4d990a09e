use anyhow::{Context, Result};
use colored::Colorize;
use scorestack_setup::{ProvisionPlan, Provisioner, SetupConfig, Transport};

use crate::cli::ApplyArgs;
use crate::output::{print_report, print_success};

pub async fn apply(
    cfg: &SetupConfig,
    storage: &dyn Transport,
    dashboard: &dyn Transport,
    args: &ApplyArgs,
) -> Result<()> {
    let plan = ProvisionPlan::load(&args.manifest)
        .with_context(|| format!("Failed to load manifest {}", args.manifest.display()))?;
    tracing::info!(steps = plan.len(), "loaded provisioning plan");

    let provisioner = Provisioner::new(storage, dashboard, cfg.health.gate_config());
    let report = if args.no_wait {
        provisioner.apply(&plan).await
    } else {
        provisioner.run(&plan).await
    }
    .context("Provisioning failed")?;

    print_report(&report);
    print_success(&format!(
        "Provisioned {} from {}",
        format!("{} resources", report.applied.len()).cyan(),
        args.manifest.display()
    ));
    Ok(())
}
