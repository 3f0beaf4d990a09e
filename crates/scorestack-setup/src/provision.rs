use tracing::info;

use crate::error::SetupError;
use crate::health::{HealthGate, HealthGateConfig};
use crate::plan::ProvisionPlan;
use crate::reconcile::{Reconciler, ResourceKind};
use crate::transport::Transport;

/// A resource that was applied during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedResource {
    pub kind: ResourceKind,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisionReport {
    pub applied: Vec<AppliedResource>,
}

/// Health gate followed by one reconcile call per plan step.
pub struct Provisioner<'a> {
    gate: HealthGate<'a>,
    reconciler: Reconciler<'a>,
}

impl<'a> Provisioner<'a> {
    pub fn new(
        storage: &'a dyn Transport,
        dashboard: &'a dyn Transport,
        gate_config: HealthGateConfig,
    ) -> Self {
        Self {
            gate: HealthGate::new(storage, dashboard, gate_config),
            reconciler: Reconciler::new(storage, dashboard),
        }
    }

    /// Waits for both services, then applies `plan`.
    ///
    /// # Errors
    ///
    /// Returns the first failure. Steps applied before it are not rolled back
    /// and the whole run can be repeated.
    pub async fn run(&self, plan: &ProvisionPlan) -> Result<ProvisionReport, SetupError> {
        self.gate.wait_until_ready().await?;
        self.apply(plan).await
    }

    /// Applies `plan` without waiting for health first.
    pub async fn apply(&self, plan: &ProvisionPlan) -> Result<ProvisionReport, SetupError> {
        let mut report = ProvisionReport::default();
        for step in plan.steps() {
            self.reconciler
                .ensure(step.kind, &step.name, &step.source)
                .await?;
            report.applied.push(AppliedResource {
                kind: step.kind,
                name: step.name.clone(),
            });
        }
        info!(resources = report.applied.len(), "provisioning complete");
        Ok(report)
    }
}
