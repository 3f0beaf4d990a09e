//! Provisioning plan loaded from a TOML manifest.
//!
//! ```toml
//! [[user]]
//! name = "root"
//! file = "users/root.json"
//!
//! [[dashboards]]
//! file = "dashboards/overview.json"
//! ```
//!
//! Relative `file` paths resolve against the manifest's directory. Steps are
//! ordered users, roles, indices, spaces, then dashboard sets, keeping the
//! manifest order within each kind.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::SetupError;
use crate::payload::FilePayload;
use crate::reconcile::ResourceKind;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanManifest {
    #[serde(default, rename = "user")]
    pub users: Vec<NamedEntry>,
    #[serde(default, rename = "role")]
    pub roles: Vec<NamedEntry>,
    #[serde(default, rename = "index")]
    pub indices: Vec<NamedEntry>,
    #[serde(default, rename = "space")]
    pub spaces: Vec<NamedEntry>,
    #[serde(default)]
    pub dashboards: Vec<DashboardEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NamedEntry {
    pub name: String,
    pub file: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DashboardEntry {
    pub file: PathBuf,
}

/// One resource to apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanStep {
    pub kind: ResourceKind,
    pub name: String,
    pub source: FilePayload,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisionPlan {
    steps: Vec<PlanStep>,
}

impl ProvisionPlan {
    /// Reads and validates a manifest file.
    pub fn load(path: &Path) -> Result<Self, SetupError> {
        let content = fs::read_to_string(path).map_err(|e| {
            SetupError::Config(format!("cannot read manifest {}: {e}", path.display()))
        })?;
        let manifest: PlanManifest = toml::from_str(&content)
            .map_err(|e| SetupError::Config(format!("{}: {e}", path.display())))?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_manifest(manifest, base_dir)
    }

    pub fn from_manifest(manifest: PlanManifest, base_dir: &Path) -> Result<Self, SetupError> {
        let resolve = |file: &Path| {
            if file.is_absolute() {
                file.to_path_buf()
            } else {
                base_dir.join(file)
            }
        };

        let named = [
            (ResourceKind::User, manifest.users),
            (ResourceKind::Role, manifest.roles),
            (ResourceKind::Index, manifest.indices),
            (ResourceKind::Space, manifest.spaces),
        ];

        let mut steps = Vec::new();
        for (kind, entries) in named {
            for entry in entries {
                steps.push(PlanStep {
                    kind,
                    name: entry.name,
                    source: FilePayload::new(resolve(&entry.file)),
                });
            }
        }
        for entry in manifest.dashboards {
            steps.push(PlanStep {
                kind: ResourceKind::DashboardSet,
                name: entry.file.display().to_string(),
                source: FilePayload::new(resolve(&entry.file)),
            });
        }

        let plan = Self { steps };
        plan.validate()?;
        Ok(plan)
    }

    fn validate(&self) -> Result<(), SetupError> {
        let mut seen = HashSet::new();
        for step in &self.steps {
            if step.name.trim().is_empty() {
                return Err(SetupError::Config(format!("{} with empty name", step.kind)));
            }
            if !seen.insert((step.kind, step.name.as_str())) {
                return Err(SetupError::Config(format!(
                    "duplicate {} '{}'",
                    step.kind, step.name
                )));
            }
        }
        Ok(())
    }

    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
