//! Idempotent creation of Elasticsearch and Kibana resources.
//!
//! None of the remote APIs offer a single "create if missing" call, so each
//! resource kind picks one of three patterns:
//!
//! - **probe then create** (index, user): `GET` the resource and `PUT` it only
//!   when the probe answers `404`. Any other probe status is treated as
//!   "already there". The existing resource is not compared with the payload.
//! - **update then create** (space): `PUT` the named space and fall back to
//!   `POST` on `404`.
//! - **direct** (role, dashboard set): the remote call is itself idempotent.
//!
//! Every call is independent, makes no retries and can be repeated after a
//! failure.

use std::fmt;

use tracing::info;

use crate::error::SetupError;
use crate::payload::{Payload, PayloadSource};
use crate::response::{NOT_FOUND, classify};
use crate::transport::{Method, Transport};

/// Kibana space that receives the second dashboard import.
pub const SCORESTACK_SPACE: &str = "scorestack";

pub const DASHBOARD_IMPORT_PATH: &str = "/api/kibana/dashboards/import?force=true";
pub const SPACES_PATH: &str = "/api/spaces/space";

/// Kinds of resources the reconciler knows how to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    User,
    Role,
    Index,
    Space,
    DashboardSet,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Role => "role",
            Self::Index => "index",
            Self::Space => "space",
            Self::DashboardSet => "dashboard-set",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn index_path(name: &str) -> String {
    format!("/{name}")
}

pub fn user_path(name: &str) -> String {
    format!("/_security/user/{name}")
}

pub fn role_path(name: &str) -> String {
    format!("/api/security/role/{name}")
}

pub fn space_path(name: &str) -> String {
    format!("{SPACES_PATH}/{name}")
}

/// Import path scoped to the [`SCORESTACK_SPACE`] space.
pub fn scoped_dashboard_import_path() -> String {
    format!("/s/{SCORESTACK_SPACE}{DASHBOARD_IMPORT_PATH}")
}

fn require_name(kind: ResourceKind, name: &str) -> Result<(), SetupError> {
    if name.trim().is_empty() {
        return Err(SetupError::Config(format!("{kind} name must not be empty")));
    }
    Ok(())
}

/// Applies resources to the storage and dashboard services.
pub struct Reconciler<'a> {
    storage: &'a dyn Transport,
    dashboard: &'a dyn Transport,
}

impl<'a> Reconciler<'a> {
    pub fn new(storage: &'a dyn Transport, dashboard: &'a dyn Transport) -> Self {
        Self { storage, dashboard }
    }

    /// Ensures one resource of `kind` exists.
    ///
    /// `name` is ignored for [`ResourceKind::DashboardSet`].
    ///
    /// # Errors
    ///
    /// See the individual `ensure_*` methods.
    pub async fn ensure<S>(
        &self,
        kind: ResourceKind,
        name: &str,
        source: &S,
    ) -> Result<(), SetupError>
    where
        S: PayloadSource + ?Sized,
    {
        match kind {
            ResourceKind::User => self.ensure_user(name, source.produce()?).await,
            ResourceKind::Role => self.ensure_role(name, source.produce()?).await,
            ResourceKind::Index => self.ensure_index(name, source).await,
            ResourceKind::Space => self.ensure_space(name, source).await,
            ResourceKind::DashboardSet => self.ensure_dashboard_set(source).await,
        }
    }

    /// Imports a dashboard set into the default space and the
    /// [`SCORESTACK_SPACE`] space, each with its own freshly produced payload.
    ///
    /// # Errors
    ///
    /// Fails on the first import that is not accepted. The second import is
    /// not attempted in that case.
    pub async fn ensure_dashboard_set<S>(&self, source: &S) -> Result<(), SetupError>
    where
        S: PayloadSource + ?Sized,
    {
        info!("adding dashboards");
        let scoped = scoped_dashboard_import_path();
        for path in [DASHBOARD_IMPORT_PATH, scoped.as_str()] {
            let payload = source.produce()?;
            classify(
                self.dashboard
                    .execute(Method::POST, path, Some(payload))
                    .await,
            )
            .await?;
        }
        Ok(())
    }

    /// Creates index `name` unless a `GET /{name}` probe finds it.
    ///
    /// # Errors
    ///
    /// Transport failures, a create that is not accepted, or a probe that
    /// answers with an error status other than `404`.
    pub async fn ensure_index<S>(&self, name: &str, source: &S) -> Result<(), SetupError>
    where
        S: PayloadSource + ?Sized,
    {
        require_name(ResourceKind::Index, name)?;
        let path = index_path(name);

        let probe = self.storage.execute(Method::GET, &path, None).await;
        match probe {
            Ok(response) if response.status() == NOT_FOUND => {
                drop(response);
                info!(index = name, "adding index: {name}");
                let payload = source.produce()?;
                classify(self.storage.execute(Method::PUT, &path, Some(payload)).await).await
            }
            outcome => {
                classify(outcome).await?;
                info!(index = name, "index '{name}' already exists, skipping...");
                Ok(())
            }
        }
    }

    /// Creates or replaces Kibana role `name`.
    ///
    /// # Errors
    ///
    /// Transport failures or a response other than `200`/`204`.
    pub async fn ensure_role(&self, name: &str, payload: Payload) -> Result<(), SetupError> {
        require_name(ResourceKind::Role, name)?;
        info!(role = name, "adding role: {name}");
        classify(
            self.dashboard
                .execute(Method::PUT, &role_path(name), Some(payload))
                .await,
        )
        .await
    }

    /// Updates Kibana space `name`, creating it when the update answers `404`.
    ///
    /// # Errors
    ///
    /// Transport failures or a final response other than `200`/`204`.
    pub async fn ensure_space<S>(&self, name: &str, source: &S) -> Result<(), SetupError>
    where
        S: PayloadSource + ?Sized,
    {
        require_name(ResourceKind::Space, name)?;
        let update = self
            .dashboard
            .execute(Method::PUT, &space_path(name), Some(source.produce()?))
            .await;
        match update {
            Ok(response) if response.status() == NOT_FOUND => {
                drop(response);
                info!(space = name, "adding Kibana space: {name}");
                let payload = source.produce()?;
                classify(
                    self.dashboard
                        .execute(Method::POST, SPACES_PATH, Some(payload))
                        .await,
                )
                .await
            }
            outcome => {
                classify(outcome).await?;
                info!(space = name, "Kibana space '{name}' already exists, updated");
                Ok(())
            }
        }
    }

    /// Creates user `name` unless a `GET /_security/user/{name}` probe finds it.
    ///
    /// # Errors
    ///
    /// Same as [`Reconciler::ensure_index`].
    pub async fn ensure_user(&self, name: &str, payload: Payload) -> Result<(), SetupError> {
        require_name(ResourceKind::User, name)?;
        let path = user_path(name);

        let probe = self.storage.execute(Method::GET, &path, None).await;
        match probe {
            Ok(response) if response.status() == NOT_FOUND => {
                drop(response);
                info!(user = name, "adding user: {name}");
                classify(self.storage.execute(Method::PUT, &path, Some(payload)).await).await
            }
            outcome => {
                classify(outcome).await?;
                info!(user = name, "user '{name}' already exists, skipping...");
                Ok(())
            }
        }
    }
}
