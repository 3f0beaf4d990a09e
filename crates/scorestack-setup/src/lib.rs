//! Brings an Elasticsearch + Kibana pair into a known-ready, known-configured
//! state.
//!
//! - [`HealthGate`] waits until both services report `green`.
//! - [`Reconciler`] makes "create resource X" safe to call repeatedly.
//! - [`Provisioner`] runs the two against a [`ProvisionPlan`].
//!
//! Requests go through the [`Transport`] trait. [`HttpTransport`] is the
//! reqwest implementation used in production.

pub mod client;
pub mod config;
pub mod error;
pub mod health;
pub mod payload;
pub mod plan;
pub mod provision;
pub mod reconcile;
pub mod response;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{Credentials, Endpoint, HttpTransport, XSRF_HEADER};
pub use config::{HealthSettings, SetupConfig};
pub use error::{BodyError, Service, SetupError, TransportError};
pub use health::{HealthGate, HealthGateConfig, probe};
pub use payload::{FilePayload, Payload, PayloadSource};
pub use plan::{PlanManifest, PlanStep, ProvisionPlan};
pub use provision::{AppliedResource, ProvisionReport, Provisioner};
pub use reconcile::{Reconciler, ResourceKind, SCORESTACK_SPACE};
pub use response::classify;
pub use transport::{Method, Response, ResponseBody, Transport};
