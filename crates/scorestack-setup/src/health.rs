//! Health gate: blocks until Elasticsearch and then Kibana report `green`.
//!
//! Every failure while polling (connection errors, unexpected bodies, a
//! `yellow` or `red` state) counts as "not ready yet". The first attempt per
//! service runs immediately. Each later attempt waits `poll_interval` first.
//! With no `max_attempts` the gate polls forever, and the caller bounds
//! the total time (for example with `tokio::time::timeout`).

use std::time::Duration;

use serde::Deserialize;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::error::{Service, SetupError};
use crate::transport::{Method, Transport};

pub const STORAGE_HEALTH_PATH: &str = "/_cluster/health";
pub const DASHBOARD_STATUS_PATH: &str = "/api/status";

/// The only state accepted as ready. Compared exactly.
pub const READY_STATE: &str = "green";

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Polling cadence and optional attempt bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthGateConfig {
    /// Wait between two attempts against the same service (default: 5 seconds).
    pub poll_interval: Duration,

    /// Attempts per service before giving up. `None` polls forever.
    ///
    /// At least one attempt is always made, so `Some(0)` behaves like `Some(1)`.
    pub max_attempts: Option<u32>,
}

impl Default for HealthGateConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_attempts: None,
        }
    }
}

impl HealthGateConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Bounds the attempts per service. A bound of zero is raised to one.
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: Option<u32>) -> Self {
        self.max_attempts = max_attempts.map(|max| max.max(1));
        self
    }
}

#[derive(Debug, Deserialize)]
struct ClusterHealth {
    status: String,
}

#[derive(Debug, Deserialize)]
struct KibanaStatus {
    status: KibanaStatusBody,
}

#[derive(Debug, Deserialize)]
struct KibanaStatusBody {
    overall: KibanaOverall,
}

#[derive(Debug, Deserialize)]
struct KibanaOverall {
    state: String,
}

/// Path of the health endpoint for `service`.
pub fn health_path(service: Service) -> &'static str {
    match service {
        Service::Elasticsearch => STORAGE_HEALTH_PATH,
        Service::Kibana => DASHBOARD_STATUS_PATH,
    }
}

/// Extracts the reported state from a health response body.
///
/// # Errors
///
/// Returns [`SetupError::Decode`] if the body does not have the expected shape.
pub fn parse_state(service: Service, body: &str) -> Result<String, SetupError> {
    let decode_err = |e: serde_json::Error| SetupError::Decode {
        service,
        message: e.to_string(),
    };
    match service {
        Service::Elasticsearch => serde_json::from_str::<ClusterHealth>(body)
            .map(|h| h.status)
            .map_err(decode_err),
        Service::Kibana => serde_json::from_str::<KibanaStatus>(body)
            .map(|s| s.status.overall.state)
            .map_err(decode_err),
    }
}

/// Polls the health endpoint of `transport` once and returns the state it reports.
///
/// The HTTP status is ignored and only the body shape matters.
///
/// # Errors
///
/// Returns a transport error or a decode error.
pub async fn probe(transport: &dyn Transport) -> Result<String, SetupError> {
    let service = transport.service();
    let response = transport
        .execute(Method::GET, health_path(service), None)
        .await?;
    let body = response.text().await.map_err(|e| SetupError::Decode {
        service,
        message: e.to_string(),
    })?;
    parse_state(service, &body)
}

/// Blocks until both services report [`READY_STATE`].
pub struct HealthGate<'a> {
    storage: &'a dyn Transport,
    dashboard: &'a dyn Transport,
    config: HealthGateConfig,
}

impl<'a> HealthGate<'a> {
    pub fn new(
        storage: &'a dyn Transport,
        dashboard: &'a dyn Transport,
        config: HealthGateConfig,
    ) -> Self {
        Self {
            storage,
            dashboard,
            config,
        }
    }

    /// Waits for the storage service, then for the dashboard service.
    ///
    /// # Errors
    ///
    /// Only returns [`SetupError::NotReady`], and only when `max_attempts`
    /// is set. Without a bound this returns `Ok(())` or never returns.
    pub async fn wait_until_ready(&self) -> Result<(), SetupError> {
        self.wait_for(self.storage).await?;
        self.wait_for(self.dashboard).await?;
        Ok(())
    }

    async fn wait_for(&self, transport: &dyn Transport) -> Result<u32, SetupError> {
        let service = transport.service();
        let mut attempts: u32 = 0;
        loop {
            if attempts > 0 {
                if let Some(max) = self.config.max_attempts
                    && attempts >= max
                {
                    return Err(SetupError::NotReady { service, attempts });
                }
                info!("waiting for {service} to be ready...");
                sleep(self.config.poll_interval).await;
            }
            attempts = attempts.saturating_add(1);

            match probe(transport).await {
                Ok(state) if state == READY_STATE => {
                    info!(%service, attempts, "service is ready");
                    return Ok(attempts);
                }
                Ok(state) => debug!(%service, state, "service not ready"),
                Err(e) => debug!(%service, error = %e, "health check failed"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Reply, ScriptedTransport};
    use tokio::time::Instant;

    const ES_GREEN: &str = r#"{"status":"green"}"#;
    const ES_YELLOW: &str = r#"{"status":"yellow"}"#;
    const KB_GREEN: &str = r#"{"status":{"overall":{"state":"green"}}}"#;
    const KB_RED: &str = r#"{"status":{"overall":{"state":"red"}}}"#;

    fn es(replies: Vec<Reply>) -> ScriptedTransport {
        ScriptedTransport::new(Service::Elasticsearch, replies)
    }

    fn kb(replies: Vec<Reply>) -> ScriptedTransport {
        ScriptedTransport::new(Service::Kibana, replies)
    }

    #[test]
    fn test_parse_storage_state() {
        assert_eq!(parse_state(Service::Elasticsearch, ES_YELLOW).unwrap(), "yellow");
        assert!(parse_state(Service::Elasticsearch, "{}").is_err());
        assert!(parse_state(Service::Elasticsearch, "<html>").is_err());
    }

    #[test]
    fn test_parse_dashboard_state_follows_nested_path() {
        assert_eq!(parse_state(Service::Kibana, KB_GREEN).unwrap(), "green");
        // top-level "status" string is the storage shape, not the dashboard one
        assert!(parse_state(Service::Kibana, ES_GREEN).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_yellow_then_green_scenario() {
        let storage = es(vec![Reply::ok(200, ES_YELLOW), Reply::ok(200, ES_GREEN)]);
        let dashboard = kb(vec![Reply::ok(200, KB_GREEN)]);
        let start = Instant::now();

        HealthGate::new(&storage, &dashboard, HealthGateConfig::default())
            .wait_until_ready()
            .await
            .unwrap();

        let polls = storage.requests();
        assert_eq!(polls.len(), 2);
        assert!(polls.iter().all(|r| r.method == Method::GET && r.path == STORAGE_HEALTH_PATH));
        assert_eq!(polls[0].at - start, Duration::ZERO);
        assert_eq!(polls[1].at - start, DEFAULT_POLL_INTERVAL);

        let dash = dashboard.requests();
        assert_eq!(dash.len(), 1);
        assert_eq!(dash[0].path, DASHBOARD_STATUS_PATH);
        // no sleep before the first dashboard attempt
        assert_eq!(dash[0].at - start, DEFAULT_POLL_INTERVAL);
        assert_eq!(start.elapsed(), DEFAULT_POLL_INTERVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_are_retried_until_green() {
        let storage = es(vec![
            Reply::Fail,
            Reply::ok(503, r#"{"error":"unavailable"}"#),
            Reply::ok(200, "not json"),
            Reply::ok(200, ES_GREEN),
        ]);
        let dashboard = kb(vec![
            Reply::Fail,
            Reply::ok(200, KB_RED),
            Reply::ok(200, KB_GREEN),
        ]);
        let start = Instant::now();

        HealthGate::new(&storage, &dashboard, HealthGateConfig::default())
            .wait_until_ready()
            .await
            .unwrap();

        assert_eq!(storage.requests().len(), 4);
        assert_eq!(dashboard.requests().len(), 3);
        assert_eq!(start.elapsed(), DEFAULT_POLL_INTERVAL * 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dashboard_not_polled_before_storage_green() {
        let storage = es(vec![Reply::ok(200, ES_YELLOW), Reply::ok(200, ES_GREEN)]);
        let dashboard = kb(vec![Reply::ok(200, KB_GREEN)]);

        HealthGate::new(&storage, &dashboard, HealthGateConfig::default())
            .wait_until_ready()
            .await
            .unwrap();

        let last_storage = storage.requests().last().unwrap().at;
        assert!(dashboard.requests()[0].at >= last_storage);
    }

    #[tokio::test(start_paused = true)]
    async fn test_state_match_is_case_sensitive() {
        let storage = es(vec![
            Reply::ok(200, r#"{"status":"Green"}"#),
            Reply::ok(200, r#"{"status":"GREEN"}"#),
            Reply::ok(200, ES_GREEN),
        ]);
        let dashboard = kb(vec![Reply::ok(200, KB_GREEN)]);

        HealthGate::new(&storage, &dashboard, HealthGateConfig::default())
            .wait_until_ready()
            .await
            .unwrap();

        assert_eq!(storage.requests().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_both_green_returns_without_sleeping() {
        let storage = es(vec![Reply::ok(200, ES_GREEN)]);
        let dashboard = kb(vec![Reply::ok(200, KB_GREEN)]);
        let start = Instant::now();

        HealthGate::new(&storage, &dashboard, HealthGateConfig::default())
            .wait_until_ready()
            .await
            .unwrap();

        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_bounded_gate_gives_up() {
        let storage = es(vec![
            Reply::ok(200, ES_YELLOW),
            Reply::ok(200, ES_YELLOW),
            Reply::ok(200, ES_YELLOW),
            Reply::ok(200, ES_GREEN),
        ]);
        let dashboard = kb(vec![]);
        let config = HealthGateConfig::new()
            .with_poll_interval(Duration::from_secs(1))
            .with_max_attempts(Some(3));
        let start = Instant::now();

        let err = HealthGate::new(&storage, &dashboard, config)
            .wait_until_ready()
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SetupError::NotReady {
                service: Service::Elasticsearch,
                attempts: 3
            }
        ));
        assert_eq!(storage.requests().len(), 3);
        assert!(dashboard.requests().is_empty());
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_bound_still_polls_once() {
        let storage = es(vec![Reply::ok(200, ES_YELLOW), Reply::ok(200, ES_GREEN)]);
        let dashboard = kb(vec![]);
        let config = HealthGateConfig::new().with_max_attempts(Some(0));
        assert_eq!(config.max_attempts, Some(1));
        let start = Instant::now();

        let err = HealthGate::new(&storage, &dashboard, config)
            .wait_until_ready()
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SetupError::NotReady {
                service: Service::Elasticsearch,
                attempts: 1
            }
        ));
        assert_eq!(storage.requests().len(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_probe_surfaces_decode_error() {
        let storage = es(vec![Reply::ok(200, "[]")]);
        let err = probe(&storage).await.unwrap_err();
        assert!(matches!(err, SetupError::Decode { .. }));
    }
}
