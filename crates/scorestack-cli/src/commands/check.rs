use anyhow::{Result, bail};
use scorestack_setup::health::READY_STATE;
use scorestack_setup::{SetupConfig, Transport, probe};

use crate::output::print_state;

/// Polls each service once and fails unless both report green.
pub async fn check(
    cfg: &SetupConfig,
    storage: &dyn Transport,
    dashboard: &dyn Transport,
) -> Result<()> {
    let mut states = Vec::with_capacity(2);
    for (transport, url) in [(storage, &cfg.elasticsearch), (dashboard, &cfg.kibana)] {
        let service = transport.service().to_string();
        let state = probe(transport).await.map_err(|e| e.to_string());
        print_state(&service, url, state.as_deref().map_err(Clone::clone));
        states.push((service, state));
    }
    ensure_ready(&states)
}

fn ensure_ready(states: &[(String, Result<String, String>)]) -> Result<()> {
    let unready: Vec<&str> = states
        .iter()
        .filter(|(_, state)| state.as_deref() != Ok(READY_STATE))
        .map(|(service, _)| service.as_str())
        .collect();
    if !unready.is_empty() {
        bail!("not ready: {}", unready.join(", "));
    }
    Ok(())
}
