//! Startup backfill from the REST backend.
//!
//! Fills the dashboard with history the stream alone would take minutes to
//! build. Each request is independent and every failure is logged and
//! ignored.

use tracing::{debug, info};

use trace_api::ApiClient;
use trace_types::{AgentStatus, AGENT_TRACE};

use crate::data::{SharedState, TELEMETRY_CAPACITY};

/// Number of resolutions requested from history.
pub const RESOLUTION_LIMIT: usize = 20;

/// What the backfill managed to load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackfillReport {
    pub telemetry: usize,
    pub issues: usize,
    pub resolutions: usize,
    pub agents: usize,
    pub active_users: bool,
    pub health: bool,
}

impl BackfillReport {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Agent list shown when no backend reports agent status.
pub fn simulated_agents() -> Vec<AgentStatus> {
    AGENT_TRACE
        .iter()
        .map(|name| AgentStatus::new(*name, "simulated", "-"))
        .collect()
}

/// Load history into `state`.
///
/// Issues go through the tracker, so ids already resolved stay out.
pub async fn backfill(api: &ApiClient, state: &SharedState) -> BackfillReport {
    let mut report = BackfillReport::default();

    match api.telemetry(TELEMETRY_CAPACITY).await {
        Ok(series) => {
            report.telemetry = state.lock().history.backfill_telemetry(series);
        }
        Err(e) => debug!(error = %e, "telemetry backfill failed"),
    }

    match api.issues().await {
        Ok(issues) => {
            let mut state = state.lock();
            for issue in issues {
                if state.issues.insert(issue) {
                    report.issues += 1;
                }
            }
        }
        Err(e) => debug!(error = %e, "issue backfill failed"),
    }

    match api.resolutions(RESOLUTION_LIMIT).await {
        Ok(resolutions) => {
            // Served newest first; the view reverses insertion order
            let mut state = state.lock();
            for resolution in resolutions.into_iter().rev() {
                if state.add_resolution(resolution) {
                    report.resolutions += 1;
                }
            }
        }
        Err(e) => debug!(error = %e, "resolution backfill failed"),
    }

    match api.active_users().await {
        Ok(sample) => {
            state.lock().history.record_active_users(sample);
            report.active_users = true;
        }
        Err(e) => debug!(error = %e, "active users backfill failed"),
    }

    match api.region_health().await {
        Ok(health) => {
            let mut state = state.lock();
            // A streamed snapshot is newer than the REST one
            if state.health.is_none() {
                state.health = Some(health);
                report.health = true;
            }
        }
        Err(e) => debug!(error = %e, "health backfill failed"),
    }

    match api.agent_statuses().await {
        Ok(agents) if !agents.is_empty() => {
            report.agents = agents.len();
            state.lock().agents = agents;
        }
        Ok(_) => debug!("backend reported no agents"),
        Err(e) => debug!(error = %e, "agent status backfill failed"),
    }

    if report.is_empty() {
        info!(endpoint = api.endpoint(), "backend unavailable, nothing backfilled");
    } else {
        info!(
            telemetry = report.telemetry,
            issues = report.issues,
            resolutions = report.resolutions,
            agents = report.agents,
            health = report.health,
            "backfill complete"
        );
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_agents() {
        let agents = simulated_agents();
        assert_eq!(agents.len(), 5);
        assert_eq!(agents[0].name, "Monitoring");
        assert!(agents.iter().all(|a| a.status == "simulated"));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_ignored() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let api = ApiClient::builder().endpoint(format!("http://{}", addr)).build();
        let state = SharedState::default();
        let report = backfill(&api, &state).await;

        assert!(report.is_empty());
        assert!(state.lock().agents.is_empty());
        assert!(state.lock().health.is_none());
        assert_eq!(state.lock().history.telemetry.len(), 0);
    }
}
