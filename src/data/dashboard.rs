//! Dashboard state fed by the stream, the REST backfill and remediation.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::{Mutex, MutexGuard};
use serde_json::json;

use trace_types::{AgentStatus, HealthSnapshot, Issue, Resolution, StreamEvent};

use super::history::History;
use super::issues::IssueTracker;

/// Everything the views render.
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub history: History,
    pub issues: IssueTracker,
    /// Resolution history in arrival order (newest last). Unbounded.
    pub resolutions: Vec<Resolution>,
    /// Latest health snapshot; each new one replaces the last.
    pub health: Option<HealthSnapshot>,
    pub agents: Vec<AgentStatus>,
    last_event: Option<Instant>,
    events_received: u64,
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one stream event into the state.
    ///
    /// Returns `true` if anything changed. Duplicate or already-resolved
    /// issues and duplicate resolutions leave the state untouched.
    pub fn apply(&mut self, event: &StreamEvent) -> bool {
        self.last_event = Some(Instant::now());
        self.events_received += 1;

        match event {
            StreamEvent::Telemetry(sample) => {
                self.history.record_telemetry(sample.clone());
                true
            }
            StreamEvent::ActiveUsers(sample) => {
                self.history.record_active_users(sample.clone());
                true
            }
            StreamEvent::Issue(issue) => self.issues.insert(issue.clone()),
            StreamEvent::Resolution(resolution) => self.add_resolution(resolution.clone()),
            StreamEvent::Health(snapshot) => {
                self.health = Some(snapshot.clone());
                true
            }
            StreamEvent::Connection(_) => false,
        }
    }

    /// Append a resolution unless one with the same id is already recorded.
    ///
    /// A resolution that names its issue also resolves that issue.
    pub fn add_resolution(&mut self, resolution: Resolution) -> bool {
        if self.resolutions.iter().any(|r| r.id == resolution.id) {
            return false;
        }
        if let Some(ref issue_id) = resolution.issue_id {
            self.issues.resolve(issue_id);
        }
        self.resolutions.push(resolution);
        true
    }

    /// Resolve an issue and record the resolution in one update.
    pub fn complete_remediation(&mut self, issue_id: &str, resolution: Resolution) -> Option<Issue> {
        let issue = self.issues.resolve(issue_id);
        self.add_resolution(resolution);
        issue
    }

    /// Resolutions, newest first.
    pub fn recent_resolutions(&self) -> impl Iterator<Item = &Resolution> {
        self.resolutions.iter().rev()
    }

    /// When the last stream event was applied.
    pub fn last_event(&self) -> Option<Instant> {
        self.last_event
    }

    pub fn events_received(&self) -> u64 {
        self.events_received
    }

    /// JSON summary used by the export command.
    pub fn export(&self) -> serde_json::Value {
        let counts = self.issues.counts();
        let active: Vec<&str> = self.issues.active().iter().map(|i| i.id.as_str()).collect();

        json!({
            "health": self.health,
            "issues": {
                "active": active,
                "resolved": self.issues.resolved_ids(),
                "by_severity": {
                    "critical": counts.critical,
                    "high": counts.high,
                    "medium": counts.medium,
                    "low": counts.low,
                },
            },
            "resolution_count": self.resolutions.len(),
            "latest": {
                "telemetry": self.history.telemetry.latest(),
                "active_users": self.history.active_users.latest(),
            },
            "buffered": {
                "telemetry": self.history.telemetry.len(),
                "active_users": self.history.active_users.len(),
            },
            "events_received": self.events_received,
        })
    }
}

/// Handle to the one dashboard state, shared by stream callbacks, the
/// remediation tasks and the renderer.
///
/// Always lock at the point of use; never keep a copy of the state around
/// to decide later mutations.
#[derive(Debug, Clone, Default)]
pub struct SharedState {
    inner: Arc<Mutex<DashboardState>>,
}

impl SharedState {
    pub fn new(state: DashboardState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, DashboardState> {
        self.inner.lock()
    }

    pub fn apply(&self, event: &StreamEvent) -> bool {
        self.lock().apply(event)
    }
}
