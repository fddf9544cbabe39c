//! Auto-remediation pipeline.
//!
//! A remediation walks four presentational stages, each held for
//! `stage_delay`, then calls `/remediate`. Progress is reported to the UI as
//! [`RemediationEvent`]s over an unbounded channel. A running pipeline is
//! never cancelled; closing the detail overlay only hides its progress.
//!
//! Any response below 500 counts as success. On success the issue is
//! resolved in the shared state and a [`Resolution`] is recorded, taken from
//! the response body if it carries one.

use std::fmt;
use std::time::Duration;

use rand::Rng;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use trace_api::{ApiClient, ApiError, RemediationReply};
use trace_types::{Issue, Resolution};

use crate::data::SharedState;

/// Default hold time for each stage.
pub const DEFAULT_STAGE_DELAY: Duration = Duration::from_millis(800);

/// Pipeline stages, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Analyze,
    Pipeline,
    Execute,
    Verify,
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::Analyze, Stage::Pipeline, Stage::Execute, Stage::Verify];

    pub fn label(&self) -> &'static str {
        match self {
            Stage::Analyze => "Analyze",
            Stage::Pipeline => "Pipeline",
            Stage::Execute => "Execute",
            Stage::Verify => "Verify",
        }
    }

    /// Progress line shown while the stage runs.
    pub fn detail(&self, action: &str) -> String {
        match self {
            Stage::Analyze => "Analyzing issue and affected towers".to_string(),
            Stage::Pipeline => "Routing through Monitoring > Prediction > Decision xApp".to_string(),
            Stage::Execute => format!("Executing {}", action),
            Stage::Verify => "Verifying stability".to_string(),
        }
    }

    /// Zero-based position in [`Stage::ALL`].
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Progress reported by a running remediation.
#[derive(Debug, Clone, PartialEq)]
pub enum RemediationEvent {
    Stage { issue_id: String, stage: Stage },
    Succeeded { issue_id: String, resolution: Resolution, message: String },
    Failed { issue_id: String, message: String },
}

impl RemediationEvent {
    pub fn issue_id(&self) -> &str {
        match self {
            RemediationEvent::Stage { issue_id, .. }
            | RemediationEvent::Succeeded { issue_id, .. }
            | RemediationEvent::Failed { issue_id, .. } => issue_id,
        }
    }
}

/// How a `/remediate` call is interpreted.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// The server accepted the request. Carries the resolution from the
    /// body, if any, and a message to show.
    Success {
        resolution: Option<Resolution>,
        message: Option<String>,
    },
    /// The server failed or could not be reached.
    Failure(String),
}

/// Classify the result of a `/remediate` call.
///
/// Everything below 500 is a success, including 4xx.
pub fn judge(result: Result<RemediationReply, ApiError>) -> Verdict {
    match result {
        Ok(reply) if reply.is_server_error() => Verdict::Failure(format!(
            "Remediation failed: server returned {}",
            reply.status
        )),
        Ok(reply) => {
            let message = reply.message().map(str::to_string);
            let resolution = reply.body.and_then(|body| body.resolution);
            Verdict::Success { resolution, message }
        }
        Err(e) => Verdict::Failure(format!("Error: could not reach the remediation service ({})", e)),
    }
}

/// Resolution recorded when the server did not return one.
pub fn fallback_resolution(issue: &Issue, action: &str, message: Option<&str>) -> Resolution {
    let mut rng = rand::thread_rng();
    let id = format!("resolution-{:06x}", rng.gen_range(0..0x100_0000u32));
    let agent = if issue.active_agent.is_empty() {
        "Principal Agent"
    } else {
        issue.active_agent.as_str()
    };
    let rollback = if rng.gen_bool(0.5) { "Available" } else { "Manual Review" };

    Resolution::new(id, chrono::Utc::now().to_rfc3339(), "Automated Remediation Completed")
        .summary(format!("{} resolved via {}", issue.title, action))
        .initiating_agent(agent)
        .action(message.unwrap_or("Remediation action executed"))
        .action("Stability verification completed")
        .rollback_status(rollback)
        .learning_notes(format!("{} applied for {}", action, issue.title))
        .confidence_score(format!("{}%", rng.gen_range(85..=99)))
        .for_issue(issue.id.clone())
}

/// Spawns remediation pipelines against the backend.
#[derive(Debug, Clone)]
pub struct Remediator {
    api: ApiClient,
    state: SharedState,
    stage_delay: Duration,
    events: mpsc::UnboundedSender<RemediationEvent>,
}

impl Remediator {
    /// Create a remediator and the receiver its progress is reported on.
    pub fn new(
        api: ApiClient,
        state: SharedState,
        stage_delay: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<RemediationEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let remediator = Self {
            api,
            state,
            stage_delay,
            events: tx,
        };
        (remediator, rx)
    }

    /// Run the pipeline for `issue` on a background task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(&self, issue: Issue) -> JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move { this.run(issue).await })
    }

    /// Run the pipeline to completion on the current task.
    pub async fn run(&self, issue: Issue) {
        let action = issue.remediation_action().to_string();
        info!(issue_id = %issue.id, %action, "remediation started");

        for stage in Stage::ALL {
            self.report(RemediationEvent::Stage {
                issue_id: issue.id.clone(),
                stage,
            });
            tokio::time::sleep(self.stage_delay).await;
        }

        let event = match judge(self.api.remediate(&issue.id, &action).await) {
            Verdict::Success { resolution, message } => {
                let resolution = resolution
                    .map(|r| if r.issue_id.is_none() { r.for_issue(issue.id.clone()) } else { r })
                    .unwrap_or_else(|| fallback_resolution(&issue, &action, message.as_deref()));
                let message = message.unwrap_or_else(|| format!("{} completed for {}", action, issue.title));

                self.state.lock().complete_remediation(&issue.id, resolution.clone());
                info!(issue_id = %issue.id, resolution_id = %resolution.id, "remediation succeeded");

                RemediationEvent::Succeeded {
                    issue_id: issue.id.clone(),
                    resolution,
                    message,
                }
            }
            Verdict::Failure(message) => {
                warn!(issue_id = %issue.id, %message, "remediation failed");
                RemediationEvent::Failed {
                    issue_id: issue.id.clone(),
                    message,
                }
            }
        };
        self.report(event);
    }

    fn report(&self, event: RemediationEvent) {
        // The UI may already be gone
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trace_api::RemediateBody;
    use trace_types::Severity;

    fn issue() -> Issue {
        Issue::new("issue-mock-1", "Energy Spike", Severity::High)
            .active_agent("monitoring_agent")
            .suggested_action("restart_agent")
    }

    #[test]
    fn test_stage_order() {
        let labels: Vec<_> = Stage::ALL.iter().map(Stage::label).collect();
        assert_eq!(labels, ["Analyze", "Pipeline", "Execute", "Verify"]);
        assert_eq!(Stage::Verify.index(), 3);
        assert_eq!(Stage::Execute.detail("restart_agent"), "Executing restart_agent");
    }

    #[test]
    fn test_judge_is_permissive_below_500() {
        for status in [200, 201, 400, 404, 422, 499] {
            let verdict = judge(Ok(RemediationReply { status, body: None }));
            assert!(matches!(verdict, Verdict::Success { .. }), "status {}", status);
        }
        for status in [500, 502, 503] {
            let verdict = judge(Ok(RemediationReply { status, body: None }));
            assert!(matches!(verdict, Verdict::Failure(_)), "status {}", status);
        }
    }

    #[test]
    fn test_judge_keeps_body_resolution() {
        let body = RemediateBody {
            message: Some("agent restarted".to_string()),
            resolution: Some(Resolution::new("resolution-abc123", "t", "Restarted")),
            ..Default::default()
        };
        match judge(Ok(RemediationReply { status: 200, body: Some(body) })) {
            Verdict::Success { resolution, message } => {
                assert_eq!(resolution.unwrap().id, "resolution-abc123");
                assert_eq!(message.as_deref(), Some("agent restarted"));
            }
            other => panic!("unexpected verdict: {:?}", other),
        }
    }

    #[test]
    fn test_judge_transport_error() {
        match judge(Err(ApiError::Connection("refused".to_string()))) {
            Verdict::Failure(message) => assert!(message.starts_with("Error:")),
            other => panic!("unexpected verdict: {:?}", other),
        }
    }

    #[test]
    fn test_fallback_resolution() {
        let resolution = fallback_resolution(&issue(), "restart_agent", Some("agent restarted"));
        assert!(resolution.id.starts_with("resolution-"));
        assert_eq!(resolution.id.len(), "resolution-".len() + 6);
        assert_eq!(resolution.title, "Automated Remediation Completed");
        assert_eq!(resolution.summary, "Energy Spike resolved via restart_agent");
        assert_eq!(resolution.initiating_agent, "monitoring_agent");
        assert_eq!(resolution.actions, ["agent restarted", "Stability verification completed"]);
        assert_eq!(resolution.issue_id.as_deref(), Some("issue-mock-1"));

        let confidence: u32 = resolution.confidence_score.trim_end_matches('%').parse().unwrap();
        assert!((85..=99).contains(&confidence));

        let anonymous = Issue::new("issue-2", "TRX Overload", Severity::Medium);
        let resolution = fallback_resolution(&anonymous, "reroute_traffic", None);
        assert_eq!(resolution.initiating_agent, "Principal Agent");
    }
}
