//! Detected issues and their agent activity.

use std::fmt;

/// How urgent an issue is. Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }

    /// Short symbol for table display.
    pub fn symbol(&self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Medium => "MED",
            Severity::High => "HIGH",
            Severity::Critical => "CRIT",
        }
    }

    /// The remediation action the backend suggests for this severity.
    pub fn default_action(&self) -> &'static str {
        match self {
            Severity::Critical => "redeploy_agent",
            Severity::High => "restart_agent",
            Severity::Medium | Severity::Low => "reroute_traffic",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single line of agent activity attached to an issue.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentLogEntry {
    pub timestamp: String,
    pub agent: String,
    pub message: String,
}

/// A detected anomalous condition requiring remediation.
///
/// Identity is the `id` field; everything else is descriptive.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Issue {
    pub id: String,

    pub title: String,

    pub severity: Severity,

    #[cfg_attr(feature = "serde", serde(default))]
    pub description: String,

    #[cfg_attr(feature = "serde", serde(default))]
    pub affected_towers: Vec<String>,

    /// Impact as displayed, e.g. `"87%"`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub impact_score: String,

    #[cfg_attr(feature = "serde", serde(default))]
    pub status: String,

    #[cfg_attr(feature = "serde", serde(default))]
    pub agent_trace: Vec<String>,

    #[cfg_attr(feature = "serde", serde(default))]
    pub active_agent: String,

    #[cfg_attr(feature = "serde", serde(default))]
    pub suggested_action: String,

    #[cfg_attr(feature = "serde", serde(default))]
    pub remediation_steps: Vec<String>,

    #[cfg_attr(feature = "serde", serde(default))]
    pub agent_logs: Vec<AgentLogEntry>,

    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub region: Option<String>,

    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub detailed_analysis: Option<String>,
}

impl Issue {
    /// Create an active issue with the given identity and defaults elsewhere.
    pub fn new(id: impl Into<String>, title: impl Into<String>, severity: Severity) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            severity,
            status: "Active".to_string(),
            agent_trace: crate::AGENT_TRACE.iter().map(|s| s.to_string()).collect(),
            suggested_action: severity.default_action().to_string(),
            ..Default::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn affected_towers<I, S>(mut self, towers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.affected_towers = towers.into_iter().map(Into::into).collect();
        self
    }

    pub fn impact_score(mut self, impact: impl Into<String>) -> Self {
        self.impact_score = impact.into();
        self
    }

    pub fn active_agent(mut self, agent: impl Into<String>) -> Self {
        self.active_agent = agent.into();
        self
    }

    pub fn suggested_action(mut self, action: impl Into<String>) -> Self {
        self.suggested_action = action.into();
        self
    }

    pub fn remediation_steps<I, S>(mut self, steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.remediation_steps = steps.into_iter().map(Into::into).collect();
        self
    }

    pub fn agent_log(mut self, entry: AgentLogEntry) -> Self {
        self.agent_logs.push(entry);
        self
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// The action to run when remediating, falling back to the severity default.
    pub fn remediation_action(&self) -> &str {
        if self.suggested_action.is_empty() {
            self.severity.default_action()
        } else {
            &self.suggested_action
        }
    }

    /// Impact as a number, if `impact_score` parses (a trailing `%` is allowed).
    pub fn impact_percent(&self) -> Option<f64> {
        self.impact_score.trim().trim_end_matches('%').parse().ok()
    }
}
