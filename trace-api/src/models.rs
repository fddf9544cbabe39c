//! Request and response bodies for the action endpoints.

use serde::{Deserialize, Serialize};

use trace_types::{Issue, Resolution};

/// Body sent to `/agent`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum AgentRequest {
    /// Free-form chat with the principal agent.
    Chat { message: String, context: String },
    /// Ask the agent to analyze a specific issue.
    Analyze { issue: Issue },
}

/// Reply from `/agent`.
///
/// Chat replies carry `response`; analysis replies carry `analysis`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AgentReply {
    #[serde(default)]
    pub success: Option<bool>,

    #[serde(default, alias = "analysis")]
    pub response: Option<String>,

    /// `"agent"`, `"fallback"`, ...
    #[serde(default)]
    pub source: Option<String>,

    #[serde(default)]
    pub timestamp: Option<String>,
}

impl AgentReply {
    /// The reply text, if the backend produced any.
    pub fn text(&self) -> Option<&str> {
        self.response.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// Body sent to `/remediate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemediateRequest {
    pub issue_id: String,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

/// Body returned by `/remediate`. Every field is optional because demo
/// backends return anything from a full record to an empty object.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemediateBody {
    #[serde(default)]
    pub success: Option<bool>,

    #[serde(default, rename = "issueId")]
    pub issue_id: Option<String>,

    #[serde(default)]
    pub action: Option<String>,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub agent_response: Option<String>,

    #[serde(default)]
    pub source: Option<String>,

    #[serde(default)]
    pub timestamp: Option<String>,

    #[serde(default)]
    pub resolution: Option<Resolution>,
}

/// Outcome of a `/remediate` call that reached the server.
#[derive(Debug, Clone, Default)]
pub struct RemediationReply {
    /// HTTP status code.
    pub status: u16,
    /// Parsed body, or `None` if it was empty or not JSON.
    pub body: Option<RemediateBody>,
}

impl RemediationReply {
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }

    /// Human-readable message from the body, if any.
    pub fn message(&self) -> Option<&str> {
        let body = self.body.as_ref()?;
        body.message.as_deref().or(body.agent_response.as_deref())
    }
}
