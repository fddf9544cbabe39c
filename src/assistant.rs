//! Principal agent chat and issue analysis.
//!
//! Requests go to `/agent`. When the backend is unreachable, errors, or
//! replies with nothing, a canned response is produced locally so the chat
//! log always gets an answer.

use std::fmt;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use trace_api::ApiClient;
use trace_types::Issue;

/// Context string sent with chat requests.
pub const CHAT_CONTEXT: &str = "trace_dashboard";

/// Who a chat line is from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Agent,
    System,
    Error,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "you",
            Role::Agent => "agent",
            Role::System => "system",
            Role::Error => "error",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One line in a chat log.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    /// Issue the conversation is attached to, `None` for general chat.
    pub issue_id: Option<String>,
    pub role: Role,
    pub text: String,
    /// `"agent"` or `"fallback"` for agent replies.
    pub source: Option<String>,
}

impl ChatMessage {
    pub fn new(issue_id: Option<String>, role: Role, text: impl Into<String>) -> Self {
        Self {
            issue_id,
            role,
            text: text.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn is_fallback(&self) -> bool {
        self.source.as_deref() == Some("fallback")
    }
}

/// What a chat message is about, for picking a canned reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    Health,
    Energy,
    Congestion,
    Remediation,
    Help,
    General,
}

impl Topic {
    /// Keyword match, first topic wins.
    pub fn classify(message: &str) -> Topic {
        const KEYWORDS: [(Topic, &[&str]); 5] = [
            (Topic::Health, &["health", "status", "check", "overview"]),
            (Topic::Energy, &["energy", "power", "consumption", "saving", "kwh"]),
            (Topic::Congestion, &["congestion", "traffic", "surge", "load", "balance", "concert", "event"]),
            (Topic::Remediation, &["remediat", "fix", "heal", "recover", "restart", "fail", "issue", "incident"]),
            (Topic::Help, &["help", "what can", "capabilit", "feature", "how to"]),
        ];

        let lower = message.to_lowercase();
        KEYWORDS
            .iter()
            .find(|(_, words)| words.iter().any(|w| lower.contains(w)))
            .map_or(Topic::General, |(topic, _)| *topic)
    }
}

/// Canned reply used when the agent is unavailable.
pub fn fallback_chat(message: &str) -> String {
    match Topic::classify(message) {
        Topic::Health => "System Health Report\n\
            Overall status: operational (95.7%)\n\
            Principal agent: active 1/1\n\
            Regional coordinators: healthy 3/3\n\
            Edge agents: running 15/15\n\
            Towers online: 48/50\n\
            Energy savings today: 34.2%. Congestion events prevented: 3 (last 6h)."
            .to_string(),
        Topic::Energy => "Energy Optimization Analysis\n\
            Consumption: 1,245 kWh over the last hour\n\
            Savings achieved: 34.2% vs baseline\n\
            Opportunities: TX003 reduce TRX 40%, TX007 sleep mode, TX012 partial shutdown\n\
            Low traffic expected 2:00-5:00; energy saving mode on 12 towers could save 30-40% more."
            .to_string(),
        Topic::Congestion => "Congestion Management Analysis\n\
            Network load: 67% of capacity, peak 485 Gbps, 32,450 active connections\n\
            Risk: moderate, predicted surge +45% in 4 hours\n\
            Plan: pre-activate backup cells on TX003/TX004, raise capacity on TX007/TX008, \
            keep TX001/TX002 ready for overflow."
            .to_string(),
        Topic::Remediation => "Self-Healing and Remediation\n\
            restart_agent: restart monitoring agent (~30s, 95% success)\n\
            redeploy_agent: full agent redeployment (~2min, 98% success)\n\
            reroute_traffic: redirect to healthy nodes (~45s, 97% success)\n\
            Select an issue and press 'a' to run auto-remediation."
            .to_string(),
        Topic::Help => "TRACE Principal Agent capabilities\n\
            Energy optimization: reduce tower energy 30-40% during low demand\n\
            Congestion management: predict surges and balance load ahead of them\n\
            Self-healing: detect failures and remediate automatically\n\
            Pipeline: Monitoring > Prediction > Decision xApp > Action > Learning"
            .to_string(),
        Topic::General => format!(
            "I understand you're asking about: \"{}\"\n\
            I coordinate the TRACE multi-agent system. Try asking about system health, \
            energy usage, traffic surges or remediation.",
            message.trim()
        ),
    }
}

/// Templated analysis used when the agent is unavailable.
pub fn fallback_analysis(issue: &Issue) -> String {
    let cause = issue.detailed_analysis.as_deref().unwrap_or("elevated resource usage");
    let action = title_case(issue.remediation_action());

    format!(
        "Issue Analysis (Fallback Mode)\n\
        Issue: {}\n\
        Severity: {}\n\
        Root cause assessment: based on the metrics patterns, this issue appears to be related to {}.\n\
        Recommended actions:\n\
        1. {}\n\
        2. Monitor system metrics for 15 minutes post-remediation\n\
        3. If issue persists, escalate to redeploy_agent",
        issue.title,
        issue.severity.label().to_uppercase(),
        cause,
        action,
    )
}

/// `restart_agent` -> `Restart Agent`.
fn title_case(action: &str) -> String {
    action
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Sends chat and analysis requests and reports replies on a channel.
#[derive(Debug, Clone)]
pub struct Assistant {
    api: ApiClient,
    replies: mpsc::UnboundedSender<ChatMessage>,
}

impl Assistant {
    pub fn new(api: ApiClient) -> (Self, mpsc::UnboundedReceiver<ChatMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { api, replies: tx }, rx)
    }

    /// Ask a free-form question on a background task.
    pub fn ask(&self, issue_id: Option<String>, message: String) -> JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move {
            let reply = this.chat(issue_id, &message).await;
            let _ = this.replies.send(reply);
        })
    }

    /// Request an analysis of `issue` on a background task.
    pub fn request_analysis(&self, issue: Issue) -> JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move {
            let reply = this.analyze(&issue).await;
            let _ = this.replies.send(reply);
        })
    }

    pub async fn chat(&self, issue_id: Option<String>, message: &str) -> ChatMessage {
        match self.api.chat(message, CHAT_CONTEXT).await {
            Ok(reply) => match reply.text() {
                Some(text) => {
                    let source = reply.source.clone().unwrap_or_else(|| "agent".to_string());
                    ChatMessage::new(issue_id, Role::Agent, text).with_source(source)
                }
                None => {
                    debug!("agent returned an empty chat reply");
                    ChatMessage::new(issue_id, Role::Agent, fallback_chat(message)).with_source("fallback")
                }
            },
            Err(e) => {
                warn!(error = %e, "agent chat failed, using fallback");
                ChatMessage::new(issue_id, Role::Agent, fallback_chat(message)).with_source("fallback")
            }
        }
    }

    pub async fn analyze(&self, issue: &Issue) -> ChatMessage {
        let issue_id = Some(issue.id.clone());
        match self.api.analyze(issue).await {
            Ok(reply) => match reply.text() {
                Some(text) => {
                    let source = reply.source.clone().unwrap_or_else(|| "agent".to_string());
                    ChatMessage::new(issue_id, Role::Agent, text).with_source(source)
                }
                None => ChatMessage::new(issue_id, Role::Agent, fallback_analysis(issue)).with_source("fallback"),
            },
            Err(e) => {
                warn!(issue_id = %issue.id, error = %e, "agent analysis failed, using fallback");
                ChatMessage::new(issue_id, Role::Agent, fallback_analysis(issue)).with_source("fallback")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trace_types::Severity;

    #[test]
    fn test_classify() {
        assert_eq!(Topic::classify("What's the system HEALTH?"), Topic::Health);
        assert_eq!(Topic::classify("power draw on tower 5"), Topic::Energy);
        assert_eq!(Topic::classify("traffic surge tonight"), Topic::Congestion);
        assert_eq!(Topic::classify("any open incident?"), Topic::Remediation);
        assert_eq!(Topic::classify("help"), Topic::Help);
        assert_eq!(Topic::classify("hello there"), Topic::General);
        // Health wins over energy
        assert_eq!(Topic::classify("energy status"), Topic::Health);
    }

    #[test]
    fn test_fallback_chat() {
        assert!(fallback_chat("status").contains("95.7%"));
        assert!(fallback_chat("how much energy did we save").contains("34.2%"));
        assert!(fallback_chat("hello").contains("\"hello\""));
    }

    #[test]
    fn test_fallback_analysis() {
        let issue = Issue::new("issue-1", "TRX Overload", Severity::Critical).suggested_action("redeploy_agent");
        let text = fallback_analysis(&issue);
        assert!(text.starts_with("Issue Analysis (Fallback Mode)"));
        assert!(text.contains("Severity: CRITICAL"));
        assert!(text.contains("elevated resource usage"));
        assert!(text.contains("1. Redeploy Agent"));

        let mut issue = issue;
        issue.detailed_analysis = Some("a firmware regression on Tower-4".to_string());
        assert!(fallback_analysis(&issue).contains("a firmware regression on Tower-4"));
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("reroute_traffic"), "Reroute Traffic");
        assert_eq!(title_case("restart"), "Restart");
        assert_eq!(title_case(""), "");
    }

    #[tokio::test]
    async fn test_unreachable_agent_falls_back() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let api = ApiClient::builder().endpoint(format!("http://{}", addr)).build();
        let (assistant, _rx) = Assistant::new(api);

        let reply = assistant.chat(None, "check health").await;
        assert_eq!(reply.role, Role::Agent);
        assert!(reply.is_fallback());
        assert!(reply.text.contains("95.7%"));

        let issue = Issue::new("issue-1", "Energy Spike", Severity::High);
        let reply = assistant.analyze(&issue).await;
        assert_eq!(reply.issue_id.as_deref(), Some("issue-1"));
        assert!(reply.text.contains("Severity: HIGH"));
    }
}
