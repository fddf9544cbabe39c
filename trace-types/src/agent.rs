//! Agent status as reported by `/api/agents/status`.

/// Runtime status of one agent in the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentStatus {
    pub name: String,

    /// Usually `"active"`.
    pub status: String,

    /// Uptime as displayed, e.g. `"27h"`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub uptime: String,
}

impl AgentStatus {
    pub fn new(name: impl Into<String>, status: impl Into<String>, uptime: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: status.into(),
            uptime: uptime.into(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status.eq_ignore_ascii_case("active")
    }
}
