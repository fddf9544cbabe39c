//! Records of completed remediations.

/// A record of a completed remediation action.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Resolution {
    pub id: String,

    pub timestamp: String,

    pub title: String,

    #[cfg_attr(feature = "serde", serde(default))]
    pub summary: String,

    #[cfg_attr(feature = "serde", serde(default))]
    pub initiating_agent: String,

    #[cfg_attr(feature = "serde", serde(default))]
    pub actions: Vec<String>,

    /// `"Available"` when the change can be rolled back, otherwise `"Manual Review"`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub rollback_status: String,

    #[cfg_attr(feature = "serde", serde(default))]
    pub learning_notes: String,

    #[cfg_attr(feature = "serde", serde(default))]
    pub confidence_score: String,

    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub region: Option<String>,

    /// Issue this resolution closed, when known.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub issue_id: Option<String>,
}

impl Resolution {
    pub fn new(id: impl Into<String>, timestamp: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            timestamp: timestamp.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn initiating_agent(mut self, agent: impl Into<String>) -> Self {
        self.initiating_agent = agent.into();
        self
    }

    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.actions.push(action.into());
        self
    }

    pub fn rollback_status(mut self, status: impl Into<String>) -> Self {
        self.rollback_status = status.into();
        self
    }

    pub fn learning_notes(mut self, notes: impl Into<String>) -> Self {
        self.learning_notes = notes.into();
        self
    }

    pub fn confidence_score(mut self, score: impl Into<String>) -> Self {
        self.confidence_score = score.into();
        self
    }

    pub fn for_issue(mut self, issue_id: impl Into<String>) -> Self {
        self.issue_id = Some(issue_id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let r = Resolution::new("resolution-a1b2c3", "2024-05-01T12:00:00", "Automated Remediation Completed")
            .summary("Energy Spike resolved via restart_agent")
            .action("Agent restarted")
            .action("Stability verification completed")
            .for_issue("issue-1");

        assert_eq!(r.actions.len(), 2);
        assert_eq!(r.issue_id.as_deref(), Some("issue-1"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_backend_resolution() {
        let json = r#"{
            "id": "resolution-9f8e7d",
            "region": "eu-central-1",
            "timestamp": "2024-05-01T12:00:00",
            "title": "Historical Remediation",
            "summary": "TRX_Overload mitigated",
            "initiatingAgent": "Action",
            "actions": ["Applied policy fix", "Verified KPIs"],
            "rollbackStatus": "Available",
            "confidenceScore": "91%"
        }"#;

        let r: Resolution = serde_json::from_str(json).unwrap();
        assert_eq!(r.initiating_agent, "Action");
        assert_eq!(r.rollback_status, "Available");
        assert!(r.learning_notes.is_empty());
        assert!(r.issue_id.is_none());
    }
}
