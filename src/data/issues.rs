//! Issue lifecycle tracking.
//!
//! Issues move one way: active, then resolved. Once an id has been resolved
//! it is remembered for the lifetime of the tracker, and any later `issue`
//! event carrying that id is rejected.

use std::collections::HashSet;

use trace_types::{Issue, Severity};

/// Active issues plus the set of ids that have already been resolved.
#[derive(Debug, Clone, Default)]
pub struct IssueTracker {
    active: Vec<Issue>,
    resolved: HashSet<String>,
}

/// Issue counts by severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeverityCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl SeverityCounts {
    pub fn total(&self) -> usize {
        self.critical + self.high + self.medium + self.low
    }

    pub fn get(&self, severity: Severity) -> usize {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
        }
    }
}

impl IssueTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an issue to the active list.
    ///
    /// Returns `false` without changing anything if the id is already active
    /// or has already been resolved.
    pub fn insert(&mut self, issue: Issue) -> bool {
        if self.resolved.contains(&issue.id) || self.is_active(&issue.id) {
            return false;
        }
        self.active.push(issue);
        true
    }

    /// Mark an id resolved and drop it from the active list.
    ///
    /// Returns the issue if it was active. The id is recorded as resolved
    /// either way, so an issue resolved before it was ever seen stays out.
    pub fn resolve(&mut self, id: &str) -> Option<Issue> {
        self.resolved.insert(id.to_string());
        let index = self.active.iter().position(|i| i.id == id)?;
        Some(self.active.remove(index))
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.active.iter().any(|i| i.id == id)
    }

    pub fn is_resolved(&self, id: &str) -> bool {
        self.resolved.contains(id)
    }

    pub fn get(&self, id: &str) -> Option<&Issue> {
        self.active.iter().find(|i| i.id == id)
    }

    /// Active issues in arrival order.
    pub fn active(&self) -> &[Issue] {
        &self.active
    }

    /// Active issues, most severe first, then by arrival.
    pub fn by_severity(&self) -> Vec<&Issue> {
        let mut issues: Vec<&Issue> = self.active.iter().collect();
        // sort_by is stable, so arrival order survives within a severity
        issues.sort_by(|a, b| b.severity.cmp(&a.severity));
        issues
    }

    /// Resolved ids, sorted for stable output.
    pub fn resolved_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.resolved.iter().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn resolved_count(&self) -> usize {
        self.resolved.len()
    }

    pub fn counts(&self) -> SeverityCounts {
        let mut counts = SeverityCounts::default();
        for issue in &self.active {
            match issue.severity {
                Severity::Critical => counts.critical += 1,
                Severity::High => counts.high += 1,
                Severity::Medium => counts.medium += 1,
                Severity::Low => counts.low += 1,
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(id: &str, severity: Severity) -> Issue {
        Issue::new(id, "Energy Spike", severity)
    }

    #[test]
    fn test_insert_is_idempotent() {
        let mut tracker = IssueTracker::new();
        assert!(tracker.insert(issue("issue-1", Severity::High)));
        assert!(!tracker.insert(issue("issue-1", Severity::Critical)));
        assert_eq!(tracker.active_count(), 1);
        assert_eq!(tracker.active()[0].severity, Severity::High);
    }

    #[test]
    fn test_resolved_issue_never_returns() {
        let mut tracker = IssueTracker::new();
        tracker.insert(issue("issue-mock-1", Severity::High));

        let resolved = tracker.resolve("issue-mock-1");
        assert_eq!(resolved.map(|i| i.id), Some("issue-mock-1".to_string()));
        assert!(tracker.active().is_empty());

        // Duplicate detection event after resolution
        assert!(!tracker.insert(issue("issue-mock-1", Severity::High)));
        assert!(tracker.active().is_empty());
        assert!(tracker.is_resolved("issue-mock-1"));
    }

    #[test]
    fn test_resolve_unknown_id_blocks_later_insert() {
        let mut tracker = IssueTracker::new();
        assert!(tracker.resolve("issue-late").is_none());
        assert!(!tracker.insert(issue("issue-late", Severity::Medium)));
        assert_eq!(tracker.resolved_count(), 1);
    }

    #[test]
    fn test_by_severity_is_stable() {
        let mut tracker = IssueTracker::new();
        tracker.insert(issue("a", Severity::Medium));
        tracker.insert(issue("b", Severity::Critical));
        tracker.insert(issue("c", Severity::Medium));
        tracker.insert(issue("d", Severity::High));

        let ids: Vec<&str> = tracker.by_severity().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn test_counts() {
        let mut tracker = IssueTracker::new();
        tracker.insert(issue("a", Severity::Critical));
        tracker.insert(issue("b", Severity::Critical));
        tracker.insert(issue("c", Severity::Low));

        let counts = tracker.counts();
        assert_eq!(counts.critical, 2);
        assert_eq!(counts.get(Severity::Low), 1);
        assert_eq!(counts.total(), 3);
    }
}
