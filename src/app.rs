//! Application state and navigation logic.

use std::collections::HashMap;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info};

use trace_api::ApiClient;
use trace_types::{AgentStatus, Channel, ConnectionMode, Issue, Resolution};

use crate::assistant::{Assistant, ChatMessage, Role};
use crate::backfill::simulated_agents;
use crate::data::SharedState;
use crate::remediation::{RemediationEvent, Remediator, Stage};
use crate::stream::StreamClient;
use crate::ui::Theme;

/// How long a status message stays on screen.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// The current view/tab in the TUI.
///
/// Issue detail is shown as an overlay (controlled by
/// `App::show_detail_overlay`) rather than as a separate view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Health gauge, telemetry sparklines and active users.
    Overview,
    /// Active issues, most severe first.
    Issues,
    /// Resolution history, newest first.
    Resolutions,
    /// Agent statuses.
    Agents,
}

impl View {
    pub const ALL: [View; 4] = [View::Overview, View::Issues, View::Resolutions, View::Agents];

    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Overview => View::Issues,
            View::Issues => View::Resolutions,
            View::Resolutions => View::Agents,
            View::Agents => View::Overview,
        }
    }

    /// Cycle to the previous view.
    pub fn prev(self) -> Self {
        match self {
            View::Overview => View::Agents,
            View::Issues => View::Overview,
            View::Resolutions => View::Issues,
            View::Agents => View::Resolutions,
        }
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Overview => "Overview",
            View::Issues => "Issues",
            View::Resolutions => "Resolutions",
            View::Agents => "Agents",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

/// Progress of one remediation as seen by the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum RemediationProgress {
    /// Spawned, no stage reported yet.
    Pending,
    Running(Stage),
    Succeeded(String),
    Failed(String),
}

impl RemediationProgress {
    pub fn is_finished(&self) -> bool {
        matches!(self, RemediationProgress::Succeeded(_) | RemediationProgress::Failed(_))
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,
    pub show_detail_overlay: bool,

    // Stream and shared dashboard state
    client: StreamClient,
    pub state: SharedState,

    // Backend actions
    remediator: Option<Remediator>,
    remediation_rx: Option<mpsc::UnboundedReceiver<RemediationEvent>>,
    assistant: Option<Assistant>,
    chat_rx: Option<mpsc::UnboundedReceiver<ChatMessage>>,
    pub remediations: HashMap<String, RemediationProgress>,
    pub chat_log: Vec<ChatMessage>,

    // Navigation state
    pub selected_index: usize,
    /// The issue shown in the detail overlay. Kept as a copy so the overlay
    /// survives the issue being resolved.
    pub detail_issue: Option<Issue>,

    // Search/filter
    pub filter_text: String,
    pub filter_active: bool,

    // Chat input in the detail overlay
    pub chat_input: String,
    pub chat_active: bool,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create an App reading from `client` into `state`.
    ///
    /// Every data channel of the client is subscribed to `state`.
    pub fn new(mut client: StreamClient, state: SharedState, theme: Theme) -> Self {
        for channel in Channel::ALL {
            if channel == Channel::Connection {
                continue;
            }
            let state = state.clone();
            client.subscribe(channel, move |event| {
                state.apply(event);
            });
        }

        Self {
            running: true,
            current_view: View::Overview,
            show_help: false,
            show_detail_overlay: false,
            client,
            state,
            remediator: None,
            remediation_rx: None,
            assistant: None,
            chat_rx: None,
            remediations: HashMap::new(),
            chat_log: Vec::new(),
            selected_index: 0,
            detail_issue: None,
            filter_text: String::new(),
            filter_active: false,
            chat_input: String::new(),
            chat_active: false,
            theme,
            status_message: None,
        }
    }

    /// Enable remediation and the agent assistant against `api`.
    pub fn with_backend(mut self, api: ApiClient, stage_delay: Duration) -> Self {
        let (remediator, remediation_rx) = Remediator::new(api.clone(), self.state.clone(), stage_delay);
        let (assistant, chat_rx) = Assistant::new(api);
        self.remediator = Some(remediator);
        self.remediation_rx = Some(remediation_rx);
        self.assistant = Some(assistant);
        self.chat_rx = Some(chat_rx);
        self
    }

    /// Returns a description of the current event source.
    pub fn source_description(&self) -> &str {
        self.client.description()
    }

    pub fn mode(&self) -> ConnectionMode {
        self.client.mode()
    }

    pub fn stream_error(&self) -> Option<String> {
        self.client.error()
    }

    /// Time since the last data event, if any arrived.
    pub fn last_event_age(&self) -> Option<Duration> {
        self.client.last_event().map(|t| t.elapsed())
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < STATUS_MESSAGE_TTL {
                return Some(msg);
            }
        }
        None
    }

    /// Deliver queued stream events and background replies.
    ///
    /// Returns the number of stream events delivered.
    pub fn tick(&mut self) -> usize {
        let delivered = self.client.pump();
        self.drain_updates();
        self.clamp_selection();
        delivered
    }

    /// Fold remediation progress and chat replies into the UI state.
    pub fn drain_updates(&mut self) {
        let mut events = Vec::new();
        if let Some(rx) = self.remediation_rx.as_mut() {
            while let Ok(event) = rx.try_recv() {
                events.push(event);
            }
        }
        for event in events {
            self.on_remediation_event(event);
        }

        if let Some(rx) = self.chat_rx.as_mut() {
            while let Ok(message) = rx.try_recv() {
                self.chat_log.push(message);
            }
        }
    }

    fn on_remediation_event(&mut self, event: RemediationEvent) {
        match event {
            RemediationEvent::Stage { issue_id, stage } => {
                debug!(%issue_id, %stage, "remediation stage");
                self.remediations.insert(issue_id, RemediationProgress::Running(stage));
            }
            RemediationEvent::Succeeded {
                issue_id,
                resolution,
                message,
            } => {
                self.set_status_message(format!("Remediated {}: {}", issue_id, resolution.title));
                self.chat_log
                    .push(ChatMessage::new(Some(issue_id.clone()), Role::System, message.clone()));
                self.remediations.insert(issue_id, RemediationProgress::Succeeded(message));
            }
            RemediationEvent::Failed { issue_id, message } => {
                self.set_status_message(format!("Remediation of {} failed", issue_id));
                self.chat_log
                    .push(ChatMessage::new(Some(issue_id.clone()), Role::Error, message.clone()));
                self.remediations.insert(issue_id, RemediationProgress::Failed(message));
            }
        }
    }

    /// Switch to the next view.
    pub fn next_view(&mut self) {
        self.set_view(self.current_view.next());
    }

    /// Switch to the previous view.
    pub fn prev_view(&mut self) {
        self.set_view(self.current_view.prev());
    }

    /// Switch to a specific view.
    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
        self.selected_index = 0;
    }

    /// Number of selectable rows in the current view.
    pub fn item_count(&self) -> usize {
        match self.current_view {
            View::Overview => 0,
            View::Issues => self.filtered_issues().len(),
            View::Resolutions => self.filtered_resolutions().len(),
            View::Agents => self.agents().len(),
        }
    }

    /// Move selection down by one item.
    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    /// Move selection up by one item.
    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    /// Move selection down by n items.
    pub fn select_next_n(&mut self, n: usize) {
        let max = self.item_count().saturating_sub(1);
        self.selected_index = (self.selected_index + n).min(max);
    }

    /// Move selection up by n items.
    pub fn select_prev_n(&mut self, n: usize) {
        self.selected_index = self.selected_index.saturating_sub(n);
    }

    /// Jump to the first item in the list.
    pub fn select_first(&mut self) {
        self.selected_index = 0;
    }

    /// Jump to the last item in the list.
    pub fn select_last(&mut self) {
        self.selected_index = self.item_count().saturating_sub(1);
    }

    fn clamp_selection(&mut self) {
        let max = self.item_count().saturating_sub(1);
        if self.selected_index > max {
            self.selected_index = max;
        }
    }

    /// Active issues after the filter, most severe first.
    pub fn filtered_issues(&self) -> Vec<Issue> {
        let state = self.state.lock();
        state
            .issues
            .by_severity()
            .into_iter()
            .filter(|issue| {
                self.matches_filter(&issue.title)
                    || self.matches_filter(&issue.id)
                    || issue.affected_towers.iter().any(|t| self.matches_filter(t))
            })
            .cloned()
            .collect()
    }

    /// Resolutions after the filter, newest first.
    pub fn filtered_resolutions(&self) -> Vec<Resolution> {
        let state = self.state.lock();
        state
            .recent_resolutions()
            .filter(|r| self.matches_filter(&r.title) || self.matches_filter(&r.summary))
            .cloned()
            .collect()
    }

    /// Agent statuses, or the simulated pipeline if the backend reported none.
    pub fn agents(&self) -> Vec<AgentStatus> {
        let state = self.state.lock();
        if state.agents.is_empty() {
            simulated_agents()
        } else {
            state.agents.clone()
        }
    }

    /// The issue under the cursor in the Issues view.
    pub fn selected_issue(&self) -> Option<Issue> {
        if self.current_view != View::Issues {
            return None;
        }
        self.filtered_issues().into_iter().nth(self.selected_index)
    }

    /// The issue actions apply to: the open overlay's, else the selection.
    fn target_issue(&self) -> Option<Issue> {
        if self.show_detail_overlay {
            self.detail_issue.clone()
        } else {
            self.selected_issue()
        }
    }

    /// Open the detail overlay for the currently selected issue.
    pub fn enter_detail(&mut self) {
        if let Some(issue) = self.selected_issue() {
            self.detail_issue = Some(issue);
            self.show_detail_overlay = true;
        }
    }

    /// Navigate back: close overlay first, then go to Overview.
    pub fn go_back(&mut self) {
        if self.show_detail_overlay {
            self.close_overlay();
            return;
        }
        if self.current_view != View::Overview {
            self.set_view(View::Overview);
        }
    }

    /// Close the detail overlay if open.
    ///
    /// A running remediation keeps going.
    pub fn close_overlay(&mut self) {
        self.show_detail_overlay = false;
        self.chat_active = false;
        self.chat_input.clear();
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Run auto-remediation on the target issue.
    pub fn remediate_selected(&mut self) {
        let Some(issue) = self.target_issue() else {
            return;
        };
        if self.state.lock().issues.is_resolved(&issue.id) {
            self.set_status_message(format!("{} is already resolved", issue.id));
            return;
        }
        if matches!(self.remediations.get(&issue.id), Some(p) if !p.is_finished()) {
            self.set_status_message(format!("Remediation of {} already running", issue.id));
            return;
        }
        let Some(remediator) = self.remediator.as_ref() else {
            self.set_status_message("Remediation unavailable: no backend configured".to_string());
            return;
        };

        info!(issue_id = %issue.id, "auto-remediate requested");
        let action = issue.remediation_action().to_string();
        remediator.spawn(issue.clone());
        self.remediations.insert(issue.id.clone(), RemediationProgress::Pending);
        self.chat_log.push(ChatMessage::new(
            Some(issue.id.clone()),
            Role::User,
            format!("Auto-remediate with {}", action),
        ));
    }

    /// Ask the agent to analyze the target issue.
    pub fn analyze_selected(&mut self) {
        let Some(issue) = self.target_issue() else {
            return;
        };
        let Some(assistant) = self.assistant.as_ref() else {
            self.set_status_message("Analysis unavailable: no backend configured".to_string());
            return;
        };

        assistant.request_analysis(issue.clone());
        self.chat_log.push(ChatMessage::new(Some(issue.id), Role::User, "Analyze this issue"));
    }

    /// Chat lines for the given issue, oldest first.
    pub fn chat_for<'a>(&'a self, issue_id: &'a str) -> impl Iterator<Item = &'a ChatMessage> + 'a {
        self.chat_log
            .iter()
            .filter(move |m| m.issue_id.as_deref() == Some(issue_id))
    }

    /// Start typing a chat message in the detail overlay.
    pub fn start_chat(&mut self) {
        if self.show_detail_overlay {
            self.chat_active = true;
        }
    }

    /// Exit chat input mode, discarding the draft.
    pub fn cancel_chat(&mut self) {
        self.chat_active = false;
        self.chat_input.clear();
    }

    pub fn chat_push(&mut self, c: char) {
        self.chat_input.push(c);
    }

    pub fn chat_pop(&mut self) {
        self.chat_input.pop();
    }

    /// Send the chat draft to the agent.
    pub fn submit_chat(&mut self) {
        let message = self.chat_input.trim().to_string();
        self.cancel_chat();
        if message.is_empty() {
            return;
        }

        let issue_id = self.detail_issue.as_ref().map(|i| i.id.clone());
        self.chat_log
            .push(ChatMessage::new(issue_id.clone(), Role::User, message.clone()));

        match self.assistant.as_ref() {
            Some(assistant) => {
                assistant.ask(issue_id, message);
            }
            None => self.chat_log.push(ChatMessage::new(
                issue_id,
                Role::Error,
                "Error: no agent backend configured",
            )),
        }
    }

    /// Enter filter input mode (starts capturing keystrokes for search).
    pub fn start_filter(&mut self) {
        self.filter_active = true;
    }

    /// Exit filter input mode without clearing the filter text.
    pub fn cancel_filter(&mut self) {
        self.filter_active = false;
    }

    /// Clear the filter text and exit filter mode.
    pub fn clear_filter(&mut self) {
        self.filter_text.clear();
        self.filter_active = false;
    }

    /// Append a character to the filter text.
    pub fn filter_push(&mut self, c: char) {
        self.filter_text.push(c);
        self.selected_index = 0;
    }

    /// Remove the last character from the filter text.
    pub fn filter_pop(&mut self) {
        self.filter_text.pop();
    }

    /// Check if a name matches the current filter.
    pub fn matches_filter(&self, name: &str) -> bool {
        if self.filter_text.is_empty() {
            return true;
        }
        name.to_lowercase().contains(&self.filter_text.to_lowercase())
    }

    /// Signal the application to quit and stop the stream.
    pub fn quit(&mut self) {
        self.running = false;
        self.client.shutdown();
    }

    /// Export the current dashboard summary to a JSON file.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        let mut export = self.state.lock().export();
        if let Some(map) = export.as_object_mut() {
            map.insert("mode".to_string(), serde_json::json!(self.mode().label()));
            map.insert("source".to_string(), serde_json::json!(self.source_description()));
        }

        let json = serde_json::to_string_pretty(&export)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ChannelSource;
    use trace_types::{HealthSnapshot, HealthStatus, Severity, StreamEvent};

    fn app_with_channel() -> (mpsc::Sender<StreamEvent>, App) {
        let (tx, source) = ChannelSource::create("test");
        let client = StreamClient::with_source(Box::new(source));
        (tx, App::new(client, SharedState::default(), Theme::dark()))
    }

    fn issue(id: &str, severity: Severity) -> Issue {
        Issue::new(id, "Energy Spike", severity).affected_towers(["Tower-3"])
    }

    #[test]
    fn test_view_cycle() {
        let mut view = View::Overview;
        for _ in 0..View::ALL.len() {
            view = view.next();
        }
        assert_eq!(view, View::Overview);
        assert_eq!(View::Overview.prev(), View::Agents);
        assert_eq!(View::Resolutions.index(), 2);
    }

    #[test]
    fn test_tick_applies_events() {
        let (tx, mut app) = app_with_channel();
        tx.try_send(StreamEvent::Connection(ConnectionMode::Synthetic)).unwrap();
        tx.try_send(StreamEvent::Health(HealthSnapshot::new(72.0, HealthStatus::Degraded)))
            .unwrap();
        tx.try_send(StreamEvent::Issue(issue("issue-1", Severity::Medium))).unwrap();
        tx.try_send(StreamEvent::Issue(issue("issue-2", Severity::Critical))).unwrap();

        assert_eq!(app.tick(), 4);
        assert_eq!(app.mode(), ConnectionMode::Synthetic);
        assert_eq!(app.state.lock().health.as_ref().map(|h| h.status), Some(HealthStatus::Degraded));

        app.set_view(View::Issues);
        let ids: Vec<_> = app.filtered_issues().into_iter().map(|i| i.id).collect();
        assert_eq!(ids, ["issue-2", "issue-1"]);
        assert!(app.last_event_age().is_some());
    }

    #[test]
    fn test_selection_and_detail() {
        let (tx, mut app) = app_with_channel();
        for n in 0..3 {
            tx.try_send(StreamEvent::Issue(issue(&format!("issue-{}", n), Severity::High)))
                .unwrap();
        }
        app.tick();
        app.set_view(View::Issues);

        app.select_next_n(10);
        assert_eq!(app.selected_index, 2);
        app.select_first();
        app.select_next();
        let selected = app.selected_issue().unwrap();

        app.enter_detail();
        assert!(app.show_detail_overlay);
        assert_eq!(app.detail_issue.as_ref().map(|i| &i.id), Some(&selected.id));

        app.go_back();
        assert!(!app.show_detail_overlay);
        app.go_back();
        assert_eq!(app.current_view, View::Overview);
    }

    #[test]
    fn test_filter_matches_towers() {
        let (tx, mut app) = app_with_channel();
        tx.try_send(StreamEvent::Issue(issue("issue-1", Severity::High))).unwrap();
        tx.try_send(StreamEvent::Issue(
            Issue::new("issue-2", "TRX Overload", Severity::Low).affected_towers(["Tower-9"]),
        ))
        .unwrap();
        app.tick();
        app.set_view(View::Issues);

        for c in "tower-9".chars() {
            app.filter_push(c);
        }
        let issues = app.filtered_issues();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].id, "issue-2");

        app.clear_filter();
        assert_eq!(app.item_count(), 2);
    }

    #[test]
    fn test_agents_fall_back_to_simulated() {
        let (_tx, app) = app_with_channel();
        let agents = app.agents();
        assert_eq!(agents.len(), 5);
        assert!(agents.iter().all(|a| a.status == "simulated"));
    }

    #[test]
    fn test_actions_without_backend() {
        let (tx, mut app) = app_with_channel();
        tx.try_send(StreamEvent::Issue(issue("issue-1", Severity::High))).unwrap();
        app.tick();
        app.set_view(View::Issues);

        app.remediate_selected();
        assert!(app.get_status_message().unwrap().contains("Remediation unavailable"));
        assert!(app.remediations.is_empty());

        app.enter_detail();
        app.start_chat();
        for c in "status?".chars() {
            app.chat_push(c);
        }
        app.submit_chat();
        let roles: Vec<_> = app.chat_for("issue-1").map(|m| m.role).collect();
        assert_eq!(roles, [Role::User, Role::Error]);
        assert!(!app.chat_active);
    }

    #[test]
    fn test_remediation_events_update_progress() {
        let (_tx, mut app) = app_with_channel();
        app.on_remediation_event(RemediationEvent::Stage {
            issue_id: "issue-1".to_string(),
            stage: Stage::Execute,
        });
        assert_eq!(app.remediations["issue-1"], RemediationProgress::Running(Stage::Execute));

        app.on_remediation_event(RemediationEvent::Failed {
            issue_id: "issue-1".to_string(),
            message: "Remediation failed: server returned 503".to_string(),
        });
        assert!(app.remediations["issue-1"].is_finished());
        let last = app.chat_log.last().unwrap();
        assert_eq!(last.role, Role::Error);
    }

    #[test]
    fn test_export_state() {
        let (tx, mut app) = app_with_channel();
        tx.try_send(StreamEvent::Issue(issue("issue-1", Severity::Critical))).unwrap();
        app.tick();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");
        app.export_state(&path).unwrap();

        let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["issues"]["active"][0], "issue-1");
        assert_eq!(json["issues"]["by_severity"]["critical"], 1);
        assert_eq!(json["mode"], "connecting");
        assert_eq!(json["source"], "channel: test");
    }
}
