//! Detail overlay rendering.
//!
//! Displays a modal overlay with the selected issue, its agent activity,
//! remediation progress and the chat log for that issue.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use trace_types::Issue;

use super::common::centered;
use crate::app::{App, RemediationProgress};
use crate::assistant::Role;
use crate::remediation::Stage;

/// Minimum width required for the detail overlay to render properly.
const MIN_OVERLAY_WIDTH: u16 = 50;
/// Minimum height required for the detail overlay to render properly.
const MIN_OVERLAY_HEIGHT: u16 = 16;

/// Render the issue detail as a modal overlay.
pub fn render_overlay(frame: &mut Frame, app: &App, area: Rect) {
    if area.width < MIN_OVERLAY_WIDTH || area.height < MIN_OVERLAY_HEIGHT {
        return;
    }
    let Some(ref issue) = app.detail_issue else {
        return;
    };

    let overlay_width = (area.width * 95 / 100).clamp(MIN_OVERLAY_WIDTH, 120);
    let overlay_height = (area.height * 90 / 100).clamp(MIN_OVERLAY_HEIGHT, 50);
    let overlay_area = centered(area, overlay_width, overlay_height);

    frame.render_widget(Clear, overlay_area);

    let chunks = Layout::vertical([
        Constraint::Length(5), // Header
        Constraint::Min(6),    // Issue body and chat
        Constraint::Length(3), // Remediation progress
        Constraint::Length(1), // Footer / chat input
    ])
    .split(overlay_area);

    render_header(frame, app, issue, chunks[0]);

    let body = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).split(chunks[1]);
    render_body(frame, app, issue, body[0]);
    render_chat(frame, app, issue, body[1]);
    render_progress(frame, app, issue, chunks[2]);
    render_footer(frame, app, chunks[3]);
}

fn bordered<'a>(app: &App, title: String) -> Block<'a> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border))
}

fn render_header(frame: &mut Frame, app: &App, issue: &Issue, area: Rect) {
    let resolved = app.state.lock().issues.is_resolved(&issue.id);
    let status = if resolved { "resolved" } else { issue.status.as_str() };
    let bold = Style::default().add_modifier(Modifier::BOLD);

    let lines = vec![
        Line::from(vec![
            Span::styled(format!(" {} ", issue.severity.symbol()), app.theme.severity_style(issue.severity)),
            Span::styled(issue.title.clone(), bold),
            Span::raw(format!("  ({})", issue.id)),
        ]),
        Line::from(vec![
            Span::raw(" Towers: "),
            Span::styled(issue.affected_towers.join(", "), bold),
            Span::raw("    Impact: "),
            Span::styled(issue.impact_score.clone(), bold),
            Span::raw("    Status: "),
            Span::styled(status.to_string(), bold),
        ]),
        Line::from(vec![
            Span::raw(" Agent: "),
            Span::raw(issue.active_agent.clone()),
            Span::raw("    Suggested action: "),
            Span::styled(issue.remediation_action().to_string(), Style::default().fg(app.theme.highlight)),
        ]),
    ];

    let block = Block::default()
        .title(" Issue Detail ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_body(frame: &mut Frame, app: &App, issue: &Issue, area: Rect) {
    let dim = Style::default().add_modifier(Modifier::DIM);
    let bold = Style::default().add_modifier(Modifier::BOLD);

    let mut lines = vec![Line::from(issue.description.clone()), Line::from("")];

    if !issue.remediation_steps.is_empty() {
        lines.push(Line::from(Span::styled("Remediation steps", bold)));
        for (n, step) in issue.remediation_steps.iter().enumerate() {
            lines.push(Line::from(format!(" {}. {}", n + 1, step)));
        }
        lines.push(Line::from(""));
    }

    if !issue.agent_trace.is_empty() {
        lines.push(Line::from(vec![
            Span::styled("Pipeline ", bold),
            Span::raw(issue.agent_trace.join(" > ")),
        ]));
        lines.push(Line::from(""));
    }

    lines.push(Line::from(Span::styled("Agent log", bold)));
    if issue.agent_logs.is_empty() {
        lines.push(Line::from(Span::styled(" No agent activity", dim)));
    }
    for entry in &issue.agent_logs {
        lines.push(Line::from(vec![
            Span::styled(format!(" {} ", entry.timestamp), dim),
            Span::styled(format!("{}: ", entry.agent), Style::default().fg(app.theme.highlight)),
            Span::raw(entry.message.clone()),
        ]));
    }

    let paragraph = Paragraph::new(lines)
        .block(bordered(app, " Description ".to_string()))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_chat(frame: &mut Frame, app: &App, issue: &Issue, area: Rect) {
    let mut lines = Vec::new();
    for message in app.chat_for(&issue.id) {
        let role_style = match message.role {
            Role::User => Style::default().fg(app.theme.highlight).add_modifier(Modifier::BOLD),
            Role::Agent => Style::default().fg(app.theme.healthy).add_modifier(Modifier::BOLD),
            Role::System => Style::default().add_modifier(Modifier::DIM),
            Role::Error => Style::default().fg(app.theme.critical).add_modifier(Modifier::BOLD),
        };
        let tag = if message.is_fallback() {
            format!("{} (fallback)", message.role)
        } else {
            message.role.to_string()
        };
        lines.push(Line::from(Span::styled(tag, role_style)));
        for text in message.text.lines() {
            lines.push(Line::from(format!(" {}", text)));
        }
    }
    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            " i: ask for analysis, m: message the agent",
            Style::default().add_modifier(Modifier::DIM),
        )));
    }

    // Keep the tail of the conversation in view
    let inner_height = area.height.saturating_sub(2) as usize;
    let skip = lines.len().saturating_sub(inner_height);
    let visible: Vec<Line> = lines.into_iter().skip(skip).collect();

    let paragraph = Paragraph::new(visible)
        .block(bordered(app, " Agent Chat ".to_string()))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_progress(frame: &mut Frame, app: &App, issue: &Issue, area: Rect) {
    let dim = Style::default().add_modifier(Modifier::DIM);
    let progress = app.remediations.get(&issue.id);

    let current = match progress {
        Some(RemediationProgress::Running(stage)) => Some(stage.index()),
        Some(RemediationProgress::Succeeded(_)) => Some(Stage::ALL.len()),
        _ => None,
    };

    let mut spans = vec![Span::raw(" ")];
    for stage in Stage::ALL {
        let style = match current {
            Some(c) if stage.index() < c => Style::default().fg(app.theme.healthy),
            Some(c) if stage.index() == c => Style::default().fg(app.theme.highlight).add_modifier(Modifier::BOLD),
            _ => dim,
        };
        spans.push(Span::styled(format!("[{}]", stage.label()), style));
        spans.push(Span::raw(" "));
    }

    let detail = match progress {
        None => Span::styled("press a to auto-remediate", dim),
        Some(RemediationProgress::Pending) => Span::raw("starting..."),
        Some(RemediationProgress::Running(stage)) => Span::raw(stage.detail(issue.remediation_action())),
        Some(RemediationProgress::Succeeded(message)) => {
            Span::styled(message.clone(), Style::default().fg(app.theme.healthy))
        }
        Some(RemediationProgress::Failed(message)) => {
            Span::styled(message.clone(), Style::default().fg(app.theme.critical))
        }
    };
    spans.push(detail);

    frame.render_widget(
        Paragraph::new(Line::from(spans)).block(bordered(app, " Remediation ".to_string())),
        area,
    );
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let line = if app.chat_active {
        Line::from(vec![
            Span::styled(" > ", Style::default().fg(app.theme.highlight)),
            Span::raw(format!("{}_", app.chat_input)),
        ])
    } else {
        Line::from(Span::styled(
            " a:remediate  i:analyze  m:message  Esc:close ",
            Style::default().add_modifier(Modifier::DIM),
        ))
    };
    frame.render_widget(Paragraph::new(line), area);
}
