//! Issues view rendering.
//!
//! Active issues, most severe first, with remediation progress inline.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use super::common::filter_info;
use crate::app::{App, RemediationProgress};

/// Render the Issues view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let issues = app.filtered_issues();
    let total = app.state.lock().issues.active_count();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    if issues.is_empty() {
        let message = if total == 0 {
            "  No active issues"
        } else {
            "  No issues match the filter"
        };
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(message, Style::default().add_modifier(Modifier::DIM))),
        ])
        .block(block.title(format!(" Issues (0/{}){} ", total, filter_info(app))));
        frame.render_widget(empty, area);
        return;
    }

    let header = Row::new(vec!["Sev", "ID", "Title", "Towers", "Impact", "Action", "Progress"])
        .height(1)
        .style(app.theme.header);

    let rows: Vec<Row> = issues
        .iter()
        .map(|issue| {
            let progress = match app.remediations.get(&issue.id) {
                Some(RemediationProgress::Pending) => "queued".to_string(),
                Some(RemediationProgress::Running(stage)) => format!("{}...", stage),
                Some(RemediationProgress::Succeeded(_)) => "done".to_string(),
                Some(RemediationProgress::Failed(_)) => "failed".to_string(),
                None => "-".to_string(),
            };

            Row::new(vec![
                Cell::from(issue.severity.symbol()).style(app.theme.severity_style(issue.severity)),
                Cell::from(issue.id.clone()),
                Cell::from(issue.title.clone()),
                Cell::from(issue.affected_towers.join(", ")),
                Cell::from(if issue.impact_score.is_empty() {
                    "-".to_string()
                } else {
                    issue.impact_score.clone()
                }),
                Cell::from(issue.remediation_action().to_string()),
                Cell::from(progress),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(5),
        Constraint::Length(15),
        Constraint::Fill(3),
        Constraint::Fill(1),
        Constraint::Length(7),
        Constraint::Length(16),
        Constraint::Length(12),
    ];

    let selected = app.selected_index.min(issues.len().saturating_sub(1));
    let title = format!(
        " Issues ({}/{}){} [{}/{}] ",
        issues.len(),
        total,
        filter_info(app),
        selected + 1,
        issues.len()
    );

    let table = Table::new(rows, widths)
        .header(header)
        .block(block.title(title))
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(selected));

    frame.render_stateful_widget(table, area, &mut state);
}
