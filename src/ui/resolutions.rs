//! Resolutions view rendering.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use super::common::filter_info;
use crate::app::App;

/// Render the resolution history, newest first.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let resolutions = app.filtered_resolutions();
    let total = app.state.lock().resolutions.len();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border))
        .title(format!(" Resolutions ({}/{}){} ", resolutions.len(), total, filter_info(app)));

    if resolutions.is_empty() {
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled("  No resolutions yet", Style::default().add_modifier(Modifier::DIM))),
        ])
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let header = Row::new(vec!["Time", "Title", "Summary", "Agent", "Confidence", "Rollback"])
        .height(1)
        .style(app.theme.header);

    let rows: Vec<Row> = resolutions
        .iter()
        .map(|r| {
            Row::new(vec![
                Cell::from(short_time(&r.timestamp)),
                Cell::from(r.title.clone()),
                Cell::from(r.summary.clone()),
                Cell::from(r.initiating_agent.clone()),
                Cell::from(r.confidence_score.clone()),
                Cell::from(r.rollback_status.clone()),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(9),
        Constraint::Fill(2),
        Constraint::Fill(3),
        Constraint::Fill(1),
        Constraint::Length(11),
        Constraint::Length(14),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(app.selected_index.min(resolutions.len().saturating_sub(1))));

    frame.render_stateful_widget(table, area, &mut state);
}

/// `2025-01-07T14:03:22Z` -> `14:03:22`; anything unparseable is shown as-is.
fn short_time(timestamp: &str) -> String {
    match chrono::DateTime::parse_from_rfc3339(timestamp) {
        Ok(t) => t.format("%H:%M:%S").to_string(),
        Err(_) => timestamp.to_string(),
    }
}
