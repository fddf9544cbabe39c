//! Agents view rendering.

use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use crate::app::App;

/// Render agent statuses.
///
/// Without a backend this lists the pipeline stages as "simulated".
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let agents = app.agents();

    let header = Row::new(vec!["Agent", "Status", "Uptime"]).height(1).style(app.theme.header);

    let rows: Vec<Row> = agents
        .iter()
        .map(|agent| {
            let style = if agent.is_active() {
                Style::default().fg(app.theme.healthy)
            } else {
                Style::default().fg(app.theme.warning)
            };
            Row::new(vec![
                Cell::from(agent.name.clone()),
                Cell::from(agent.status.clone()).style(style),
                Cell::from(agent.uptime.clone()),
            ])
        })
        .collect();

    let widths = [Constraint::Fill(2), Constraint::Fill(1), Constraint::Length(14)];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(format!(" Agents ({}) ", agents.len()))
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(app.selected_index.min(agents.len().saturating_sub(1))));

    frame.render_stateful_widget(table, area, &mut state);
}
