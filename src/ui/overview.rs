//! Overview view rendering.
//!
//! Health gauge and active users on top, a telemetry table with trend
//! sparklines below, and the active-user history as a bar sparkline.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Gauge, Paragraph, Row, Sparkline, Table},
    Frame,
};

use trace_types::TelemetryMetric;

use super::common::{format_count, render_sparkline};
use crate::app::App;
use crate::data::DashboardState;

/// Width of the trend column in characters.
const TREND_WIDTH: usize = 30;

/// Render the Overview view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let state = app.state.lock();

    let rows = Layout::vertical([
        Constraint::Length(5), // Health and users
        Constraint::Min(8),    // Telemetry table
        Constraint::Length(6), // Users sparkline
    ])
    .split(area);

    let top = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).split(rows[0]);

    render_health(frame, app, &state, top[0]);
    render_users(frame, app, &state, top[1]);
    render_telemetry(frame, app, &state, rows[1]);
    render_user_history(frame, app, &state, rows[2]);
}

fn block<'a>(app: &App, title: String) -> Block<'a> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border))
}

fn render_health(frame: &mut Frame, app: &App, state: &DashboardState, area: Rect) {
    let Some(ref health) = state.health else {
        let waiting = Paragraph::new(Line::from(Span::styled(
            " Waiting for health data...",
            Style::default().add_modifier(Modifier::DIM),
        )))
        .block(block(app, " Network Health ".to_string()));
        frame.render_widget(waiting, area);
        return;
    };

    let gauge = Gauge::default()
        .block(block(app, format!(" Network Health: {} ", health.status)))
        .gauge_style(app.theme.health_style(health.status))
        .ratio((health.score / 100.0).clamp(0.0, 1.0))
        .label(format!("{:.1}%", health.score));

    frame.render_widget(gauge, area);
}

fn render_users(frame: &mut Frame, app: &App, state: &DashboardState, area: Rect) {
    let lines = match state.history.active_users.latest() {
        Some(sample) => {
            let rate = state
                .history
                .user_rate()
                .map(|r| format!("{:+.0}/s", r))
                .unwrap_or_else(|| "-".to_string());
            let surge = if sample.surge_detected {
                Span::styled(" SURGE", Style::default().fg(app.theme.critical).add_modifier(Modifier::BOLD))
            } else {
                Span::raw("")
            };

            vec![
                Line::from(vec![
                    Span::raw(" Users: "),
                    Span::styled(format_count(sample.active_users), Style::default().add_modifier(Modifier::BOLD)),
                    Span::raw(format!("  ({})", rate)),
                    surge,
                ]),
                Line::from(format!(
                    " Cluster: {}  Last optimization: {}",
                    sample.tower_cluster, sample.last_optimization
                )),
            ]
        }
        None => vec![Line::from(Span::styled(
            " Waiting for active users...",
            Style::default().add_modifier(Modifier::DIM),
        ))],
    };

    frame.render_widget(Paragraph::new(lines).block(block(app, " Active Users ".to_string())), area);
}

fn render_telemetry(frame: &mut Frame, app: &App, state: &DashboardState, area: Rect) {
    let history = &state.history;

    let header = Row::new(vec!["Metric", "Latest", "Min", "Max", "Trend"])
        .height(1)
        .style(app.theme.header);

    let rows: Vec<Row> = TelemetryMetric::ALL
        .iter()
        .map(|&metric| {
            let unit = metric.unit();
            let (min, max, latest) = match history.stats(metric) {
                Some((min, max, latest)) => (
                    format!("{:.1}{}", min, unit),
                    format!("{:.1}{}", max, unit),
                    format!("{:.1}{}", latest, unit),
                ),
                None => ("-".to_string(), "-".to_string(), "-".to_string()),
            };
            let trend = render_sparkline(&history.trend(metric, TREND_WIDTH));

            Row::new(vec![
                Cell::from(metric.label()),
                Cell::from(latest).style(Style::default().add_modifier(Modifier::BOLD)),
                Cell::from(min),
                Cell::from(max),
                Cell::from(trend).style(Style::default().fg(app.theme.chart)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(12),
        Constraint::Length(11),
        Constraint::Length(11),
        Constraint::Length(11),
        Constraint::Min(TREND_WIDTH as u16),
    ];

    let title = format!(
        " Telemetry ({}/{} samples) ",
        history.telemetry.len(),
        history.telemetry.capacity()
    );
    let table = Table::new(rows, widths).header(header).block(block(app, title));

    frame.render_widget(table, area);
}

fn render_user_history(frame: &mut Frame, app: &App, state: &DashboardState, area: Rect) {
    let counts = state.history.user_counts();
    // Keep the newest samples that fit inside the borders
    let visible = area.width.saturating_sub(2) as usize;
    let start = counts.len().saturating_sub(visible);

    let sparkline = Sparkline::default()
        .block(block(
            app,
            format!(" Active Users ({}/{}) ", counts.len(), state.history.active_users.capacity()),
        ))
        .data(&counts[start..])
        .style(Style::default().fg(app.theme.chart));

    frame.render_widget(sparkline, area);
}
