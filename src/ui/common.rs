//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, View};
use crate::data::duration::format_elapsed;

/// Sparkline characters (8 levels of height).
pub const SPARKLINE_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Render the header bar with network health overview.
///
/// Displays: health indicator and score, active issue counts, resolutions.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let state = app.state.lock();

    let Some(ref health) = state.health else {
        let line = Line::from(vec![
            Span::styled(" TRACE ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!("│ {} │ Waiting for health data...", app.source_description())),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    };

    let counts = state.issues.counts();
    let health_style = app.theme.health_style(health.status);

    let line = Line::from(vec![
        Span::styled(" ● ", health_style),
        Span::styled("TRACE ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::styled(format!("{:.1}% {}", health.score, health.status), health_style),
        Span::raw(" │ "),
        Span::styled(
            format!("{}", counts.total()),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" issues "),
        if counts.critical > 0 {
            Span::styled(
                format!("{}", counts.critical),
                Style::default().fg(app.theme.critical).add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled("0", Style::default().add_modifier(Modifier::DIM))
        },
        Span::raw(" crit │ "),
        Span::raw(format!("{} resolved", state.issues.resolved_count())),
        Span::raw(" │ "),
        Span::styled(app.source_description().to_string(), Style::default().add_modifier(Modifier::DIM)),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the tab bar showing available views.
///
/// Highlights the currently active view.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = View::ALL
        .iter()
        .enumerate()
        .map(|(i, view)| Line::from(format!(" {}:{} ", i + 1, view.label())))
        .collect();

    let tabs = Tabs::new(titles)
        .select(app.current_view.index())
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows: connection mode, time since the last event, available controls.
/// Also displays temporary status messages.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph = Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let mode = app.mode();
    let last_event = match app.last_event_age() {
        Some(age) => format!("last event {} ago", format_elapsed(age)),
        None => "no events yet".to_string(),
    };

    let controls = if app.chat_active {
        "Type a message | Enter:send Esc:cancel"
    } else if app.filter_active {
        "Type to search | Enter:apply Esc:cancel"
    } else if app.show_detail_overlay {
        "a:remediate i:analyze m:message Esc:close"
    } else {
        match app.current_view {
            View::Issues => "/:search Enter:detail a:remediate i:analyze ?:help q:quit",
            View::Resolutions => "/:search Tab:switch e:export ?:help q:quit",
            View::Overview | View::Agents => "Tab:switch e:export ?:help q:quit",
        }
    };

    let dim = Style::default().add_modifier(Modifier::DIM);
    let line = Line::from(vec![
        Span::styled(format!(" [{}] ", mode.label()), app.theme.mode_style(mode)),
        Span::styled(format!("{} | {}", last_event, controls), dim),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let section = |title: &'static str| Line::from(vec![Span::styled(title, Style::default().add_modifier(Modifier::BOLD))]);

    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        section(" Navigation"),
        Line::from("  ←/→ h/l 1-4  Switch views"),
        Line::from("  ↑/↓ j/k      Navigate list"),
        Line::from("  PgUp/PgDn    Jump 10 items"),
        Line::from("  Enter        Issue detail"),
        Line::from("  Esc          Go back"),
        Line::from(""),
        section(" Issues"),
        Line::from("  a            Auto-remediate"),
        Line::from("  i            Ask agent for analysis"),
        Line::from("  m            Message the agent (detail)"),
        Line::from("  /            Start filter/search"),
        Line::from("  c            Clear filter"),
        Line::from(""),
        section(" General"),
        Line::from("  e            Export to JSON"),
        Line::from("  q            Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    let help_width = 46u16.min(area.width.saturating_sub(4));
    let help_height = 24u16.min(area.height.saturating_sub(2));
    let help_area = centered(area, help_width, help_height);

    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}

/// A `width` x `height` rectangle centered in `area`.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

/// Render 0-7 levels as sparkline characters.
pub fn render_sparkline(levels: &[u8]) -> String {
    levels.iter().map(|&v| SPARKLINE_CHARS[v.min(7) as usize]).collect()
}

/// Format large numbers with K/M suffixes
pub fn format_count(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

/// Title suffix showing the filter being typed or applied.
pub fn filter_info(app: &App) -> String {
    if app.filter_active {
        format!(" /{}_", app.filter_text)
    } else if !app.filter_text.is_empty() {
        format!(" /{}/ [c:clear]", app.filter_text)
    } else {
        String::new()
    }
}
