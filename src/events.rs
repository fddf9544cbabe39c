use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::app::{App, View};

/// Default file written by the export key.
pub const EXPORT_FILE: &str = "trace_export.json";

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    // Chat input swallows every key until sent or cancelled
    if app.chat_active {
        handle_chat_input(app, key);
        return;
    }

    if app.show_detail_overlay {
        match key.code {
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('q') => app.close_overlay(),
            KeyCode::Char('a') => app.remediate_selected(),
            KeyCode::Char('i') => app.analyze_selected(),
            KeyCode::Char('m') => app.start_chat(),
            KeyCode::Char('?') => app.toggle_help(),
            _ => {}
        }
        return;
    }

    // If filter input is active, handle text input
    if app.filter_active {
        handle_filter_input(app, key);
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),

        // View switching
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.prev_view();
            } else {
                app.next_view();
            }
        }
        KeyCode::BackTab => app.prev_view(),
        KeyCode::Char('1') => app.set_view(View::Overview),
        KeyCode::Char('2') => app.set_view(View::Issues),
        KeyCode::Char('3') => app.set_view(View::Resolutions),
        KeyCode::Char('4') => app.set_view(View::Agents),

        // Navigation (up/down for items, left/right for tabs)
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Left | KeyCode::Char('h') => app.prev_view(),
        KeyCode::Right | KeyCode::Char('l') => app.next_view(),
        KeyCode::PageUp => app.select_prev_n(10),
        KeyCode::PageDown => app.select_next_n(10),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),

        KeyCode::Enter => app.enter_detail(),
        KeyCode::Esc | KeyCode::Backspace => app.go_back(),

        // Issue actions
        KeyCode::Char('a') => app.remediate_selected(),
        KeyCode::Char('i') => app.analyze_selected(),

        KeyCode::Char('?') => app.toggle_help(),

        KeyCode::Char('/') => app.start_filter(),
        KeyCode::Char('c') => {
            if !app.filter_text.is_empty() {
                app.clear_filter();
            }
        }

        KeyCode::Char('e') => {
            let export_path = PathBuf::from(EXPORT_FILE);
            match app.export_state(&export_path) {
                Ok(()) => app.set_status_message(format!("Exported to {}", export_path.display())),
                Err(e) => app.set_status_message(format!("Export failed: {}", e)),
            }
        }

        _ => {}
    }
}

/// Handle key input while filter is active
fn handle_filter_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.filter_active = false,
        KeyCode::Esc => app.cancel_filter(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.clear_filter(),
        KeyCode::Backspace => {
            app.filter_pop();
            if app.filter_text.is_empty() {
                app.filter_active = false;
            }
        }
        KeyCode::Char(c) => app.filter_push(c),
        _ => {}
    }
}

/// Handle key input while composing a chat message
fn handle_chat_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.submit_chat(),
        KeyCode::Esc => app.cancel_chat(),
        KeyCode::Backspace => app.chat_pop(),
        KeyCode::Char(c) => app.chat_push(c),
        _ => {}
    }
}

/// Handle mouse events
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent, content_start_row: u16) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.select_prev(),
        MouseEventKind::ScrollDown => app.select_next(),

        MouseEventKind::Down(MouseButton::Left) => {
            let clicked_row = mouse.row;

            // Rows below the table header
            if clicked_row > content_start_row && !app.show_detail_overlay {
                let item_row = (clicked_row - content_start_row - 1) as usize;
                if item_row < app.item_count() {
                    app.selected_index = item_row;
                }
            }

            // Tab bar is row 1, tabs are roughly 15 columns wide
            if clicked_row == 1 {
                if let Some(view) = View::ALL.get((mouse.column / 15) as usize) {
                    app.set_view(*view);
                }
            }
        }

        MouseEventKind::Down(MouseButton::Right) => app.go_back(),

        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SharedState;
    use crate::source::ChannelSource;
    use crate::stream::StreamClient;
    use crate::ui::Theme;
    use crossterm::event::KeyEventKind;
    use trace_types::{Issue, Severity, StreamEvent};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app_with_issue() -> App {
        let (tx, source) = ChannelSource::create("test");
        let client = StreamClient::with_source(Box::new(source));
        let mut app = App::new(client, SharedState::default(), Theme::dark());
        tx.try_send(StreamEvent::Issue(Issue::new("issue-1", "Energy Spike", Severity::High)))
            .unwrap();
        app.tick();
        app
    }

    #[test]
    fn test_tabs_and_quit() {
        let mut app = app_with_issue();
        handle_key_event(&mut app, key(KeyCode::Tab));
        assert_eq!(app.current_view, View::Issues);
        handle_key_event(&mut app, key(KeyCode::Char('4')));
        assert_eq!(app.current_view, View::Agents);
        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(!app.running);
    }

    #[test]
    fn test_help_swallows_next_key() {
        let mut app = app_with_issue();
        handle_key_event(&mut app, key(KeyCode::Char('?')));
        assert!(app.show_help);
        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(!app.show_help);
        assert!(app.running);
    }

    #[test]
    fn test_overlay_chat_input() {
        let mut app = app_with_issue();
        handle_key_event(&mut app, key(KeyCode::Char('2')));
        handle_key_event(&mut app, key(KeyCode::Enter));
        assert!(app.show_detail_overlay);

        handle_key_event(&mut app, key(KeyCode::Char('m')));
        assert!(app.chat_active);
        // 'q' is text while typing
        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert_eq!(app.chat_input, "q");
        assert!(app.running);

        handle_key_event(&mut app, key(KeyCode::Esc));
        assert!(!app.chat_active);
        assert!(app.show_detail_overlay);
        handle_key_event(&mut app, key(KeyCode::Esc));
        assert!(!app.show_detail_overlay);
    }

    #[test]
    fn test_filter_input() {
        let mut app = app_with_issue();
        handle_key_event(&mut app, key(KeyCode::Char('/')));
        for c in "spike".chars() {
            handle_key_event(&mut app, key(KeyCode::Char(c)));
        }
        assert_eq!(app.filter_text, "spike");
        handle_key_event(&mut app, key(KeyCode::Enter));
        assert!(!app.filter_active);

        let mut ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        ctrl_c.kind = KeyEventKind::Press;
        handle_key_event(&mut app, key(KeyCode::Char('c')));
        assert!(app.filter_text.is_empty());
        handle_key_event(&mut app, ctrl_c);
        assert!(!app.running);
    }
}
