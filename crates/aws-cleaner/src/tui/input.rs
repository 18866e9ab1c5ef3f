//! Keyboard input handling for the TUI

use super::app::{App, Field, Popup};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tui_logger::TuiWidgetEvent;

/// Result of handling a keyboard event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyResult {
    /// Key was handled, continue running
    Handled,
    /// The operator confirmed a run; the caller spawns the worker
    StartRun,
    /// Key was not handled (no action taken)
    Unhandled,
}

/// Keyboard event handler
///
/// Popups take every key while open. The form is read-only while a run is
/// in flight; the log pane stays scrollable.
pub struct KeyHandler;

impl KeyHandler {
    pub fn handle(app: &mut App, key: KeyEvent) -> KeyResult {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            app.request_quit();
            return KeyResult::Handled;
        }

        if app.ui.popup.is_some() {
            return Self::handle_popup(app, key);
        }

        if app.ui.logs_fullscreen {
            return Self::handle_fullscreen_logs(app, key);
        }

        Self::handle_normal(app, key)
    }

    fn handle_popup(app: &mut App, key: KeyEvent) -> KeyResult {
        match app.ui.popup {
            Some(Popup::Confirm(_)) => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => KeyResult::StartRun,
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    app.dismiss_popup();
                    KeyResult::Handled
                }
                _ => KeyResult::Handled,
            },
            // Error and completion popups close on any key
            _ => {
                app.dismiss_popup();
                KeyResult::Handled
            }
        }
    }

    fn handle_fullscreen_logs(app: &mut App, key: KeyEvent) -> KeyResult {
        let event = match key.code {
            KeyCode::Char('q') => {
                app.request_quit();
                return KeyResult::Handled;
            }
            KeyCode::Char('l') => {
                app.ui.logs_fullscreen = false;
                return KeyResult::Handled;
            }
            KeyCode::Esc => TuiWidgetEvent::EscapeKey,
            KeyCode::Up | KeyCode::Char('k') => TuiWidgetEvent::UpKey,
            KeyCode::Down | KeyCode::Char('j') => TuiWidgetEvent::DownKey,
            KeyCode::Left | KeyCode::Char('h') => TuiWidgetEvent::LeftKey,
            KeyCode::Right => TuiWidgetEvent::RightKey,
            KeyCode::PageUp => TuiWidgetEvent::PrevPageKey,
            KeyCode::PageDown => TuiWidgetEvent::NextPageKey,
            KeyCode::Char(' ') => TuiWidgetEvent::SpaceKey,
            KeyCode::Char('+') | KeyCode::Char('=') => TuiWidgetEvent::PlusKey,
            KeyCode::Char('-') => TuiWidgetEvent::MinusKey,
            KeyCode::Char('f') => TuiWidgetEvent::FocusKey,
            KeyCode::Tab => TuiWidgetEvent::HideKey,
            _ => return KeyResult::Unhandled,
        };
        app.ui.log_state.transition(event);
        KeyResult::Handled
    }

    fn handle_normal(app: &mut App, key: KeyEvent) -> KeyResult {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => app.request_quit(),
            KeyCode::Char('l') => app.ui.logs_fullscreen = true,
            KeyCode::PageUp => {
                app.ui.log_state.transition(TuiWidgetEvent::PrevPageKey);
            }
            KeyCode::PageDown => {
                app.ui.log_state.transition(TuiWidgetEvent::NextPageKey);
            }
            KeyCode::Tab | KeyCode::Down | KeyCode::Char('j') => app.form.focus_next(),
            KeyCode::BackTab | KeyCode::Up | KeyCode::Char('k') => app.form.focus_previous(),
            _ if app.is_running() => return KeyResult::Unhandled,
            KeyCode::Left | KeyCode::Char('h') if app.form.focused() == Field::Profile => {
                app.form.previous_profile();
            }
            KeyCode::Right if app.form.focused() == Field::Profile => app.form.next_profile(),
            KeyCode::Char(' ') | KeyCode::Enter => Self::activate(app),
            KeyCode::Char('s') => app.request_start(),
            KeyCode::Char('a') => app.form.set_all(true),
            KeyCode::Char('n') => app.form.set_all(false),
            KeyCode::Char('d') => app.form.dry_run = !app.form.dry_run,
            _ => return KeyResult::Unhandled,
        }
        KeyResult::Handled
    }

    /// Space/Enter on the focused control
    fn activate(app: &mut App) {
        match app.form.focused() {
            Field::Profile => app.form.next_profile(),
            Field::Resource(kind) => app.form.toggle_resource(kind),
            Field::DryRun => app.form.dry_run = !app.form.dry_run,
            Field::Start => app.request_start(),
            Field::SelectAll => app.form.set_all(true),
            Field::DeselectAll => app.form.set_all(false),
        }
    }
}
