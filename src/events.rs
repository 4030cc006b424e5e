use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};

use crate::app::App;

/// File written by the export key.
pub const EXPORT_FILE: &str = "diagchart_export.json";

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

    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),

        // Chart switching
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.prev_chart();
            } else {
                app.next_chart();
            }
        }
        KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => app.prev_chart(),
        KeyCode::Right | KeyCode::Char('l') => app.next_chart(),
        KeyCode::Char(c @ '1'..='9') => {
            if let Some(index) = c.to_digit(10) {
                app.select_chart(index as usize - 1);
            }
        }

        // Scale
        KeyCode::Char('+') | KeyCode::Char('=') => app.scale_up(),
        KeyCode::Char('-') | KeyCode::Char('_') => app.scale_down(),

        KeyCode::Char('r') => {
            let reloaded = app.reload_data();
            match app.load_error.clone() {
                Some(e) => app.set_status_message(format!("Reload failed: {}", e)),
                None if reloaded => app.set_status_message("Reloaded".to_string()),
                None => app.set_status_message("No new data".to_string()),
            }
        }

        KeyCode::Char('?') => app.toggle_help(),

        KeyCode::Char('e') => {
            let export_path = PathBuf::from(EXPORT_FILE);
            match app.export(&export_path) {
                Ok(()) => {
                    app.set_status_message(format!("Exported to {}", export_path.display()));
                }
                Err(e) => {
                    app.set_status_message(format!("Export failed: {}", e));
                }
            }
        }

        _ => {}
    }
}
