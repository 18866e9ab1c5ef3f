//! Terminal front end
//!
//! A form for profile, resource kinds and dry run, a progress panel fed by
//! the worker, and the tracing log pane.

mod app;
pub mod input;
pub mod theme;
mod ui;

pub use app::{App, Field, FormState, Popup, RunStatus, UiState};
pub use input::{KeyHandler, KeyResult};

use crate::config::RunConfig;
use crate::orchestrator::RunSummary;
use anyhow::Result;
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use std::io;

/// Run the TUI until the operator quits; returns every completed run.
///
/// The terminal is restored before any error from the event loop is
/// returned.
pub async fn run(config: RunConfig, profiles: Vec<String>) -> Result<Vec<RunSummary>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let mut app = App::new(config, profiles);
    let result = app.run(&mut terminal).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result.map(|()| app.summaries)
}
