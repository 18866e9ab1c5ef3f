//! TUI event loop

use super::App;
use crate::tui::input::{KeyHandler, KeyResult};
use crate::tui::ui;
use anyhow::Result;
use crossterm::event::{Event, KeyEventKind};
use futures::StreamExt;
use ratatui::prelude::*;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

impl App {
    /// Run until the operator quits.
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        // Raw mode swallows the terminal's own Ctrl+C; this catches SIGINT from elsewhere
        let interrupted = CancellationToken::new();
        let interrupt_guard = interrupted.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                interrupt_guard.cancel();
            }
        });
        let mut interrupt_seen = false;

        let mut event_stream = crossterm::event::EventStream::new();
        let mut tick_interval = tokio::time::interval(Duration::from_millis(100));
        let mut render_interval = tokio::time::interval(Duration::from_millis(33));

        loop {
            tokio::select! {
                _ = interrupted.cancelled(), if !interrupt_seen => {
                    interrupt_seen = true;
                    self.request_quit();
                }

                maybe_event = event_stream.next() => {
                    if let Some(Ok(Event::Key(key))) = maybe_event {
                        if key.kind == KeyEventKind::Press
                            && KeyHandler::handle(self, key) == KeyResult::StartRun
                        {
                            if let Some(config) = self.confirm() {
                                self.start(config);
                            }
                        }
                    }
                }

                _ = tick_interval.tick() => {
                    self.tick();
                    self.poll_worker().await;
                }

                _ = render_interval.tick() => {
                    tui_logger::move_events();
                    terminal.draw(|f| ui::render(f, self))?;
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }
}
