//! TUI application state
//!
//! The form is the only thing the operator edits. Starting a run moves the
//! chosen settings into a [`RunConfig`], asks for confirmation and hands the
//! config to one background worker. The tick handler polls that worker and
//! re-enables the form when it finishes.

mod event_loop;
mod state;

pub use state::{Field, FormState, Popup, RunStatus, UiState};

use crate::config::RunConfig;
use crate::orchestrator::{self, Progress, RunSummary};
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Progress messages buffered between the worker and the UI
const PROGRESS_CHANNEL_CAPACITY: usize = 256;

struct Worker {
    handle: JoinHandle<RunSummary>,
    progress: mpsc::Receiver<Progress>,
}

/// Application state
///
/// - `form`: the operator's choices
/// - `ui`: popups, log pane and animation state
/// - `status`: what the running worker has reported
pub struct App {
    pub form: FormState,
    pub ui: UiState,
    pub status: RunStatus,
    /// Settings the form does not expose: log file, settle delays, region filter
    base: RunConfig,
    /// Config waiting on the confirmation popup
    pending: Option<RunConfig>,
    worker: Option<Worker>,
    /// Every completed run, oldest first
    pub summaries: Vec<RunSummary>,
    pub should_quit: bool,
}

impl App {
    /// Build the form from the command-line config and the discovered profiles.
    pub fn new(base: RunConfig, profiles: Vec<String>) -> Self {
        let form = FormState::new(profiles, base.profile(), base.resources(), base.dry_run());
        Self {
            form,
            ui: UiState::default(),
            status: RunStatus::default(),
            base,
            pending: None,
            worker: None,
            summaries: Vec::new(),
            should_quit: false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// The config a run started right now would use
    pub fn config_from_form(&self) -> RunConfig {
        let mut config = self.base.clone();
        config.aws.profile = self.form.selected_profile().map(str::to_string);
        config.resources = self.form.selected_resources();
        config.cleanup.dry_run = self.form.dry_run;
        config
    }

    /// Start pressed: open the confirmation, or explain why not.
    pub fn request_start(&mut self) {
        if self.is_running() {
            return;
        }
        let config = self.config_from_form();
        if config.validate().is_err() {
            self.ui.popup = Some(Popup::Error(
                "Select at least one resource type before starting.".to_string(),
            ));
            return;
        }
        self.ui.popup = Some(Popup::Confirm(config.confirmation_lines()));
        self.pending = Some(config);
    }

    /// Accept the confirmation popup, returning the config to run.
    pub fn confirm(&mut self) -> Option<RunConfig> {
        if !matches!(self.ui.popup, Some(Popup::Confirm(_))) {
            return None;
        }
        self.ui.popup = None;
        self.pending.take()
    }

    pub fn dismiss_popup(&mut self) {
        if matches!(self.ui.popup, Some(Popup::Confirm(_))) {
            info!("Cleanup cancelled");
        }
        self.ui.popup = None;
        self.pending = None;
    }

    /// Spawn the worker for `config`.
    pub fn start(&mut self, config: RunConfig) {
        let (tx, rx) = mpsc::channel(PROGRESS_CHANNEL_CAPACITY);
        let handle = orchestrator::spawn_worker(config, tx);
        self.attach_worker(handle, rx);
    }

    fn attach_worker(&mut self, handle: JoinHandle<RunSummary>, progress: mpsc::Receiver<Progress>) {
        self.status = RunStatus {
            started_at: Some(Instant::now()),
            ..RunStatus::default()
        };
        self.worker = Some(Worker { handle, progress });
    }

    /// Quit unless a run is in flight.
    pub fn request_quit(&mut self) {
        if self.is_running() {
            warn!("Cleanup in progress; quitting is disabled until it finishes");
            return;
        }
        self.should_quit = true;
    }

    /// Drain progress and, once the worker has exited, collect its summary.
    pub async fn poll_worker(&mut self) {
        let Some(worker) = self.worker.as_mut() else {
            return;
        };
        while let Ok(update) = worker.progress.try_recv() {
            self.status.apply(update);
        }
        if !worker.handle.is_finished() {
            return;
        }

        let Some(worker) = self.worker.take() else {
            return;
        };
        self.status.current = None;
        match worker.handle.await {
            Ok(summary) => {
                self.summaries.push(summary.clone());
                self.ui.popup = Some(Popup::Completed(summary));
            }
            Err(e) => {
                error!(error = %e, "Cleanup worker stopped unexpectedly");
                self.ui.popup = Some(Popup::Error(format!(
                    "The cleanup worker stopped unexpectedly: {e}"
                )));
            }
        }
    }

    /// Advance the throbber while a run is in flight.
    pub fn tick(&mut self) {
        if self.is_running() {
            self.ui.throbber.calc_next();
        }
    }

    /// Elapsed time of the current or last run as HH:MM:SS
    pub fn elapsed_str(&self) -> String {
        let secs = self
            .status
            .started_at
            .map(|t| t.elapsed().as_secs())
            .unwrap_or(0);
        format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

#[cfg(test)]
impl App {
    /// Attach a stand-in worker task
    pub(crate) fn attach_for_test(
        &mut self,
        handle: JoinHandle<RunSummary>,
        progress: mpsc::Receiver<Progress>,
    ) {
        self.attach_worker(handle, progress);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_cleaner_common::ResourceKind;

    fn app() -> App {
        App::new(
            RunConfig::for_test(&[ResourceKind::S3], true),
            vec!["default".into(), "sandbox".into()],
        )
    }

    #[test]
    fn form_starts_from_the_base_config() {
        let app = app();
        assert_eq!(app.form.selected_resources(), vec![ResourceKind::S3]);
        assert!(app.form.dry_run);
        assert_eq!(app.form.selected_profile(), Some("default"));
    }

    #[test]
    fn config_reflects_the_form() {
        let mut app = app();
        app.form.next_profile();
        app.form.toggle_resource(ResourceKind::Vpc);
        app.form.dry_run = false;

        let config = app.config_from_form();
        assert_eq!(config.profile(), Some("sandbox"));
        assert_eq!(config.resources(), &[ResourceKind::S3, ResourceKind::Vpc]);
        assert!(!config.dry_run());
        // untouched by the form
        assert_eq!(config.cleanup.settle, app.base.cleanup.settle);
    }

    #[test]
    fn empty_selection_shows_an_error() {
        let mut app = app();
        app.form.set_all(false);
        app.request_start();
        assert!(matches!(app.ui.popup, Some(Popup::Error(_))));
        assert_eq!(app.confirm(), None);
    }

    #[test]
    fn confirm_hands_over_the_pending_config() {
        let mut app = app();
        app.request_start();
        let Some(Popup::Confirm(lines)) = &app.ui.popup else {
            panic!("expected confirmation popup");
        };
        assert!(lines.iter().any(|l| l.contains("DRY RUN")));

        let config = app.confirm().unwrap();
        assert_eq!(config.resources(), &[ResourceKind::S3]);
        assert!(app.ui.popup.is_none());
    }

    #[test]
    fn dismissing_drops_the_pending_config() {
        let mut app = app();
        app.request_start();
        app.dismiss_popup();
        assert!(app.ui.popup.is_none());
        assert_eq!(app.confirm(), None);
    }

    #[tokio::test]
    async fn quit_is_refused_while_running() {
        let mut app = app();
        let (release, wait) = tokio::sync::oneshot::channel::<()>();
        let (_tx, rx) = mpsc::channel(1);
        app.attach_for_test(
            tokio::spawn(async move {
                let _ = wait.await;
                RunSummary::default()
            }),
            rx,
        );

        app.request_quit();
        assert!(!app.should_quit);

        release.send(()).unwrap();
        while app.is_running() {
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            app.poll_worker().await;
        }
        app.request_quit();
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn finished_worker_opens_the_completion_popup() {
        let mut app = app();
        let (tx, rx) = mpsc::channel(8);
        tx.send(Progress::Account("123456789012".into())).await.unwrap();
        drop(tx);

        let summary = RunSummary {
            dry_run: true,
            ..RunSummary::default()
        };
        let expected = summary.clone();
        let handle = tokio::spawn(async move { summary });
        app.attach_for_test(handle, rx);

        while app.is_running() {
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            app.poll_worker().await;
        }

        assert_eq!(app.status.account_id.as_deref(), Some("123456789012"));
        assert_eq!(app.summaries, vec![expected.clone()]);
        assert_eq!(app.ui.popup, Some(Popup::Completed(expected)));
    }
}
