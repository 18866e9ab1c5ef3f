//! Application state types

use crate::orchestrator::{Progress, RunSummary};
use aws_cleaner_common::ResourceKind;
use std::time::Instant;
use throbber_widgets_tui::ThrobberState;
use tui_logger::TuiWidgetState;

/// A focusable control on the form, in tab order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Profile,
    Resource(ResourceKind),
    DryRun,
    Start,
    SelectAll,
    DeselectAll,
}

impl Field {
    /// Every field in tab order
    pub fn all() -> Vec<Field> {
        let mut fields = vec![Field::Profile];
        fields.extend(ResourceKind::ALL.iter().copied().map(Field::Resource));
        fields.extend([
            Field::DryRun,
            Field::Start,
            Field::SelectAll,
            Field::DeselectAll,
        ]);
        fields
    }

    pub fn is_button(self) -> bool {
        matches!(self, Field::Start | Field::SelectAll | Field::DeselectAll)
    }
}

/// The operator's choices
#[derive(Debug, Clone)]
pub struct FormState {
    /// Profile names found in the shared AWS files
    pub profiles: Vec<String>,
    pub profile_index: usize,
    /// Checkbox per resource kind, in display order
    pub resources: Vec<(ResourceKind, bool)>,
    pub dry_run: bool,
    /// Index into [`Field::all`]
    pub focus: usize,
}

impl FormState {
    /// `preferred` preselects a profile when it is in the list.
    pub fn new(
        profiles: Vec<String>,
        preferred: Option<&str>,
        selected: &[ResourceKind],
        dry_run: bool,
    ) -> Self {
        let profile_index = preferred
            .and_then(|p| profiles.iter().position(|name| name == p))
            .unwrap_or(0);
        Self {
            profiles,
            profile_index,
            resources: ResourceKind::ALL
                .iter()
                .map(|&kind| (kind, selected.contains(&kind)))
                .collect(),
            dry_run,
            focus: 0,
        }
    }

    /// `None` means the default credential chain
    pub fn selected_profile(&self) -> Option<&str> {
        self.profiles.get(self.profile_index).map(String::as_str)
    }

    pub fn selected_resources(&self) -> Vec<ResourceKind> {
        self.resources
            .iter()
            .filter(|(_, checked)| *checked)
            .map(|(kind, _)| *kind)
            .collect()
    }

    pub fn focused(&self) -> Field {
        let fields = Field::all();
        fields[self.focus.min(fields.len() - 1)]
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % Field::all().len();
    }

    pub fn focus_previous(&mut self) {
        let len = Field::all().len();
        self.focus = (self.focus + len - 1) % len;
    }

    pub fn next_profile(&mut self) {
        if !self.profiles.is_empty() {
            self.profile_index = (self.profile_index + 1) % self.profiles.len();
        }
    }

    pub fn previous_profile(&mut self) {
        if !self.profiles.is_empty() {
            let len = self.profiles.len();
            self.profile_index = (self.profile_index + len - 1) % len;
        }
    }

    pub fn toggle_resource(&mut self, kind: ResourceKind) {
        if let Some((_, checked)) = self.resources.iter_mut().find(|(k, _)| *k == kind) {
            *checked = !*checked;
        }
    }

    pub fn set_all(&mut self, checked: bool) {
        for (_, value) in &mut self.resources {
            *value = checked;
        }
    }
}

/// Modal dialogs; at most one is open
#[derive(Debug, Clone, PartialEq)]
pub enum Popup {
    /// Confirm the run described by these lines
    Confirm(Vec<String>),
    Error(String),
    Completed(RunSummary),
}

/// What the worker has reported so far
#[derive(Debug, Default)]
pub struct RunStatus {
    pub account_id: Option<String>,
    pub regions: Vec<String>,
    /// Scope being cleaned right now, as a label
    pub current: Option<String>,
    pub finished_scopes: usize,
    pub started_at: Option<Instant>,
}

impl RunStatus {
    pub fn apply(&mut self, update: Progress) {
        match update {
            Progress::Account(id) => self.account_id = Some(id),
            Progress::Regions(regions) => self.regions = regions,
            Progress::Started { kind, region } => {
                self.current = Some(match region {
                    Some(region) => format!("{} in {}", kind.display_name(), region),
                    None => format!("{} (global)", kind.display_name()),
                });
            }
            Progress::Finished { .. } => {
                self.current = None;
                self.finished_scopes += 1;
            }
        }
    }
}

/// UI-only state
pub struct UiState {
    pub logs_fullscreen: bool,
    pub popup: Option<Popup>,
    pub log_state: TuiWidgetState,
    pub throbber: ThrobberState,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            logs_fullscreen: false,
            popup: None,
            log_state: TuiWidgetState::new(),
            throbber: ThrobberState::default(),
        }
    }
}

impl std::fmt::Debug for UiState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UiState")
            .field("logs_fullscreen", &self.logs_fullscreen)
            .field("popup", &self.popup)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> FormState {
        FormState::new(
            vec!["default".into(), "sandbox".into()],
            Some("sandbox"),
            &[ResourceKind::Ec2],
            true,
        )
    }

    #[test]
    fn preferred_profile_is_preselected() {
        let form = form();
        assert_eq!(form.selected_profile(), Some("sandbox"));

        let unknown = FormState::new(vec!["a".into()], Some("zzz"), &[], true);
        assert_eq!(unknown.selected_profile(), Some("a"));

        let none = FormState::new(Vec::new(), None, &[], true);
        assert_eq!(none.selected_profile(), None);
    }

    #[test]
    fn profile_cycling_wraps() {
        let mut form = form();
        form.next_profile();
        assert_eq!(form.selected_profile(), Some("default"));
        form.previous_profile();
        assert_eq!(form.selected_profile(), Some("sandbox"));
    }

    #[test]
    fn focus_wraps_both_ways() {
        let mut form = form();
        assert_eq!(form.focused(), Field::Profile);
        form.focus_previous();
        assert_eq!(form.focused(), Field::DeselectAll);
        form.focus_next();
        form.focus_next();
        assert_eq!(form.focused(), Field::Resource(ResourceKind::ALL[0]));
    }

    #[test]
    fn select_and_deselect_all() {
        let mut form = form();
        assert_eq!(form.selected_resources(), vec![ResourceKind::Ec2]);
        form.set_all(true);
        assert_eq!(form.selected_resources().len(), ResourceKind::ALL.len());
        form.set_all(false);
        assert!(form.selected_resources().is_empty());
        form.toggle_resource(ResourceKind::Iam);
        assert_eq!(form.selected_resources(), vec![ResourceKind::Iam]);
    }

    #[test]
    fn status_tracks_progress() {
        let mut status = RunStatus::default();
        status.apply(Progress::Account("123456789012".into()));
        status.apply(Progress::Started {
            kind: ResourceKind::Lambda,
            region: Some("eu-west-1".into()),
        });
        assert_eq!(status.current.as_deref(), Some("Lambda in eu-west-1"));
        status.apply(Progress::Finished {
            kind: ResourceKind::Lambda,
            region: Some("eu-west-1".into()),
            report: Default::default(),
        });
        assert_eq!(status.current, None);
        assert_eq!(status.finished_scopes, 1);
        assert_eq!(status.account_id.as_deref(), Some("123456789012"));
    }
}
