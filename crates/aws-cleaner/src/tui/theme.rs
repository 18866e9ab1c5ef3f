//! Color palette for the TUI (Catppuccin Mocha)

use ratatui::style::{Color, Modifier, Style};

/// Catppuccin Mocha base, used as dark text on colored bars
const BASE: Color = Color::Rgb(30, 30, 46);

pub struct Theme {
    pub bg: Color,
    pub fg: Color,
    pub fg_dim: Color,

    pub accent: Color,
    pub highlight: Color,

    pub success: Color,
    pub warning: Color,
    pub error: Color,

    pub log_trace: Color,
    pub log_debug: Color,
    pub log_info: Color,
    pub log_warn: Color,
    pub log_error: Color,

    pub border_focused: Color,
    pub border_unfocused: Color,
    pub selection_bg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::catppuccin_mocha()
    }
}

impl Theme {
    /// https://github.com/catppuccin/catppuccin
    pub fn catppuccin_mocha() -> Self {
        Self {
            bg: BASE,
            fg: Color::Rgb(205, 214, 244),     // Text
            fg_dim: Color::Rgb(147, 153, 178), // Subtext0

            accent: Color::Rgb(137, 180, 250),    // Blue
            highlight: Color::Rgb(203, 166, 247), // Mauve

            success: Color::Rgb(166, 227, 161), // Green
            warning: Color::Rgb(249, 226, 175), // Yellow
            error: Color::Rgb(243, 139, 168),   // Red

            log_trace: Color::Rgb(108, 112, 134), // Overlay0
            log_debug: Color::Rgb(148, 226, 213), // Teal
            log_info: Color::Rgb(137, 180, 250),  // Blue
            log_warn: Color::Rgb(249, 226, 175),  // Yellow
            log_error: Color::Rgb(243, 139, 168), // Red

            border_focused: Color::Rgb(180, 190, 254), // Lavender
            border_unfocused: Color::Rgb(69, 71, 90),  // Surface1
            selection_bg: Color::Rgb(69, 71, 90),      // Surface1
        }
    }

    pub fn block_focused(&self) -> Style {
        Style::default().fg(self.border_focused)
    }

    pub fn block_unfocused(&self) -> Style {
        Style::default().fg(self.border_unfocused)
    }

    /// Focused form control
    pub fn selection(&self) -> Style {
        Style::default()
            .bg(self.selection_bg)
            .fg(self.highlight)
            .add_modifier(Modifier::BOLD)
    }

    pub fn dim(&self) -> Style {
        Style::default().fg(self.fg_dim)
    }

    pub fn text(&self) -> Style {
        Style::default().fg(self.fg)
    }

    pub fn bold(&self) -> Style {
        Style::default().fg(self.fg).add_modifier(Modifier::BOLD)
    }

    pub fn success_style(&self) -> Style {
        Style::default().fg(self.success)
    }

    pub fn warning_style(&self) -> Style {
        Style::default().fg(self.warning)
    }

    pub fn error_style(&self) -> Style {
        Style::default().fg(self.error)
    }

    /// Header bar: red for a live run, yellow for a dry run, blue when idle
    pub fn header_style(&self, running: bool, dry_run: bool) -> Style {
        match (running, dry_run) {
            (true, false) => Style::default().fg(BASE).bg(self.error),
            (true, true) => Style::default().fg(BASE).bg(self.warning),
            (false, _) => Style::default().fg(BASE).bg(self.accent),
        }
    }

    /// Keyboard shortcut badge
    pub fn key_badge(&self) -> Style {
        Style::default().fg(BASE).bg(self.fg_dim)
    }
}

/// Get the global theme instance
pub fn theme() -> &'static Theme {
    static THEME: std::sync::OnceLock<Theme> = std::sync::OnceLock::new();
    THEME.get_or_init(Theme::default)
}
