//! UI rendering

use crate::tui::app::{App, Field, Popup};
use crate::tui::theme;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use throbber_widgets_tui::{BRAILLE_SIX, Throbber};
use tui_logger::{TuiLoggerLevelOutput, TuiLoggerSmartWidget, TuiLoggerWidget};

/// Profile line, blank, one line per kind, blank, dry run, blank, buttons, borders
const FORM_HEIGHT: u16 = 15;
const FORM_WIDTH: u16 = 40;

/// Render the entire UI
pub fn render(frame: &mut Frame, app: &mut App) {
    if app.ui.logs_fullscreen {
        render_fullscreen_logs(frame, app);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),           // Header
            Constraint::Length(FORM_HEIGHT), // Form and progress
            Constraint::Min(3),              // Logs
            Constraint::Length(1),           // Help bar
        ])
        .split(frame.area());

    render_header(frame, chunks[0], app);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(FORM_WIDTH), Constraint::Min(20)])
        .split(chunks[1]);
    render_form(frame, body[0], app);
    render_progress(frame, body[1], app);

    render_logs(frame, chunks[2], app);
    render_help_bar(frame, chunks[3]);

    match &app.ui.popup {
        Some(Popup::Confirm(lines)) => render_confirm_popup(frame, lines),
        Some(Popup::Error(message)) => render_error_popup(frame, message),
        Some(Popup::Completed(summary)) => render_completed_popup(frame, &summary.describe()),
        None => {}
    }
}

fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let t = theme::theme();
    let profile = app.form.selected_profile().unwrap_or("default credentials");
    let mode = if app.form.dry_run { "DRY RUN" } else { "LIVE" };
    let state = if app.is_running() { "Running" } else { "Idle" };

    let text = format!(
        " aws-cleaner │ Profile: {profile} │ {mode} │ {state} │ Elapsed: {} ",
        app.elapsed_str()
    );
    let header = Paragraph::new(text).style(t.header_style(app.is_running(), app.form.dry_run));
    frame.render_widget(header, area);
}

fn checkbox(checked: bool) -> &'static str {
    if checked { "[x]" } else { "[ ]" }
}

fn render_form(frame: &mut Frame, area: Rect, app: &App) {
    let t = theme::theme();
    let focused = app.form.focused();
    let editable = !app.is_running();
    let style_for = |field: Field| {
        if editable && focused == field {
            t.selection()
        } else if editable {
            t.text()
        } else {
            t.dim()
        }
    };

    let profile = app
        .form
        .selected_profile()
        .unwrap_or("(default credential chain)");
    let mut lines = vec![
        Line::from(vec![
            Span::styled(" Profile  ", t.dim()),
            Span::styled(format!("◀ {profile} ▶"), style_for(Field::Profile)),
        ]),
        Line::from(""),
    ];

    for (kind, checked) in &app.form.resources {
        lines.push(Line::from(Span::styled(
            format!(" {} {}", checkbox(*checked), kind.display_name()),
            style_for(Field::Resource(*kind)),
        )));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!(" {} Dry run (log only)", checkbox(app.form.dry_run)),
        style_for(Field::DryRun),
    )));
    lines.push(Line::from(""));

    let button = |label: &'static str, field: Field| {
        let style = if editable && focused == field {
            t.selection()
        } else {
            t.key_badge()
        };
        Span::styled(label, style)
    };
    lines.push(Line::from(vec![
        Span::raw(" "),
        button(" Start ", Field::Start),
        Span::raw(" "),
        button(" Select All ", Field::SelectAll),
        Span::raw(" "),
        button(" Deselect All ", Field::DeselectAll),
    ]));

    let block = Block::default()
        .title(" Options ")
        .borders(Borders::ALL)
        .border_style(if editable {
            t.block_focused()
        } else {
            t.block_unfocused()
        });
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_progress(frame: &mut Frame, area: Rect, app: &mut App) {
    let t = theme::theme();
    let status = &app.status;

    let value = |v: Option<String>| Span::styled(v.unwrap_or_else(|| "-".to_string()), t.text());
    let mut lines = vec![
        Line::from(vec![
            Span::styled(" Account  ", t.dim()),
            value(status.account_id.clone()),
        ]),
        Line::from(vec![
            Span::styled(" Regions  ", t.dim()),
            value((!status.regions.is_empty()).then(|| status.regions.len().to_string())),
        ]),
        Line::from(vec![
            Span::styled(" Scopes   ", t.dim()),
            value(Some(status.finished_scopes.to_string())),
        ]),
        Line::from(""),
    ];

    // Line 4 is left for the throbber while running
    if !app.is_running() {
        lines.push(Line::from(Span::styled(
            if app.summaries.is_empty() {
                " Waiting to start"
            } else {
                " Finished"
            },
            t.dim(),
        )));
    }
    lines.push(Line::from(""));
    if let Some(last) = app.summaries.last() {
        let style = if last.has_failures() {
            t.warning_style()
        } else {
            t.success_style()
        };
        lines.push(Line::from(Span::styled(" Last run", t.bold())));
        lines.push(Line::from(Span::styled(format!(" {}", last.totals()), style)));
    }

    let block = Block::default()
        .title(" Progress ")
        .borders(Borders::ALL)
        .border_style(t.block_unfocused());
    let inner = block.inner(area);
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );

    if app.is_running() && inner.height > 4 {
        let label = app
            .status
            .current
            .clone()
            .unwrap_or_else(|| "Connecting...".to_string());
        let throbber_area = Rect {
            x: inner.x + 1,
            y: inner.y + 4,
            width: inner.width.saturating_sub(1),
            height: 1,
        };
        let throbber = Throbber::default()
            .label(label)
            .throbber_set(BRAILLE_SIX)
            .style(t.text())
            .throbber_style(Style::default().fg(t.accent));
        frame.render_stateful_widget(throbber, throbber_area, &mut app.ui.throbber);
    }
}

fn render_logs(frame: &mut Frame, area: Rect, app: &App) {
    let t = theme::theme();
    let widget = TuiLoggerWidget::default()
        .block(
            Block::default()
                .title(" Logs ")
                .borders(Borders::ALL)
                .border_style(t.block_unfocused()),
        )
        .style(Style::default().fg(t.fg))
        .output_level(Some(TuiLoggerLevelOutput::Long))
        .output_target(false)
        .style_error(Style::default().fg(t.log_error))
        .style_warn(Style::default().fg(t.log_warn))
        .style_info(Style::default().fg(t.log_info))
        .style_debug(Style::default().fg(t.log_debug))
        .style_trace(Style::default().fg(t.log_trace))
        .state(&app.ui.log_state);
    frame.render_widget(widget, area);
}

fn render_fullscreen_logs(frame: &mut Frame, app: &mut App) {
    let t = theme::theme();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let header = Paragraph::new(format!(
        " aws-cleaner │ Logs (fullscreen) │ Press 'l' to return │ Elapsed: {} ",
        app.elapsed_str()
    ))
    .style(Style::default().fg(t.fg).bg(t.accent));
    frame.render_widget(header, chunks[0]);

    let widget = TuiLoggerSmartWidget::default()
        .style(Style::default().fg(t.fg).bg(t.bg))
        .output_level(Some(TuiLoggerLevelOutput::Long))
        .style_error(Style::default().fg(t.log_error))
        .style_warn(Style::default().fg(t.log_warn))
        .style_info(Style::default().fg(t.log_info))
        .style_debug(Style::default().fg(t.log_debug))
        .style_trace(Style::default().fg(t.log_trace))
        .state(&app.ui.log_state);
    frame.render_widget(widget, chunks[1]);

    let key_style = t.key_badge();
    let help = Line::from(vec![
        Span::styled(" ↑↓←→ ", key_style),
        Span::styled(" Navigate ", t.dim()),
        Span::styled(" PgUp/PgDn ", key_style),
        Span::styled(" Scroll ", t.dim()),
        Span::styled(" Tab ", key_style),
        Span::styled(" Targets ", t.dim()),
        Span::styled(" l ", key_style),
        Span::styled(" Return ", t.dim()),
        Span::styled(" q ", key_style),
        Span::styled(" Quit ", t.dim()),
    ]);
    frame.render_widget(Paragraph::new(help), chunks[2]);
}

fn render_help_bar(frame: &mut Frame, area: Rect) {
    let t = theme::theme();
    let key_style = t.key_badge();
    let help = Line::from(vec![
        Span::styled(" Tab/↑↓ ", key_style),
        Span::styled(" Move ", t.dim()),
        Span::styled(" Space ", key_style),
        Span::styled(" Toggle ", t.dim()),
        Span::styled(" ←→ ", key_style),
        Span::styled(" Profile ", t.dim()),
        Span::styled(" s ", key_style),
        Span::styled(" Start ", t.dim()),
        Span::styled(" a/n ", key_style),
        Span::styled(" All/None ", t.dim()),
        Span::styled(" d ", key_style),
        Span::styled(" Dry run ", t.dim()),
        Span::styled(" l ", key_style),
        Span::styled(" Logs ", t.dim()),
        Span::styled(" q ", key_style),
        Span::styled(" Quit ", t.dim()),
    ]);
    frame.render_widget(Paragraph::new(help), area);
}

fn popup_block(title: &str, border: Style) -> Block<'_> {
    let t = theme::theme();
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border)
        .style(Style::default().bg(t.bg))
}

fn render_confirm_popup(frame: &mut Frame, lines: &[String]) {
    let t = theme::theme();
    let area = centered_rect(60, 50, frame.area());
    frame.render_widget(Clear, area);

    let key_style = t.key_badge();
    let mut text = vec![
        Line::from(""),
        Line::from(Span::styled("Start AWS resource cleanup?", t.bold())),
        Line::from(""),
    ];
    text.extend(lines.iter().map(|l| Line::from(Span::styled(l.clone(), t.text()))));
    text.push(Line::from(""));
    text.push(Line::from(vec![
        Span::styled(" y ", key_style),
        Span::styled(" Start  ", t.text()),
        Span::styled(" n ", key_style),
        Span::styled(" Cancel ", t.text()),
    ]));

    let live = lines.iter().any(|l| l.contains("LIVE"));
    let border = if live { t.error_style() } else { t.block_focused() };
    let paragraph = Paragraph::new(text)
        .block(popup_block(" Confirm ", border))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_error_popup(frame: &mut Frame, message: &str) {
    let t = theme::theme();
    let area = centered_rect(50, 30, frame.area());
    frame.render_widget(Clear, area);

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(message.to_string(), t.text())),
        Line::from(""),
        Line::from(Span::styled("Press any key to close", t.dim())),
    ];
    let paragraph = Paragraph::new(text)
        .block(popup_block(" Error ", t.error_style()))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_completed_popup(frame: &mut Frame, lines: &[String]) {
    let t = theme::theme();
    let area = centered_rect(80, 60, frame.area());
    frame.render_widget(Clear, area);

    let mut text = vec![Line::from("")];
    text.extend(lines.iter().map(|l| Line::from(Span::styled(l.clone(), t.text()))));
    text.push(Line::from(""));
    text.push(Line::from(Span::styled("Press any key to close", t.dim())));

    let paragraph = Paragraph::new(text)
        .block(popup_block(" Complete ", t.success_style()))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

/// Create a centered rectangle
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
