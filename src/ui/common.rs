//! Common UI components shared across views.
//!
//! This module contains the header bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::{RunStatus, Theme};
use crate::acquisition::AcquisitionState;
use crate::data::duration::format_duration;
use crate::data::BufferSnapshot;

/// Render the header bar with the run overview.
///
/// Displays: state indicator, zone, source, sample and skip counts, elapsed time.
pub fn render_header(
    frame: &mut Frame,
    snapshot: &BufferSnapshot,
    status: &RunStatus,
    theme: &Theme,
    area: Rect,
) {
    let loop_status = &status.loop_status;
    let state_style = theme.state_style(loop_status.state);

    let elapsed = match status.duration_limit {
        Some(limit) => format!(
            "{} / {}",
            format_duration(status.elapsed),
            format_duration(limit)
        ),
        None => format_duration(status.elapsed),
    };

    let skipped = if loop_status.failed_ticks > 0 {
        Span::styled(
            format!("{}", loop_status.failed_ticks),
            Style::default().fg(theme.warning),
        )
    } else {
        Span::styled("0", Style::default().add_modifier(Modifier::DIM))
    };

    let line = Line::from(vec![
        Span::styled(" ● ", state_style),
        Span::styled("SENSORWATCH ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ zone "),
        Span::styled(status.zone.clone(), Style::default().fg(theme.highlight)),
        Span::raw(format!(" │ {} │ ", status.source)),
        Span::styled(loop_status.state.label(), state_style),
        Span::raw(" │ "),
        Span::styled(
            format!("{}", snapshot.total_appended),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" samples "),
        skipped,
        Span::raw(format!(" skipped │ {}", elapsed)),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the status bar at the bottom.
///
/// Shows the last fetch error while the loop keeps failing, otherwise the
/// available controls.
pub fn render_status_bar(frame: &mut Frame, status: &RunStatus, theme: &Theme, area: Rect) {
    let loop_status = &status.loop_status;

    let (text, style) = match (&loop_status.last_error, loop_status.state) {
        (_, AcquisitionState::Stopped) => {
            let reason = loop_status
                .stop_reason
                .map(|r| r.label())
                .unwrap_or("stopped");
            (
                format!(" Acquisition stopped ({}) | ?:help q:quit and export", reason),
                Style::default().fg(theme.highlight),
            )
        }
        (Some(err), _) => (
            format!(" Last error: {} | s:stop ?:help q:quit", err),
            Style::default().fg(theme.warning),
        ),
        (None, _) => (
            " s:stop ?:help q:quit".to_string(),
            Style::default().add_modifier(Modifier::DIM),
        ),
    };

    frame.render_widget(Paragraph::new(text).style(style), area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the charts.
pub fn render_help(frame: &mut Frame, theme: &Theme, area: Rect) {
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", theme.header)]),
        Line::from(""),
        Line::from("  s         Stop acquisition, keep window"),
        Line::from("  q / Esc   Stop, export and quit"),
        Line::from("  Ctrl-C    Same as q"),
        Line::from("  ?         Toggle this help"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(Style::default().fg(theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    // Center the help overlay - responsive to terminal size
    let help_width = 44u16.min(area.width.saturating_sub(4));
    let help_height = 10u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
