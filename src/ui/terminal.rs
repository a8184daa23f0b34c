//! Full-screen ratatui renderer.

use anyhow::Result;
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Terminal,
};

use super::{chart, common, Renderable, RunStatus, Theme};
use crate::data::BufferSnapshot;

// Minimum terminal size for usable display
const MIN_WIDTH: u16 = 60;
const MIN_HEIGHT: u16 = 16;

/// Draws the header, three charts and the status bar onto a terminal.
///
/// Terminal setup (raw mode, alternate screen) is the caller's job.
pub struct TerminalRenderer<B: Backend> {
    terminal: Terminal<B>,
    theme: Theme,
}

impl<B: Backend> TerminalRenderer<B> {
    pub fn new(terminal: Terminal<B>, theme: Theme) -> Self {
        Self { terminal, theme }
    }

    pub fn terminal_mut(&mut self) -> &mut Terminal<B> {
        &mut self.terminal
    }
}

impl<B: Backend> Renderable for TerminalRenderer<B> {
    fn draw(&mut self, snapshot: &BufferSnapshot, status: &RunStatus) -> Result<()> {
        let theme = &self.theme;
        self.terminal.draw(|frame| {
            let area = frame.area();

            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = Paragraph::new(msg)
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(Color::Yellow));
                let centered = Rect::new(0, (area.height / 2).saturating_sub(2), area.width, 5)
                    .intersection(area);
                frame.render_widget(paragraph, centered);
                return;
            }

            let chunks = Layout::vertical([
                Constraint::Length(1), // Header bar
                Constraint::Min(12),   // Charts
                Constraint::Length(1), // Status bar
            ])
            .split(area);

            common::render_header(frame, snapshot, status, theme, chunks[0]);
            chart::render(frame, snapshot, status, theme, chunks[1]);
            common::render_status_bar(frame, status, theme, chunks[2]);

            if status.show_help {
                common::render_help(frame, theme, area);
            }
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::{AcquisitionState, LoopStatus, StopReason};
    use crate::data::{Reading, Sample, SampleBuffer};
    use ratatui::backend::TestBackend;
    use std::time::Duration;

    fn status(loop_status: LoopStatus) -> RunStatus {
        RunStatus {
            zone: "lab".to_string(),
            source: "http: http://10.0.0.5".to_string(),
            loop_status,
            elapsed: Duration::from_secs(65),
            duration_limit: Some(Duration::from_secs(300)),
            expected_ticks: Some(60),
            show_help: false,
        }
    }

    fn snapshot(count: u64) -> BufferSnapshot {
        let mut buffer = SampleBuffer::new(300);
        for i in 0..count {
            buffer.append(Sample::new(
                i,
                Reading {
                    temperature: 23.5,
                    pressure: 101_325.0,
                    humidity: 45.0,
                },
            ));
        }
        buffer.snapshot()
    }

    fn rendered(renderer: &mut TerminalRenderer<TestBackend>) -> String {
        let buffer = renderer.terminal_mut().backend().buffer().clone();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn renderer(width: u16, height: u16) -> TerminalRenderer<TestBackend> {
        let terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        TerminalRenderer::new(terminal, Theme::dark())
    }

    #[test]
    fn draws_header_and_charts() {
        let mut renderer = renderer(120, 40);
        let loop_status = LoopStatus {
            state: AcquisitionState::Running,
            samples_recorded: 3,
            ..LoopStatus::default()
        };
        renderer.draw(&snapshot(3), &status(loop_status)).unwrap();

        let screen = rendered(&mut renderer);
        assert!(screen.contains("zone lab"));
        assert!(screen.contains("running"));
        assert!(screen.contains("1m05s / 5m00s"));
        assert!(screen.contains("Temperature"));
        assert!(screen.contains("Pressure"));
        assert!(screen.contains("Humidity"));
        assert!(screen.contains("23.5 deg"));
    }

    #[test]
    fn empty_buffer_waits_for_pressure() {
        let mut renderer = renderer(120, 40);
        renderer
            .draw(&snapshot(0), &status(LoopStatus::default()))
            .unwrap();
        assert!(rendered(&mut renderer).contains("Waiting for the first reading"));
    }

    #[test]
    fn stopped_run_shows_reason() {
        let mut renderer = renderer(120, 40);
        let loop_status = LoopStatus {
            state: AcquisitionState::Stopped,
            stop_reason: Some(StopReason::DurationElapsed),
            ..LoopStatus::default()
        };
        renderer.draw(&snapshot(2), &status(loop_status)).unwrap();
        let screen = rendered(&mut renderer);
        assert!(screen.contains("Acquisition stopped"));
        assert!(screen.contains(StopReason::DurationElapsed.label()));
    }

    #[test]
    fn too_small_terminal() {
        let mut renderer = renderer(40, 10);
        renderer
            .draw(&snapshot(1), &status(LoopStatus::default()))
            .unwrap();
        assert!(rendered(&mut renderer).contains("Terminal too small"));
    }
}
