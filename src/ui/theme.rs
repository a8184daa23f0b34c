//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::acquisition::AcquisitionState;
use crate::data::Quantity;

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Color for skipped ticks and errors.
    pub warning: Color,
    /// Color for a running loop.
    pub healthy: Color,
    /// Color for axes and borders.
    pub border: Color,
    /// Style for chart titles.
    pub header: Style,
    /// Series colors.
    pub temperature: Color,
    pub pressure: Color,
    pub humidity: Color,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            warning: Color::Yellow,
            healthy: Color::Green,
            border: Color::Gray,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            temperature: Color::LightRed,
            pressure: Color::LightBlue,
            humidity: Color::LightGreen,
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            warning: Color::Rgb(180, 120, 0),
            healthy: Color::Green,
            border: Color::DarkGray,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            temperature: Color::Red,
            pressure: Color::Blue,
            humidity: Color::Green,
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        // Use terminal-light crate to detect background luminance
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Series color for a quantity
    pub fn quantity_color(&self, quantity: Quantity) -> Color {
        match quantity {
            Quantity::Temperature => self.temperature,
            Quantity::Pressure => self.pressure,
            Quantity::Humidity => self.humidity,
        }
    }

    /// Get style for a loop state
    pub fn state_style(&self, state: AcquisitionState) -> Style {
        match state {
            AcquisitionState::Running => Style::default().fg(self.healthy),
            AcquisitionState::Idle | AcquisitionState::Stopping => {
                Style::default().fg(self.warning)
            }
            AcquisitionState::Stopped => Style::default().add_modifier(Modifier::DIM),
        }
    }
}
