//! Live rendering of the sample window.
//!
//! Renderers implement [`Renderable`] and are driven from a single thread.
//! They only ever see [`BufferSnapshot`] copies, never the live buffer.
//!
//! ## Submodules
//!
//! - [`terminal`]: ratatui renderer with three stacked charts
//! - [`chart`]: the per-quantity chart widgets
//! - [`common`]: header bar, status bar and help overlay
//! - [`headless`]: line-per-sample renderer for runs without a terminal UI
//! - [`theme`]: Light/dark theme support with terminal auto-detection
//!
//! ## Layout
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ Header (common::render_header)       │
//! ├──────────────────────────────────────┤
//! │ Temperature chart                    │
//! ├──────────────────────────────────────┤
//! │ Pressure chart                       │
//! ├──────────────────────────────────────┤
//! │ Humidity chart                       │
//! ├──────────────────────────────────────┤
//! │ Status Bar (common::render_status)   │
//! └──────────────────────────────────────┘
//! ```

pub mod chart;
pub mod common;
pub mod headless;
pub mod terminal;
pub mod theme;

pub use headless::HeadlessRenderer;
pub use terminal::TerminalRenderer;
pub use theme::Theme;

use std::time::Duration;

use anyhow::Result;

use crate::acquisition::LoopStatus;
use crate::data::BufferSnapshot;

/// Everything besides the samples that a renderer may display.
#[derive(Debug, Clone, PartialEq)]
pub struct RunStatus {
    pub zone: String,
    pub source: String,
    pub loop_status: LoopStatus,
    /// Time since acquisition started, frozen once it stops.
    pub elapsed: Duration,
    pub duration_limit: Option<Duration>,
    /// Ticks a limited run is expected to take; sizes the time axis.
    pub expected_ticks: Option<u64>,
    pub show_help: bool,
}

/// Something that can draw a snapshot of the run.
pub trait Renderable {
    fn draw(&mut self, snapshot: &BufferSnapshot, status: &RunStatus) -> Result<()>;
}
