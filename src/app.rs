//! Interactive state of a run, owned by the UI thread.

use std::time::{Duration, Instant};

use tokio::sync::watch;

use crate::acquisition::{AcquisitionState, CancelToken, LoopStatus};
use crate::data::{BufferSnapshot, SharedBuffer};
use crate::ui::RunStatus;

/// Main application state.
///
/// Reads the buffer through snapshots and follows the loop through its
/// status channel. The only thing it can do to the loop is cancel it.
pub struct App {
    /// Whether the UI loop should keep going.
    pub running: bool,
    pub show_help: bool,
    /// Keep the window up after the loop stops on its own.
    pub keep_open: bool,

    zone: String,
    source: String,
    buffer: SharedBuffer,
    status_rx: watch::Receiver<LoopStatus>,
    cancel: CancelToken,
    duration_limit: Option<Duration>,
    expected_ticks: Option<u64>,
    started_at: Instant,
    stopped_at: Option<Instant>,
}

impl App {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        zone: &str,
        source: &str,
        buffer: SharedBuffer,
        status_rx: watch::Receiver<LoopStatus>,
        cancel: CancelToken,
        duration_limit: Option<Duration>,
        expected_ticks: Option<u64>,
        keep_open: bool,
    ) -> Self {
        Self {
            running: true,
            show_help: false,
            keep_open,
            zone: zone.to_string(),
            source: source.to_string(),
            buffer,
            status_rx,
            cancel,
            duration_limit,
            expected_ticks,
            started_at: Instant::now(),
            stopped_at: None,
        }
    }

    /// Check the loop for progress. Returns true when a redraw is due.
    ///
    /// Once the loop is `Stopped` the elapsed clock freezes, and the UI
    /// quits unless `keep_open` is set.
    pub fn poll_updates(&mut self) -> bool {
        let changed = match self.status_rx.has_changed() {
            Ok(changed) => changed,
            // Loop task is gone, so nothing will change anymore.
            Err(_) => false,
        };
        if changed {
            self.status_rx.borrow_and_update();
        }

        if self.is_stopped() && self.stopped_at.is_none() {
            self.stopped_at = Some(Instant::now());
            if !self.keep_open {
                self.running = false;
            }
        }
        changed
    }

    pub fn loop_status(&self) -> LoopStatus {
        self.status_rx.borrow().clone()
    }

    pub fn is_stopped(&self) -> bool {
        self.status_rx.borrow().state == AcquisitionState::Stopped
    }

    pub fn elapsed(&self) -> Duration {
        let end = self.stopped_at.unwrap_or_else(Instant::now);
        end.saturating_duration_since(self.started_at)
    }

    pub fn snapshot(&self) -> BufferSnapshot {
        self.buffer.snapshot()
    }

    /// Everything the renderer shows besides the samples.
    pub fn run_status(&self) -> RunStatus {
        RunStatus {
            zone: self.zone.clone(),
            source: self.source.clone(),
            loop_status: self.loop_status(),
            elapsed: self.elapsed(),
            duration_limit: self.duration_limit,
            expected_ticks: self.expected_ticks,
            show_help: self.show_help,
        }
    }

    /// Stop acquiring but leave the window up for inspection.
    pub fn stop_acquisition(&mut self) {
        self.keep_open = true;
        self.cancel.cancel();
    }

    /// Stop acquiring and leave the UI loop.
    pub fn quit(&mut self) {
        self.cancel.cancel();
        self.running = false;
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }
}
