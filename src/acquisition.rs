//! Background acquisition loop.
//!
//! The loop is the only writer of the [`SharedBuffer`]. Each tick fetches one
//! reading, appends it, publishes a new [`LoopStatus`] (which doubles as the
//! renderer's refresh hint) and then waits for the next tick. Every wait also
//! listens for an explicit stop, the [`CancelToken`] and the optional
//! duration deadline, so shutdown never has to sit out a full interval.
//!
//! ```text
//!   Idle ──start()──▶ Running ──stop / deadline / cancel──▶ Stopping ──▶ Stopped
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{sleep, sleep_until, timeout, Instant};
use tracing::{debug, info, warn};

use crate::data::{Sample, SharedBuffer};
use crate::error::FetchError;
use crate::source::{SampleSource, DEFAULT_TIMEOUT};

/// Pause between two ticks.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

/// Lifecycle of the acquisition loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionState {
    Idle,
    Running,
    Stopping,
    Stopped,
}

impl AcquisitionState {
    /// Returns the display label for this state.
    pub fn label(&self) -> &'static str {
        match self {
            AcquisitionState::Idle => "idle",
            AcquisitionState::Running => "running",
            AcquisitionState::Stopping => "stopping",
            AcquisitionState::Stopped => "stopped",
        }
    }
}

/// Why the loop left the `Running` state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// [`AcquisitionHandle::stop`] was called or the handle was dropped.
    Requested,
    /// The configured duration limit elapsed.
    DurationElapsed,
    /// The shared [`CancelToken`] was triggered.
    Cancelled,
}

impl StopReason {
    pub fn label(&self) -> &'static str {
        match self {
            StopReason::Requested => "stop requested",
            StopReason::DurationElapsed => "duration elapsed",
            StopReason::Cancelled => "cancelled",
        }
    }
}

/// Progress published by the loop after every tick.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopStatus {
    pub state: AcquisitionState,
    /// Successful fetches so far (also the next time index).
    pub samples_recorded: u64,
    /// Ticks skipped because of fetch or parse errors.
    pub failed_ticks: u64,
    /// Message of the most recent failed tick, cleared by the next success.
    pub last_error: Option<String>,
    pub stop_reason: Option<StopReason>,
}

impl Default for LoopStatus {
    fn default() -> Self {
        Self {
            state: AcquisitionState::Idle,
            samples_recorded: 0,
            failed_ticks: 0,
            last_error: None,
            stop_reason: None,
        }
    }
}

/// Cancellation signal shared between the loop and whoever may abort it.
///
/// Cloning the token shares the same signal. Once cancelled it stays
/// cancelled.
#[derive(Debug, Clone)]
pub struct CancelToken {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Trigger cancellation. Idempotent.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once the token has been cancelled.
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

/// Timing of the loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcquisitionConfig {
    /// Pause after every tick.
    pub interval: Duration,
    /// Upper bound for one fetch.
    pub fetch_timeout: Duration,
    /// Stop automatically once this much time has passed since start.
    pub duration_limit: Option<Duration>,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            fetch_timeout: DEFAULT_TIMEOUT,
            duration_limit: None,
        }
    }
}

impl AcquisitionConfig {
    /// Number of ticks a limited run is expected to take, used to size the
    /// time axis. `None` when the run has no limit.
    pub fn expected_ticks(&self) -> Option<u64> {
        let limit = self.duration_limit?;
        let interval = self.interval.as_secs_f64();
        if interval <= 0.0 {
            return None;
        }
        Some((limit.as_secs_f64() / interval).ceil() as u64)
    }
}

/// An acquisition loop that has not been started yet.
#[derive(Debug)]
pub struct Acquisition {
    source: Arc<dyn SampleSource>,
    buffer: SharedBuffer,
    config: AcquisitionConfig,
    cancel: CancelToken,
    status_tx: watch::Sender<LoopStatus>,
}

impl Acquisition {
    /// Create an idle loop writing into `buffer`.
    pub fn new(
        source: Arc<dyn SampleSource>,
        buffer: SharedBuffer,
        config: AcquisitionConfig,
        cancel: CancelToken,
    ) -> Self {
        let (status_tx, _) = watch::channel(LoopStatus::default());
        Self {
            source,
            buffer,
            config,
            cancel,
            status_tx,
        }
    }

    pub fn state(&self) -> AcquisitionState {
        self.status_tx.borrow().state
    }

    /// Start the loop on the current tokio runtime.
    ///
    /// Must be called from within a runtime context.
    pub fn start(self) -> AcquisitionHandle {
        let (stop_tx, stop_rx) = watch::channel(false);
        let status_rx = self.status_tx.subscribe();
        self.status_tx.send_modify(|status| status.state = AcquisitionState::Running);

        let task = tokio::spawn(self.run(stop_rx));

        AcquisitionHandle {
            stop_tx,
            status_rx,
            task,
        }
    }

    async fn run(self, mut stop_rx: watch::Receiver<bool>) -> StopReason {
        // A limit past the clock's range never elapses.
        let deadline = self
            .config
            .duration_limit
            .and_then(|limit| Instant::now().checked_add(limit));
        let mut next_index = 0u64;

        info!(
            source = self.source.description(),
            interval = ?self.config.interval,
            limit = ?self.config.duration_limit,
            "acquisition started"
        );

        let reason = loop {
            if let Some(reason) = self.stop_pending(&stop_rx, deadline) {
                break reason;
            }

            let fetched = tokio::select! {
                biased;
                reason = stop_signal(&mut stop_rx, &self.cancel, deadline) => break reason,
                result = timeout(self.config.fetch_timeout, self.source.fetch()) => {
                    result.unwrap_or(Err(FetchError::Timeout))
                }
            };

            match fetched {
                Ok(reading) => {
                    let sample = Sample::new(next_index, reading);
                    self.buffer.append(sample);
                    next_index += 1;
                    info!(
                        time_index = sample.time_index,
                        "Data updated: Temp={}, Pressure={}, Humidity={}",
                        sample.temperature,
                        sample.pressure,
                        sample.humidity
                    );
                    self.status_tx.send_modify(|status| {
                        status.samples_recorded = next_index;
                        status.last_error = None;
                    });
                }
                Err(e) => {
                    warn!(error = %e, "tick skipped");
                    self.status_tx.send_modify(|status| {
                        status.failed_ticks += 1;
                        status.last_error = Some(e.to_string());
                    });
                }
            }

            tokio::select! {
                biased;
                reason = stop_signal(&mut stop_rx, &self.cancel, deadline) => break reason,
                _ = sleep(self.config.interval) => {}
            }
        };

        self.status_tx.send_modify(|status| {
            status.state = AcquisitionState::Stopping;
            status.stop_reason = Some(reason);
        });
        debug!(reason = reason.label(), "acquisition stopping");

        self.status_tx.send_modify(|status| status.state = AcquisitionState::Stopped);
        info!(
            reason = reason.label(),
            samples = next_index,
            "acquisition stopped"
        );
        reason
    }

    /// Non-blocking check of every stop condition.
    fn stop_pending(
        &self,
        stop_rx: &watch::Receiver<bool>,
        deadline: Option<Instant>,
    ) -> Option<StopReason> {
        if self.cancel.is_cancelled() {
            Some(StopReason::Cancelled)
        } else if *stop_rx.borrow() || stop_rx.has_changed().is_err() {
            Some(StopReason::Requested)
        } else if deadline.is_some_and(|d| Instant::now() >= d) {
            Some(StopReason::DurationElapsed)
        } else {
            None
        }
    }
}

/// Resolves with the first stop condition to fire.
async fn stop_signal(
    stop_rx: &mut watch::Receiver<bool>,
    cancel: &CancelToken,
    deadline: Option<Instant>,
) -> StopReason {
    let requested = async {
        // An error means the handle was dropped, which also counts as a stop.
        let _ = stop_rx.wait_for(|stop| *stop).await;
    };
    let deadline_reached = async {
        match deadline {
            Some(deadline) => sleep_until(deadline).await,
            None => std::future::pending().await,
        }
    };

    tokio::select! {
        biased;
        _ = cancel.cancelled() => StopReason::Cancelled,
        _ = requested => StopReason::Requested,
        _ = deadline_reached => StopReason::DurationElapsed,
    }
}

/// Handle to a running acquisition loop.
///
/// Dropping the handle stops the loop, or call [`stop`](Self::stop) and
/// then [`join`](Self::join) to wait for it.
#[derive(Debug)]
pub struct AcquisitionHandle {
    stop_tx: watch::Sender<bool>,
    status_rx: watch::Receiver<LoopStatus>,
    task: JoinHandle<StopReason>,
}

impl AcquisitionHandle {
    /// Ask the loop to stop. Returns immediately.
    pub fn stop(&self) {
        self.stop_tx.send_replace(true);
    }

    /// Receiver of loop progress. A change is the renderer's cue to redraw.
    pub fn status(&self) -> watch::Receiver<LoopStatus> {
        self.status_rx.clone()
    }

    /// Wait for the loop to reach `Stopped`.
    pub async fn join(self) -> Result<StopReason, JoinError> {
        let AcquisitionHandle { stop_tx, task, .. } = self;
        let reason = task.await;
        drop(stop_tx);
        reason
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use async_trait::async_trait;
    use parking_lot::Mutex;

    use super::*;
    use crate::data::Reading;
    use crate::error::ParseError;

    fn reading(temperature: f64) -> Reading {
        Reading {
            temperature,
            pressure: 1013.2,
            humidity: 45.0,
        }
    }

    /// Replays scripted outcomes, then keeps returning a fixed reading.
    #[derive(Debug, Default)]
    struct ScriptedSource {
        script: Mutex<VecDeque<Result<Reading, FetchError>>>,
        delay: Option<Duration>,
    }

    impl ScriptedSource {
        fn with_script(script: Vec<Result<Reading, FetchError>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                delay: None,
            }
        }

        fn hanging(delay: Duration) -> Self {
            Self {
                delay: Some(delay),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl SampleSource for ScriptedSource {
        async fn fetch(&self) -> Result<Reading, FetchError> {
            if let Some(delay) = self.delay {
                sleep(delay).await;
            }
            let next = self.script.lock().pop_front();
            next.unwrap_or_else(|| Ok(reading(22.0)))
        }

        fn description(&self) -> &str {
            "scripted"
        }
    }

    fn acquisition(
        source: ScriptedSource,
        config: AcquisitionConfig,
    ) -> (Acquisition, SharedBuffer, CancelToken) {
        let buffer = SharedBuffer::new(300);
        let cancel = CancelToken::new();
        let acquisition = Acquisition::new(Arc::new(source), buffer.clone(), config, cancel.clone());
        (acquisition, buffer, cancel)
    }

    #[tokio::test(start_paused = true)]
    async fn duration_limit_stops_loop() {
        let config = AcquisitionConfig {
            duration_limit: Some(Duration::from_secs(12)),
            ..AcquisitionConfig::default()
        };
        let (acquisition, buffer, _cancel) = acquisition(ScriptedSource::default(), config);

        let handle = acquisition.start();
        let status = handle.status();
        let reason = handle.join().await.unwrap();

        assert_eq!(reason, StopReason::DurationElapsed);
        // Ticks at 0s, 5s and 10s; the deadline at 12s cuts the last wait short.
        let snapshot = buffer.snapshot();
        assert!((2..=3).contains(&snapshot.len()), "got {} samples", snapshot.len());
        assert_eq!(status.borrow().state, AcquisitionState::Stopped);
        assert_eq!(status.borrow().stop_reason, Some(StopReason::DurationElapsed));
    }

    #[tokio::test(start_paused = true)]
    async fn huge_limit_runs_until_cancelled() {
        let limit = crate::prompt::parse_duration_limit("1e19").unwrap();
        let config = AcquisitionConfig {
            duration_limit: limit,
            ..AcquisitionConfig::default()
        };
        assert!(config.expected_ticks().is_some());
        let (acquisition, buffer, cancel) = acquisition(ScriptedSource::default(), config);

        let handle = acquisition.start();
        sleep(Duration::from_secs(11)).await;
        cancel.cancel();

        assert_eq!(handle.join().await.unwrap(), StopReason::Cancelled);
        assert_eq!(buffer.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_fetches_do_not_consume_time_index() {
        let source = ScriptedSource::with_script(vec![
            Ok(reading(20.0)),
            Err(FetchError::Parse(ParseError { found: 2 })),
            Err(FetchError::Timeout),
            Ok(reading(21.0)),
        ]);
        let config = AcquisitionConfig {
            duration_limit: Some(Duration::from_secs(18)),
            ..AcquisitionConfig::default()
        };
        let (acquisition, buffer, _cancel) = acquisition(source, config);

        let handle = acquisition.start();
        let status = handle.status();
        handle.join().await.unwrap();

        let snapshot = buffer.snapshot();
        let indices: Vec<u64> = snapshot.samples.iter().map(|s| s.time_index).collect();
        assert_eq!(indices, vec![0, 1]);
        assert_eq!(snapshot.samples[1].temperature, 21.0);
        assert_eq!(status.borrow().failed_ticks, 2);
        assert_eq!(status.borrow().samples_recorded, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_interrupts_sleep() {
        let (acquisition, buffer, cancel) =
            acquisition(ScriptedSource::default(), AcquisitionConfig::default());

        let started = Instant::now();
        let handle = acquisition.start();
        sleep(Duration::from_secs(1)).await;
        cancel.cancel();

        let reason = handle.join().await.unwrap();
        assert_eq!(reason, StopReason::Cancelled);
        assert!(started.elapsed() < DEFAULT_INTERVAL);
        assert_eq!(buffer.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_interrupts_hanging_fetch() {
        let (acquisition, buffer, cancel) = acquisition(
            ScriptedSource::hanging(Duration::from_secs(8)),
            AcquisitionConfig::default(),
        );

        let started = Instant::now();
        let handle = acquisition.start();
        sleep(Duration::from_secs(2)).await;
        cancel.cancel();

        assert_eq!(handle.join().await.unwrap(), StopReason::Cancelled);
        assert!(started.elapsed() < Duration::from_secs(8));
        assert!(buffer.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_fetch_times_out() {
        let config = AcquisitionConfig {
            duration_limit: Some(Duration::from_secs(11)),
            ..AcquisitionConfig::default()
        };
        let (acquisition, buffer, _cancel) =
            acquisition(ScriptedSource::hanging(Duration::from_secs(30)), config);

        let handle = acquisition.start();
        let status = handle.status();
        handle.join().await.unwrap();

        assert!(buffer.is_empty());
        assert_eq!(status.borrow().failed_ticks, 1);
        assert_eq!(status.borrow().last_error.as_deref(), Some("request timed out"));
    }

    #[tokio::test(start_paused = true)]
    async fn explicit_stop_freezes_buffer() {
        let (acquisition, buffer, _cancel) =
            acquisition(ScriptedSource::default(), AcquisitionConfig::default());

        let handle = acquisition.start();
        sleep(Duration::from_secs(11)).await;
        handle.stop();
        assert_eq!(handle.join().await.unwrap(), StopReason::Requested);

        let before = buffer.snapshot();
        sleep(Duration::from_secs(30)).await;
        assert_eq!(buffer.snapshot(), before);
        assert_eq!(before.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_before_start_records_nothing() {
        let (acquisition, buffer, cancel) =
            acquisition(ScriptedSource::default(), AcquisitionConfig::default());
        cancel.cancel();

        let handle = acquisition.start();
        assert_eq!(handle.join().await.unwrap(), StopReason::Cancelled);
        assert!(buffer.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn state_transitions() {
        let (acquisition, _buffer, _cancel) =
            acquisition(ScriptedSource::default(), AcquisitionConfig::default());
        assert_eq!(acquisition.state(), AcquisitionState::Idle);

        let handle = acquisition.start();
        let status = handle.status();
        assert_eq!(status.borrow().state, AcquisitionState::Running);

        handle.stop();
        handle.join().await.unwrap();
        assert_eq!(status.borrow().state, AcquisitionState::Stopped);
    }

    #[test]
    fn expected_ticks_rounds_up() {
        let config = AcquisitionConfig {
            duration_limit: Some(Duration::from_secs(12)),
            ..AcquisitionConfig::default()
        };
        assert_eq!(config.expected_ticks(), Some(3));
        assert_eq!(AcquisitionConfig::default().expected_ticks(), None);
    }

    #[test]
    fn cancel_token_is_shared() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        token.cancel();
        assert!(clone.is_cancelled());
    }
}
