//! # sensorwatch
//!
//! Polls a networked environmental sensor (temperature, pressure, humidity),
//! keeps a bounded live window of samples, charts it in the terminal and
//! exports the run to CSV and PNG when acquisition stops.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! │  ┌─────────┐    ┌─────────────┐    ┌────────────┐           │
//! │  │ source  │───▶│ acquisition │───▶│    data    │           │
//! │  │ (fetch) │    │   (loop)    │    │  (buffer)  │           │
//! │  └─────────┘    └──────┬──────┘    └─────┬──────┘           │
//! │                        │ status          │ snapshots        │
//! │                        ▼                 ▼                  │
//! │                 ┌─────────────┐    ┌────────────┐           │
//! │                 │     app     │───▶│     ui     │──▶ TTY    │
//! │                 └─────────────┘    └────────────┘           │
//! │                                          │ on stop          │
//! │                                          ▼                  │
//! │                                    ┌────────────┐           │
//! │                                    │   export   │──▶ CSV/PNG│
//! │                                    └────────────┘           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`source`]**: [`SampleSource`] trait with an HTTP scraper and a saved-page replay
//! - **[`acquisition`]**: the fixed-interval loop, its state machine and the [`CancelToken`]
//! - **[`data`]**: samples, display ranges and the bounded [`SharedBuffer`]
//! - **[`export`]**: CSV dump and static plots written at the end of a run
//! - **[`ui`]**: ratatui charts and a headless line renderer
//! - **[`app`]**, **[`events`]**: interactive state and key handling
//! - **[`session`]**, **[`settings`]**, **[`prompt`]**: run setup
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Interactive: asks for address, zone and duration
//! sensorwatch
//!
//! # Ten minutes on the north wing, no prompts
//! sensorwatch --address 192.168.1.20 --zone north --duration 10m
//!
//! # Replay a saved page without a terminal UI
//! sensorwatch --file page.html --zone demo --duration 30s --headless
//! ```
//!
//! ### As a library
//!
//! ```no_run
//! use std::sync::Arc;
//! use sensorwatch::{Acquisition, AcquisitionConfig, CancelToken, HttpSource, SharedBuffer};
//!
//! # tokio_test::block_on(async {
//! let source = HttpSource::builder().address("192.168.1.20").build().unwrap();
//! let buffer = SharedBuffer::default();
//! let handle = Acquisition::new(
//!     Arc::new(source),
//!     buffer.clone(),
//!     AcquisitionConfig::default(),
//!     CancelToken::new(),
//! )
//! .start();
//!
//! handle.stop();
//! handle.join().await.unwrap();
//! println!("{} samples", buffer.len());
//! # });
//! ```

pub mod acquisition;
pub mod app;
pub mod data;
pub mod error;
pub mod events;
pub mod export;
pub mod prompt;
pub mod session;
pub mod settings;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use acquisition::{
    Acquisition, AcquisitionConfig, AcquisitionHandle, AcquisitionState, CancelToken, LoopStatus,
    StopReason,
};
pub use app::App;
pub use data::{BufferSnapshot, Quantity, Reading, Sample, SampleBuffer, SharedBuffer, ValueRange};
pub use error::{ExportError, FetchError, ParseError, SessionError};
pub use export::{export_run, finish_run, ExportReport};
pub use session::RunSession;
pub use settings::Settings;
pub use source::{extract_reading, FileSource, HttpSource, HttpSourceBuilder, SampleSource};
