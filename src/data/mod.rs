//! Sample model and the bounded live window.
//!
//! ## Submodules
//!
//! - [`sample`]: [`Reading`], [`Sample`] and the per-[`Quantity`] display ranges
//! - [`buffer`]: [`SampleBuffer`] ring, its thread-safe [`SharedBuffer`] handle and
//!   [`BufferSnapshot`] copies handed to renderers and exporters
//! - [`duration`]: Parsing and formatting of duration strings (e.g., "5s", "500ms")
//!
//! ## Data Flow
//!
//! ```text
//! Reading (from a SampleSource)
//!        │
//!        ▼
//! Sample::new(time_index, reading)
//!        │
//!        ▼
//! SharedBuffer::append()  ──▶ evicts oldest when full
//!        │
//!        └──▶ SharedBuffer::snapshot() ──▶ renderer / exporter
//! ```

pub mod buffer;
pub mod duration;
pub mod sample;

pub use buffer::{BufferSnapshot, SampleBuffer, SharedBuffer, DEFAULT_CAPACITY};
pub use sample::{Quantity, Reading, Sample, ValueRange};
