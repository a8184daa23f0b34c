//! Bounded, thread-safe sample window.
//!
//! The acquisition loop is the only writer; the renderer and exporter take
//! [`BufferSnapshot`]s. Every access goes through one mutex, so a reader
//! never observes a half-applied eviction.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use super::sample::{Quantity, Sample, ValueRange};

/// Default number of samples kept in the window.
pub const DEFAULT_CAPACITY: usize = 300;

/// Fixed-capacity FIFO of samples.
///
/// When full, appending evicts the oldest sample first.
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    samples: VecDeque<Sample>,
    capacity: usize,
    pressure_range: Option<ValueRange>,
    total_appended: u64,
}

impl Default for SampleBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl SampleBuffer {
    /// Create an empty buffer. A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
            pressure_range: None,
            total_appended: 0,
        }
    }

    /// Append a sample, evicting the oldest one if the buffer is full.
    ///
    /// The first sample of the run also fixes the pressure display range.
    pub fn append(&mut self, sample: Sample) {
        debug_assert!(
            self.samples.back().map_or(true, |last| sample.time_index > last.time_index),
            "time_index must be strictly increasing"
        );

        if self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
        self.total_appended += 1;

        if self.pressure_range.is_none() {
            self.pressure_range = Some(ValueRange::around_pressure(sample.pressure));
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Copy the current contents.
    pub fn snapshot(&self) -> BufferSnapshot {
        BufferSnapshot {
            samples: self.samples.iter().copied().collect(),
            capacity: self.capacity,
            pressure_range: self.pressure_range,
            total_appended: self.total_appended,
        }
    }
}

/// Shared handle to a [`SampleBuffer`].
///
/// Cloning the handle shares the same underlying buffer.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    inner: Arc<Mutex<SampleBuffer>>,
}

impl SharedBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SampleBuffer::new(capacity))),
        }
    }

    /// Append under the lock.
    pub fn append(&self, sample: Sample) {
        self.inner.lock().append(sample);
    }

    /// Take a consistent copy. The lock is held only while copying.
    pub fn snapshot(&self) -> BufferSnapshot {
        self.inner.lock().snapshot()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }
}

/// Immutable copy of the buffer at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct BufferSnapshot {
    pub samples: Vec<Sample>,
    pub capacity: usize,
    /// Pressure range fixed by the first sample of the run.
    pub pressure_range: Option<ValueRange>,
    /// Samples appended over the whole run, including evicted ones.
    pub total_appended: u64,
}

impl BufferSnapshot {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn latest(&self) -> Option<&Sample> {
        self.samples.last()
    }

    /// Y-axis range for a quantity.
    ///
    /// Returns `None` for pressure until the first sample has arrived.
    pub fn range(&self, quantity: Quantity) -> Option<ValueRange> {
        quantity.fixed_range().or(self.pressure_range)
    }

    /// Points of one series as `(time_index, value)` pairs.
    pub fn series(&self, quantity: Quantity) -> Vec<(f64, f64)> {
        self.samples
            .iter()
            .map(|s| (s.time_index as f64, s.value(quantity)))
            .collect()
    }

    /// X-axis window shared by all series.
    ///
    /// Starts at the oldest retained sample and spans `expected_ticks`
    /// (capped at the capacity) or the full capacity when the run has no
    /// duration limit. Always wide enough to include the newest sample.
    pub fn time_window(&self, expected_ticks: Option<u64>) -> [f64; 2] {
        let capacity = self.capacity as u64;
        let span = expected_ticks.map_or(capacity, |t| t.clamp(1, capacity));
        let start = self.samples.first().map_or(0, |s| s.time_index);
        let last = self.samples.last().map_or(0, |s| s.time_index);
        let end = (start + span).max(last);
        [start as f64, end as f64]
    }
}
