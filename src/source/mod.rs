//! Sample source abstraction.
//!
//! A sample source produces one [`Reading`] per call. The acquisition loop
//! treats every source the same way; fetch and parse failures only skip
//! the current tick.

mod file;
mod http;
pub mod scrape;

pub use file::FileSource;
pub use http::{HttpSource, HttpSourceBuilder, DEFAULT_TIMEOUT};
pub use scrape::extract_reading;

use std::fmt::Debug;

use async_trait::async_trait;

use crate::data::Reading;
use crate::error::FetchError;

/// Trait for fetching readings from a sensor.
///
/// # Example
///
/// ```no_run
/// use sensorwatch::{HttpSource, SampleSource};
///
/// # tokio_test::block_on(async {
/// let source = HttpSource::builder().endpoint("http://192.168.1.20").build().unwrap();
/// match source.fetch().await {
///     Ok(reading) => println!("{:.1} deg", reading.temperature),
///     Err(e) => eprintln!("skipped: {}", e),
/// }
/// # });
/// ```
#[async_trait]
pub trait SampleSource: Send + Sync + Debug {
    /// Fetch a single reading.
    async fn fetch(&self) -> Result<Reading, FetchError>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;
}
