//! File-based sample source.
//!
//! Re-reads a saved copy of the sensor page on every fetch, which makes it
//! possible to run the whole pipeline without the device on the network.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{scrape::extract_reading, SampleSource};
use crate::data::Reading;
use crate::error::FetchError;

/// A sample source that scrapes a local HTML file.
///
/// The file is read fresh on every fetch, so editing it while a session is
/// running changes the next reading.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    description: String,
}

impl FileSource {
    /// Create a new file source for the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self { path, description }
    }

    /// Returns the path being read.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SampleSource for FileSource {
    async fn fetch(&self) -> Result<Reading, FetchError> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        Ok(extract_reading(&content)?)
    }

    fn description(&self) -> &str {
        &self.description
    }
}
