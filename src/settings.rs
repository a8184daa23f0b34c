//! Runtime settings.
//!
//! Layered with the `config` crate: built-in defaults, then an optional TOML
//! file, then `SENSORWATCH_*` environment variables.
//!
//! ```toml
//! output_root = "/srv/measurements"
//! interval = "5s"
//! timeout = "10s"
//! capacity = 300
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::acquisition::AcquisitionConfig;
use crate::data::duration::parse_duration;
use crate::data::DEFAULT_CAPACITY;

/// Operational knobs of a run.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Parent of the per-zone output directories.
    pub output_root: PathBuf,
    /// Pause between ticks (e.g., "5s").
    pub interval: String,
    /// Per-fetch timeout (e.g., "10s").
    pub timeout: String,
    /// Samples kept in the live window.
    pub capacity: usize,
}

/// `<home>/Desktop/analisi ventole`, or a relative directory when no home is set.
pub fn default_output_root() -> PathBuf {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(|home| PathBuf::from(home).join("Desktop"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("analisi ventole")
}

impl Settings {
    /// Load settings, reading `path` if one is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("output_root", default_output_root().to_string_lossy().into_owned())?
            .set_default("interval", "5s")?
            .set_default("timeout", "10s")?
            .set_default("capacity", DEFAULT_CAPACITY as i64)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        let settings: Settings = builder
            .add_source(Environment::with_prefix("SENSORWATCH"))
            .build()?
            .try_deserialize()
            .context("invalid settings")?;

        // Validate durations early so a typo fails before the session starts.
        settings.interval()?;
        settings.timeout()?;
        Ok(settings)
    }

    pub fn interval(&self) -> Result<Duration> {
        parse_duration(&self.interval).context("invalid interval")
    }

    pub fn timeout(&self) -> Result<Duration> {
        parse_duration(&self.timeout).context("invalid timeout")
    }

    /// Loop timing for a run with the given duration limit.
    pub fn acquisition_config(&self, duration_limit: Option<Duration>) -> Result<AcquisitionConfig> {
        Ok(AcquisitionConfig {
            interval: self.interval()?,
            fetch_timeout: self.timeout()?,
            duration_limit,
        })
    }
}
