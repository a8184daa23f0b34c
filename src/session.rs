//! Run session: where the output of one measurement goes.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Local};

use crate::data::Quantity;
use crate::error::SessionError;

/// Parameters of one measurement run, fixed at startup.
#[derive(Debug, Clone)]
pub struct RunSession {
    pub zone: String,
    pub output_dir: PathBuf,
    pub duration_limit: Option<Duration>,
    pub created_at: DateTime<Local>,
}

impl RunSession {
    /// Create the session and its `<output_root>/<zone>` directory.
    ///
    /// Missing parent directories are created as well.
    pub fn create(
        output_root: &Path,
        zone: &str,
        duration_limit: Option<Duration>,
    ) -> Result<Self, SessionError> {
        let output_dir = output_root.join(zone);
        fs::create_dir_all(&output_dir).map_err(|source| SessionError::CreateDir {
            path: output_dir.clone(),
            source,
        })?;

        Ok(Self {
            zone: zone.to_string(),
            output_dir,
            duration_limit,
            created_at: Local::now(),
        })
    }

    /// CSV dump path, stamped with the given time
    /// (`data_<zone>_<Y>-<M>-<D>_<H>-<M>-<S>.csv`, no zero padding).
    pub fn csv_path(&self, at: DateTime<Local>) -> PathBuf {
        let stamp = at.format("%Y-%-m-%-d_%-H-%-M-%-S");
        self.output_dir
            .join(format!("data_{}_{}.csv", self.zone, stamp))
    }

    /// Static plot path for one quantity.
    pub fn plot_path(&self, quantity: Quantity) -> PathBuf {
        self.output_dir.join(format!(
            "realtime_plot_{}_{}.png",
            quantity.file_stem(),
            self.zone
        ))
    }

    /// Log file used while the terminal UI owns the screen.
    pub fn log_path(&self) -> PathBuf {
        self.output_dir.join("sensorwatch.log")
    }
}
