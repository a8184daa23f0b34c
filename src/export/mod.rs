//! Final export of a stopped run.
//!
//! Runs once, synchronously, after the acquisition loop has been joined:
//!
//! - [`csv_dump`]: `data_<zone>_<timestamp>.csv` with every retained sample
//! - [`plot`]: `realtime_plot_<quantity>_<zone>.png`, one per quantity
//!
//! A failing exporter does not stop the others, and files that were already
//! written are left in place.

pub mod csv_dump;
pub mod plot;

use std::path::PathBuf;

use chrono::{DateTime, Local};
use tracing::{error, info, warn};

use crate::data::{BufferSnapshot, Quantity, SharedBuffer};
use crate::error::ExportError;
use crate::session::RunSession;

/// Outcome of one export pass.
#[derive(Debug)]
pub struct ExportReport {
    /// Path and row count of the CSV dump.
    pub csv: Result<(PathBuf, usize), ExportError>,
    /// One entry per quantity. Empty when there was nothing to plot.
    pub plots: Vec<(Quantity, Result<PathBuf, ExportError>)>,
}

impl ExportReport {
    pub fn is_ok(&self) -> bool {
        self.csv.is_ok() && self.plots.iter().all(|(_, result)| result.is_ok())
    }

    /// Errors of every exporter that failed.
    pub fn errors(&self) -> Vec<&ExportError> {
        self.csv
            .as_ref()
            .err()
            .into_iter()
            .chain(self.plots.iter().filter_map(|(_, r)| r.as_ref().err()))
            .collect()
    }
}

/// Write the CSV dump and the per-quantity plots for a finished run.
///
/// `expected_ticks` sizes the time axis the same way as the live chart.
/// Plots are skipped when no sample was recorded.
pub fn export_run(
    session: &RunSession,
    snapshot: &BufferSnapshot,
    expected_ticks: Option<u64>,
    at: DateTime<Local>,
) -> ExportReport {
    let csv_path = session.csv_path(at);
    let csv = csv_dump::write_csv(&csv_path, snapshot).map(|rows| (csv_path, rows));
    match &csv {
        Ok((path, rows)) => info!(path = %path.display(), rows, "CSV file created"),
        Err(e) => error!(error = %e, "unable to create CSV file"),
    }

    let mut plots = Vec::new();
    if snapshot.is_empty() {
        warn!("no samples recorded, skipping plots");
    } else {
        let window = snapshot.time_window(expected_ticks);
        for quantity in Quantity::ALL {
            let path = session.plot_path(quantity);
            let result = match snapshot.range(quantity) {
                Some(range) => plot::plot_quantity(&path, snapshot, quantity, window, range),
                None => Err(ExportError::Plot {
                    path: path.clone(),
                    message: format!("no display range for {}", quantity),
                }),
            };
            match &result {
                Ok(()) => info!(path = %path.display(), "plot created"),
                Err(e) => error!(error = %e, "unable to create plot"),
            }
            plots.push((quantity, result.map(|()| path)));
        }
    }

    ExportReport { csv, plots }
}

/// Export a stopped run, whatever ended its UI.
///
/// A UI failure is logged and reported alongside the export; it never
/// prevents the buffer from being written out.
pub fn finish_run(
    session: &RunSession,
    buffer: &SharedBuffer,
    expected_ticks: Option<u64>,
    ui_result: anyhow::Result<()>,
) -> (ExportReport, Option<anyhow::Error>) {
    let ui_error = ui_result.err();
    if let Some(e) = &ui_error {
        error!(error = %format!("{:#}", e), "run ended with an error, exporting anyway");
    }
    let report = export_run(session, &buffer.snapshot(), expected_ticks, Local::now());
    (report, ui_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::{Acquisition, AcquisitionConfig, CancelToken, StopReason};
    use crate::data::{Reading, Sample, SampleBuffer};
    use crate::source::FileSource;
    use std::io::Write;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::{tempdir, NamedTempFile};

    fn filled_snapshot(count: u64) -> BufferSnapshot {
        let mut buffer = SampleBuffer::new(300);
        for i in 0..count {
            buffer.append(Sample::new(
                i,
                Reading {
                    temperature: 24.0,
                    pressure: 99_800.0 + i as f64,
                    humidity: 41.0,
                },
            ));
        }
        buffer.snapshot()
    }

    #[test]
    fn exports_csv_and_three_plots() {
        let root = tempdir().unwrap();
        let session = RunSession::create(root.path(), "lab", None).unwrap();
        let snapshot = filled_snapshot(3);

        let report = export_run(&session, &snapshot, Some(3), Local::now());
        assert!(report.is_ok(), "{:?}", report.errors());

        let (csv_path, rows) = report.csv.as_ref().unwrap();
        assert_eq!(*rows, snapshot.len());
        let content = std::fs::read_to_string(csv_path).unwrap();
        assert_eq!(content.lines().count(), snapshot.len() + 1);

        assert_eq!(report.plots.len(), 3);
        for quantity in Quantity::ALL {
            assert!(session.plot_path(quantity).is_file());
        }
    }

    #[test]
    fn empty_run_writes_header_and_skips_plots() {
        let root = tempdir().unwrap();
        let session = RunSession::create(root.path(), "lab", None).unwrap();

        let report = export_run(&session, &filled_snapshot(0), None, Local::now());
        assert!(report.is_ok());
        assert!(report.plots.is_empty());
        assert_eq!(report.csv.unwrap().1, 0);
    }

    #[test]
    fn csv_failure_does_not_block_plots() {
        let root = tempdir().unwrap();
        let session = RunSession::create(root.path(), "lab", None).unwrap();
        let snapshot = filled_snapshot(2);
        let at = Local::now();
        // A directory squatting on the CSV path makes the CSV writer fail.
        std::fs::create_dir(session.csv_path(at)).unwrap();

        let report = export_run(&session, &snapshot, None, at);
        assert!(report.csv.is_err());
        assert_eq!(report.errors().len(), 1);
        assert!(report.plots.iter().all(|(_, r)| r.is_ok()));
    }

    #[test]
    fn ui_error_still_exports() {
        let root = tempdir().unwrap();
        let session = RunSession::create(root.path(), "lab", None).unwrap();
        let buffer = SharedBuffer::new(300);
        for sample in filled_snapshot(4).samples {
            buffer.append(sample);
        }

        let (report, ui_error) = finish_run(
            &session,
            &buffer,
            None,
            Err(anyhow::anyhow!("terminal went away")),
        );
        assert!(ui_error.is_some());
        assert!(report.is_ok(), "{:?}", report.errors());

        let (csv_path, rows) = report.csv.unwrap();
        assert_eq!(rows, 4);
        assert!(csv_path.is_file());
    }

    #[tokio::test(start_paused = true)]
    async fn limited_run_exports_every_retained_sample() {
        let mut page = NamedTempFile::new().unwrap();
        writeln!(page, "<b>23.5 deg</b> <b>1013.2 Pa</b> <b>45.0 rH</b>").unwrap();

        let root = tempdir().unwrap();
        let limit = Some(Duration::from_secs(12));
        let session = RunSession::create(root.path(), "lab", limit).unwrap();
        let config = AcquisitionConfig {
            duration_limit: limit,
            ..AcquisitionConfig::default()
        };
        let buffer = SharedBuffer::new(300);

        let handle = Acquisition::new(
            Arc::new(FileSource::new(page.path())),
            buffer.clone(),
            config,
            CancelToken::new(),
        )
        .start();
        assert_eq!(handle.join().await.unwrap(), StopReason::DurationElapsed);

        let snapshot = buffer.snapshot();
        assert!((2..=3).contains(&snapshot.len()), "got {} samples", snapshot.len());

        let (report, ui_error) = finish_run(&session, &buffer, config.expected_ticks(), Ok(()));
        assert!(ui_error.is_none());
        assert!(report.is_ok(), "{:?}", report.errors());

        let (csv_path, rows) = report.csv.unwrap();
        assert_eq!(rows, snapshot.len());
        let content = std::fs::read_to_string(csv_path).unwrap();
        assert_eq!(content.lines().count(), snapshot.len() + 1);
        assert!(content.starts_with("Time,Temperature,Pressure,Humidity\n0,23.5,1013.2,45"));
    }
}
