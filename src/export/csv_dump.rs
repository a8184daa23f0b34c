//! CSV dump of the sample window.

use std::path::Path;

use crate::data::BufferSnapshot;
use crate::error::ExportError;

/// Header row of the dump.
pub const HEADER: [&str; 4] = ["Time", "Temperature", "Pressure", "Humidity"];

/// Write the header and one row per sample, in insertion order.
///
/// Returns the number of data rows written.
pub fn write_csv(path: &Path, snapshot: &BufferSnapshot) -> Result<usize, ExportError> {
    let csv_err = |source| ExportError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    writer.write_record(HEADER).map_err(csv_err)?;

    for sample in &snapshot.samples {
        writer
            .write_record([
                sample.time_index.to_string(),
                sample.temperature.to_string(),
                sample.pressure.to_string(),
                sample.humidity.to_string(),
            ])
            .map_err(csv_err)?;
    }

    writer.flush().map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(snapshot.samples.len())
}
