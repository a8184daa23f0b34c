//! Static PNG plot of one quantity.

use std::path::Path;

use plotters::prelude::*;

use crate::data::{BufferSnapshot, Quantity, ValueRange};
use crate::error::ExportError;

/// Output image size in pixels.
pub const IMAGE_SIZE: (u32, u32) = (800, 600);

fn series_color(quantity: Quantity) -> RGBColor {
    match quantity {
        Quantity::Temperature => RED,
        Quantity::Pressure => BLUE,
        Quantity::Humidity => GREEN,
    }
}

fn plot_error(path: &Path, e: impl std::fmt::Display) -> ExportError {
    ExportError::Plot {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

/// Draw the full series of `quantity` and save it as a PNG.
pub fn plot_quantity(
    path: &Path,
    snapshot: &BufferSnapshot,
    quantity: Quantity,
    time_window: [f64; 2],
    range: ValueRange,
) -> Result<(), ExportError> {
    let color = series_color(quantity);

    let root = BitMapBackend::new(path, IMAGE_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(|e| plot_error(path, e))?;

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(time_window[0]..time_window[1], range.min..range.max)
        .map_err(|e| plot_error(path, e))?;

    chart
        .configure_mesh()
        .x_desc("Time")
        .y_desc(quantity.label())
        .draw()
        .map_err(|e| plot_error(path, e))?;

    chart
        .draw_series(LineSeries::new(snapshot.series(quantity), &color))
        .map_err(|e| plot_error(path, e))?
        .label(quantity.label())
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(|e| plot_error(path, e))?;

    root.present().map_err(|e| plot_error(path, e))?;
    Ok(())
}
