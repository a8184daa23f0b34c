//! Stacked per-quantity charts.
//!
//! All three charts share the same time window; each has its own y-range
//! (fixed for temperature and humidity, derived from the first sample for
//! pressure).

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Style,
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use super::{RunStatus, Theme};
use crate::data::{BufferSnapshot, Quantity};

/// Render the three charts stacked vertically.
pub fn render(
    frame: &mut Frame,
    snapshot: &BufferSnapshot,
    status: &RunStatus,
    theme: &Theme,
    area: Rect,
) {
    let rows = Layout::vertical([
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
    ])
    .split(area);

    let x_bounds = snapshot.time_window(status.expected_ticks);
    for (index, quantity) in Quantity::ALL.into_iter().enumerate() {
        let is_bottom = index == Quantity::ALL.len() - 1;
        render_quantity(frame, snapshot, quantity, x_bounds, is_bottom, theme, rows[index]);
    }
}

/// Decimal places used for axis labels and the latest value.
fn precision(quantity: Quantity) -> usize {
    match quantity {
        Quantity::Pressure => 0,
        Quantity::Temperature | Quantity::Humidity => 1,
    }
}

fn axis_labels(bounds: [f64; 2], precision: usize) -> Vec<String> {
    let mid = (bounds[0] + bounds[1]) / 2.0;
    [bounds[0], mid, bounds[1]]
        .iter()
        .map(|v| format!("{:.*}", precision, v))
        .collect()
}

fn render_quantity(
    frame: &mut Frame,
    snapshot: &BufferSnapshot,
    quantity: Quantity,
    x_bounds: [f64; 2],
    is_bottom: bool,
    theme: &Theme,
    area: Rect,
) {
    let color = theme.quantity_color(quantity);
    let precision = precision(quantity);

    let latest = snapshot
        .latest()
        .map(|s| format!("{:.*} {} ", precision, s.value(quantity), quantity.unit()))
        .unwrap_or_else(|| "- ".to_string());
    let title = Line::from(vec![
        Span::styled(format!(" {} ", quantity.label()), theme.header),
        Span::styled(latest, Style::default().fg(color)),
    ]);

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(Style::default().fg(theme.border));

    // Pressure has no range until the first sample arrives.
    let Some(range) = snapshot.range(quantity) else {
        let waiting = Paragraph::new(" Waiting for the first reading...")
            .style(Style::default().fg(theme.border))
            .block(block);
        frame.render_widget(waiting, area);
        return;
    };

    let points = snapshot.series(quantity);
    let dataset = Dataset::default()
        .name(quantity.label())
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(&points);

    let mut x_axis = Axis::default()
        .style(Style::default().fg(theme.border))
        .bounds(x_bounds)
        .labels(axis_labels(x_bounds, 0));
    if is_bottom {
        x_axis = x_axis.title("Time");
    }

    let y_axis = Axis::default()
        .style(Style::default().fg(theme.border))
        .bounds(range.bounds())
        .labels(axis_labels(range.bounds(), precision));

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(x_axis)
        .y_axis(y_axis)
        .hidden_legend_constraints((Constraint::Ratio(0, 1), Constraint::Ratio(0, 1)));

    frame.render_widget(chart, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_span_bounds() {
        assert_eq!(axis_labels([0.0, 12.0], 0), vec!["0", "6", "12"]);
        assert_eq!(axis_labels([20.0, 45.0], 1), vec!["20.0", "32.5", "45.0"]);
    }
}
