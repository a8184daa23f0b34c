//! Sample and quantity definitions.

use std::fmt;

/// Half-width of the pressure display window around the first reading.
pub const PRESSURE_SPAN: f64 = 50.0;

/// A single reading as extracted from the sensor page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub temperature: f64,
    pub pressure: f64,
    pub humidity: f64,
}

/// A reading stamped with its position in the run.
///
/// `time_index` counts successful fetches only, starting at 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub time_index: u64,
    pub temperature: f64,
    pub pressure: f64,
    pub humidity: f64,
}

impl Sample {
    pub fn new(time_index: u64, reading: Reading) -> Self {
        Self {
            time_index,
            temperature: reading.temperature,
            pressure: reading.pressure,
            humidity: reading.humidity,
        }
    }

    /// Returns the value of the given quantity.
    pub fn value(&self, quantity: Quantity) -> f64 {
        match quantity {
            Quantity::Temperature => self.temperature,
            Quantity::Pressure => self.pressure,
            Quantity::Humidity => self.humidity,
        }
    }
}

/// Inclusive y-axis range for one quantity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Pressure window centred on the first reading of a run.
    pub fn around_pressure(first: f64) -> Self {
        Self::new(first - PRESSURE_SPAN, first + PRESSURE_SPAN)
    }

    pub fn bounds(&self) -> [f64; 2] {
        [self.min, self.max]
    }
}

/// The three measured quantities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantity {
    Temperature,
    Pressure,
    Humidity,
}

impl Quantity {
    /// All quantities in display order (top to bottom).
    pub const ALL: [Quantity; 3] = [Quantity::Temperature, Quantity::Pressure, Quantity::Humidity];

    /// Returns the display label for this quantity.
    pub fn label(&self) -> &'static str {
        match self {
            Quantity::Temperature => "Temperature",
            Quantity::Pressure => "Pressure",
            Quantity::Humidity => "Humidity",
        }
    }

    /// Short name used in exported file names.
    pub fn file_stem(&self) -> &'static str {
        match self {
            Quantity::Temperature => "temp",
            Quantity::Pressure => "pressure",
            Quantity::Humidity => "humidity",
        }
    }

    /// Unit marker as it appears on the sensor page.
    pub fn unit(&self) -> &'static str {
        match self {
            Quantity::Temperature => "deg",
            Quantity::Pressure => "Pa",
            Quantity::Humidity => "rH",
        }
    }

    /// Fixed display range, if this quantity has one.
    ///
    /// Pressure has no fixed range; it is derived from the first sample.
    pub fn fixed_range(&self) -> Option<ValueRange> {
        match self {
            Quantity::Temperature => Some(ValueRange::new(20.0, 45.0)),
            Quantity::Pressure => None,
            Quantity::Humidity => Some(ValueRange::new(10.0, 70.0)),
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
