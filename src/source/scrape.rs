//! Extraction of readings from the sensor's HTML page.

use std::sync::OnceLock;

use regex::Regex;

use crate::data::Reading;
use crate::error::ParseError;

/// A decimal value followed by one whitespace character and a unit marker.
const READING_PATTERN: &str = r"([0-9]+\.[0-9]+)\s(deg|Pa|rH)";

fn reading_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(READING_PATTERN).expect("reading pattern is valid"))
}

/// Extract a reading from the page body.
///
/// Matches are taken in order of appearance: the first is the temperature,
/// the second the pressure and the third the humidity. Extra matches are
/// ignored.
pub fn extract_reading(body: &str) -> Result<Reading, ParseError> {
    let values = reading_regex()
        .captures_iter(body)
        .take(3)
        .map(|caps| caps[1].parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| ParseError { found: 0 })?;

    match values[..] {
        [temperature, pressure, humidity] => Ok(Reading {
            temperature,
            pressure,
            humidity,
        }),
        _ => Err(ParseError {
            found: values.len(),
        }),
    }
}
