//! Interactive prompts for the values not given on the command line.

use std::io::{self, BufRead, Write};
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;

use crate::data::duration::parse_duration;

const IPV4_PATTERN: &str =
    r"^((25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)$";

/// Whether `address` is a dotted-quad IPv4 address (leading zeros allowed).
pub fn is_valid_ipv4(address: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(IPV4_PATTERN).expect("IPv4 pattern is valid"))
        .is_match(address)
}

/// Parse a duration answer. Empty input or zero means "no limit".
pub fn parse_duration_limit(answer: &str) -> anyhow::Result<Option<Duration>> {
    let answer = answer.trim();
    if answer.is_empty() {
        return Ok(None);
    }
    let duration = parse_duration(answer)?;
    Ok((!duration.is_zero()).then_some(duration))
}

/// Line-based prompter over any reader/writer pair.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl Prompter<io::StdinLock<'static>, io::Stdout> {
    /// Prompter bound to the process's stdin/stdout.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, question: &str) -> io::Result<String> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
        }
        Ok(line.trim().to_string())
    }

    /// Ask until a valid IPv4 address is entered.
    pub fn address(&mut self) -> io::Result<String> {
        loop {
            let answer = self.ask("Enter the IP address: ")?;
            if is_valid_ipv4(&answer) {
                return Ok(answer);
            }
            writeln!(self.output, "Invalid IP address format. Please try again.")?;
        }
    }

    /// Ask until a non-empty zone name without path separators is entered.
    pub fn zone(&mut self) -> io::Result<String> {
        loop {
            let answer = self.ask("Enter the zone of the panel: ")?;
            if is_valid_zone(&answer) {
                return Ok(answer);
            }
            writeln!(self.output, "Invalid zone name. Please try again.")?;
        }
    }

    /// Ask for an optional duration limit in seconds.
    pub fn duration(&mut self) -> io::Result<Option<Duration>> {
        loop {
            let answer =
                self.ask("Enter the duration of the measurement in seconds (empty for no limit): ")?;
            match parse_duration_limit(&answer) {
                Ok(limit) => return Ok(limit),
                Err(e) => writeln!(self.output, "{}. Please try again.", e)?,
            }
        }
    }
}

/// Zone names end up in directory and file names.
pub fn is_valid_zone(zone: &str) -> bool {
    !zone.is_empty() && zone != "." && zone != ".." && !zone.contains(['/', '\\'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompter(input: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn test_ipv4_validation() {
        assert!(is_valid_ipv4("192.168.1.20"));
        assert!(is_valid_ipv4("010.0.0.1"));
        assert!(is_valid_ipv4("255.255.255.255"));
        assert!(!is_valid_ipv4("256.1.1.1"));
        assert!(!is_valid_ipv4("1.2.3"));
        assert!(!is_valid_ipv4("sensor.local"));
        assert!(!is_valid_ipv4("1.2.3.4 "));
    }

    #[test]
    fn test_address_reprompts() {
        let mut p = prompter("nope\n300.1.1.1\n10.0.0.5\n");
        assert_eq!(p.address().unwrap(), "10.0.0.5");
        let output = String::from_utf8(p.output).unwrap();
        assert_eq!(output.matches("Invalid IP address format").count(), 2);
    }

    #[test]
    fn test_address_eof() {
        let mut p = prompter("");
        let err = p.address().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_zone() {
        let mut p = prompter("\n../x\nnorth-wing\n");
        assert_eq!(p.zone().unwrap(), "north-wing");
    }

    #[test]
    fn test_duration_answers() {
        assert_eq!(prompter("120\n").duration().unwrap(), Some(Duration::from_secs(120)));
        assert_eq!(prompter("\n").duration().unwrap(), None);
        assert_eq!(prompter("0\n").duration().unwrap(), None);
        assert_eq!(prompter("abc\n30\n").duration().unwrap(), Some(Duration::from_secs(30)));
    }
}
