//! Line-oriented renderer for runs without a terminal UI.
//!
//! Prints one line per new sample and one line per state change, so a
//! headless run can be followed from a pipe or a log collector.

use std::io::Write;

use anyhow::Result;

use super::{Renderable, RunStatus};
use crate::acquisition::AcquisitionState;
use crate::data::BufferSnapshot;

pub struct HeadlessRenderer<W: Write> {
    out: W,
    last_seen: u64,
    last_state: Option<AcquisitionState>,
}

impl<W: Write> HeadlessRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            last_seen: 0,
            last_state: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderable for HeadlessRenderer<W> {
    fn draw(&mut self, snapshot: &BufferSnapshot, status: &RunStatus) -> Result<()> {
        let state = status.loop_status.state;
        if self.last_state != Some(state) {
            match status.loop_status.stop_reason {
                Some(reason) if state == AcquisitionState::Stopped => {
                    writeln!(self.out, "[{}] {} ({})", status.zone, state.label(), reason.label())?
                }
                _ => writeln!(self.out, "[{}] {} | {}", status.zone, state.label(), status.source)?,
            }
            self.last_state = Some(state);
        }

        // Only samples appended since the previous draw that are still retained.
        let new = snapshot.total_appended.saturating_sub(self.last_seen) as usize;
        let skip = snapshot.len().saturating_sub(new);
        for sample in &snapshot.samples[skip..] {
            writeln!(
                self.out,
                "[{}] #{} Temp={:.2} deg, Pressure={:.2} Pa, Humidity={:.2} rH",
                status.zone, sample.time_index, sample.temperature, sample.pressure, sample.humidity
            )?;
        }
        self.last_seen = snapshot.total_appended;

        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::{LoopStatus, StopReason};
    use crate::data::{Reading, Sample, SampleBuffer};
    use std::time::Duration;

    fn status(state: AcquisitionState) -> RunStatus {
        RunStatus {
            zone: "lab".to_string(),
            source: "file: page.html".to_string(),
            loop_status: LoopStatus {
                state,
                stop_reason: (state == AcquisitionState::Stopped).then_some(StopReason::Cancelled),
                ..LoopStatus::default()
            },
            elapsed: Duration::ZERO,
            duration_limit: None,
            expected_ticks: None,
            show_help: false,
        }
    }

    fn push(buffer: &mut SampleBuffer, index: u64) {
        buffer.append(Sample::new(
            index,
            Reading {
                temperature: 23.5,
                pressure: 1013.2,
                humidity: 45.0,
            },
        ));
    }

    #[test]
    fn prints_each_sample_once() {
        let mut renderer = HeadlessRenderer::new(Vec::new());
        let mut buffer = SampleBuffer::new(300);

        push(&mut buffer, 0);
        renderer
            .draw(&buffer.snapshot(), &status(AcquisitionState::Running))
            .unwrap();
        renderer
            .draw(&buffer.snapshot(), &status(AcquisitionState::Running))
            .unwrap();
        push(&mut buffer, 1);
        renderer
            .draw(&buffer.snapshot(), &status(AcquisitionState::Stopped))
            .unwrap();

        let output = String::from_utf8(renderer.into_inner()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            lines,
            vec![
                "[lab] running | file: page.html",
                "[lab] #0 Temp=23.50 deg, Pressure=1013.20 Pa, Humidity=45.00 rH",
                "[lab] stopped (cancelled)",
                "[lab] #1 Temp=23.50 deg, Pressure=1013.20 Pa, Humidity=45.00 rH",
            ]
        );
    }

    #[test]
    fn evicted_samples_are_not_replayed() {
        let mut renderer = HeadlessRenderer::new(Vec::new());
        let mut buffer = SampleBuffer::new(2);
        for i in 0..5 {
            push(&mut buffer, i);
        }
        renderer
            .draw(&buffer.snapshot(), &status(AcquisitionState::Running))
            .unwrap();

        let output = String::from_utf8(renderer.into_inner()).unwrap();
        assert!(output.contains("#3 "));
        assert!(output.contains("#4 "));
        assert!(!output.contains("#2 "));
    }
}
