use neokit_sensors::line::{Level, Pull, PulseLine};
use std::collections::VecDeque;

#[derive(Debug, PartialEq)]
pub enum Error {}

/// A scripted pulse line.
///
/// Pulse measurements are served in order from a queue of durations; an
/// exhausted queue behaves like a silent line (every measurement times out
/// and returns 0). Writes, pull changes, and measured levels are recorded so
/// tests can assert on the driver's side of the transaction.
#[derive(Debug)]
pub struct Line {
    pulses: VecDeque<u32>,
    pub writes: Vec<Level>,
    pub pulls: Vec<Pull>,
    pub measured_levels: Vec<Level>,
}

impl Line {
    pub fn new() -> Line {
        Line {
            pulses: VecDeque::new(),
            writes: Vec::new(),
            pulls: Vec::new(),
            measured_levels: Vec::new(),
        }
    }

    /// Appends pulse durations to the measurement script.
    pub fn push_pulses(&mut self, pulses: &[u32]) {
        self.pulses.extend(pulses.iter().copied());
    }
}

impl PulseLine for Line {
    type Error = Error;

    fn set_pull(&mut self, pull: Pull) -> Result<(), Self::Error> {
        self.pulls.push(pull);
        Ok(())
    }

    fn write(&mut self, level: Level) -> Result<(), Self::Error> {
        self.writes.push(level);
        Ok(())
    }

    fn read(&mut self) -> Result<Level, Self::Error> {
        Ok(Level::High)
    }

    fn measure_pulse(&mut self, level: Level, _timeout_micros: u32) -> Result<u32, Self::Error> {
        self.measured_levels.push(level);
        Ok(self.pulses.pop_front().unwrap_or(0))
    }
}
