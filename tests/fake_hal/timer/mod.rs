use embedded_hal::delay::DelayNs;

/// A recording delay provider. Busy-waits complete instantly; the requested
/// durations are kept for assertions.
#[derive(Debug)]
pub struct Delay {
    pub waits_micros: Vec<u32>,
}

impl Delay {
    pub fn new() -> Delay {
        Delay {
            waits_micros: Vec::new(),
        }
    }
}

impl DelayNs for Delay {
    fn delay_ns(&mut self, ns: u32) {
        self.waits_micros.push(ns / 1_000);
    }
}
