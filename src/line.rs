/// The logic level of a digital line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Level {
    Low,
    High,
}

/// Pull-resistor configuration for a digital line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Pull {
    None,
    Up,
    Down,
}

/// A single digital line with pulse-width measurement.
///
/// This is the capability the one-wire sensor protocols in this crate are
/// built on: the host and the sensor take turns driving the same line, and
/// data is encoded in how long the line holds a given level. `embedded-hal`
/// has no pulse-measurement trait, so implementations must be provided per
/// platform (micro:bit-style runtimes expose this directly as `pulseIn`).
///
/// The line's direction is implicit: [`PulseLine::write`] drives the line as
/// an output, while [`PulseLine::read`] and [`PulseLine::measure_pulse`]
/// release it to input mode first if necessary.
pub trait PulseLine {
    type Error;

    /// Configures the line's pull resistor.
    fn set_pull(&mut self, pull: Pull) -> Result<(), Self::Error>;

    /// Drives the line to the given level.
    fn write(&mut self, level: Level) -> Result<(), Self::Error>;

    /// Reads the line's current level.
    fn read(&mut self) -> Result<Level, Self::Error>;

    /// Measures how long, in microseconds, the line next holds `level`.
    ///
    /// Blocks until the pulse completes or `timeout_micros` elapses. A return
    /// value of 0 means the measurement timed out; any other value is the
    /// pulse duration.
    fn measure_pulse(&mut self, level: Level, timeout_micros: u32) -> Result<u32, Self::Error>;
}

impl<T: PulseLine + ?Sized> PulseLine for &mut T {
    type Error = T::Error;

    fn set_pull(&mut self, pull: Pull) -> Result<(), Self::Error> {
        T::set_pull(self, pull)
    }

    fn write(&mut self, level: Level) -> Result<(), Self::Error> {
        T::write(self, level)
    }

    fn read(&mut self) -> Result<Level, Self::Error> {
        T::read(self)
    }

    fn measure_pulse(&mut self, level: Level, timeout_micros: u32) -> Result<u32, Self::Error> {
        T::measure_pulse(self, level, timeout_micros)
    }
}
