use crate::line::{Level, Pull, PulseLine};
use embedded_hal::delay::DelayNs;

/// The longest echo pulse worth waiting for, in microseconds. Corresponds to
/// roughly 4m of round-trip range.
pub const MAX_ECHO_MICROS: u32 = 25_000;

/// Sound covers one centimeter out and back in about 58us.
const MICROS_PER_CM: u32 = 58;

const TRIGGER_SETTLE_MICROS: u32 = 2;
const TRIGGER_PULSE_MICROS: u32 = 10;

#[derive(Debug, PartialEq)]
pub enum Error<TIoError> {
    /// Wrapped error from the HAL.
    Wrapped(TIoError),
    /// No echo pulse arrived within [`MAX_ECHO_MICROS`]. Either nothing is in
    /// range or the ranger is not connected.
    NoEcho,
}

impl<TIoError> From<TIoError> for Error<TIoError> {
    fn from(error: TIoError) -> Error<TIoError> {
        Error::Wrapped(error)
    }
}

/// Reads the distance to the nearest obstacle, in centimeters.
///
/// Fires a 10us trigger pulse on `trig` and measures the resulting echo
/// pulse on `echo`, blocking for up to [`MAX_ECHO_MICROS`]. The two lines
/// must not be shared with anything else for the duration of the call.
pub fn read_distance_cm<TTrig, TEcho, TIoError, TDelay>(
    trig: &mut TTrig,
    echo: &mut TEcho,
    delay: &mut TDelay,
) -> Result<u32, Error<TIoError>>
where
    TTrig: PulseLine<Error = TIoError>,
    TEcho: PulseLine<Error = TIoError>,
    TDelay: DelayNs,
{
    trig.set_pull(Pull::None)?;
    trig.write(Level::Low)?;
    delay.delay_us(TRIGGER_SETTLE_MICROS);
    trig.write(Level::High)?;
    delay.delay_us(TRIGGER_PULSE_MICROS);
    trig.write(Level::Low)?;

    let echo_micros = echo.measure_pulse(Level::High, MAX_ECHO_MICROS)?;
    if echo_micros == 0 {
        return Err(Error::NoEcho);
    }
    Ok(echo_micros / MICROS_PER_CM)
}
