use crate::line::{Level, Pull, PulseLine};
use core::time::Duration;
use embedded_hal::delay::DelayNs;

/// The minimum interval between read attempts.
///
/// The sensor needs over a second to recover between queries; reads issued
/// faster than this are delayed, not rejected.
pub const MIN_READ_INTERVAL: Duration = Duration::from_millis(1100);

/// How long the host holds the line low to wake the sensor. The sensor
/// ignores shorter pulses.
pub const WAKE_PULSE: Duration = Duration::from_millis(18);

/// How long the host keeps driving the line high after the wake pulse,
/// before releasing it to the sensor.
pub const RELEASE_HOLD_MICROS: u32 = 30;

/// Safety ceiling on every pulse measurement. The longest protocol pulse is
/// well under a millisecond, so this bound is only ever hit when the sensor
/// has stopped talking.
pub const PULSE_TIMEOUT_MICROS: u32 = 120_000;

/// A high pulse strictly longer than this decodes to a 1 bit.
///
/// Midpoint between the nominal "0" pulse (~26-28us) and "1" pulse (~70us);
/// not a protocol constant.
pub const BIT_ONE_THRESHOLD_MICROS: u32 = 45;

/// The reading returned by the sentinel-style accessors when a read fails.
pub const SENSOR_FAULT_READING: f32 = -999.0;

#[derive(Debug, PartialEq)]
pub enum Error<TIoError> {
    /// Wrapped error from the HAL.
    Wrapped(TIoError),
    /// The sensor never pulled the line low after the wake pulse.
    NoHandshakeLow,
    /// The sensor answered the wake pulse but never released the line high.
    NoHandshakeHigh,
    /// The sensor stopped transmitting partway through the 40 data bits.
    TruncatedBit,
    /// All 40 bits arrived but the checksum byte does not match the data.
    NoChecksumMatch,
}

impl<TIoError> From<TIoError> for Error<TIoError> {
    fn from(error: TIoError) -> Error<TIoError> {
        Error::Wrapped(error)
    }
}

/// One field of a [`RawFrame`], for the raw byte accessor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RawField {
    HumidityInt,
    HumidityFrac,
    TemperatureInt,
    TemperatureFrac,
    Checksum,
}

/// The five bytes of one validated sensor transmission.
///
/// Only produced by a complete, checksum-verified 40-bit capture. The
/// fractional bytes use the sensor's tenths encoding: one decimal digit
/// stored in a whole byte, always interpreted as base-10 tenths.
#[derive(Debug, PartialEq)]
pub struct RawFrame {
    pub humidity_int: u8,
    pub humidity_frac: u8,
    pub temperature_int: u8,
    pub temperature_frac: u8,
    pub checksum: u8,
}

impl RawFrame {
    fn from_bytes(bytes: [u8; 5]) -> RawFrame {
        RawFrame {
            humidity_int: bytes[0],
            humidity_frac: bytes[1],
            temperature_int: bytes[2],
            temperature_frac: bytes[3],
            checksum: bytes[4],
        }
    }

    fn checksum_matches(&self) -> bool {
        let sum = self.humidity_int as u16
            + self.humidity_frac as u16
            + self.temperature_int as u16
            + self.temperature_frac as u16;
        // The checksum byte is the low 8 bits of the data-byte sum.
        sum.to_be_bytes()[1] == self.checksum
    }

    /// Relative humidity in percent.
    pub fn humidity(&self) -> f32 {
        self.humidity_int as f32 + (self.humidity_frac as f32 * 0.1)
    }

    /// Temperature in degrees Celsius.
    pub fn temperature(&self) -> f32 {
        self.temperature_int as f32 + (self.temperature_frac as f32 * 0.1)
    }

    /// Returns one raw byte of the frame.
    pub fn byte(&self, field: RawField) -> u8 {
        match field {
            RawField::HumidityInt => self.humidity_int,
            RawField::HumidityFrac => self.humidity_frac,
            RawField::TemperatureInt => self.temperature_int,
            RawField::TemperatureFrac => self.temperature_frac,
            RawField::Checksum => self.checksum,
        }
    }
}

/// Driver for the DHT11 humidity/temperature sensor on a single shared line.
#[derive(Debug)]
pub struct Dht11<TLine, TDelay, TimeFn, ElapsedFn, TTime>
where
    TimeFn: Fn() -> TTime,
    ElapsedFn: Fn(TTime) -> Duration,
    TTime: Copy,
{
    line: TLine,
    delay: TDelay,
    last_attempt: Option<TTime>,
    time_fn: TimeFn,
    elapsed_since_fn: ElapsedFn,
}

impl<TLine, TError, TDelay, TimeFn, ElapsedFn, TTime>
    Dht11<TLine, TDelay, TimeFn, ElapsedFn, TTime>
where
    TLine: PulseLine<Error = TError>,
    TDelay: DelayNs,
    TimeFn: Fn() -> TTime,
    ElapsedFn: Fn(TTime) -> Duration,
    TTime: Copy,
{
    /// Constructs a DHT11 sensor that reads from the given line.
    ///
    /// The provided `time_fn` closure should provide some representation of a
    /// given instant that can be used with `elapsed_since_fn` to determine
    /// how much time has passed since then. It does not need to reflect real
    /// dates and times, but only needs to be capable of providing reasonably
    /// accurate durations (i.e. with millisecond precision or better). The
    /// `delay` is used for the microsecond busy-waits inside the protocol.
    pub fn new(
        line: TLine,
        delay: TDelay,
        time_fn: TimeFn,
        elapsed_since_fn: ElapsedFn,
    ) -> Dht11<TLine, TDelay, TimeFn, ElapsedFn, TTime> {
        Dht11 {
            line,
            delay,
            last_attempt: None,
            time_fn,
            elapsed_since_fn,
        }
    }

    /// Reads one frame from the sensor, enforcing the minimum read interval.
    ///
    /// This will asynchronously sleep using the provided `delay_fn` if `read`
    /// is called within [`MIN_READ_INTERVAL`] of the previous attempt. The
    /// provided function needs to be capable of millisecond precision or
    /// better.
    ///
    /// Due to the tight timing necessary to distinguish bits in the sensor's
    /// response, the capture itself (handshake plus 40 bits) performs
    /// blocking pulse measurements on the calling task. The line must not be
    /// driven or read by anything else for the duration of the call, and
    /// concurrent callers must be serialized externally.
    ///
    /// A failed read is not retried; call again after the minimum interval
    /// for a fresh attempt.
    pub async fn read<DelayFn, EmptyFuture>(
        &mut self,
        delay_fn: DelayFn,
    ) -> Result<RawFrame, Error<TError>>
    where
        DelayFn: Fn(Duration) -> EmptyFuture,
        EmptyFuture: core::future::Future<Output = ()>,
    {
        self.ensure_interval(&delay_fn).await;
        self.wake_sensor(&delay_fn).await?;
        let bytes = self.receive_frame()?;

        let frame = RawFrame::from_bytes(bytes);
        if !frame.checksum_matches() {
            return Err(Error::NoChecksumMatch);
        }
        Ok(frame)
    }

    /// Reads the temperature in degrees Celsius, or [`SENSOR_FAULT_READING`]
    /// if the read fails for any reason.
    ///
    /// This is the legacy block-style contract; use [`Dht11::read`] to
    /// distinguish fault kinds.
    pub async fn read_temperature_c<DelayFn, EmptyFuture>(&mut self, delay_fn: DelayFn) -> f32
    where
        DelayFn: Fn(Duration) -> EmptyFuture,
        EmptyFuture: core::future::Future<Output = ()>,
    {
        match self.read(delay_fn).await {
            Ok(frame) => frame.temperature(),
            Err(_) => SENSOR_FAULT_READING,
        }
    }

    /// Reads the relative humidity in percent, or [`SENSOR_FAULT_READING`]
    /// if the read fails for any reason.
    pub async fn read_humidity_percent<DelayFn, EmptyFuture>(&mut self, delay_fn: DelayFn) -> f32
    where
        DelayFn: Fn(Duration) -> EmptyFuture,
        EmptyFuture: core::future::Future<Output = ()>,
    {
        match self.read(delay_fn).await {
            Ok(frame) => frame.humidity(),
            Err(_) => SENSOR_FAULT_READING,
        }
    }

    /// Reads one raw byte of the frame, or -1 if the read fails for any
    /// reason.
    pub async fn read_raw<DelayFn, EmptyFuture>(
        &mut self,
        field: RawField,
        delay_fn: DelayFn,
    ) -> i16
    where
        DelayFn: Fn(Duration) -> EmptyFuture,
        EmptyFuture: core::future::Future<Output = ()>,
    {
        match self.read(delay_fn).await {
            Ok(frame) => frame.byte(field) as i16,
            Err(_) => -1,
        }
    }

    async fn ensure_interval<DelayFn, EmptyFuture>(&mut self, delay_fn: &DelayFn)
    where
        DelayFn: Fn(Duration) -> EmptyFuture,
        EmptyFuture: core::future::Future<Output = ()>,
    {
        if let Some(last) = self.last_attempt {
            let elapsed = (self.elapsed_since_fn)(last);
            if elapsed < MIN_READ_INTERVAL {
                delay_fn(MIN_READ_INTERVAL - elapsed).await;
            }
        }
        // Attempts count, not just successes: a failed read stresses the
        // sensor as much as a successful one.
        self.last_attempt = Some((self.time_fn)());
    }

    async fn wake_sensor<DelayFn, EmptyFuture>(
        &mut self,
        delay_fn: &DelayFn,
    ) -> Result<(), Error<TError>>
    where
        DelayFn: Fn(Duration) -> EmptyFuture,
        EmptyFuture: core::future::Future<Output = ()>,
    {
        // Bias the line high so it idles high once nothing drives it.
        self.line.set_pull(Pull::Up)?;
        self.line.write(Level::Low)?;
        delay_fn(WAKE_PULSE).await;

        // Release the wake pulse while still driving, so the rising edge is
        // clean, then hand the line to the sensor.
        self.line.write(Level::High)?;
        self.delay.delay_us(RELEASE_HOLD_MICROS);
        self.line.set_pull(Pull::Up)?;
        // Dummy read to force the direction change through.
        let _ = self.line.read()?;
        Ok(())
    }

    fn receive_frame(&mut self) -> Result<[u8; 5], Error<TError>> {
        // Sensor handshake: ~80us low, then ~80us high. Only a timeout is
        // treated as failure; the measured durations are not range-checked.
        if self.measure(Level::Low)? == 0 {
            return Err(Error::NoHandshakeLow);
        }
        if self.measure(Level::High)? == 0 {
            return Err(Error::NoHandshakeHigh);
        }

        // 40 bits, each framed as a ~50us low sync pulse followed by a high
        // pulse whose width encodes the bit. Bytes fill MSB-first in arrival
        // order. A missing pulse aborts the frame; no partial data survives.
        let mut bytes = [0u8; 5];
        for i in 0..40 {
            if self.measure(Level::Low)? == 0 {
                return Err(Error::TruncatedBit);
            }
            let width = self.measure(Level::High)?;
            if width == 0 {
                return Err(Error::TruncatedBit);
            }
            let bit = (width > BIT_ONE_THRESHOLD_MICROS) as u8;
            bytes[i / 8] = (bytes[i / 8] << 1) | bit;
        }
        Ok(bytes)
    }

    #[inline]
    fn measure(&mut self, level: Level) -> Result<u32, Error<TError>> {
        Ok(self.line.measure_pulse(level, PULSE_TIMEOUT_MICROS)?)
    }
}
