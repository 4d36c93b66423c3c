//! Sensor input seam

use sc_core::RawSample;

/// Opaque source of raw pose samples, polled once per control tick.
///
/// Implementations wrap real ranging/IMU hardware or a simulator; the
/// engine only sees the sample stream.
pub trait SensorSource: Send + 'static {
    /// Produce the next raw sample
    fn sample(&mut self) -> RawSample;
}

impl<F> SensorSource for F
where
    F: FnMut() -> RawSample + Send + 'static,
{
    fn sample(&mut self) -> RawSample {
        self()
    }
}
