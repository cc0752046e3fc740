//! Deterministic stand-in for the IMU, for exercising the link without hardware
//!
//! [`SyntheticImu`] produces smooth, repeatable readings in the same units as
//! the real sensor: gravity on Z in mg, slow rotations in °/s, an Earth-like
//! magnetic field in µT and a room-temperature die.

use crate::error::{Result, StreamError};
use crate::sample::{ImuSample, ImuSource};
use std::f32::consts::TAU;
use std::time::{Duration, Instant};

/// Control flow for streaming operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamControl {
    /// Continue streaming
    Continue,
    /// Stop streaming
    Break,
}

/// Synthetic sensor driven by sample time
#[derive(Debug, Clone)]
pub struct SyntheticImu {
    /// Seconds since the first sample
    t: f32,
}

impl SyntheticImu {
    pub fn new() -> Self {
        Self { t: 0.0 }
    }

    /// Readings at `t` seconds
    pub fn at(t: f32) -> Self {
        Self { t }
    }

    /// Stream samples at a fixed rate with a callback function
    ///
    /// Sample times advance by exactly `1 / rate_hz`, so the waveforms do
    /// not depend on scheduling jitter. Wall-clock pacing is best effort:
    /// if the callback runs late the next sample is produced immediately.
    ///
    /// # Arguments
    /// * `rate_hz` - Target sample rate in Hz (1-1000)
    /// * `callback` - Called for each sample. Return `StreamControl::Break`
    ///                to stop.
    ///
    /// # Returns
    /// * `Ok(u64)` - Number of samples produced before stopping
    /// * `Err(StreamError::InvalidParameter)` - Rate out of range
    ///
    /// # Example
    /// ```
    /// use imu_serial_stream::{StreamControl, SyntheticImu};
    ///
    /// let mut imu = SyntheticImu::new();
    /// let mut temps = Vec::new();
    /// imu.stream(1000, |sample| {
    ///     temps.push(sample.temp);
    ///     if temps.len() >= 5 { StreamControl::Break } else { StreamControl::Continue }
    /// })?;
    /// assert_eq!(temps.len(), 5);
    /// # Ok::<(), imu_serial_stream::StreamError>(())
    /// ```
    pub fn stream<F>(&mut self, rate_hz: u32, mut callback: F) -> Result<u64>
    where
        F: FnMut(ImuSample) -> StreamControl,
    {
        if rate_hz == 0 || rate_hz > 1000 {
            return Err(StreamError::InvalidParameter(format!(
                "Sample rate must be between 1-1000 Hz, got {}",
                rate_hz
            )));
        }

        let interval = Duration::from_micros(1_000_000 / rate_hz as u64);
        let mut sample_count = 0u64;
        let mut next_sample_time = Instant::now();

        loop {
            self.t = sample_count as f32 / rate_hz as f32;
            let sample = ImuSample::from_source(&*self);
            sample_count += 1;

            if callback(sample) == StreamControl::Break {
                break;
            }

            // Wait until next sample time
            next_sample_time += interval;
            let now = Instant::now();
            if next_sample_time > now {
                std::thread::sleep(next_sample_time - now);
            }
        }

        Ok(sample_count)
    }
}

impl Default for SyntheticImu {
    fn default() -> Self {
        Self::new()
    }
}

fn wave(amplitude: f32, freq_hz: f32, t: f32) -> f32 {
    amplitude * (TAU * freq_hz * t).sin()
}

impl ImuSource for SyntheticImu {
    fn acc_x(&self) -> f32 {
        wave(50.0, 0.5, self.t)
    }
    fn acc_y(&self) -> f32 {
        wave(-50.0, 0.25, self.t)
    }
    fn acc_z(&self) -> f32 {
        1000.0 + wave(5.0, 2.0, self.t)
    }
    fn gyr_x(&self) -> f32 {
        wave(12.5, 0.5, self.t)
    }
    fn gyr_y(&self) -> f32 {
        wave(-8.0, 0.2, self.t)
    }
    fn gyr_z(&self) -> f32 {
        0.15
    }
    fn mag_x(&self) -> f32 {
        22.0 + wave(3.0, 0.1, self.t)
    }
    fn mag_y(&self) -> f32 {
        -5.5 + wave(3.0, 0.05, self.t)
    }
    fn mag_z(&self) -> f32 {
        -42.0
    }
    fn temp(&self) -> f32 {
        24.0 + wave(0.5, 0.01, self.t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serializer;

    #[test]
    fn test_rate_out_of_range() {
        let mut imu = SyntheticImu::new();
        assert!(matches!(
            imu.stream(0, |_| StreamControl::Break),
            Err(StreamError::InvalidParameter(_))
        ));
        assert!(matches!(
            imu.stream(1001, |_| StreamControl::Break),
            Err(StreamError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_stream_is_deterministic() {
        let mut first = Vec::new();
        SyntheticImu::new()
            .stream(1000, |s| {
                first.push(s);
                if first.len() == 20 { StreamControl::Break } else { StreamControl::Continue }
            })
            .unwrap();

        for (i, sample) in first.iter().enumerate() {
            assert_eq!(*sample, ImuSample::from_source(&SyntheticImu::at(i as f32 / 1000.0)));
        }
    }

    #[test]
    fn test_stream_counts_samples() {
        let mut seen = 0;
        let count = SyntheticImu::new()
            .stream(1000, |_| {
                seen += 1;
                if seen == 3 { StreamControl::Break } else { StreamControl::Continue }
            })
            .unwrap();
        assert_eq!(count, 3);
    }

    #[test]
    fn test_readings_fit_default_buffer() {
        for step in 0..200 {
            let sample = ImuSample::from_source(&SyntheticImu::at(step as f32 * 0.37));
            assert!(serializer::required_size(&sample) <= 192);
        }
    }

    #[test]
    fn test_gravity_dominates_z() {
        let sample = ImuSample::from_source(&SyntheticImu::at(3.3));
        assert!(sample.acc_z > 990.0 && sample.acc_z < 1010.0);
    }
}
