//! Common utilities shared across programs

use crate::sample::ImuSource;
use std::time::Instant;

/// Decimal places used for console readings
pub const CONSOLE_PRECISION: usize = 4;

/// Minimum integer digits used for console readings
pub const CONSOLE_INTEGER_DIGITS: usize = 5;

/// Tracks elapsed time since creation
pub struct TimeKeeper {
    start: Instant,
}

impl TimeKeeper {
    /// Create a new TimeKeeper starting now
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get elapsed time in seconds
    pub fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

impl Default for TimeKeeper {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a value in a fixed-width column
///
/// The first character is `-` for negative values and a space otherwise,
/// so positive and negative readings line up. The integer part is
/// zero-padded to at least `min_int_digits` digits.
///
/// # Example
/// ```
/// use imu_serial_stream::format_padded;
///
/// assert_eq!(format_padded(12.3, 4, 5), " 00012.3000");
/// assert_eq!(format_padded(-0.5, 2, 3), "-000.50");
/// ```
pub fn format_padded(value: f32, decimals: usize, min_int_digits: usize) -> String {
    let sign = if value < 0.0 { '-' } else { ' ' };
    let magnitude = value.abs();
    let width = if decimals > 0 {
        min_int_digits + 1 + decimals
    } else {
        min_int_digits
    };
    format!("{}{:0width$.decimals$}", sign, magnitude, width = width, decimals = decimals)
}

/// One-line scaled reading in the sensor console layout
///
/// ```text
/// Scaled. Acc (mg) [ ... ], Gyr (DPS) [ ... ], Mag (uT) [ ... ], Tmp (C) [ ... ]
/// ```
pub fn agmt_line<S: ImuSource + ?Sized>(sensor: &S) -> String {
    let f = |v: f32| format_padded(v, CONSOLE_PRECISION, CONSOLE_INTEGER_DIGITS);
    format!(
        "Scaled. Acc (mg) [ {}, {}, {} ], Gyr (DPS) [ {}, {}, {} ], Mag (uT) [ {}, {}, {} ], Tmp (C) [ {} ]",
        f(sensor.acc_x()), f(sensor.acc_y()), f(sensor.acc_z()),
        f(sensor.gyr_x()), f(sensor.gyr_y()), f(sensor.gyr_z()),
        f(sensor.mag_x()), f(sensor.mag_y()), f(sensor.mag_z()),
        f(sensor.temp()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ImuSample;

    #[test]
    fn test_format_padded_positive() {
        assert_eq!(format_padded(12.3, 4, 5), " 00012.3000");
        assert_eq!(format_padded(0.5, 4, 5), " 00000.5000");
    }

    #[test]
    fn test_format_padded_negative() {
        assert_eq!(format_padded(-981.25, 4, 5), "-00981.2500");
    }

    #[test]
    fn test_format_padded_wide_value_not_truncated() {
        assert_eq!(format_padded(123456.0, 1, 3), " 123456.0");
    }

    #[test]
    fn test_format_padded_no_decimals() {
        assert_eq!(format_padded(7.0, 0, 3), " 007");
    }

    #[test]
    fn test_agmt_line_layout() {
        let sample = ImuSample {
            acc_z: 1000.0,
            gyr_x: -1.5,
            temp: 24.25,
            ..Default::default()
        };
        let line = agmt_line(&sample);
        assert!(line.starts_with("Scaled. Acc (mg) [  00000.0000,  00000.0000,  01000.0000 ]"));
        assert!(line.contains("Gyr (DPS) [ -00001.5000,"));
        assert!(line.ends_with("Tmp (C) [  00024.2500 ]"));
    }

    #[test]
    fn test_timekeeper() {
        let keeper = TimeKeeper::new();
        std::thread::sleep(std::time::Duration::from_millis(10));
        let elapsed = keeper.elapsed_secs();
        assert!(elapsed >= 0.01); // At least 10ms
        assert!(elapsed < 1.0);
    }
}
