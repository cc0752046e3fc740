//! Fixed-schema JSON serializer for IMU samples
//!
//! Produces one single-line record per sample:
//!
//! ```text
//! {"accX":F,"accY":F,"accZ":F,"gyrX":F,"gyrY":F,"gyrZ":F,"magX":F,"magY":F,"magZ":F,"temp":F}
//! ```
//!
//! Every `F` is fixed-point with exactly four fractional digits. Key names,
//! order and precision are part of the wire contract.
//!
//! The buffer-based API never allocates, so a producer can format into a
//! fixed stack array:
//!
//! ```
//! use imu_serial_stream::{serializer, ImuSample};
//!
//! let sample = ImuSample { acc_z: 1000.0, temp: 24.5, ..Default::default() };
//! let mut buf = [0u8; 256];
//! let len = serializer::write_into(&sample, &mut buf)?;
//! assert_eq!(len + 1, serializer::required_size(&sample));
//! assert_eq!(buf[len], b'\n');
//! assert!(buf[..len].starts_with(b"{\"accX\":0.0000,"));
//! # Ok::<(), imu_serial_stream::StreamError>(())
//! ```

use crate::error::{Result, StreamError};
use crate::sample::ImuSample;
use std::fmt::{self, Write};

/// Byte written after the record; also the wire delimiter
pub const RECORD_TERMINATOR: u8 = b'\n';

/// Fractional digits for every field
pub const FIELD_PRECISION: usize = 4;

/// Display adapter rendering a sample as its wire record (no terminator)
pub struct JsonRecord<'a>(pub &'a ImuSample);

impl fmt::Display for JsonRecord<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.0;
        write!(
            f,
            "{{\"accX\":{:.p$},\"accY\":{:.p$},\"accZ\":{:.p$},\
             \"gyrX\":{:.p$},\"gyrY\":{:.p$},\"gyrZ\":{:.p$},\
             \"magX\":{:.p$},\"magY\":{:.p$},\"magZ\":{:.p$},\
             \"temp\":{:.p$}}}",
            s.acc_x, s.acc_y, s.acc_z,
            s.gyr_x, s.gyr_y, s.gyr_z,
            s.mag_x, s.mag_y, s.mag_z,
            s.temp,
            p = FIELD_PRECISION,
        )
    }
}

/// Counts formatted bytes without storing them
struct ByteCounter(usize);

impl Write for ByteCounter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0 += s.len();
        Ok(())
    }
}

/// Writes into a borrowed slice, failing instead of truncating
struct SliceWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl Write for SliceWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let end = self.pos.checked_add(s.len()).ok_or(fmt::Error)?;
        let dst = self.buf.get_mut(self.pos..end).ok_or(fmt::Error)?;
        dst.copy_from_slice(s.as_bytes());
        self.pos = end;
        Ok(())
    }
}

/// Bytes needed to hold the record plus its terminator
///
/// Measured with a dry-run format, nothing is written anywhere.
pub fn required_size(sample: &ImuSample) -> usize {
    let mut counter = ByteCounter(0);
    // ByteCounter never fails
    let _ = write!(counter, "{}", JsonRecord(sample));
    counter.0 + 1
}

/// Format a sample into `buffer`
///
/// On success returns the record length; `buffer[len]` holds
/// [`RECORD_TERMINATOR`], so `&buffer[..=len]` is ready to transmit.
///
/// # Errors
/// * `StreamError::BufferTooSmall` - the record plus terminator does not fit.
///   The buffer may be partially written and must not be sent.
pub fn write_into(sample: &ImuSample, buffer: &mut [u8]) -> Result<usize> {
    let capacity = buffer.len();
    let mut writer = SliceWriter { buf: buffer, pos: 0 };

    if write!(writer, "{}", JsonRecord(sample)).is_err() || writer.pos >= capacity {
        return Err(StreamError::BufferTooSmall {
            required: required_size(sample),
            capacity,
        });
    }

    let len = writer.pos;
    buffer[len] = RECORD_TERMINATOR;
    Ok(len)
}

/// Allocating convenience form, without terminator
pub fn to_json_line(sample: &ImuSample) -> String {
    JsonRecord(sample).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framing::is_accepted;
    use crate::sample::FIELD_NAMES;
    use approx::assert_abs_diff_eq;

    fn mixed_sample() -> ImuSample {
        ImuSample {
            acc_x: -1.5,
            acc_y: 0.0625,
            acc_z: 981.25,
            gyr_x: -0.001,
            gyr_y: 250.0,
            gyr_z: -0.75,
            mag_x: 30.5,
            mag_y: -12.0,
            mag_z: 0.0,
            temp: 24.5,
        }
    }

    #[test]
    fn test_exact_wire_layout() {
        let line = to_json_line(&mixed_sample());
        assert_eq!(
            line,
            "{\"accX\":-1.5000,\"accY\":0.0625,\"accZ\":981.2500,\
             \"gyrX\":-0.0010,\"gyrY\":250.0000,\"gyrZ\":-0.7500,\
             \"magX\":30.5000,\"magY\":-12.0000,\"magZ\":0.0000,\
             \"temp\":24.5000}"
        );
    }

    #[test]
    fn test_required_size_matches_output() {
        let sample = mixed_sample();
        let mut buf = vec![0u8; 512];
        let len = write_into(&sample, &mut buf).unwrap();
        assert_eq!(required_size(&sample), len + 1);
        assert_eq!(&buf[..len], to_json_line(&sample).as_bytes());
        assert_eq!(buf[len], RECORD_TERMINATOR);
    }

    #[test]
    fn test_exact_capacity_succeeds() {
        let sample = mixed_sample();
        let mut buf = vec![0u8; required_size(&sample)];
        assert!(write_into(&sample, &mut buf).is_ok());
    }

    #[test]
    fn test_every_short_capacity_fails() {
        let sample = mixed_sample();
        let required = required_size(&sample);

        for capacity in 0..required {
            let mut buf = vec![0u8; capacity];
            match write_into(&sample, &mut buf) {
                Err(StreamError::BufferTooSmall { required: r, capacity: c }) => {
                    assert_eq!(r, required);
                    assert_eq!(c, capacity);
                }
                other => panic!("capacity {} should fail, got {:?}", capacity, other),
            }
        }
    }

    #[test]
    fn test_no_scientific_notation() {
        let sample = ImuSample {
            acc_x: 1.0e-7,
            acc_y: -3.0e6,
            ..Default::default()
        };
        let line = to_json_line(&sample);
        assert!(!line.contains("e-") && !line.contains("e+"));
        assert!(line.starts_with("{\"accX\":0.0000,\"accY\":-3000000.0000,"));
    }

    #[test]
    fn test_round_trip_through_reference_parser() {
        let samples = [
            mixed_sample(),
            ImuSample::default(),
            ImuSample {
                acc_x: 0.05,
                acc_y: -0.0049,
                acc_z: 1999.9999,
                gyr_x: -245.1234,
                gyr_y: 0.3,
                gyr_z: 7.0001,
                mag_x: -4900.5,
                mag_y: 0.0001,
                mag_z: -0.0001,
                temp: -40.125,
            },
        ];

        let mut buf = [0u8; 256];
        for sample in &samples {
            let len = write_into(sample, &mut buf).unwrap();
            let record = &buf[..len];
            assert!(is_accepted(record));

            let value: serde_json::Value = serde_json::from_slice(record).unwrap();
            let object = value.as_object().unwrap();
            assert_eq!(object.len(), 10);

            for (name, original) in FIELD_NAMES.iter().zip(sample.values()) {
                let parsed = object[*name].as_f64().unwrap();
                assert_abs_diff_eq!(parsed, original as f64, epsilon = 5.1e-5);
            }
        }
    }

    #[test]
    fn test_key_order_is_fixed() {
        let line = to_json_line(&mixed_sample());
        let positions: Vec<usize> = FIELD_NAMES
            .iter()
            .map(|name| line.find(&format!("\"{}\":", name)).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }
}
