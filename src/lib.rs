//! Newline-delimited JSON link for IMU samples
//!
//! The producer side renders each accelerometer/gyroscope/magnetometer/
//! temperature sample as one fixed-schema JSON line. The consumer side
//! frames a serial byte stream back into records, drops lines that are not
//! bracket-shaped, and reports packet arrival rates once per second.
//!
//! # Quick Start
//!
//! ## Producing records
//! ```
//! use imu_serial_stream::{serializer, ImuSample};
//!
//! let sample = ImuSample { acc_x: -12.5, acc_z: 998.0, temp: 23.75, ..Default::default() };
//!
//! // Fixed buffer, no allocation
//! let mut buf = [0u8; 192];
//! let len = serializer::write_into(&sample, &mut buf)?;
//! let wire = &buf[..=len]; // record + '\n'
//! assert!(wire.ends_with(b"\"temp\":23.7500}\n"));
//! # Ok::<(), imu_serial_stream::StreamError>(())
//! ```
//!
//! ## Monitoring a serial link
//! ```no_run
//! use imu_serial_stream::{MonitorOptions, MonitorSession, SerialConfig, SerialLink, SessionEvent};
//! use std::sync::atomic::AtomicBool;
//! use std::time::Instant;
//!
//! let mut link = SerialLink::open(&SerialConfig::default())?;
//! let mut session = MonitorSession::new(MonitorOptions::default(), Instant::now());
//! let running = AtomicBool::new(true);
//!
//! session.run(&mut link, &running, None, |event| match event {
//!     SessionEvent::Packet { index, record, echo: true } => {
//!         println!("Packet {}: {}", index, record.text());
//!     }
//!     SessionEvent::Report(report) => println!("{}", report),
//!     _ => {}
//! })?;
//! # Ok::<(), imu_serial_stream::StreamError>(())
//! ```
//!
//! ## Replaying a capture
//! ```
//! use imu_serial_stream::{MonitorOptions, MonitorSession, ReaderSource};
//! use std::io::Cursor;
//! use std::sync::atomic::AtomicBool;
//! use std::time::Instant;
//!
//! let capture = b"boot\r\n{\"accX\":1.0000}\r\n{garbage}\r\n{trunc";
//! let mut source = ReaderSource::new(Cursor::new(&capture[..]));
//! let mut session = MonitorSession::new(MonitorOptions::default(), Instant::now());
//!
//! let summary = session.run(&mut source, &AtomicBool::new(true), None, |_| {})?;
//! assert_eq!(summary.total_packets, 2);
//! assert_eq!(summary.malformed_lines, 1);
//! # Ok::<(), imu_serial_stream::StreamError>(())
//! ```

mod common;
pub mod error;
pub mod framing;
#[cfg(feature = "hdf5")]
mod hdf5_format;
pub mod rate;
pub mod sample;
pub mod serializer;
pub mod session;
pub mod synthetic;
pub mod transport;

// Re-export public API
pub use common::{agmt_line, format_padded, TimeKeeper};
pub use error::{Result, StreamError};
pub use framing::{Frame, FrameReader, MalformedReason, Record};
#[cfg(feature = "hdf5")]
pub use hdf5_format::{Hdf5Reader, Hdf5Writer, Metadata, TimestampedSample};
pub use rate::{RateMonitor, RateReport, REPORT_WINDOW};
pub use sample::{ImuSample, ImuSource};
pub use session::{MonitorOptions, MonitorSession, SessionEvent, SessionSummary};
pub use synthetic::{StreamControl, SyntheticImu};
pub use transport::{ByteSource, ReaderSource, SerialConfig, SerialLink};
