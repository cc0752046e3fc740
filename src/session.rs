//! Monitoring session: framing plus rate accounting over one byte source
//!
//! A [`MonitorSession`] owns all per-run state (the line buffer, the window
//! and the cumulative counters). It is built once per run and driven from a
//! single thread; the only blocking point is the transport read.

use crate::error::Result;
use crate::framing::{Frame, FrameReader, Record};
use crate::rate::{RateMonitor, RateReport};
use crate::transport::ByteSource;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// Bytes requested from the transport per read
const READ_CHUNK_SIZE: usize = 256;

/// Session options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorOptions {
    /// Number of leading packets flagged for echo to the operator
    pub echo_first: u64,
}

impl Default for MonitorOptions {
    fn default() -> Self {
        Self { echo_first: 3 }
    }
}

/// Something the operator may want to see
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// An accepted record; `index` counts from 1
    Packet {
        index: u64,
        record: Record,
        echo: bool,
    },
    /// A window closed
    Report(RateReport),
}

/// Totals at the end of (or during) a session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSummary {
    pub total_packets: u64,
    pub malformed_lines: u64,
    pub elapsed_secs: f64,
    pub average_hz: f64,
}

/// Frame reader and rate monitor for one monitoring run
#[derive(Debug)]
pub struct MonitorSession {
    reader: FrameReader,
    rate: RateMonitor,
    options: MonitorOptions,
}

impl MonitorSession {
    /// Start a session at `start`
    pub fn new(options: MonitorOptions, start: Instant) -> Self {
        Self {
            reader: FrameReader::new(),
            rate: RateMonitor::new(start),
            options,
        }
    }

    /// Feed bytes received at `now`
    ///
    /// Every completed line, accepted or not, is followed by a window check.
    /// Malformed lines are logged at trace level and otherwise ignored.
    pub fn ingest<F>(&mut self, bytes: &[u8], now: Instant, mut on_event: F)
    where
        F: FnMut(SessionEvent),
    {
        for &byte in bytes {
            let Some(frame) = self.reader.push(byte) else {
                continue;
            };

            match frame {
                Frame::Accepted(record) => {
                    self.rate.record_packet();
                    let index = self.rate.total_packets();
                    on_event(SessionEvent::Packet {
                        index,
                        record,
                        echo: index <= self.options.echo_first,
                    });
                }
                Frame::Malformed { reason, len } => {
                    log::trace!("Dropped {}-byte line: {}", len, reason);
                }
            }

            if let Some(report) = self.rate.poll(now) {
                on_event(SessionEvent::Report(report));
            }
        }
    }

    /// Window check with no new bytes
    pub fn tick<F>(&mut self, now: Instant, mut on_event: F)
    where
        F: FnMut(SessionEvent),
    {
        if let Some(report) = self.rate.poll(now) {
            on_event(SessionEvent::Report(report));
        }
    }

    /// Drain `source` until it ends, `running` is cleared or `end_time` passes
    ///
    /// Idle polls (no bytes within the transport timeout) still run the
    /// window check, so a silent link reports 0.0 Hz.
    ///
    /// # Errors
    /// Transport read errors are returned as-is; content never fails.
    pub fn run<S, F>(
        &mut self,
        source: &mut S,
        running: &AtomicBool,
        end_time: Option<Instant>,
        mut on_event: F,
    ) -> Result<SessionSummary>
    where
        S: ByteSource + ?Sized,
        F: FnMut(SessionEvent),
    {
        let mut buffer = [0u8; READ_CHUNK_SIZE];
        log::debug!("Monitoring session started");

        while running.load(Ordering::SeqCst) {
            if let Some(end) = end_time {
                if Instant::now() >= end {
                    log::debug!("Monitoring duration elapsed");
                    break;
                }
            }

            match source.read_chunk(&mut buffer)? {
                None => {
                    log::debug!("Byte source reached end of stream");
                    break;
                }
                Some(0) => self.tick(Instant::now(), &mut on_event),
                Some(n) => self.ingest(&buffer[..n], Instant::now(), &mut on_event),
            }
        }

        let summary = self.summary(Instant::now());
        log::debug!(
            "Monitoring session stopped: {} packets, {} malformed",
            summary.total_packets,
            summary.malformed_lines
        );
        Ok(summary)
    }

    /// Totals as of `now`
    pub fn summary(&self, now: Instant) -> SessionSummary {
        SessionSummary {
            total_packets: self.rate.total_packets(),
            malformed_lines: self.reader.malformed_count(),
            elapsed_secs: now
                .saturating_duration_since(self.rate.program_start())
                .as_secs_f64(),
            average_hz: self.rate.average_rate(now),
        }
    }

    /// Packets accepted so far
    pub fn total_packets(&self) -> u64 {
        self.rate.total_packets()
    }

    /// Lines dropped so far
    pub fn malformed_count(&self) -> u64 {
        self.reader.malformed_count()
    }
}
