//! Packet arrival-rate accounting
//!
//! The monitor keeps a one-second window counter and an all-time counter.
//! Time is always passed in, so the same code runs against the wall clock in
//! the read loop and against a synthetic clock in tests.

use std::fmt;
use std::time::{Duration, Instant};

/// Window length for the instantaneous rate
pub const REPORT_WINDOW: Duration = Duration::from_secs(1);

/// Throughput figures emitted once per window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateReport {
    /// Packets per second over the window that just closed
    pub instantaneous_hz: f64,
    /// Packets per second since the monitor started
    pub average_hz: f64,
    /// Packets accepted since the monitor started
    pub total_packets: u64,
}

impl fmt::Display for RateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Current rate: {:.1} Hz | Average rate: {:.1} Hz | Total packets: {}",
            self.instantaneous_hz, self.average_hz, self.total_packets
        )
    }
}

/// Window and cumulative packet counters
#[derive(Debug, Clone)]
pub struct RateMonitor {
    packets_in_window: u64,
    window_start: Instant,
    total_packets: u64,
    program_start: Instant,
}

impl RateMonitor {
    /// Start monitoring at `start`
    pub fn new(start: Instant) -> Self {
        Self {
            packets_in_window: 0,
            window_start: start,
            total_packets: 0,
            program_start: start,
        }
    }

    /// Count one accepted packet
    pub fn record_packet(&mut self) {
        self.packets_in_window += 1;
        self.total_packets += 1;
    }

    /// Close the window if at least [`REPORT_WINDOW`] has passed since it opened
    ///
    /// Returns the report for the closed window and starts a new one at `now`.
    /// A `now` earlier than the window start is treated as no time passed.
    pub fn poll(&mut self, now: Instant) -> Option<RateReport> {
        let window_elapsed = now.saturating_duration_since(self.window_start);
        if window_elapsed < REPORT_WINDOW {
            return None;
        }

        let instantaneous_hz = self.packets_in_window as f64 / window_elapsed.as_secs_f64();
        let report = RateReport {
            instantaneous_hz,
            average_hz: self.average_rate(now),
            total_packets: self.total_packets,
        };

        self.packets_in_window = 0;
        self.window_start = now;
        Some(report)
    }

    /// All-time average at `now`, 0.0 before any time has passed
    pub fn average_rate(&self, now: Instant) -> f64 {
        let total_elapsed = now.saturating_duration_since(self.program_start).as_secs_f64();
        if total_elapsed > 0.0 {
            self.total_packets as f64 / total_elapsed
        } else {
            0.0
        }
    }

    /// Packets counted in the open window
    pub fn packets_in_window(&self) -> u64 {
        self.packets_in_window
    }

    /// Packets counted since start
    pub fn total_packets(&self) -> u64 {
        self.total_packets
    }

    /// Time the monitor started
    pub fn program_start(&self) -> Instant {
        self.program_start
    }
}
