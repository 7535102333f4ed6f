//! Bit and Frame Error Statistics
//!
//! Corruption counters accumulated by a protocol simulator during a run.
//! Unlike stream-comparison error testers, corruption here is decided at
//! the receiving comparator, one bit at a time, so the counters record
//! events rather than diffing transmitted and received payloads.
//!
//! Rates guard the zero-denominator case: with nothing sent, both the bit
//! and the frame error rate are a defined 0.0.

use serde::{Deserialize, Serialize};

/// Monotone corruption counters for one simulator run.
///
/// `bit_errors <= total_bits_sent` and `frame_errors <= total_frames_sent`
/// hold by construction: errors are only recorded together with the
/// matching total increment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ErrorCounters {
    bit_errors: u64,
    frame_errors: u64,
    total_bits_sent: u64,
    total_frames_sent: u64,
}

impl ErrorCounters {
    /// Fresh counters, all zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one transmitted bit.
    pub fn record_bit(&mut self, corrupted: bool) {
        self.total_bits_sent += 1;
        if corrupted {
            self.bit_errors += 1;
        }
    }

    /// Record one transmitted frame.
    pub fn record_frame(&mut self, failed: bool) {
        self.total_frames_sent += 1;
        if failed {
            self.frame_errors += 1;
        }
    }

    /// Bit error rate, 0.0 when no bits have been sent.
    pub fn ber(&self) -> f64 {
        if self.total_bits_sent == 0 {
            return 0.0;
        }
        self.bit_errors as f64 / self.total_bits_sent as f64
    }

    /// Frame error rate, 0.0 when no frames have been sent.
    pub fn fer(&self) -> f64 {
        if self.total_frames_sent == 0 {
            return 0.0;
        }
        self.frame_errors as f64 / self.total_frames_sent as f64
    }

    /// Corrupted bits so far.
    pub fn bit_errors(&self) -> u64 {
        self.bit_errors
    }

    /// Failed frames so far.
    pub fn frame_errors(&self) -> u64 {
        self.frame_errors
    }

    /// Bits transmitted so far.
    pub fn total_bits_sent(&self) -> u64 {
        self.total_bits_sent
    }

    /// Frames transmitted so far.
    pub fn total_frames_sent(&self) -> u64 {
        self.total_frames_sent
    }

    /// Zero all counters.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Snapshot the counters into a report.
    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            bit_error_rate: self.ber(),
            frame_error_rate: self.fer(),
            bit_errors: self.bit_errors,
            frame_errors: self.frame_errors,
            total_bits: self.total_bits_sent,
            total_frames: self.total_frames_sent,
        }
    }
}

/// Point-in-time error statistics snapshot, exported to downstream
/// reporting layers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub bit_error_rate: f64,
    pub frame_error_rate: f64,
    pub bit_errors: u64,
    pub frame_errors: u64,
    pub total_bits: u64,
    pub total_frames: u64,
}
