//! Bus Protocol Simulator
//!
//! Models one bus protocol's electrical signalling under interference. A
//! transmitted bit is a nominal voltage level (high or low) with the summed
//! output of every associated interference source added on top; the
//! receiving comparator classifies the bit as corrupted when the received
//! voltage strays past the noise threshold in the direction that flips its
//! logic level:
//!
//! ```text
//! logical 1: corrupted  iff  received < voltage_high - threshold
//! logical 0: corrupted  iff  received > voltage_low  + threshold
//! ```
//!
//! with `threshold = 10%` of the high/low swing. The rule is asymmetric
//! around the two levels, matching the conventional bus idle/dominant
//! polarity.
//!
//! Interference sources are shared with the orchestrating test suite, which
//! reconfigures them between phases; the simulator only invokes their
//! sampling call. The whole engine is single-threaded with a caller-supplied
//! logical timestamp, so the shared handles are plain `Rc<RefCell<_>>`.

use std::cell::RefCell;
use std::rc::Rc;

use emclab_core::error::{EmcError, EmcResult};
use emclab_core::framing::{frame_bits, Protocol};
use emclab_core::interference::InterferenceSource;
use emclab_core::stats::{ErrorCounters, ErrorReport};
use serde::{Deserialize, Serialize};

/// Interference source handle shared between the suite and its simulators.
pub type SharedSource = Rc<RefCell<InterferenceSource>>;

/// Fraction of the high/low voltage swing tolerated before a received bit
/// is classified corrupted.
pub const NOISE_THRESHOLD_RATIO: f64 = 0.1;

/// Electrical and timing configuration of one protocol simulator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// Which bus protocol's framing and naming to use.
    pub protocol: Protocol,
    /// Signalling rate in bits per second.
    pub bit_rate: f64,
    /// Nominal voltage of a logical 1.
    pub voltage_high: f64,
    /// Nominal voltage of a logical 0.
    pub voltage_low: f64,
}

impl ProtocolConfig {
    /// Configuration from a protocol's documented nominal parameters.
    pub fn nominal(protocol: Protocol) -> Self {
        let (voltage_high, voltage_low) = protocol.default_voltage_levels();
        Self {
            protocol,
            bit_rate: protocol.default_bit_rate(),
            voltage_high,
            voltage_low,
        }
    }

    /// Classic CAN at 500 kbps, 2.5/1.5 V differential levels.
    pub fn can_500k() -> Self {
        Self::nominal(Protocol::Can)
    }

    /// CAN-FD at 2 Mbps data rate.
    pub fn can_fd_2m() -> Self {
        Self::nominal(Protocol::CanFd)
    }

    /// LIN at 19.2 kbps on a 12 V single-wire bus.
    pub fn lin_19k2() -> Self {
        Self::nominal(Protocol::Lin)
    }

    /// FlexRay at 10 Mbps.
    pub fn flexray_10m() -> Self {
        Self::nominal(Protocol::FlexRay)
    }

    /// Reject configurations that would make the timing model degenerate.
    pub fn validate(&self) -> EmcResult<()> {
        if self.bit_rate <= 0.0 {
            return Err(EmcError::NonPositiveBitRate(self.bit_rate));
        }
        Ok(())
    }
}

/// Outcome of a single bit transmission.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BitResult {
    /// Whether the bit survived uncorrupted.
    pub success: bool,
    /// Voltage seen at the receiver, nominal plus summed interference.
    pub received_voltage: f64,
}

/// Outcome of a frame transmission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameResult {
    /// True iff every constituent bit was uncorrupted.
    pub success: bool,
    /// Number of corrupted bits within the frame.
    pub corrupted_bits: usize,
    /// Total bits serialized for the frame, overhead included.
    pub bits_transmitted: usize,
}

/// One protocol's transmission model and its accumulated statistics.
#[derive(Debug)]
pub struct ProtocolSimulator {
    config: ProtocolConfig,
    /// Seconds per bit, `1 / bit_rate`.
    bit_duration: f64,
    /// Voltage margin before a received level counts as corrupted.
    noise_threshold: f64,
    sources: Vec<SharedSource>,
    counters: ErrorCounters,
    /// Nominal voltage of every transmitted bit, in order. Introspection
    /// only; cleared by [`reset_statistics`](Self::reset_statistics).
    signal_samples: Vec<f64>,
    /// Summed interference seen by every transmitted bit, in order.
    interference_samples: Vec<f64>,
}

impl ProtocolSimulator {
    /// Build a simulator from a validated configuration with no associated
    /// interference sources.
    pub fn new(config: ProtocolConfig) -> EmcResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            bit_duration: 1.0 / config.bit_rate,
            noise_threshold: NOISE_THRESHOLD_RATIO * (config.voltage_high - config.voltage_low).abs(),
            sources: Vec::new(),
            counters: ErrorCounters::new(),
            signal_samples: Vec::new(),
            interference_samples: Vec::new(),
        })
    }

    /// Replace the associated interference sources.
    ///
    /// Accumulated counters and sample buffers are untouched.
    pub fn set_interference_sources(&mut self, sources: Vec<SharedSource>) {
        self.sources = sources;
    }

    /// Transmit one bit at the given simulation timestamp.
    pub fn transmit_bit(&mut self, bit: bool, timestamp: f64) -> BitResult {
        let nominal = if bit {
            self.config.voltage_high
        } else {
            self.config.voltage_low
        };

        let interference: f64 = self
            .sources
            .iter()
            .map(|source| source.borrow_mut().generate_interference(timestamp))
            .sum();
        let received = nominal + interference;

        self.signal_samples.push(nominal);
        self.interference_samples.push(interference);

        let corrupted = if bit {
            received < self.config.voltage_high - self.noise_threshold
        } else {
            received > self.config.voltage_low + self.noise_threshold
        };
        self.counters.record_bit(corrupted);

        BitResult {
            success: !corrupted,
            received_voltage: received,
        }
    }

    /// Transmit a complete frame starting at `timestamp`.
    ///
    /// The payload is framed per the configured protocol and serialized one
    /// bit per bit duration, so bit `i` goes out at
    /// `timestamp + i * bit_duration`. The frame fails if any bit is
    /// corrupted; `frame_errors` is bumped at most once per call.
    pub fn transmit_frame(&mut self, frame: &[u8], timestamp: f64) -> EmcResult<FrameResult> {
        if frame.is_empty() {
            return Err(EmcError::EmptyFrame);
        }

        let bits = frame_bits(self.config.protocol, frame);
        let mut corrupted_bits = 0;
        for (i, &bit) in bits.iter().enumerate() {
            let bit_timestamp = timestamp + i as f64 * self.bit_duration;
            let result = self.transmit_bit(bit == 1, bit_timestamp);
            if !result.success {
                corrupted_bits += 1;
            }
        }

        let success = corrupted_bits == 0;
        self.counters.record_frame(!success);

        Ok(FrameResult {
            success,
            corrupted_bits,
            bits_transmitted: bits.len(),
        })
    }

    /// Snapshot the accumulated error statistics. Pure read.
    pub fn get_error_statistics(&self) -> ErrorReport {
        self.counters.report()
    }

    /// Zero all counters and clear both sample buffers.
    ///
    /// Associated interference sources are untouched; used between test
    /// phases to isolate measurements.
    pub fn reset_statistics(&mut self) {
        self.counters.reset();
        self.signal_samples.clear();
        self.interference_samples.clear();
    }

    /// The simulator's configuration.
    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    /// Display name of the simulated protocol.
    pub fn protocol_name(&self) -> String {
        self.config.protocol.to_string()
    }

    /// Seconds per transmitted bit.
    pub fn bit_duration(&self) -> f64 {
        self.bit_duration
    }

    /// Voltage margin before a received level counts as corrupted.
    pub fn noise_threshold(&self) -> f64 {
        self.noise_threshold
    }

    /// Nominal voltages of all bits transmitted since the last reset.
    pub fn signal_samples(&self) -> &[f64] {
        &self.signal_samples
    }

    /// Summed interference of all bits transmitted since the last reset.
    pub fn interference_samples(&self) -> &[f64] {
        &self.interference_samples
    }
}
