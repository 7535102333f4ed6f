//! Bus Protocol Framing
//!
//! Bit-level framing for the simulated bus protocols. A transmitted frame
//! is a protocol-specific overhead bit sequence (standing in for the
//! framing fields of the real wire format) followed by the payload bytes
//! expanded LSB first, one bit per `u8` (only bit 0 is meaningful, the
//! convention used throughout this workspace for unpacked bit streams).
//!
//! The overhead tables are deterministic literals resolved by an exhaustive
//! match over [`Protocol`], so an unframed protocol is an explicit empty
//! table rather than a lookup miss.
//!
//! ## Example
//!
//! ```rust
//! use emclab_core::framing::{frame_bits, payload_bits, Protocol};
//!
//! // 0x01 expands LSB first.
//! assert_eq!(payload_bits(&[0x01]), vec![1, 0, 0, 0, 0, 0, 0, 0]);
//!
//! // CAN prepends 60 overhead bits to the payload.
//! let bits = frame_bits(Protocol::Can, &[0x01]);
//! assert_eq!(bits.len(), 60 + 8);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// CAN frame overhead: start of frame, arbitration, control, CRC, ACK and
/// end of frame, as stand-in bit sequences.
const CAN_OVERHEAD: &[u8] = &[
    // start of frame
    0, //
    // arbitration (identifier + RTR)
    0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, //
    // control
    0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, //
    // CRC
    1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, //
    // ACK
    1, 1, //
    // end of frame
    1, 1, 1, 1, 1, 1, 1,
];

/// LIN frame overhead: sync break, sync field and protected identifier.
const LIN_OVERHEAD: &[u8] = &[
    // sync break (13 dominant bits)
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, //
    // sync field (0x55 on the wire)
    0, 1, 0, 1, 0, 1, 0, 1, //
    // protected identifier
    0, 1, 0, 1, 0, 1, 0, 1,
];

/// The simulated bus protocols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Protocol {
    /// Classic CAN.
    Can,
    /// CAN with flexible data rate.
    CanFd,
    /// Local Interconnect Network.
    Lin,
    /// FlexRay.
    FlexRay,
}

impl Protocol {
    /// All supported protocols, in catalog order.
    pub const ALL: [Protocol; 4] = [Protocol::Can, Protocol::CanFd, Protocol::Lin, Protocol::FlexRay];

    /// Framing overhead bits prepended to every payload.
    ///
    /// CAN-FD and FlexRay carry no modeled overhead and transmit payload
    /// bits only.
    pub fn overhead_bits(self) -> &'static [u8] {
        match self {
            Protocol::Can => CAN_OVERHEAD,
            Protocol::CanFd => &[],
            Protocol::Lin => LIN_OVERHEAD,
            Protocol::FlexRay => &[],
        }
    }

    /// Nominal bit rate in bits per second.
    pub fn default_bit_rate(self) -> f64 {
        match self {
            Protocol::Can => 500e3,
            Protocol::CanFd => 2e6,
            Protocol::Lin => 19.2e3,
            Protocol::FlexRay => 10e6,
        }
    }

    /// Nominal `(high, low)` signal voltages in volts.
    pub fn default_voltage_levels(self) -> (f64, f64) {
        match self {
            Protocol::Can => (2.5, 1.5),
            Protocol::CanFd => (2.5, 1.5),
            Protocol::Lin => (12.0, 0.0),
            Protocol::FlexRay => (2.5, 0.0),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Can => write!(f, "CAN"),
            Protocol::CanFd => write!(f, "CAN-FD"),
            Protocol::Lin => write!(f, "LIN"),
            Protocol::FlexRay => write!(f, "FlexRay"),
        }
    }
}

/// Expand payload bytes into bits, LSB first, one bit per output byte.
pub fn payload_bits(frame: &[u8]) -> Vec<u8> {
    let mut bits = Vec::with_capacity(frame.len() * 8);
    for &byte in frame {
        for i in 0..8 {
            bits.push((byte >> i) & 1);
        }
    }
    bits
}

/// Assemble the full on-wire bit sequence: overhead, then payload.
pub fn frame_bits(protocol: Protocol, frame: &[u8]) -> Vec<u8> {
    let overhead = protocol.overhead_bits();
    let mut bits = Vec::with_capacity(overhead.len() + frame.len() * 8);
    bits.extend_from_slice(overhead);
    bits.extend(payload_bits(frame));
    bits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overhead_lengths() {
        assert_eq!(Protocol::Can.overhead_bits().len(), 60);
        assert_eq!(Protocol::Lin.overhead_bits().len(), 29);
        assert_eq!(Protocol::CanFd.overhead_bits().len(), 0);
        assert_eq!(Protocol::FlexRay.overhead_bits().len(), 0);
    }

    #[test]
    fn test_overhead_is_binary() {
        for protocol in Protocol::ALL {
            for &bit in protocol.overhead_bits() {
                assert!(bit <= 1, "{protocol} overhead contains non-bit value {bit}");
            }
        }
    }

    #[test]
    fn test_payload_expansion_lsb_first() {
        assert_eq!(payload_bits(&[0x01]), vec![1, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(payload_bits(&[0x80]), vec![0, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(payload_bits(&[0xAA]), vec![0, 1, 0, 1, 0, 1, 0, 1]);
        assert_eq!(payload_bits(&[0xFF, 0x00]).len(), 16);
        assert_eq!(payload_bits(&[]), Vec::<u8>::new());
    }

    #[test]
    fn test_frame_bits_prepends_overhead() {
        let bits = frame_bits(Protocol::Lin, &[0x0F]);
        assert_eq!(bits.len(), 29 + 8);
        assert_eq!(&bits[..29], Protocol::Lin.overhead_bits());
        assert_eq!(&bits[29..], &[1, 1, 1, 1, 0, 0, 0, 0]);

        // Unframed protocols transmit payload only.
        let bits = frame_bits(Protocol::FlexRay, &[0x0F]);
        assert_eq!(bits, payload_bits(&[0x0F]));
    }

    #[test]
    fn test_display_names() {
        assert_eq!(Protocol::Can.to_string(), "CAN");
        assert_eq!(Protocol::CanFd.to_string(), "CAN-FD");
        assert_eq!(Protocol::Lin.to_string(), "LIN");
        assert_eq!(Protocol::FlexRay.to_string(), "FlexRay");
    }

    #[test]
    fn test_default_parameters() {
        assert_eq!(Protocol::Can.default_bit_rate(), 500e3);
        assert_eq!(Protocol::Lin.default_voltage_levels(), (12.0, 0.0));
        for protocol in Protocol::ALL {
            let (high, low) = protocol.default_voltage_levels();
            assert!(high > low, "{protocol} voltage pair must be ordered");
            assert!(protocol.default_bit_rate() > 0.0);
        }
    }
}
