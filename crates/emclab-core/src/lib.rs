//! # EMC Lab Core
//!
//! Leaf primitives for bit-level electromagnetic-compatibility simulation of
//! vehicle bus protocols:
//!
//! - **Interference sources**: seeded noise emitters (random, periodic,
//!   burst) sampled at caller-supplied simulation timestamps
//! - **Framing**: protocol overhead bit tables and LSB-first payload
//!   expansion for CAN, CAN-FD, LIN and FlexRay
//! - **Statistics**: bit/frame corruption counters with guarded error rates
//!
//! The simulation environment built on these primitives (protocol
//! simulators, scenario orchestration, immunity sweeps) lives in the
//! `emclab-sim` crate.
//!
//! ## Signal Flow
//!
//! ```text
//! frame bytes → overhead + LSB-first bits → per-bit nominal voltage
//!                                               + Σ interference sources
//!                                               → comparator → counters
//! ```
//!
//! Everything here is deterministic given a seed: time is a logical `f64`
//! timestamp supplied by the caller, and every random draw comes from an
//! explicitly seeded generator.

pub mod error;
pub mod framing;
pub mod interference;
pub mod stats;

pub use error::{EmcError, EmcResult};
pub use framing::Protocol;
pub use interference::{InterferencePattern, InterferenceSource, InterferenceSpec};
pub use stats::{ErrorCounters, ErrorReport};
