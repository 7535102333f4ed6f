//! # EMC Lab Simulator
//!
//! Bit-level simulation of electromagnetic interference coupling onto
//! vehicle bus protocols, built on the primitives in `emclab-core`.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                      EmiTestSuite                       │
//! │                                                         │
//! │  sources ──────────┬──────────────┬──────────────┐      │
//! │  (shared)          ▼              ▼              ▼      │
//! │            ┌─────────────┐ ┌─────────────┐ ┌─────────┐  │
//! │            │ CAN 500k    │ │ LIN 19.2k   │ │   ...   │  │
//! │            │ simulator   │ │ simulator   │ │         │  │
//! │            └──────┬──────┘ └──────┬──────┘ └────┬────┘  │
//! │                   ▼               ▼             ▼       │
//! │              error counters, sample buffers             │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! The suite activates and reconfigures the shared sources between phases;
//! simulators only sample them during transmission. The whole engine is
//! single-threaded and deterministic: time is a logical timestamp advanced
//! by exactly one bit duration per bit, and all randomness flows from the
//! suite seed.
//!
//! ## Example
//!
//! ```rust
//! use emclab_sim::suite::{default_scenarios, default_sweep, EmiTestSuite, SuiteConfig, SuiteReport};
//!
//! let mut suite = EmiTestSuite::new(SuiteConfig::default()).unwrap();
//! suite.run_baseline().unwrap();
//! suite.run_scenarios(&default_scenarios()).unwrap();
//! suite.run_immunity_sweep(&default_sweep()).unwrap();
//!
//! let report = SuiteReport::derive(&suite);
//! assert_eq!(report.ranking.len(), 4);
//! ```

pub mod protocol;
pub mod suite;

pub use protocol::{
    BitResult, FrameResult, ProtocolConfig, ProtocolSimulator, SharedSource,
    NOISE_THRESHOLD_RATIO,
};
pub use suite::{EmiTestSuite, ScenarioSpec, SuiteConfig, SuiteReport, SweepPlan};
