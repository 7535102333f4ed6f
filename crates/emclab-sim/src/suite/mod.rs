//! EMI test campaign orchestration.
//!
//! A suite owns a fixed catalog of interference sources and protocol
//! simulators and drives them through three phases: clean baseline, named
//! interference scenarios, and an amplitude immunity sweep. Recorded
//! results are append-only and purely in-memory; derived summaries live in
//! [`report`].

pub mod config;
pub mod engine;
pub mod report;

pub use config::{
    default_interference_sources, default_protocols, default_scenarios, default_sweep,
    ScenarioSpec, SuiteConfig, SweepPlan, BASELINE_FRAMES, SCENARIO_FRAMES, SWEEP_FRAME,
};
pub use engine::{
    EmiTestSuite, ProtocolMeasurement, ScenarioRecord, SweepPoint, SweepResults, SweepSeries,
    TestResults, BASELINE_SCENARIO, IMMUNITY_BER_THRESHOLD,
};
pub use report::{ProtocolSummary, SuiteReport};
