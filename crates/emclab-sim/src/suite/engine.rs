//! EMI test suite: phase orchestration over shared sources and simulators.
//!
//! The suite owns the interference sources and the protocol simulators,
//! built once from their catalogs and reused across all phases:
//!
//! 1. **Baseline**: all sources inactive, representative frames, error
//!    rates recorded under `"baseline"`.
//! 2. **Scenarios**: each named scenario activates exactly its source
//!    subset (everything else deactivated), transmits the expanded frame
//!    catalog, and records under the scenario name.
//! 3. **Immunity sweep**: one designated source walks an ascending
//!    amplitude ladder; each protocol's error rates per level form its
//!    sweep history, scanned afterwards for the immunity threshold.
//!
//! Time is a purely logical `f64` timestamp the suite advances by exactly
//! the serialized frame duration per transmission. There is no wall clock
//! and no sleeping anywhere in the engine.

use std::cell::RefCell;
use std::rc::Rc;

use emclab_core::error::{EmcError, EmcResult};
use emclab_core::interference::InterferenceSource;
use emclab_core::stats::ErrorReport;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::config::{
    default_interference_sources, default_protocols, ScenarioSpec, SuiteConfig, SweepPlan,
    BASELINE_FRAMES, SCENARIO_FRAMES, SWEEP_FRAME,
};
use crate::protocol::{ProtocolConfig, ProtocolSimulator, SharedSource};

/// Result key used by the baseline phase.
pub const BASELINE_SCENARIO: &str = "baseline";

/// A protocol is considered susceptible at the first sweep level whose bit
/// error rate exceeds this.
pub const IMMUNITY_BER_THRESHOLD: f64 = 1e-6;

/// Error statistics of one protocol under one scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolMeasurement {
    pub protocol: String,
    pub report: ErrorReport,
}

/// All protocol measurements recorded under one scenario key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRecord {
    pub scenario: String,
    pub measurements: Vec<ProtocolMeasurement>,
}

impl ScenarioRecord {
    /// Measurement for a protocol by display name.
    pub fn measurement(&self, protocol: &str) -> Option<&ErrorReport> {
        self.measurements
            .iter()
            .find(|m| m.protocol == protocol)
            .map(|m| &m.report)
    }
}

/// Append-only scenario results, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestResults {
    scenarios: Vec<ScenarioRecord>,
}

impl TestResults {
    /// All recorded scenarios in execution order.
    pub fn scenarios(&self) -> &[ScenarioRecord] {
        &self.scenarios
    }

    /// Record for one scenario key.
    pub fn get(&self, scenario: &str) -> Option<&ScenarioRecord> {
        self.scenarios.iter().find(|r| r.scenario == scenario)
    }

    /// Error report for one scenario/protocol pair.
    pub fn report_for(&self, scenario: &str, protocol: &str) -> Option<&ErrorReport> {
        self.get(scenario)?.measurement(protocol)
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    fn insert(&mut self, scenario: &str, protocol: String, report: ErrorReport) {
        let idx = self
            .scenarios
            .iter()
            .position(|r| r.scenario == scenario)
            .unwrap_or_else(|| {
                self.scenarios.push(ScenarioRecord {
                    scenario: scenario.to_string(),
                    measurements: Vec::new(),
                });
                self.scenarios.len() - 1
            });
        self.scenarios[idx].measurements.push(ProtocolMeasurement { protocol, report });
    }
}

/// One immunity sweep measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    /// Interference amplitude in volts.
    pub level: f64,
    pub bit_error_rate: f64,
    pub frame_error_rate: f64,
}

/// Immunity sweep history of one protocol, in ascending level order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepSeries {
    pub protocol: String,
    pub points: Vec<SweepPoint>,
}

/// Sweep histories for all protocols, in catalog order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SweepResults {
    series: Vec<SweepSeries>,
}

impl SweepResults {
    /// All sweep series in protocol catalog order.
    pub fn series(&self) -> &[SweepSeries] {
        &self.series
    }

    /// Sweep history for one protocol by display name.
    pub fn for_protocol(&self, protocol: &str) -> Option<&SweepSeries> {
        self.series.iter().find(|s| s.protocol == protocol)
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    fn push(&mut self, protocol: &str, point: SweepPoint) {
        match self.series.iter_mut().find(|s| s.protocol == protocol) {
            Some(series) => series.points.push(point),
            None => self.series.push(SweepSeries {
                protocol: protocol.to_string(),
                points: vec![point],
            }),
        }
    }
}

/// Orchestrates baseline, scenario and immunity-sweep phases over a fixed
/// catalog of interference sources and protocol simulators.
pub struct EmiTestSuite {
    config: SuiteConfig,
    sources: Vec<SharedSource>,
    protocols: Vec<ProtocolSimulator>,
    results: TestResults,
    sweep: SweepResults,
    /// Logical simulation clock in seconds, advanced per transmitted frame.
    sim_time: f64,
}

impl EmiTestSuite {
    /// Build a suite with the stock automotive catalogs. All sources start
    /// inactive.
    pub fn new(config: SuiteConfig) -> EmcResult<Self> {
        Self::with_catalogs(config, default_interference_sources(), default_protocols())
    }

    /// Build a suite from explicit catalogs.
    ///
    /// Every simulator shares the full source list; each source gets its
    /// own RNG seed derived from the suite seed and its catalog position.
    pub fn with_catalogs(
        config: SuiteConfig,
        source_specs: Vec<emclab_core::interference::InterferenceSpec>,
        protocol_configs: Vec<ProtocolConfig>,
    ) -> EmcResult<Self> {
        let sources = source_specs
            .into_iter()
            .enumerate()
            .map(|(i, spec)| {
                InterferenceSource::new(spec, config.seed.wrapping_add(i as u64))
                    .map(|source| Rc::new(RefCell::new(source)))
            })
            .collect::<EmcResult<Vec<SharedSource>>>()?;

        let mut protocols = protocol_configs
            .into_iter()
            .map(ProtocolSimulator::new)
            .collect::<EmcResult<Vec<_>>>()?;
        for simulator in &mut protocols {
            simulator.set_interference_sources(sources.clone());
        }

        Ok(Self {
            config,
            sources,
            protocols,
            results: TestResults::default(),
            sweep: SweepResults::default(),
            sim_time: 0.0,
        })
    }

    /// Measure every protocol with all sources left as-is and record the
    /// results under `"baseline"`. Sources start inactive after
    /// construction, so a fresh suite measures the clean channel.
    pub fn run_baseline(&mut self) -> EmcResult<()> {
        info!(frames = BASELINE_FRAMES.len(), "running baseline phase");
        self.measure_all(BASELINE_SCENARIO, &BASELINE_FRAMES)
    }

    /// Run a catalog of named interference scenarios.
    ///
    /// Each scenario activates exactly its named sources and deactivates
    /// every other one, so no scenario inherits activation state from its
    /// predecessor. Unknown source names fail fast before any activation
    /// changes. All sources are deactivated after the last scenario.
    pub fn run_scenarios(&mut self, scenarios: &[ScenarioSpec]) -> EmcResult<()> {
        for scenario in scenarios {
            for name in &scenario.sources {
                self.find_source(name)?;
            }
        }

        for scenario in scenarios {
            info!(
                scenario = %scenario.name,
                sources = ?scenario.sources,
                "running interference scenario"
            );
            self.apply_scenario_sources(&scenario.sources);
            self.measure_all(&scenario.name, &SCENARIO_FRAMES)?;
        }

        self.deactivate_all();
        Ok(())
    }

    /// Escalate one source through an ascending amplitude ladder,
    /// transmitting one alternating-bit frame per protocol per level and
    /// appending the resulting rates to each protocol's sweep history.
    ///
    /// The walk always covers the full ladder; threshold detection is the
    /// post-hoc scan in [`immunity_threshold`](Self::immunity_threshold).
    pub fn run_immunity_sweep(&mut self, plan: &SweepPlan) -> EmcResult<()> {
        plan.validate()?;
        let source = self.find_source(&plan.source)?;
        info!(source = %plan.source, levels = plan.levels.len(), "running immunity sweep");

        for &level in &plan.levels {
            {
                let mut source = source.borrow_mut();
                source.set_amplitude_level(level);
                source.activate();
            }
            debug!(level, "testing interference level");

            for idx in 0..self.protocols.len() {
                let simulator = &mut self.protocols[idx];
                simulator.reset_statistics();
                let outcome = simulator.transmit_frame(&SWEEP_FRAME, self.sim_time)?;
                self.sim_time += outcome.bits_transmitted as f64 * simulator.bit_duration();

                let report = simulator.get_error_statistics();
                let protocol = simulator.protocol_name();
                self.sweep.push(
                    &protocol,
                    SweepPoint {
                        level,
                        bit_error_rate: report.bit_error_rate,
                        frame_error_rate: report.frame_error_rate,
                    },
                );
            }
        }

        source.borrow_mut().deactivate();
        Ok(())
    }

    /// First ascending sweep level whose bit error rate exceeds
    /// [`IMMUNITY_BER_THRESHOLD`], or `None` when the protocol rode out the
    /// whole ladder (more robust than the maximum tested level).
    pub fn immunity_threshold(&self, protocol: &str) -> Option<f64> {
        self.sweep
            .for_protocol(protocol)?
            .points
            .iter()
            .find(|point| point.bit_error_rate > IMMUNITY_BER_THRESHOLD)
            .map(|point| point.level)
    }

    /// All scenario results recorded so far.
    pub fn results(&self) -> &TestResults {
        &self.results
    }

    /// All immunity sweep histories recorded so far.
    pub fn sweep_results(&self) -> &SweepResults {
        &self.sweep
    }

    /// The shared interference sources, in catalog order.
    pub fn sources(&self) -> &[SharedSource] {
        &self.sources
    }

    /// The protocol simulators, in catalog order.
    pub fn protocols(&self) -> &[ProtocolSimulator] {
        &self.protocols
    }

    /// The suite configuration.
    pub fn config(&self) -> &SuiteConfig {
        &self.config
    }

    /// Current logical simulation time in seconds.
    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    /// Reset statistics on every simulator and transmit `frames` through
    /// each, recording the per-protocol reports under `scenario`.
    fn measure_all(&mut self, scenario: &str, frames: &[[u8; 8]]) -> EmcResult<()> {
        for idx in 0..self.protocols.len() {
            let simulator = &mut self.protocols[idx];
            simulator.reset_statistics();
            for frame in frames {
                let outcome = simulator.transmit_frame(frame, self.sim_time)?;
                self.sim_time += outcome.bits_transmitted as f64 * simulator.bit_duration();
            }

            let report = simulator.get_error_statistics();
            let protocol = simulator.protocol_name();
            debug!(
                scenario,
                protocol = %protocol,
                ber = report.bit_error_rate,
                fer = report.frame_error_rate,
                "scenario measurement"
            );
            self.results.insert(scenario, protocol, report);
        }
        Ok(())
    }

    /// Activate exactly the named sources; deactivate every other one.
    fn apply_scenario_sources(&self, names: &[String]) {
        for source in &self.sources {
            let mut source = source.borrow_mut();
            if names.iter().any(|name| name == source.name()) {
                source.activate();
            } else {
                source.deactivate();
            }
        }
    }

    fn deactivate_all(&self) {
        for source in &self.sources {
            source.borrow_mut().deactivate();
        }
    }

    fn find_source(&self, name: &str) -> EmcResult<SharedSource> {
        self.sources
            .iter()
            .find(|source| source.borrow().name() == name)
            .cloned()
            .ok_or_else(|| EmcError::UnknownSource(name.to_string()))
    }
}
