//! Suite configuration, scenario descriptors and the automotive catalogs.
//!
//! The catalogs are the fixed set of interference sources and protocol
//! simulators an EMI test campaign runs against, with the frequency and
//! amplitude ranges typically quoted for each aggressor class.

use emclab_core::error::{EmcError, EmcResult};
use emclab_core::interference::{InterferencePattern, InterferenceSpec};
use serde::{Deserialize, Serialize};

use crate::protocol::ProtocolConfig;

/// Suite-wide configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteConfig {
    /// Master seed; each interference source derives its own RNG seed from
    /// this, so a full campaign is reproducible from one number.
    pub seed: u64,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self { seed: 42 }
    }
}

/// A named interference scenario: which sources to activate, everything
/// else deactivated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSpec {
    /// Result key for this scenario.
    pub name: String,
    /// Names of the sources active during the scenario. Must all exist in
    /// the suite's source catalog.
    pub sources: Vec<String>,
    /// Human-readable description, carried through to reports.
    pub description: String,
}

impl ScenarioSpec {
    pub fn new(
        name: impl Into<String>,
        sources: &[&str],
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            sources: sources.iter().map(|s| s.to_string()).collect(),
            description: description.into(),
        }
    }
}

/// An immunity sweep: escalate one source's amplitude through an ascending
/// ladder of levels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPlan {
    /// Name of the source to vary.
    pub source: String,
    /// Amplitude levels in volts, strictly ascending.
    pub levels: Vec<f64>,
}

impl SweepPlan {
    pub fn new(source: impl Into<String>, levels: Vec<f64>) -> Self {
        Self {
            source: source.into(),
            levels,
        }
    }

    /// The threshold scan relies on ascending order, so enforce it up front.
    pub fn validate(&self) -> EmcResult<()> {
        if self.levels.is_empty() || self.levels.windows(2).any(|w| w[0] >= w[1]) {
            return Err(EmcError::InvalidSweepLevels);
        }
        Ok(())
    }
}

/// Representative payloads used for baseline measurements.
pub const BASELINE_FRAMES: [[u8; 8]; 3] = [
    [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08],
    [0x10, 0x20, 0x30, 0x40, 0x50, 0x60, 0x70, 0x80],
    [0xFF, 0x00, 0xAA, 0x55, 0xF0, 0x0F, 0xCC, 0x33],
];

/// Scenario payload catalog: the baseline frames plus the all-zero and
/// all-one edge patterns.
pub const SCENARIO_FRAMES: [[u8; 8]; 5] = [
    [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08],
    [0x10, 0x20, 0x30, 0x40, 0x50, 0x60, 0x70, 0x80],
    [0xFF, 0x00, 0xAA, 0x55, 0xF0, 0x0F, 0xCC, 0x33],
    [0x00; 8],
    [0xFF; 8],
];

/// Alternating-bit payload transmitted at each immunity sweep level.
pub const SWEEP_FRAME: [u8; 8] = [0x55, 0xAA, 0x55, 0xAA, 0x55, 0xAA, 0x55, 0xAA];

/// The five stock automotive aggressors.
pub fn default_interference_sources() -> Vec<InterferenceSpec> {
    vec![
        // GSM uplink bursts from a handset inside the cabin
        InterferenceSpec::new(
            "Mobile Phone GSM",
            (900e6, 1800e6),
            (0.1, 0.5),
            InterferencePattern::Burst,
        ),
        // DC/DC converter switching harmonics
        InterferenceSpec::new(
            "Switching Regulator",
            (100e3, 2e6),
            (0.05, 0.2),
            InterferencePattern::Periodic,
        ),
        // broadband ignition coil noise
        InterferenceSpec::new(
            "Ignition System",
            (10e6, 100e6),
            (0.2, 1.0),
            InterferencePattern::Random,
        ),
        // commutation noise from traction and auxiliary motors
        InterferenceSpec::new(
            "Electric Motor",
            (1e3, 100e3),
            (0.1, 0.3),
            InterferencePattern::Periodic,
        ),
        // LED driver PWM
        InterferenceSpec::new(
            "LED Lighting",
            (1e3, 10e3),
            (0.02, 0.1),
            InterferencePattern::Periodic,
        ),
    ]
}

/// The four stock protocol simulators, in catalog (and ranking tie-break)
/// order.
pub fn default_protocols() -> Vec<ProtocolConfig> {
    vec![
        ProtocolConfig::can_500k(),
        ProtocolConfig::can_fd_2m(),
        ProtocolConfig::lin_19k2(),
        ProtocolConfig::flexray_10m(),
    ]
}

/// The stock interference scenario catalog.
pub fn default_scenarios() -> Vec<ScenarioSpec> {
    vec![
        ScenarioSpec::new(
            "Mobile Phone Interference",
            &["Mobile Phone GSM"],
            "GSM handset near vehicle electronics",
        ),
        ScenarioSpec::new(
            "Power Electronics Interference",
            &["Switching Regulator", "Electric Motor"],
            "Combined power-system interference",
        ),
        ScenarioSpec::new(
            "Ignition Interference",
            &["Ignition System"],
            "Engine ignition system interference",
        ),
        ScenarioSpec::new(
            "Multiple Source Interference",
            &["Mobile Phone GSM", "Switching Regulator", "LED Lighting"],
            "Several simultaneous aggressors",
        ),
    ]
}

/// The stock immunity sweep: escalate the switching regulator from 50 mV
/// to 500 mV.
pub fn default_sweep() -> SweepPlan {
    SweepPlan::new(
        "Switching Regulator",
        vec![0.05, 0.1, 0.15, 0.2, 0.25, 0.3, 0.4, 0.5],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalogs_are_wellformed() {
        let sources = default_interference_sources();
        assert_eq!(sources.len(), 5);
        for spec in &sources {
            spec.validate().unwrap();
        }

        let protocols = default_protocols();
        assert_eq!(protocols.len(), 4);
        for config in &protocols {
            config.validate().unwrap();
        }
    }

    #[test]
    fn test_default_scenarios_reference_catalog_sources() {
        let names: Vec<String> = default_interference_sources()
            .into_iter()
            .map(|s| s.name)
            .collect();
        for scenario in default_scenarios() {
            assert!(!scenario.sources.is_empty());
            for source in &scenario.sources {
                assert!(names.contains(source), "unknown source in catalog: {source}");
            }
        }
    }

    #[test]
    fn test_default_sweep_is_valid() {
        default_sweep().validate().unwrap();
    }

    #[test]
    fn test_sweep_validation() {
        assert!(SweepPlan::new("x", vec![]).validate().is_err());
        assert!(SweepPlan::new("x", vec![0.2, 0.1]).validate().is_err());
        assert!(SweepPlan::new("x", vec![0.1, 0.1]).validate().is_err());
        assert!(SweepPlan::new("x", vec![0.1, 0.2, 0.3]).validate().is_ok());
    }

    #[test]
    fn test_scenario_spec_roundtrip() {
        let spec = ScenarioSpec::new("Test", &["A", "B"], "two sources");
        let json = r#"{"name":"Test","sources":["A","B"],"description":"two sources"}"#;
        assert_eq!(serde_json::to_string(&spec).unwrap(), json);
        assert_eq!(serde_json::from_str::<ScenarioSpec>(json).unwrap(), spec);
    }
}
