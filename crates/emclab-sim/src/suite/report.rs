//! Derived robustness summaries.
//!
//! Pure data reduction over a suite's recorded results: per-protocol
//! degradation relative to baseline, mean error rates across interference
//! scenarios, immunity thresholds from the sweep histories, and a
//! robustness ranking. Rendering (console tables, JSON export) belongs to
//! downstream consumers; nothing here formats or prints.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::engine::{EmiTestSuite, BASELINE_SCENARIO};

/// Robustness summary of one protocol across a full campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolSummary {
    pub protocol: String,
    /// Bit error rate under the clean baseline run.
    pub baseline_ber: f64,
    /// Worst bit error rate over the interference scenarios (baseline and
    /// sweep excluded).
    pub max_scenario_ber: f64,
    /// `max_scenario_ber / baseline_ber`; infinite when interference
    /// produced errors on a clean baseline, 1.0 when both are error-free.
    pub degradation: f64,
    /// Mean bit error rate over the interference scenarios.
    pub mean_scenario_ber: f64,
    /// First sweep level whose bit error rate exceeded the immunity
    /// criterion; `None` when the protocol rode out the whole ladder.
    pub immunity_threshold: Option<f64>,
}

/// Campaign-wide derived report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteReport {
    /// One summary per protocol, in catalog order.
    pub summaries: Vec<ProtocolSummary>,
    /// Protocol names by ascending mean scenario bit error rate (most
    /// robust first); ties keep catalog order.
    pub ranking: Vec<String>,
}

impl SuiteReport {
    /// Reduce a suite's recorded results into per-protocol summaries and a
    /// robustness ranking.
    pub fn derive(suite: &EmiTestSuite) -> Self {
        let summaries: Vec<ProtocolSummary> = suite
            .protocols()
            .iter()
            .map(|simulator| {
                let protocol = simulator.protocol_name();
                let baseline_ber = suite
                    .results()
                    .report_for(BASELINE_SCENARIO, &protocol)
                    .map(|report| report.bit_error_rate)
                    .unwrap_or(0.0);

                let scenario_bers: Vec<f64> = suite
                    .results()
                    .scenarios()
                    .iter()
                    .filter(|record| record.scenario != BASELINE_SCENARIO)
                    .filter_map(|record| record.measurement(&protocol))
                    .map(|report| report.bit_error_rate)
                    .collect();

                let max_scenario_ber = scenario_bers.iter().copied().fold(0.0, f64::max);
                let mean_scenario_ber = if scenario_bers.is_empty() {
                    0.0
                } else {
                    scenario_bers.iter().sum::<f64>() / scenario_bers.len() as f64
                };

                let degradation = if baseline_ber > 0.0 {
                    max_scenario_ber / baseline_ber
                } else if max_scenario_ber > 0.0 {
                    f64::INFINITY
                } else {
                    1.0
                };

                ProtocolSummary {
                    immunity_threshold: suite.immunity_threshold(&protocol),
                    protocol,
                    baseline_ber,
                    max_scenario_ber,
                    degradation,
                    mean_scenario_ber,
                }
            })
            .collect();

        // Stable sort: equal means keep protocol catalog order.
        let mut ranked: Vec<&ProtocolSummary> = summaries.iter().collect();
        ranked.sort_by(|a, b| {
            a.mean_scenario_ber
                .partial_cmp(&b.mean_scenario_ber)
                .unwrap_or(Ordering::Equal)
        });
        let ranking = ranked.into_iter().map(|s| s.protocol.clone()).collect();

        Self { summaries, ranking }
    }

    /// Summary for one protocol by display name.
    pub fn summary_for(&self, protocol: &str) -> Option<&ProtocolSummary> {
        self.summaries.iter().find(|s| s.protocol == protocol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ProtocolConfig;
    use crate::suite::config::{ScenarioSpec, SuiteConfig, SweepPlan};
    use emclab_core::interference::{InterferencePattern, InterferenceSpec};

    fn tone_suite() -> EmiTestSuite {
        // One deterministic tone strong enough to corrupt CAN but nowhere
        // near LIN's 1.2 V margin.
        let sources = vec![InterferenceSpec::new(
            "Test Tone",
            (1e5, 1e5),
            (0.5, 0.5),
            InterferencePattern::Random,
        )];
        let protocols = vec![ProtocolConfig::can_500k(), ProtocolConfig::lin_19k2()];
        EmiTestSuite::with_catalogs(SuiteConfig::default(), sources, protocols).unwrap()
    }

    #[test]
    fn test_clean_campaign_reports_unity_degradation() {
        let mut suite = EmiTestSuite::new(SuiteConfig::default()).unwrap();
        suite.run_baseline().unwrap();

        let report = SuiteReport::derive(&suite);
        assert_eq!(report.summaries.len(), 4);
        for summary in &report.summaries {
            assert_eq!(summary.baseline_ber, 0.0);
            assert_eq!(summary.max_scenario_ber, 0.0);
            assert_eq!(summary.degradation, 1.0);
            assert_eq!(summary.immunity_threshold, None);
        }
        // All tied at zero: ranking preserves catalog order.
        assert_eq!(report.ranking, vec!["CAN", "CAN-FD", "LIN", "FlexRay"]);
    }

    #[test]
    fn test_degradation_is_infinite_over_clean_baseline() {
        let mut suite = tone_suite();
        suite.run_baseline().unwrap();
        suite
            .run_scenarios(&[ScenarioSpec::new("tone", &["Test Tone"], "")])
            .unwrap();

        let report = SuiteReport::derive(&suite);
        let can = report.summary_for("CAN").unwrap();
        assert_eq!(can.baseline_ber, 0.0);
        assert!(can.max_scenario_ber > 0.0);
        assert!(can.degradation.is_infinite());

        let lin = report.summary_for("LIN").unwrap();
        assert_eq!(lin.max_scenario_ber, 0.0);
        assert_eq!(lin.degradation, 1.0);
    }

    #[test]
    fn test_ranking_orders_by_mean_scenario_ber() {
        let mut suite = tone_suite();
        suite.run_baseline().unwrap();
        suite
            .run_scenarios(&[ScenarioSpec::new("tone", &["Test Tone"], "")])
            .unwrap();

        let report = SuiteReport::derive(&suite);
        // LIN shrugs the tone off entirely, CAN does not.
        assert_eq!(report.ranking, vec!["LIN", "CAN"]);
        assert!(
            report.summary_for("CAN").unwrap().mean_scenario_ber
                > report.summary_for("LIN").unwrap().mean_scenario_ber
        );
    }

    #[test]
    fn test_immunity_threshold_carried_into_summary() {
        let mut suite = tone_suite();
        suite
            .run_immunity_sweep(&SweepPlan::new("Test Tone", vec![0.05, 0.5]))
            .unwrap();

        let report = SuiteReport::derive(&suite);
        assert_eq!(report.summary_for("CAN").unwrap().immunity_threshold, Some(0.5));
        assert_eq!(report.summary_for("LIN").unwrap().immunity_threshold, None);
    }

    #[test]
    fn test_report_serializes() {
        let mut suite = tone_suite();
        suite.run_baseline().unwrap();
        let report = SuiteReport::derive(&suite);
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"ranking\""));
        assert!(json.contains("CAN"));
    }
}
