//! Pump health classification
//!
//! Two independent rule layers are evaluated for every reading:
//!
//!   1. the risk model (by default the coarse threshold rule in
//!      `RiskThresholds`) decides the top-level `HealthStatus`;
//!   2. the banded diagnostic rule grades each sensor Safe / Warning / Danger
//!      and produces the reason tags.
//!
//! The layers use different thresholds and may disagree (vibration 7.0 is a
//! Warning band but Healthy under the risk rule). Neither is consulted by the
//! other. No input validation happens here.

use serde::Serialize;

use crate::artifact::{RiskModel, RiskThresholds};
use crate::error::ClassifyError;
use crate::models::{HealthStatus, ReasonTag, SensorReading, Verdict};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Safe,
    Warning,
    Danger,
}

/// Band outcome for a single sensor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SensorStatus {
    pub severity: Severity,
    /// Display label, e.g. "Warning" or "Unsatisfactory".
    pub label: &'static str,
    /// Short qualifier shown after the value, e.g. "Possible Bearing Issue".
    pub note: Option<&'static str>,
    pub reason: Option<ReasonTag>,
}

impl SensorStatus {
    const fn safe() -> Self {
        Self {
            severity: Severity::Safe,
            label: "Safe",
            note: None,
            reason: None,
        }
    }

    const fn flagged(
        severity: Severity,
        label: &'static str,
        note: Option<&'static str>,
        reason: ReasonTag,
    ) -> Self {
        Self {
            severity,
            label,
            note,
            reason: Some(reason),
        }
    }
}

/// Per-sensor band grades for one reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Diagnosis {
    pub temperature: SensorStatus,
    pub vibration: SensorStatus,
    pub pressure: SensorStatus,
}

impl Diagnosis {
    /// Reason tags in sensor order.
    pub fn reasons(&self) -> Vec<ReasonTag> {
        [self.temperature, self.vibration, self.pressure]
            .iter()
            .filter_map(|s| s.reason)
            .collect()
    }
}

// ============================================================================
// Banded diagnostic rule
// ============================================================================

fn temperature_band(t: f64) -> SensorStatus {
    if (40.0..=85.0).contains(&t) {
        SensorStatus::safe()
    } else if t > 85.0 && t <= 100.0 {
        SensorStatus::flagged(
            Severity::Warning,
            "Warning",
            Some("High"),
            ReasonTag::HighTemperature,
        )
    } else {
        SensorStatus::flagged(Severity::Danger, "Danger", None, ReasonTag::CriticalOverheating)
    }
}

fn vibration_band(v: f64) -> SensorStatus {
    if (0.0..=4.5).contains(&v) {
        SensorStatus::safe()
    } else if v > 4.5 && v <= 7.1 {
        SensorStatus::flagged(
            Severity::Warning,
            "Warning",
            Some("Elevated"),
            ReasonTag::ModerateVibration,
        )
    } else if v > 7.1 && v <= 11.2 {
        SensorStatus::flagged(
            Severity::Warning,
            "Unsatisfactory",
            Some("Possible Bearing Issue"),
            ReasonTag::HighVibration,
        )
    } else {
        SensorStatus::flagged(
            Severity::Danger,
            "Danger",
            Some("Severe"),
            ReasonTag::CriticalVibration,
        )
    }
}

fn pressure_band(p: f64) -> SensorStatus {
    if (40.0..=60.0).contains(&p) {
        SensorStatus::safe()
    } else if (30.0..40.0).contains(&p) || (p > 60.0 && p <= 70.0) {
        SensorStatus::flagged(Severity::Warning, "Warning", None, ReasonTag::AbnormalPressure)
    } else {
        SensorStatus::flagged(Severity::Danger, "Danger", None, ReasonTag::CriticalPressure)
    }
}

/// Grade every sensor against its bands.
pub fn diagnose(reading: &SensorReading) -> Diagnosis {
    Diagnosis {
        temperature: temperature_band(reading.temperature),
        vibration: vibration_band(reading.vibration),
        pressure: pressure_band(reading.pressure),
    }
}

/// Classify with the default threshold rule. Infallible because the
/// rule-based model never errors.
pub fn classify(temperature: f64, vibration: f64, pressure: f64) -> Verdict {
    let reading = SensorReading::new(temperature, vibration, pressure);
    let status = RiskThresholds::default()
        .predict(&reading)
        .unwrap_or(HealthStatus::FailureRisk);
    Verdict {
        status,
        reasons: diagnose(&reading).reasons(),
    }
}

// ============================================================================
// Classifier
// ============================================================================

/// Full classification of one reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    pub reading: SensorReading,
    pub verdict: Verdict,
    pub diagnosis: Diagnosis,
}

/// Classifier backed by whichever risk model the artifact selected.
pub struct Classifier {
    model: Box<dyn RiskModel>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(Box::new(RiskThresholds::default()))
    }
}

impl Classifier {
    pub fn new(model: Box<dyn RiskModel>) -> Self {
        Self { model }
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub fn assess(&self, reading: SensorReading) -> Result<Assessment, ClassifyError> {
        let diagnosis = diagnose(&reading);
        let status = self.model.predict(&reading)?;

        tracing::debug!(
            model = self.model.name(),
            temperature = reading.temperature,
            vibration = reading.vibration,
            pressure = reading.pressure,
            status = status.as_str(),
            "Classified reading"
        );

        Ok(Assessment {
            reading,
            verdict: Verdict {
                status,
                reasons: diagnosis.reasons(),
            },
            diagnosis,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::LearnedWeights;

    fn labels(v: &Verdict) -> Vec<&'static str> {
        v.reason_labels()
    }

    // ========================================================================
    // TEST 1: each risk trigger alone flips the verdict
    // ========================================================================
    #[test]
    fn test_single_triggers_fail() {
        assert_eq!(classify(86.0, 2.0, 50.0).status, HealthStatus::FailureRisk);
        assert_eq!(classify(50.0, 8.5, 50.0).status, HealthStatus::FailureRisk);
        assert_eq!(classify(50.0, 2.0, 44.0).status, HealthStatus::FailureRisk);
        assert_eq!(classify(50.0, 2.0, 66.0).status, HealthStatus::FailureRisk);
        assert_eq!(classify(200.0, 50.0, 0.0).status, HealthStatus::FailureRisk);
    }

    // ========================================================================
    // TEST 2: healthy region
    // ========================================================================
    #[test]
    fn test_healthy_region() {
        for t in [40.0, 60.0, 85.0] {
            for v in [0.0, 4.5, 8.0] {
                for p in [45.0, 55.0, 65.0] {
                    assert_eq!(
                        classify(t, v, p).status,
                        HealthStatus::Healthy,
                        "({}, {}, {}) should be healthy",
                        t,
                        v,
                        p
                    );
                }
            }
        }
    }

    // ========================================================================
    // TEST 3: boundary exactness at 85 °C
    // ========================================================================
    #[test]
    fn test_temperature_boundary() {
        let at = classify(85.0, 2.0, 50.0);
        assert_eq!(at.status, HealthStatus::Healthy);
        assert!(at.reasons.is_empty());

        let over = classify(85.01, 2.0, 50.0);
        assert_eq!(over.status, HealthStatus::FailureRisk);
        assert_eq!(labels(&over), vec!["High Temperature"]);
    }

    // ========================================================================
    // TEST 4: rule layers are independent
    // ========================================================================
    #[test]
    fn test_reason_tags_independent_of_verdict() {
        let v = classify(90.0, 2.0, 50.0);
        assert_eq!(v.status, HealthStatus::FailureRisk);
        assert_eq!(v.reasons, vec![ReasonTag::HighTemperature]);

        // Warning band, yet healthy under the risk rule.
        let v = classify(50.0, 7.0, 50.0);
        assert_eq!(v.status, HealthStatus::Healthy);
        assert_eq!(labels(&v), vec!["Moderate Vibration"]);

        // Risk rule trips on pressure 44 while the band says Safe.
        let v = classify(50.0, 2.0, 44.0);
        assert_eq!(v.status, HealthStatus::FailureRisk);
        assert!(v.reasons.is_empty());
    }

    // ========================================================================
    // TEST 5: end-to-end examples
    // ========================================================================
    #[test]
    fn test_end_to_end_examples() {
        let v = classify(95.0, 3.0, 50.0);
        assert_eq!(v.status, HealthStatus::FailureRisk);
        assert!(labels(&v).contains(&"High Temperature"));

        let v = classify(50.0, 2.0, 50.0);
        assert_eq!(v.status, HealthStatus::Healthy);
        assert!(v.reasons.is_empty());
    }

    // ========================================================================
    // TEST 6: temperature bands
    // ========================================================================
    #[test]
    fn test_temperature_bands() {
        assert_eq!(temperature_band(40.0).severity, Severity::Safe);
        assert_eq!(temperature_band(100.0).reason, Some(ReasonTag::HighTemperature));
        assert_eq!(temperature_band(100.5).reason, Some(ReasonTag::CriticalOverheating));
        // Below the safe band is also Danger.
        assert_eq!(temperature_band(39.9).severity, Severity::Danger);
        assert_eq!(temperature_band(39.9).reason, Some(ReasonTag::CriticalOverheating));
    }

    #[test]
    fn test_vibration_bands() {
        assert_eq!(vibration_band(0.0).severity, Severity::Safe);
        assert_eq!(vibration_band(4.5).severity, Severity::Safe);
        assert_eq!(vibration_band(4.6).reason, Some(ReasonTag::ModerateVibration));
        assert_eq!(vibration_band(7.1).reason, Some(ReasonTag::ModerateVibration));

        let unsatisfactory = vibration_band(11.2);
        assert_eq!(unsatisfactory.severity, Severity::Warning);
        assert_eq!(unsatisfactory.label, "Unsatisfactory");
        assert_eq!(unsatisfactory.reason, Some(ReasonTag::HighVibration));

        assert_eq!(vibration_band(11.3).severity, Severity::Danger);
        assert_eq!(vibration_band(-1.0).reason, Some(ReasonTag::CriticalVibration));
    }

    #[test]
    fn test_pressure_bands() {
        assert_eq!(pressure_band(40.0).severity, Severity::Safe);
        assert_eq!(pressure_band(60.0).severity, Severity::Safe);
        assert_eq!(pressure_band(30.0).reason, Some(ReasonTag::AbnormalPressure));
        assert_eq!(pressure_band(39.99).reason, Some(ReasonTag::AbnormalPressure));
        assert_eq!(pressure_band(70.0).reason, Some(ReasonTag::AbnormalPressure));
        assert_eq!(pressure_band(29.9).reason, Some(ReasonTag::CriticalPressure));
        assert_eq!(pressure_band(70.1).reason, Some(ReasonTag::CriticalPressure));
    }

    // ========================================================================
    // TEST 7: reasons come out in sensor order
    // ========================================================================
    #[test]
    fn test_reason_order() {
        let v = classify(150.0, 20.0, 10.0);
        assert_eq!(
            labels(&v),
            vec!["Critical Overheating", "Critical Vibration", "Critical Pressure"]
        );
    }

    #[test]
    fn test_extreme_finite_inputs_are_accepted() {
        let v = classify(f64::MAX, f64::MIN, 0.0);
        assert_eq!(v.status, HealthStatus::FailureRisk);
        assert_eq!(v.reasons.len(), 3);
    }

    // ========================================================================
    // TEST 8: classifier propagates model failures
    // ========================================================================
    #[test]
    fn test_classifier_surfaces_model_error() {
        let broken = Classifier::new(Box::new(LearnedWeights {
            weights: vec![1.0],
            bias: 0.0,
            threshold: 0.0,
        }));
        let err = broken.assess(SensorReading::new(50.0, 2.0, 50.0)).unwrap_err();
        assert!(matches!(err, ClassifyError::WeightCount { .. }));
    }

    #[test]
    fn test_classifier_default_matches_classify() {
        let classifier = Classifier::default();
        assert_eq!(classifier.model_name(), "rule_based");

        let reading = SensorReading::new(75.0, 10.0, 50.0);
        let assessment = classifier.assess(reading).unwrap();
        assert_eq!(assessment.verdict, classify(75.0, 10.0, 50.0));
        assert_eq!(assessment.diagnosis.vibration.label, "Unsatisfactory");
    }
}
