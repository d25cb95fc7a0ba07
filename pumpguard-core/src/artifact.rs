//! Model artifact for PumpGuard — versioned, tagged risk-model strategy
//!
//! The artifact is a small JSON record selecting which `RiskModel` decides the
//! top-level verdict:
//! - **rule_based** — the fixed threshold rule (default)
//! - **learned_model** — a linear score `w·x + bias` compared to a threshold
//!
//! Loading never fails hard: a missing, unreadable or corrupt artifact is
//! replaced with a fresh default and the caller receives a warning to show.
//! An artifact from another format version is never overwritten.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ArtifactError, ClassifyError};
use crate::models::{HealthStatus, SensorReading};

/// Current on-disk artifact format version.
pub const ARTIFACT_VERSION: u32 = 1;

// ============================================================================
// RiskModel trait
// ============================================================================

/// Abstraction over the component that decides Healthy / Failure Risk.
pub trait RiskModel: Send + Sync {
    /// Evaluate one reading. Only the binary status is produced here; reason
    /// tags come from the diagnostic bands, never from the model.
    fn predict(&self, reading: &SensorReading) -> Result<HealthStatus, ClassifyError>;

    /// Model name for logging.
    fn name(&self) -> &str;
}

// ============================================================================
// Strategy types
// ============================================================================

/// Thresholds of the coarse risk rule. All comparisons are strict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskThresholds {
    pub temperature_max: f64,
    pub vibration_max: f64,
    pub pressure_min: f64,
    pub pressure_max: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            temperature_max: 85.0,
            vibration_max: 8.0,
            pressure_min: 45.0,
            pressure_max: 65.0,
        }
    }
}

impl RiskModel for RiskThresholds {
    fn predict(&self, reading: &SensorReading) -> Result<HealthStatus, ClassifyError> {
        let at_risk = reading.temperature > self.temperature_max
            || reading.vibration > self.vibration_max
            || reading.pressure < self.pressure_min
            || reading.pressure > self.pressure_max;

        Ok(if at_risk {
            HealthStatus::FailureRisk
        } else {
            HealthStatus::Healthy
        })
    }

    fn name(&self) -> &str {
        "rule_based"
    }
}

/// Linear scoring model over `[temperature, vibration, pressure]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnedWeights {
    pub weights: Vec<f64>,
    pub bias: f64,
    pub threshold: f64,
}

impl LearnedWeights {
    pub fn score(&self, reading: &SensorReading) -> Result<f64, ClassifyError> {
        let features = reading.features();
        if self.weights.len() != features.len() {
            return Err(ClassifyError::WeightCount {
                expected: features.len(),
                actual: self.weights.len(),
            });
        }

        let score = self
            .weights
            .iter()
            .zip(features.iter())
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.bias;

        if !score.is_finite() {
            return Err(ClassifyError::NonFiniteScore(score));
        }
        Ok(score)
    }
}

impl RiskModel for LearnedWeights {
    fn predict(&self, reading: &SensorReading) -> Result<HealthStatus, ClassifyError> {
        let score = self.score(reading)?;
        Ok(if score > self.threshold {
            HealthStatus::FailureRisk
        } else {
            HealthStatus::Healthy
        })
    }

    fn name(&self) -> &str {
        "learned_model"
    }
}

/// Which risk model the artifact selects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Strategy {
    RuleBased(RiskThresholds),
    LearnedModel(LearnedWeights),
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::RuleBased(RiskThresholds::default())
    }
}

// ============================================================================
// ModelArtifact
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub version: u32,
    pub created_at: DateTime<Utc>,
    pub strategy: Strategy,
}

/// Result of `ModelArtifact::load_or_init`.
#[derive(Debug)]
pub struct LoadOutcome {
    pub artifact: ModelArtifact,
    /// Set when the stored artifact could not be used and a default was built.
    pub warning: Option<String>,
}

impl Default for ModelArtifact {
    fn default() -> Self {
        Self::new(Strategy::default())
    }
}

impl ModelArtifact {
    pub fn new(strategy: Strategy) -> Self {
        Self {
            version: ARTIFACT_VERSION,
            created_at: Utc::now(),
            strategy,
        }
    }

    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let raw = fs::read_to_string(path).map_err(|source| ArtifactError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let artifact: ModelArtifact =
            serde_json::from_str(&raw).map_err(|source| ArtifactError::Corrupt {
                path: path.display().to_string(),
                source,
            })?;
        if artifact.version != ARTIFACT_VERSION {
            return Err(ArtifactError::UnsupportedVersion {
                found: artifact.version,
                expected: ARTIFACT_VERSION,
            });
        }
        Ok(artifact)
    }

    pub fn save(&self, path: &Path) -> Result<(), ArtifactError> {
        let io_err = |source| ArtifactError::Io {
            path: path.display().to_string(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| ArtifactError::Corrupt {
            path: path.display().to_string(),
            source,
        })?;
        fs::write(path, json).map_err(io_err)
    }

    /// Load the artifact at `path`, creating a default one when it is absent.
    /// A corrupt artifact is replaced by a default and reported through
    /// `LoadOutcome::warning`. An artifact with another `version` is left on
    /// disk untouched and the in-memory default is used. Failing to persist a
    /// replacement is logged but does not prevent the default from being used.
    pub fn load_or_init(path: &Path) -> LoadOutcome {
        if !path.exists() {
            let artifact = ModelArtifact::default();
            tracing::info!("No model artifact at {}, creating rule-based default", path.display());
            if let Err(e) = artifact.save(path) {
                tracing::warn!("Could not persist default model artifact: {}", e);
            }
            return LoadOutcome {
                artifact,
                warning: None,
            };
        }

        match ModelArtifact::load(path) {
            Ok(artifact) => {
                tracing::debug!(
                    "Loaded model artifact v{} ({}) from {}",
                    artifact.version,
                    artifact.strategy_name(),
                    path.display()
                );
                LoadOutcome {
                    artifact,
                    warning: None,
                }
            }
            Err(e @ ArtifactError::UnsupportedVersion { .. }) => {
                // Written by another build; keep the file and run on the default.
                tracing::warn!("Model artifact not readable by this build: {}", e);
                LoadOutcome {
                    artifact: ModelArtifact::default(),
                    warning: Some(format!(
                        "Could not load model ({}). Using the rule-based default; the file was left unchanged.",
                        e
                    )),
                }
            }
            Err(e) => {
                tracing::warn!("Model artifact unusable, rebuilding default: {}", e);
                let artifact = ModelArtifact::default();
                if let Err(save_err) = artifact.save(path) {
                    tracing::warn!("Could not persist default model artifact: {}", save_err);
                }
                LoadOutcome {
                    artifact,
                    warning: Some(format!(
                        "Could not load model ({}). Created a new rule-based model.",
                        e
                    )),
                }
            }
        }
    }

    pub fn strategy_name(&self) -> &'static str {
        match self.strategy {
            Strategy::RuleBased(_) => "rule_based",
            Strategy::LearnedModel(_) => "learned_model",
        }
    }

    /// Build the risk model the artifact selects.
    pub fn into_model(self) -> Box<dyn RiskModel> {
        match self.strategy {
            Strategy::RuleBased(t) => Box::new(t),
            Strategy::LearnedModel(w) => Box::new(w),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // TEST 1: default rule uses strict comparisons at every threshold
    // ========================================================================
    #[test]
    fn test_rule_based_thresholds_are_strict() {
        let rule = RiskThresholds::default();
        let at = |t, v, p| rule.predict(&SensorReading::new(t, v, p)).unwrap();

        assert_eq!(at(85.0, 8.0, 45.0), HealthStatus::Healthy);
        assert_eq!(at(50.0, 2.0, 65.0), HealthStatus::Healthy);
        assert_eq!(at(85.01, 2.0, 50.0), HealthStatus::FailureRisk);
        assert_eq!(at(50.0, 8.01, 50.0), HealthStatus::FailureRisk);
        assert_eq!(at(50.0, 2.0, 44.99), HealthStatus::FailureRisk);
        assert_eq!(at(50.0, 2.0, 65.01), HealthStatus::FailureRisk);
    }

    // ========================================================================
    // TEST 2: learned model scores linearly against its threshold
    // ========================================================================
    #[test]
    fn test_learned_model_linear_score() {
        let model = LearnedWeights {
            weights: vec![0.1, 1.0, 0.0],
            bias: -10.0,
            threshold: 0.0,
        };
        let calm = SensorReading::new(50.0, 2.0, 50.0); // 5 + 2 - 10 = -3
        let hot = SensorReading::new(120.0, 2.0, 50.0); // 12 + 2 - 10 = 4

        assert!((model.score(&calm).unwrap() + 3.0).abs() < 1e-9);
        assert_eq!(model.predict(&calm).unwrap(), HealthStatus::Healthy);
        assert_eq!(model.predict(&hot).unwrap(), HealthStatus::FailureRisk);
    }

    // ========================================================================
    // TEST 3: learned model rejects a wrong-sized weight vector
    // ========================================================================
    #[test]
    fn test_learned_model_weight_count_error() {
        let model = LearnedWeights {
            weights: vec![1.0, 1.0],
            bias: 0.0,
            threshold: 0.0,
        };
        let err = model.predict(&SensorReading::new(1.0, 1.0, 1.0)).unwrap_err();
        assert_eq!(
            err,
            ClassifyError::WeightCount {
                expected: 3,
                actual: 2
            }
        );
    }

    #[test]
    fn test_learned_model_non_finite_score() {
        let model = LearnedWeights {
            weights: vec![f64::MAX, f64::MAX, 0.0],
            bias: 0.0,
            threshold: 0.0,
        };
        let err = model.predict(&SensorReading::new(10.0, 10.0, 1.0)).unwrap_err();
        assert!(matches!(err, ClassifyError::NonFiniteScore(_)));
    }

    // ========================================================================
    // TEST 4: tagged JSON layout
    // ========================================================================
    #[test]
    fn test_strategy_json_is_tagged() {
        let artifact = ModelArtifact::default();
        let json = serde_json::to_value(&artifact).unwrap();
        assert_eq!(json["version"], 1);
        assert_eq!(json["strategy"]["kind"], "rule_based");
        assert_eq!(json["strategy"]["temperature_max"], 85.0);

        let learned: Strategy = serde_json::from_str(
            r#"{"kind":"learned_model","weights":[1.0,2.0,3.0],"bias":0.5,"threshold":1.0}"#,
        )
        .unwrap();
        assert!(matches!(learned, Strategy::LearnedModel(ref w) if w.weights.len() == 3));
    }

    // ========================================================================
    // TEST 5: missing artifact is created silently
    // ========================================================================
    #[test]
    fn test_load_or_init_creates_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("models").join("pump_model.json");

        let outcome = ModelArtifact::load_or_init(&path);
        assert!(outcome.warning.is_none());
        assert_eq!(outcome.artifact.strategy, Strategy::default());
        assert!(path.exists(), "default artifact should be persisted");

        let reloaded = ModelArtifact::load(&path).unwrap();
        assert_eq!(reloaded, outcome.artifact);
    }

    // ========================================================================
    // TEST 6: corrupt artifact recovers with a warning
    // ========================================================================
    #[test]
    fn test_load_or_init_recovers_from_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pump_model.json");
        fs::write(&path, b"\x80\x04not json").unwrap();

        let outcome = ModelArtifact::load_or_init(&path);
        let warning = outcome.warning.expect("corrupt artifact should warn");
        assert!(warning.contains("Created a new rule-based model"));
        assert_eq!(outcome.artifact.strategy, Strategy::default());

        // The replacement was written back and now loads cleanly.
        assert!(ModelArtifact::load(&path).is_ok());
    }

    // ========================================================================
    // TEST 7: artifact from another version is used as default, not overwritten
    // ========================================================================
    #[test]
    fn test_unsupported_version_keeps_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pump_model.json");
        let mut artifact = ModelArtifact::default();
        artifact.version = 99;
        let original = serde_json::to_string(&artifact).unwrap();
        fs::write(&path, &original).unwrap();

        assert!(matches!(
            ModelArtifact::load(&path),
            Err(ArtifactError::UnsupportedVersion { found: 99, expected: 1 })
        ));

        let outcome = ModelArtifact::load_or_init(&path);
        let warning = outcome.warning.expect("newer artifact should warn");
        assert!(warning.contains("left unchanged"));
        assert_eq!(outcome.artifact.strategy, Strategy::default());
        assert_eq!(fs::read_to_string(&path).unwrap(), original);
    }

    #[test]
    fn test_into_model_selects_strategy() {
        let learned = ModelArtifact::new(Strategy::LearnedModel(LearnedWeights {
            weights: vec![0.0, 0.0, 0.0],
            bias: 1.0,
            threshold: 0.0,
        }));
        assert_eq!(learned.strategy_name(), "learned_model");
        let model = learned.into_model();
        assert_eq!(model.name(), "learned_model");
        assert_eq!(
            model.predict(&SensorReading::new(0.0, 0.0, 0.0)).unwrap(),
            HealthStatus::FailureRisk
        );
    }
}
