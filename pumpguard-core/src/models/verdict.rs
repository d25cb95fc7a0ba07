use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Top-level outcome of the coarse risk rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HealthStatus {
    #[serde(rename = "Healthy")]
    Healthy,
    #[serde(rename = "Failure Risk")]
    FailureRisk,
}

impl HealthStatus {
    /// Literal used in the `Prediction` column of the history log.
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "Healthy",
            HealthStatus::FailureRisk => "Failure Risk",
        }
    }

    pub fn is_at_risk(&self) -> bool {
        matches!(self, HealthStatus::FailureRisk)
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HealthStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Healthy" => Ok(HealthStatus::Healthy),
            "Failure Risk" => Ok(HealthStatus::FailureRisk),
            other => Err(format!("unknown prediction '{}'", other)),
        }
    }
}

/// Fixed vocabulary of reasons produced by the banded diagnostic rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReasonTag {
    #[serde(rename = "High Temperature")]
    HighTemperature,
    #[serde(rename = "Critical Overheating")]
    CriticalOverheating,
    #[serde(rename = "Moderate Vibration")]
    ModerateVibration,
    #[serde(rename = "High Vibration")]
    HighVibration,
    #[serde(rename = "Critical Vibration")]
    CriticalVibration,
    #[serde(rename = "Abnormal Pressure")]
    AbnormalPressure,
    #[serde(rename = "Critical Pressure")]
    CriticalPressure,
}

impl ReasonTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonTag::HighTemperature => "High Temperature",
            ReasonTag::CriticalOverheating => "Critical Overheating",
            ReasonTag::ModerateVibration => "Moderate Vibration",
            ReasonTag::HighVibration => "High Vibration",
            ReasonTag::CriticalVibration => "Critical Vibration",
            ReasonTag::AbnormalPressure => "Abnormal Pressure",
            ReasonTag::CriticalPressure => "Critical Pressure",
        }
    }
}

impl fmt::Display for ReasonTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status from the risk model plus the diagnostic reasons, in sensor order
/// (temperature, vibration, pressure).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub status: HealthStatus,
    pub reasons: Vec<ReasonTag>,
}

impl Verdict {
    pub fn reason_labels(&self) -> Vec<&'static str> {
        self.reasons.iter().map(ReasonTag::as_str).collect()
    }
}
