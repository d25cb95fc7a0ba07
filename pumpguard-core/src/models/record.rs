use serde::{Deserialize, Serialize};

use super::{HealthStatus, SensorReading};

/// One persisted prediction. Position in the log is its only timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    #[serde(flatten)]
    pub reading: SensorReading,
    pub prediction: HealthStatus,
}

impl HistoryRecord {
    pub fn new(reading: SensorReading, prediction: HealthStatus) -> Self {
        Self {
            reading,
            prediction,
        }
    }
}
