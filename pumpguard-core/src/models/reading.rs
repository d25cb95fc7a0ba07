use serde::{Deserialize, Serialize};

/// One set of pump sensor values as entered by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    /// Casing temperature in °C.
    pub temperature: f64,
    /// Vibration velocity in mm/s.
    pub vibration: f64,
    /// Discharge pressure in bar.
    pub pressure: f64,
}

impl SensorReading {
    pub fn new(temperature: f64, vibration: f64, pressure: f64) -> Self {
        Self {
            temperature,
            vibration,
            pressure,
        }
    }

    /// Feature vector in the fixed column order `[temperature, vibration, pressure]`.
    pub fn features(&self) -> [f64; 3] {
        [self.temperature, self.vibration, self.pressure]
    }
}
