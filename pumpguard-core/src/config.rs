use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct PumpGuardConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub input: InputConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServiceConfig {
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub history_path: String,
    pub model_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            history_path: "history.csv".to_string(),
            model_path: "pump_model.json".to_string(),
        }
    }
}

/// Accepted range of one numeric input field.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct FieldBounds {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default: f64,
}

impl FieldBounds {
    pub const fn new(min: f64, max: f64, step: f64, default: f64) -> Self {
        Self {
            min,
            max,
            step,
            default,
        }
    }

    /// Rejects values the input boundary must never forward to the classifier.
    pub fn check(&self, name: &str, value: f64) -> Result<f64, String> {
        if !value.is_finite() {
            return Err(format!("{} must be a finite number, got {}", name, value));
        }
        if value < self.min || value > self.max {
            return Err(format!(
                "{} {} is outside the accepted range [{}, {}]",
                name, value, self.min, self.max
            ));
        }
        Ok(value)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    #[serde(default = "InputConfig::default_temperature")]
    pub temperature: FieldBounds,
    #[serde(default = "InputConfig::default_vibration")]
    pub vibration: FieldBounds,
    #[serde(default = "InputConfig::default_pressure")]
    pub pressure: FieldBounds,
}

impl InputConfig {
    fn default_temperature() -> FieldBounds {
        FieldBounds::new(0.0, 500.0, 1.0, 75.0)
    }

    fn default_vibration() -> FieldBounds {
        FieldBounds::new(0.0, 100.0, 0.1, 10.0)
    }

    fn default_pressure() -> FieldBounds {
        FieldBounds::new(0.0, 200.0, 1.0, 50.0)
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            temperature: Self::default_temperature(),
            vibration: Self::default_vibration(),
            pressure: Self::default_pressure(),
        }
    }
}

impl PumpGuardConfig {
    /// Loads `path` (optional, TOML) overlaid with `PUMPGUARD__SECTION__KEY`
    /// environment variables. Missing sections fall back to defaults.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("PUMPGUARD")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        s.try_deserialize()
    }
}
