pub mod artifact;
pub mod classifier;
pub mod config;
pub mod error;
pub mod history;
pub mod models;
pub mod trend;

pub use artifact::{
    LearnedWeights, LoadOutcome, ModelArtifact, RiskModel, RiskThresholds, Strategy,
    ARTIFACT_VERSION,
};
pub use classifier::{classify, diagnose, Assessment, Classifier, Diagnosis, Severity, SensorStatus};
pub use config::PumpGuardConfig;
pub use error::{ArtifactError, ClassifyError, HistoryError};
pub use history::{CsvHistoryStore, HistoryStore, MemoryHistoryStore, CSV_HEADER};
pub use models::{HealthStatus, HistoryRecord, ReasonTag, SensorReading, Verdict};
pub use trend::{series, TrendSeries};
