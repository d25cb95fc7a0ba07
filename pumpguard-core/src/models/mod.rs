mod reading;
mod record;
mod verdict;

pub use reading::SensorReading;
pub use record::HistoryRecord;
pub use verdict::{HealthStatus, ReasonTag, Verdict};
