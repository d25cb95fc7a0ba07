use serde::Serialize;

use crate::models::HistoryRecord;

/// One sensor's values across the history log, indexed by record number.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSeries {
    pub name: &'static str,
    pub unit: &'static str,
    pub values: Vec<f64>,
}

impl TrendSeries {
    pub fn min(&self) -> Option<f64> {
        self.values.iter().copied().reduce(f64::min)
    }

    pub fn max(&self) -> Option<f64> {
        self.values.iter().copied().reduce(f64::max)
    }

    pub fn last(&self) -> Option<f64> {
        self.values.last().copied()
    }

    /// The most recent `n` values of this series.
    pub fn tail(&self, n: usize) -> TrendSeries {
        TrendSeries {
            name: self.name,
            unit: self.unit,
            values: self.values[self.values.len().saturating_sub(n)..].to_vec(),
        }
    }
}

/// Split the log into Temperature, Vibration and Pressure series.
pub fn series(records: &[HistoryRecord]) -> [TrendSeries; 3] {
    let pick = |name, unit, f: fn(&HistoryRecord) -> f64| TrendSeries {
        name,
        unit,
        values: records.iter().map(f).collect(),
    };
    [
        pick("Temperature", "°C", |r| r.reading.temperature),
        pick("Vibration", "mm/s", |r| r.reading.vibration),
        pick("Pressure", "bar", |r| r.reading.pressure),
    ]
}
