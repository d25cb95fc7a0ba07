//! Terminal rendering for verdicts, the history table and trend chart.
//!
//! Everything here is presentation only; all decisions come from
//! `pumpguard_core`.

use pumpguard_core::{series, Assessment, HistoryRecord, SensorStatus, Severity};

pub const NO_HISTORY: &str = "No history available yet. Run a prediction first.";

// ---------------------------------------------------------------------------
// Verdict
// ---------------------------------------------------------------------------

fn severity_marker(severity: Severity) -> &'static str {
    match severity {
        Severity::Safe => "[ok]",
        Severity::Warning => "[!!]",
        Severity::Danger => "[XX]",
    }
}

fn status_line(sensor: &str, value: f64, unit: &str, status: &SensorStatus) -> String {
    let mut line = format!(
        "  {} {:<12} {} ({} {})",
        severity_marker(status.severity),
        format!("{}:", sensor),
        status.label,
        value,
        unit
    );
    if let Some(note) = status.note {
        line.push_str(" - ");
        line.push_str(note);
    }
    line
}

/// Per-sensor status lines followed by the verdict box.
pub fn render_assessment(assessment: &Assessment) -> String {
    let r = &assessment.reading;
    let d = &assessment.diagnosis;
    let mut out = String::new();

    out.push_str("Sensor Safety Check\n");
    out.push_str(&status_line("Temperature", r.temperature, "°C", &d.temperature));
    out.push('\n');
    out.push_str(&status_line("Vibration", r.vibration, "mm/s", &d.vibration));
    out.push('\n');
    out.push_str(&status_line("Pressure", r.pressure, "bar", &d.pressure));
    out.push_str("\n\n");

    out.push_str("Prediction Result\n");
    if assessment.verdict.status.is_at_risk() {
        let issues = if assessment.verdict.reasons.is_empty() {
            "Unknown - check sensors.".to_string()
        } else {
            assessment.verdict.reason_labels().join(", ")
        };
        out.push_str("  WARNING: Pump is at Risk of Failure!\n");
        out.push_str(&format!("  Issues detected: {}\n", issues));
    } else {
        out.push_str("  Pump is Healthy & Stable.\n");
        out.push_str("  No immediate issues detected.\n");
    }
    out
}

// ---------------------------------------------------------------------------
// History table
// ---------------------------------------------------------------------------

pub fn render_table(records: &[HistoryRecord]) -> String {
    if records.is_empty() {
        return format!("{}\n", NO_HISTORY);
    }

    let mut out = format!(
        "{:>5}  {:>11}  {:>9}  {:>8}  {}\n",
        "#", "Temperature", "Vibration", "Pressure", "Prediction"
    );
    for (i, r) in records.iter().enumerate() {
        out.push_str(&format!(
            "{:>5}  {:>11.1}  {:>9.1}  {:>8.1}  {}\n",
            i,
            r.reading.temperature,
            r.reading.vibration,
            r.reading.pressure,
            r.prediction
        ));
    }
    out
}

// ---------------------------------------------------------------------------
// Trend chart
// ---------------------------------------------------------------------------

/// Render a sparkline from a series of values.
///
/// Uses Unicode block characters scaled to the range of the data. Only the
/// most recent `width` values are shown.
pub fn sparkline(values: &[f64], width: usize) -> String {
    if values.is_empty() || width == 0 {
        return String::new();
    }

    const SPARK_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

    let data = &values[values.len().saturating_sub(width)..];
    let min = data.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = data.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    data.iter()
        .map(|&v| {
            let normalized = if range == 0.0 { 0.5 } else { (v - min) / range };
            let idx = ((normalized * 7.0).round() as usize).min(7);
            SPARK_CHARS[idx]
        })
        .collect()
}

/// One labelled sparkline per sensor over the most recent `width` records.
/// The x-axis is record number; labels describe only the charted window.
pub fn render_trend(records: &[HistoryRecord], width: usize) -> String {
    if records.is_empty() {
        return format!("{}\n", NO_HISTORY);
    }

    let shown = records.len().min(width.max(1));
    let mut out = format!(
        "Sensor Trends (records {}..{})\n",
        records.len() - shown,
        records.len() - 1
    );
    for s in series(records) {
        let window = s.tail(shown);
        let (Some(min), Some(max), Some(last)) = (window.min(), window.max(), window.last()) else {
            continue;
        };
        out.push_str(&format!(
            "  {:<12} {}  min {:.1} max {:.1} last {:.1} {}\n",
            window.name,
            sparkline(&window.values, shown),
            min,
            max,
            last,
            window.unit
        ));
    }
    out
}
