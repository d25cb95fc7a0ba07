//! Append-only prediction history
//!
//! `HistoryStore` is the only contract the rest of the system sees:
//! `append` one record, `read_all` in insertion order. `CsvHistoryStore`
//! keeps the log as a flat CSV file:
//!
//! ```text
//! Temperature,Vibration,Pressure,Prediction
//! 75.0,10.0,50.0,Failure Risk
//! 50.0,2.0,50.0,Healthy
//! ```
//!
//! A single writer is assumed. Concurrent writers to the same file are not
//! supported and no file locking is done.

use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::HistoryError;
use crate::models::{HealthStatus, HistoryRecord, SensorReading};

/// Header row written when the log file is created.
pub const CSV_HEADER: &str = "Temperature,Vibration,Pressure,Prediction";

const COLUMNS: [&str; 4] = ["Temperature", "Vibration", "Pressure", "Prediction"];

pub trait HistoryStore {
    /// Add `record` after the last stored record.
    fn append(&mut self, record: &HistoryRecord) -> Result<(), HistoryError>;

    /// Every stored record in insertion order. An empty or missing store
    /// yields an empty vector.
    fn read_all(&self) -> Result<Vec<HistoryRecord>, HistoryError>;
}

// ============================================================================
// In-memory store
// ============================================================================

/// Volatile store, used where no persistence is wanted.
#[derive(Debug, Default, Clone)]
pub struct MemoryHistoryStore {
    records: Vec<HistoryRecord>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn append(&mut self, record: &HistoryRecord) -> Result<(), HistoryError> {
        self.records.push(*record);
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<HistoryRecord>, HistoryError> {
        Ok(self.records.clone())
    }
}

// ============================================================================
// CSV store
// ============================================================================

#[derive(Debug, Clone)]
pub struct CsvHistoryStore {
    path: PathBuf,
}

impl CsvHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> HistoryError {
        HistoryError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }

    /// True when the file has content and its last byte is not a newline.
    fn needs_leading_newline(file: &mut File, len: u64) -> std::io::Result<bool> {
        if len == 0 {
            return Ok(false);
        }
        file.seek(SeekFrom::Start(len - 1))?;
        let mut last = [0u8; 1];
        file.read_exact(&mut last)?;
        Ok(last[0] != b'\n')
    }

    /// True when the file holds anything besides whitespace. A valid log
    /// answers on its first byte.
    fn has_content(file: &mut File) -> std::io::Result<bool> {
        file.seek(SeekFrom::Start(0))?;
        for byte in BufReader::new(file).bytes() {
            if !byte?.is_ascii_whitespace() {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Format one record as a CSV line (no trailing newline).
///
/// Floats use their shortest round-trip form and always carry a decimal
/// point for integral values (`75.0`, not `75`).
pub fn format_row(record: &HistoryRecord) -> String {
    format!(
        "{:?},{:?},{:?},{}",
        record.reading.temperature,
        record.reading.vibration,
        record.reading.pressure,
        record.prediction.as_str()
    )
}

impl HistoryStore for CsvHistoryStore {
    fn append(&mut self, record: &HistoryRecord) -> Result<(), HistoryError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;
        let len = file.metadata().map_err(|e| self.io_error(e))?.len();

        let mut out = String::new();
        if Self::needs_leading_newline(&mut file, len).map_err(|e| self.io_error(e))? {
            out.push('\n');
        }
        // Blank files are treated as new: the header goes first.
        if !Self::has_content(&mut file).map_err(|e| self.io_error(e))? {
            out.push_str(CSV_HEADER);
            out.push('\n');
        }
        out.push_str(&format_row(record));
        out.push('\n');

        file.write_all(out.as_bytes()).map_err(|e| self.io_error(e))?;

        tracing::info!(
            "Appended {} reading to {}",
            record.prediction,
            self.path.display()
        );
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<HistoryRecord>, HistoryError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error(e)),
        };
        parse_log(&text)
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Parse a full log. Columns are located by header name so extra or
/// reordered columns are tolerated.
pub fn parse_log(text: &str) -> Result<Vec<HistoryRecord>, HistoryError> {
    let mut lines = text
        .lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty());

    let Some((_, header_line)) = lines.next() else {
        return Ok(Vec::new());
    };
    let headers: Vec<String> = parse_csv_line(header_line.trim_start_matches('\u{feff}'))
        .into_iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut index = [0usize; 4];
    for (slot, name) in index.iter_mut().zip(COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h == name)
            .ok_or(HistoryError::MissingColumn(name))?;
    }

    let mut records = Vec::new();
    for (i, line) in lines {
        let line_no = i + 1;
        let values = parse_csv_line(line);
        let field = |col: usize| -> Result<&str, HistoryError> {
            values
                .get(index[col])
                .map(|s| s.trim())
                .ok_or_else(|| HistoryError::Malformed {
                    line: line_no,
                    reason: format!("missing {} value", COLUMNS[col]),
                })
        };
        let number = |col: usize| -> Result<f64, HistoryError> {
            let raw = field(col)?;
            raw.parse::<f64>().map_err(|_| HistoryError::Malformed {
                line: line_no,
                reason: format!("{} '{}' is not a number", COLUMNS[col], raw),
            })
        };

        let reading = SensorReading::new(number(0)?, number(1)?, number(2)?);
        let prediction: HealthStatus =
            field(3)?
                .parse()
                .map_err(|reason| HistoryError::Malformed {
                    line: line_no,
                    reason,
                })?;
        records.push(HistoryRecord::new(reading, prediction));
    }

    Ok(records)
}

fn parse_csv_line(line: &str) -> Vec<String> {
    let mut result = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            if ch == '"' {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                current.push(ch);
            }
        } else if ch == '"' {
            in_quotes = true;
        } else if ch == ',' {
            result.push(std::mem::take(&mut current));
        } else {
            current.push(ch);
        }
    }
    result.push(current);
    result
}
