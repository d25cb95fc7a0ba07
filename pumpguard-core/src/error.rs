use thiserror::Error;

/// Failures loading or persisting the model artifact.
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt artifact at {path}: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unsupported artifact version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}

/// Failures while evaluating a reading with the active risk model.
#[derive(Error, Debug, PartialEq)]
pub enum ClassifyError {
    #[error("Learned model expects {expected} weights, got {actual}")]
    WeightCount { expected: usize, actual: usize },

    #[error("Model produced a non-finite score: {0}")]
    NonFiniteScore(f64),
}

/// Failures reading or appending the history log.
#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("History log is missing the '{0}' column")]
    MissingColumn(&'static str),

    #[error("Malformed history row at line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}
