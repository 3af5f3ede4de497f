//! Error types for the estimation pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, EstimatorError>;

/// Errors raised by loading, training, persisting and estimating
#[derive(Debug, Error)]
pub enum EstimatorError {
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read listings: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to read parquet listings: {0}")]
    Parquet(#[from] polars::error::PolarsError),

    #[error("model artifact not found at {0:?}")]
    ArtifactNotFound(PathBuf),

    #[error("model artifact at {path:?} is corrupt: {reason}")]
    CorruptArtifact { path: PathBuf, reason: String },

    #[error("model artifact format version {found} is not supported (expected {expected})")]
    IncompatibleArtifact { found: u32, expected: u32 },

    #[error("failed to serialize model artifact: {0}")]
    Serialization(String),

    #[error("no complete listings available for training")]
    EmptyCorpus,

    #[error("unknown fuel type {0:?} (expected \"Essence\" or \"Diesel\")")]
    UnknownFuelType(String),

    #[error("invalid gearbox code {0:?} (expected 0 or 1)")]
    InvalidGearbox(String),

    #[error("invalid {field}: {value} (expected a finite, non-negative number)")]
    InvalidAttribute { field: String, value: String },

    #[error("{column} {value:?} was not present in the training data")]
    UnseenCategory { column: String, value: String },

    #[error("shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },

    #[error("insufficient data: {0}")]
    InsufficientData(String),

    #[error("model is not fitted")]
    ModelNotFitted,

    #[error("estimator service is not initialized")]
    NotInitialized,
}

impl EstimatorError {
    /// Wrap an I/O error with the path it occurred on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::CorruptArtifact {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// True when the error means "no artifact on disk yet"
    pub fn is_artifact_not_found(&self) -> bool {
        matches!(self, Self::ArtifactNotFound(_))
    }
}

/// Failure of the two-state service initialization
#[derive(Debug, Error)]
pub enum InitError {
    #[error("failed to load model artifact: {0}")]
    LoadFailed(#[source] EstimatorError),

    #[error("failed to train a fresh model: {0}")]
    TrainingFailed(#[source] EstimatorError),
}
