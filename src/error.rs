//! Error types for the counting, matrix and clustering stages

use thiserror::Error;

/// Errors raised at the boundary of the stage that detects them
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error("count aggregation: invalid vocabulary: {reason}")]
    InvalidVocabulary { reason: String },

    #[error("{stage}: dimension mismatch, expected {expected} but found {actual}")]
    DimensionMismatch {
        stage: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("adjacency matrix must be square, got {rows}x{cols}")]
    NonSquareMatrix { rows: usize, cols: usize },

    #[error("count cache: malformed pair key {0:?}")]
    InvalidPairKey(String),

    #[error("clustering cancelled after {completed_powers} matrix powers")]
    Cancelled { completed_powers: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
