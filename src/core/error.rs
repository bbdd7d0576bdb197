//! Error types for SVM training and classification

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SVMError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Unknown kernel: {0}")]
    UnknownKernel(String),

    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),

    #[error("Class {class} has {count} example(s), at least 2 are required")]
    InsufficientExamples { class: i32, count: usize },

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Empty dataset")]
    EmptyDataset,

    /// Aborts the whole training call; no partially trained model is returned.
    #[error("Numerical degeneracy in subproblem {subproblem}: {message}")]
    NumericalDegeneracy { subproblem: usize, message: String },

    /// Training was stopped through a cancellation token.
    #[error("Training cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl SVMError {
    /// True for invalid-input errors reported before optimization starts
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            SVMError::InvalidParameter(_)
                | SVMError::UnknownKernel(_)
                | SVMError::InvalidDataset(_)
                | SVMError::InsufficientExamples { .. }
                | SVMError::DimensionMismatch { .. }
                | SVMError::EmptyDataset
        )
    }

    /// True if training was aborted on request rather than failing
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SVMError::Cancelled)
    }
}

pub type Result<T> = std::result::Result<T, SVMError>;
