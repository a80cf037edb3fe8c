//! Error types returned at the boundary of the crate.
use crate::metrics::ComputationError;
use thiserror::Error;

/// Result type for the evaluation entrypoints.
pub type Result<T> = std::result::Result<T, EvalError>;

/// Fatal failures of an evaluation run. Record-level problems (a record missing a field, a text
/// carrying more than one mention) are not errors: they are logged and the record is dropped or
/// passed through.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum EvalError {
    /// The annotation source could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The annotation source is not valid JSON.
    #[error("Could not parse the annotations as JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The JSON document does not have a supported shape.
    #[error("Unsupported annotation document: {0}")]
    UnsupportedShape(String),

    /// The record collection of the document is empty.
    #[error("The annotation collection is empty")]
    EmptyCollection,

    /// Every record of the collection was rejected.
    #[error("No usable annotation record found ({skipped} records skipped)")]
    NoUsableRecords { skipped: usize },

    /// No text of the ground truth is also present in the submission.
    #[error("The ground truth and the submission share no annotated text")]
    NoOverlap,

    /// The metrics could not be computed.
    #[error(transparent)]
    Computation(#[from] ComputationError),
}

impl EvalError {
    pub(crate) fn unsupported_shape(msg: impl Into<String>) -> Self {
        EvalError::UnsupportedShape(msg.into())
    }
}
