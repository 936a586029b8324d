//! Error taxonomy for the compositing engine (spec §7).

use std::path::PathBuf;

use thiserror::Error;

/// A stable error taxonomy surfaced to job callers.
///
/// `InputInvalid` lines are usually recovered locally (discarded + logged)
/// and only propagate when a *required* artifact is unusable. Every other
/// variant is fatal to the job.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid input in {artifact}: {detail}")]
    InputInvalid { artifact: String, detail: String },

    #[error("missing frame asset: {path}")]
    AssetMissing { path: PathBuf },

    #[error("encoder failed: {detail}")]
    EncoderFailure { detail: String },

    #[error("job cancelled")]
    Cancelled,

    #[error("internal invariant violated: {detail}")]
    Internal { detail: String },
}

impl EngineError {
    pub fn input_invalid(artifact: impl Into<String>, detail: impl Into<String>) -> Self {
        EngineError::InputInvalid {
            artifact: artifact.into(),
            detail: detail.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        EngineError::Internal {
            detail: detail.into(),
        }
    }

    /// Whether this kind is always fatal to the enclosing job.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, EngineError::InputInvalid { .. })
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
