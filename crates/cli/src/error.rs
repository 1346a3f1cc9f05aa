//! Error types for CLI operations.

use contracts::{ContractError, SequenceSide};
use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Keypoint input not found
    #[error("Keypoint input not found: {path}")]
    KeypointsNotFound { path: String },

    /// No cached keypoints for a video and no extractor available
    #[error("No cached keypoints for video {video} (expected {cache}); run the pose extractor first")]
    NotExtracted { video: String, cache: String },

    /// Sequences sampled at different rates
    #[error("Frame rates differ (teacher {teacher} fps, student {student} fps); resample before aligning")]
    FpsMismatch { teacher: f64, student: f64 },

    /// Sequence not at the engine's time base
    #[error("{which} keypoints are at {fps} fps, expected {expected} fps; resample before aligning")]
    UnsupportedFps {
        which: SequenceSide,
        fps: f64,
        expected: f64,
    },

    /// One side carries no frames
    #[error("No motion provided: the {which} sequence has no frames")]
    NoMotion { which: SequenceSide },

    /// Nothing aligned well enough
    #[error("Videos too short or too dissimilar to align ({message})")]
    NoMatch { message: String },

    /// Engine failure
    #[error(transparent)]
    Engine(ContractError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn keypoints_not_found(path: impl Into<String>) -> Self {
        Self::KeypointsNotFound { path: path.into() }
    }
}

impl From<ContractError> for CliError {
    fn from(err: ContractError) -> Self {
        match err {
            ContractError::EmptySequence { which } => Self::NoMotion { which },
            e @ ContractError::NoFeasibleAlignment { .. } => Self::NoMatch {
                message: e.to_string(),
            },
            other => Self::Engine(other),
        }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
