//! Layered error definitions
//!
//! Categorized by source: engine / config / keypoint io

use std::fmt;
use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Engine Errors =====
    /// Frame has no usable reference scale
    #[error("degenerate frame: {reason}")]
    DegenerateFrame { reason: DegenerateReason },

    /// Teacher or student sequence has no frames
    #[error("empty {which} sequence")]
    EmptySequence { which: SequenceSide },

    /// No segment satisfies the minimum-length policy
    #[error(
        "no feasible alignment: teacher={teacher_len} frames, student={student_len} frames, min_length={min_length}"
    )]
    NoFeasibleAlignment {
        teacher_len: usize,
        student_len: usize,
        min_length: usize,
    },

    /// Frame index outside the sequence
    #[error("frame index {index} out of range for sequence of {len} frames")]
    IndexOutOfRange { index: usize, len: usize },

    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Keypoint IO Errors =====
    /// Keypoint file could not be decoded
    #[error("keypoint file '{path}': {message}")]
    KeypointFormat { path: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Why a frame could not be normalized
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DegenerateReason {
    /// Fewer confident joints than required
    TooFewJoints { visible: usize, required: usize },
    /// Reference scale is zero or below the configured floor
    ZeroScale { scale: f32 },
}

impl fmt::Display for DegenerateReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewJoints { visible, required } => {
                write!(f, "{visible} confident joints, need {required}")
            }
            Self::ZeroScale { scale } => write!(f, "reference scale {scale} too small"),
        }
    }
}

/// Which input sequence an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceSide {
    Teacher,
    Student,
}

impl SequenceSide {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Teacher => "teacher",
            Self::Student => "student",
        }
    }
}

impl fmt::Display for SequenceSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create keypoint format error
    pub fn keypoint_format(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::KeypointFormat {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create empty sequence error
    pub fn empty_sequence(which: SequenceSide) -> Self {
        Self::EmptySequence { which }
    }
}
