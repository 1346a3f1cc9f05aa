//! # Contracts
//!
//! Frozen interface contracts, defining inter-module data structures and errors.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Sequences are indexed by integer frame number at a fixed 30 fps timebase
//! - Teacher and student sequences are timed independently; alignment is a
//!   constant frame offset `student - teacher`
//!
//! ## Matrix Orientation
//! - `SimilarityMatrix` rows are student frames, columns are teacher frames

mod alignment;
mod engine_config;
mod error;
mod keypoint;
mod matrix;
mod pose;

pub use alignment::*;
pub use engine_config::*;
pub use error::*;
pub use keypoint::*;
pub use matrix::SimilarityMatrix;
pub use pose::NormalizedPose;
