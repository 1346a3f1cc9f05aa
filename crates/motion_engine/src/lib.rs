//! # Motion Engine
//!
//! Motion similarity and temporal alignment between a teacher and a student
//! keypoint sequence.
//!
//! Pipeline:
//! - `normalizer`: raw frame -> position/scale invariant `NormalizedPose`
//! - `similarity`: all-pairs `SimilarityMatrix` (rows = student, cols = teacher)
//! - `alignment`: best constant-offset diagonal run -> `AlignmentResult`
//! - `score`: per-frame display curve and running score for the renderer
//! - `smoother`: confidence-weighted temporal smoothing of raw frames (render only)
//!
//! Every function is pure and never prints; diagnostics go through `tracing`
//! spans at debug/trace level. The `MotionEngine` facade additionally records
//! `metrics` counters and histograms.
//!
//! ## Example
//!
//! ```ignore
//! use motion_engine::{EngineConfig, MotionEngine};
//!
//! let engine = MotionEngine::new(EngineConfig::default());
//! let outcome = engine.align(&teacher.frames, &student.frames)?;
//!
//! for (t, s) in outcome.alignment.frame_pairs() {
//!     let student_pose = engine.smooth(&student.frames, s)?;
//!     // draw ...
//! }
//! ```

pub mod alignment;
mod engine;
pub mod metric;
pub mod normalizer;
pub mod score;
pub mod similarity;
pub mod smoother;
mod weighted;

pub use alignment::{select, select_with_ceilings, FrameCeilings};
pub use engine::{AlignmentOutcome, MotionEngine};
pub use metric::{metric_from_config, GaussianKernelMetric, PoseMetric, WeightedCosineMetric};
pub use normalizer::{normalize, try_normalize};
pub use score::{build_score_track, score_curve, ScoreTracker};
pub use similarity::{build_matrix, normalize_sequence};
pub use smoother::{smooth, smooth_range, smooth_with_min_weight};
pub use weighted::WeightedMean;

// Re-export contracts types
pub use contracts::{
    AlignmentConfig, AlignmentResult, ContractError, EngineConfig, Frame, Joint, KeypointSequence,
    NormalizedPose, NormalizerConfig, ScoreConfig, ScoreSample, SequenceSide, SimilarityConfig,
    SimilarityMatrix, SmootherConfig,
};
