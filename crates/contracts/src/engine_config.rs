//! Motion engine configuration contracts that can be shared across crates.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Motion engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct EngineConfig {
    /// Keypoint normalizer
    #[serde(default)]
    #[validate(nested)]
    pub normalizer: NormalizerConfig,

    /// Frame similarity
    #[serde(default)]
    #[validate(nested)]
    pub similarity: SimilarityConfig,

    /// Alignment selector
    #[serde(default)]
    #[validate(nested)]
    pub alignment: AlignmentConfig,

    /// Temporal keypoint smoother
    #[serde(default)]
    #[validate(nested)]
    pub smoother: SmootherConfig,

    /// Score track
    #[serde(default)]
    #[validate(nested)]
    pub score: ScoreConfig,
}

/// Keypoint normalizer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Joints below this confidence are discarded
    #[validate(range(min = 0.0, max = 1.0))]
    pub confidence_threshold: f32,
    /// Fewer confident joints than this => no signal
    #[validate(range(min = 1, max = 17))]
    pub min_visible_joints: usize,
    /// Reference scale floor (image units)
    #[validate(range(exclusive_min = 0.0), custom(function = "validate_finite"))]
    pub min_scale: f32,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.3,
            min_visible_joints: 2,
            min_scale: 1e-4,
        }
    }
}

/// Similarity metric selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Confidence-weighted Gaussian kernel over joint distances
    #[default]
    Gaussian,
    /// Confidence-weighted cosine of the joint coordinate vectors
    Cosine,
}

/// Frame similarity configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SimilarityConfig {
    pub metric: MetricKind,
    /// Gaussian kernel coefficient k in exp(-k * d^2)
    #[validate(range(exclusive_min = 0.0), custom(function = "validate_finite"))]
    pub sharpness: f32,
    /// Also compare against the mirrored pose and keep the better match
    pub mirror_matching: bool,
    /// Penalize pairs that share few visible joints
    pub visibility_penalty: bool,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            metric: MetricKind::Gaussian,
            sharpness: 50.0,
            mirror_matching: true,
            visibility_penalty: true,
        }
    }
}

/// Alignment selector configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AlignmentConfig {
    /// Per-frame baseline subtracted before summing along a diagonal
    #[validate(range(min = 0.0, max = 1.0))]
    pub match_threshold: f32,
    /// Minimum segment length (frames)
    #[validate(range(min = 1))]
    pub min_length: usize,
    /// Diagonals overlapping less than this fraction of min(T, S) are skipped
    #[validate(range(min = 0.0, max = 1.0))]
    pub min_overlap_fraction: f32,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            match_threshold: 0.5,
            min_length: 3,
            min_overlap_fraction: 0.25,
        }
    }
}

/// Temporal smoother configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SmootherConfig {
    /// Centered window size (frames)
    #[validate(range(min = 1))]
    pub window: usize,
    /// Aggregate confidence below this falls back to the raw joint
    #[validate(range(min = 0.0), custom(function = "validate_finite"))]
    pub min_weight: f32,
}

impl Default for SmootherConfig {
    fn default() -> Self {
        Self {
            window: 5,
            min_weight: 1e-4,
        }
    }
}

/// Score track configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ScoreConfig {
    /// Max-pool width along the teacher axis for the display curve
    #[validate(range(min = 1))]
    pub pooling_window: usize,
    /// Points gained per unit of similarity per frame
    #[validate(range(min = 0.0), custom(function = "validate_finite_f64"))]
    pub points_per_frame: f64,
    /// Displayed score only advances in steps larger than this
    #[validate(range(min = 0.0), custom(function = "validate_finite_f64"))]
    pub display_step: f64,
    /// Lower bound of the emphasis factor
    #[validate(range(min = 0.0, max = 1.0))]
    pub min_emphasis: f32,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            pooling_window: 11,
            points_per_frame: 1000.0,
            display_step: 1500.0,
            min_emphasis: 0.4,
        }
    }
}

fn validate_finite(value: f32) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::new("not_finite"))
    }
}

fn validate_finite_f64(value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::new("not_finite"))
    }
}
