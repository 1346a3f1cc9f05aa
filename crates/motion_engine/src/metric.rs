//! Pose similarity metrics.
//!
//! A metric maps two normalized poses to `[0, 1]`. Implementations must be
//! symmetric (`similarity(a, b) == similarity(b, a)`, bit for bit), give their
//! maximum for a pose against itself and return 0 against the no-signal
//! sentinel.

use std::fmt;

use contracts::{MetricKind, NormalizedPose, SimilarityConfig, JOINT_COUNT};

use crate::weighted::{accumulate_by_mirror_group, WeightedMean};

/// Pluggable pose similarity strategy
pub trait PoseMetric: Send + Sync + fmt::Debug {
    /// Short identifier used in logs and metrics
    fn name(&self) -> &'static str;

    /// Similarity in `[0, 1]`
    fn similarity(&self, a: &NormalizedPose, b: &NormalizedPose) -> f32;
}

/// Build the metric selected by the configuration
pub fn metric_from_config(config: &SimilarityConfig) -> Box<dyn PoseMetric> {
    match config.metric {
        MetricKind::Gaussian => Box::new(GaussianKernelMetric {
            sharpness: config.sharpness as f64,
            visibility_penalty: config.visibility_penalty,
        }),
        MetricKind::Cosine => Box::new(WeightedCosineMetric {
            visibility_penalty: config.visibility_penalty,
        }),
    }
}

/// Penalty for pairs that share few visible joints
///
/// `ln(max(1, 1 + 10(n-1))) / ln(1 + 10(J-1))`: 0 for one shared joint, 1 for all.
pub fn visibility_factor(shared: usize) -> f64 {
    let numerator = (1.0 + 10.0 * (shared as f64 - 1.0)).max(1.0).ln();
    let denominator = (1.0 + 10.0 * (JOINT_COUNT as f64 - 1.0)).ln();
    numerator / denominator
}

/// Per-joint pair weight (product of both confidences) and shared joint count
fn pair_weights(a: &NormalizedPose, b: &NormalizedPose) -> ([f64; JOINT_COUNT], usize) {
    let mut weights = [0.0f64; JOINT_COUNT];
    let mut shared = 0;
    for (k, w) in weights.iter_mut().enumerate() {
        let wa = a.weight(k) as f64;
        let wb = b.weight(k) as f64;
        if wa > 0.0 && wb > 0.0 {
            *w = wa * wb;
            shared += 1;
        }
    }
    (weights, shared)
}

/// Confidence-weighted mean of `exp(-k * |a_j - b_j|^2)` over shared joints
#[derive(Debug, Clone)]
pub struct GaussianKernelMetric {
    /// Kernel coefficient `k`
    pub sharpness: f64,
    /// Scale by [`visibility_factor`]
    pub visibility_penalty: bool,
}

impl Default for GaussianKernelMetric {
    fn default() -> Self {
        Self {
            sharpness: 50.0,
            visibility_penalty: true,
        }
    }
}

impl PoseMetric for GaussianKernelMetric {
    fn name(&self) -> &'static str {
        "gaussian"
    }

    fn similarity(&self, a: &NormalizedPose, b: &NormalizedPose) -> f32 {
        let (weights, shared) = pair_weights(a, b);
        if shared == 0 {
            return 0.0;
        }

        let mut terms = [(0.0f64, 0.0f64); JOINT_COUNT];
        for (k, term) in terms.iter_mut().enumerate() {
            if weights[k] == 0.0 {
                continue;
            }
            let [ax, ay] = a.coord(k);
            let [bx, by] = b.coord(k);
            let dx = ax as f64 - bx as f64;
            let dy = ay as f64 - by as f64;
            *term = ((-self.sharpness * (dx * dx + dy * dy)).exp(), weights[k]);
        }

        let mut acc = WeightedMean::new(0.0f64);
        accumulate_by_mirror_group(&mut acc, &terms);
        let Some(mean) = acc.mean(0.0) else {
            return 0.0;
        };

        let factor = if self.visibility_penalty {
            visibility_factor(shared)
        } else {
            1.0
        };
        (mean * factor).clamp(0.0, 1.0) as f32
    }
}

/// `(1 + cos) / 2` of the confidence-weighted joint coordinate vectors
#[derive(Debug, Clone, Default)]
pub struct WeightedCosineMetric {
    /// Scale by [`visibility_factor`]
    pub visibility_penalty: bool,
}

impl PoseMetric for WeightedCosineMetric {
    fn name(&self) -> &'static str {
        "cosine"
    }

    fn similarity(&self, a: &NormalizedPose, b: &NormalizedPose) -> f32 {
        let (weights, shared) = pair_weights(a, b);
        if shared == 0 {
            return 0.0;
        }

        let mut dot = [(0.0f64, 0.0f64); JOINT_COUNT];
        let mut norm_a = [(0.0f64, 0.0f64); JOINT_COUNT];
        let mut norm_b = [(0.0f64, 0.0f64); JOINT_COUNT];
        for k in 0..JOINT_COUNT {
            let w = weights[k];
            if w == 0.0 {
                continue;
            }
            let [ax, ay] = a.coord(k);
            let [bx, by] = b.coord(k);
            let (ax, ay, bx, by) = (ax as f64, ay as f64, bx as f64, by as f64);
            dot[k] = (ax * bx + ay * by, w);
            norm_a[k] = (ax * ax + ay * ay, w);
            norm_b[k] = (bx * bx + by * by, w);
        }

        let mut acc_dot = WeightedMean::new(0.0f64);
        let mut acc_a = WeightedMean::new(0.0f64);
        let mut acc_b = WeightedMean::new(0.0f64);
        accumulate_by_mirror_group(&mut acc_dot, &dot);
        accumulate_by_mirror_group(&mut acc_a, &norm_a);
        accumulate_by_mirror_group(&mut acc_b, &norm_b);

        let denominator = acc_a.weighted_sum().sqrt() * acc_b.weighted_sum().sqrt();
        if !(denominator > f64::EPSILON) {
            return 0.0;
        }
        let cos = (acc_dot.weighted_sum() / denominator).clamp(-1.0, 1.0);

        let factor = if self.visibility_penalty {
            visibility_factor(shared)
        } else {
            1.0
        };
        ((1.0 + cos) * 0.5 * factor).clamp(0.0, 1.0) as f32
    }
}
