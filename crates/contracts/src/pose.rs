//! NormalizedPose - Normalizer output
//!
//! Position/scale invariant pose used by the similarity metrics.

use serde::{Deserialize, Serialize};

use crate::{FLIP_INDEX, JOINT_COUNT};

/// Canonical pose of one frame
///
/// Coordinates are relative to the frame's reference origin and divided by
/// its reference scale. Each joint carries a weight (its confidence, or 0 if
/// it was discarded). A pose whose weights are all zero is the "no signal"
/// sentinel: nothing to compare against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPose {
    coords: [[f32; 2]; JOINT_COUNT],
    weights: [f32; JOINT_COUNT],
}

impl NormalizedPose {
    /// Build a pose from canonical coordinates and per-joint weights.
    ///
    /// Non-finite or negative weights are stored as 0.
    pub fn new(coords: [[f32; 2]; JOINT_COUNT], weights: [f32; JOINT_COUNT]) -> Self {
        let mut weights = weights;
        for w in &mut weights {
            if !w.is_finite() || *w < 0.0 {
                *w = 0.0;
            }
        }
        Self { coords, weights }
    }

    /// The "no signal" sentinel
    pub const fn no_signal() -> Self {
        Self {
            coords: [[0.0; 2]; JOINT_COUNT],
            weights: [0.0; JOINT_COUNT],
        }
    }

    pub fn is_no_signal(&self) -> bool {
        self.weights.iter().all(|&w| w == 0.0)
    }

    #[inline]
    pub fn coord(&self, joint: usize) -> [f32; 2] {
        self.coords[joint]
    }

    #[inline]
    pub fn weight(&self, joint: usize) -> f32 {
        self.weights[joint]
    }

    pub fn coords(&self) -> &[[f32; 2]; JOINT_COUNT] {
        &self.coords
    }

    pub fn weights(&self) -> &[f32; JOINT_COUNT] {
        &self.weights
    }

    /// Number of joints with non-zero weight
    pub fn visible_count(&self) -> usize {
        self.weights.iter().filter(|&&w| w > 0.0).count()
    }

    /// Horizontally mirrored pose: x negated, left/right joints swapped
    pub fn mirrored(&self) -> Self {
        let mut coords = [[0.0; 2]; JOINT_COUNT];
        let mut weights = [0.0; JOINT_COUNT];
        for (k, &src) in FLIP_INDEX.iter().enumerate() {
            let [x, y] = self.coords[src];
            coords[k] = [-x, y];
            weights[k] = self.weights[src];
        }
        Self { coords, weights }
    }
}

impl Default for NormalizedPose {
    fn default() -> Self {
        Self::no_signal()
    }
}
