//! Confidence-weighted aggregation shared by the similarity metrics and the smoother.
//!
//! Every zero-weight edge case goes through `WeightedMean::mean`, which returns
//! `None` instead of dividing by (near) zero.

use std::ops::{Add, Div, Mul};

use contracts::{FLIP_INDEX, JOINT_COUNT};

/// Running weighted mean `Σ w·x / Σ w`
///
/// Contributions with non-positive or non-finite weight are ignored.
#[derive(Debug, Clone, Copy)]
pub struct WeightedMean<T> {
    weighted_sum: T,
    total_weight: f64,
    contributors: usize,
}

impl<T> WeightedMean<T>
where
    T: Copy + Add<Output = T> + Mul<f64, Output = T> + Div<f64, Output = T>,
{
    /// Start from the additive identity of `T`
    pub fn new(zero: T) -> Self {
        Self {
            weighted_sum: zero,
            total_weight: 0.0,
            contributors: 0,
        }
    }

    #[inline]
    fn accepts(weight: f64) -> bool {
        weight.is_finite() && weight > 0.0
    }

    /// Add one value with its weight
    #[inline]
    pub fn push(&mut self, value: T, weight: f64) {
        if !Self::accepts(weight) {
            return;
        }
        self.weighted_sum = self.weighted_sum + value * weight;
        self.total_weight += weight;
        self.contributors += 1;
    }

    /// Add two contributions as one group.
    ///
    /// The pair is combined before touching the running totals, so
    /// `push_pair(a, b)` and `push_pair(b, a)` produce bit-identical state.
    #[inline]
    pub fn push_pair(&mut self, a: (T, f64), b: (T, f64)) {
        match (Self::accepts(a.1), Self::accepts(b.1)) {
            (true, true) => {
                self.weighted_sum = self.weighted_sum + (a.0 * a.1 + b.0 * b.1);
                self.total_weight += a.1 + b.1;
                self.contributors += 2;
            }
            (true, false) => self.push(a.0, a.1),
            (false, true) => self.push(b.0, b.1),
            (false, false) => {}
        }
    }

    /// `Σ w·x`
    pub fn weighted_sum(&self) -> T {
        self.weighted_sum
    }

    /// `Σ w`
    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    /// Number of accepted contributions
    pub fn contributors(&self) -> usize {
        self.contributors
    }

    /// Weighted mean, or `None` when the total weight is zero or below `min_weight`
    pub fn mean(&self, min_weight: f64) -> Option<T> {
        if self.total_weight <= 0.0 || self.total_weight < min_weight {
            return None;
        }
        Some(self.weighted_sum / self.total_weight)
    }
}

/// Joint groups closed under mirroring: `(k, FLIP_INDEX[k])` with `k <= FLIP_INDEX[k]`.
///
/// Centre joints appear as `(k, k)`.
pub fn mirror_groups() -> impl Iterator<Item = (usize, usize)> {
    (0..JOINT_COUNT)
        .filter(|&k| k <= FLIP_INDEX[k])
        .map(|k| (k, FLIP_INDEX[k]))
}

/// Fold per-joint `(value, weight)` terms in mirror-group order.
///
/// Summing in this order makes the result independent of which side of a
/// left/right pair a term was computed at, which is what keeps mirrored
/// similarity exactly symmetric.
pub fn accumulate_by_mirror_group<T>(acc: &mut WeightedMean<T>, terms: &[(T, f64); JOINT_COUNT])
where
    T: Copy + Add<Output = T> + Mul<f64, Output = T> + Div<f64, Output = T>,
{
    for (left, right) in mirror_groups() {
        if left == right {
            acc.push(terms[left].0, terms[left].1);
        } else {
            acc.push_pair(terms[left], terms[right]);
        }
    }
}
