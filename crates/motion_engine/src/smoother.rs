//! Temporal keypoint smoother.
//!
//! Confidence-weighted moving average over a centred window, clamped at the
//! sequence boundaries. Only used to stabilise rendered keypoints; the
//! similarity path never sees smoothed frames.

use std::ops::Range;

use contracts::{ContractError, Frame, Joint};
use nalgebra::Vector2;
use rayon::prelude::*;

use crate::weighted::WeightedMean;

/// Frames of the window centred on `index`, clamped to `0..len`.
///
/// A window of `w` covers `(w - 1) / 2` frames before `index` and `w / 2`
/// after it. `w == 0` is treated as 1.
pub fn window_bounds(len: usize, index: usize, window: usize) -> Range<usize> {
    let window = window.max(1);
    let before = (window - 1) / 2;
    let after = window / 2;
    let lo = index.saturating_sub(before);
    let hi = index.saturating_add(after).saturating_add(1).min(len);
    lo..hi
}

/// Smoothed frame at `index` with no aggregate-weight floor
pub fn smooth(sequence: &[Frame], index: usize, window: usize) -> Result<Frame, ContractError> {
    smooth_with_min_weight(sequence, index, window, 0.0)
}

/// Smoothed frame at `index`.
///
/// Joints whose summed confidence over the window does not exceed
/// `min_weight` keep their raw value at `index`. The output keeps the target
/// frame's confidences.
pub fn smooth_with_min_weight(
    sequence: &[Frame],
    index: usize,
    window: usize,
    min_weight: f32,
) -> Result<Frame, ContractError> {
    let len = sequence.len();
    let target = sequence
        .get(index)
        .ok_or(ContractError::IndexOutOfRange { index, len })?;

    let bounds = window_bounds(len, index, window);
    if bounds.len() <= 1 {
        return Ok(*target);
    }
    let neighbours = &sequence[bounds];

    let mut out = *target;
    for (k, joint) in out.joints.iter_mut().enumerate() {
        let mut acc = WeightedMean::new(Vector2::<f64>::zeros());
        for frame in neighbours {
            let j = &frame.joints[k];
            if !(j.x.is_finite() && j.y.is_finite()) {
                continue;
            }
            acc.push(Vector2::new(j.x as f64, j.y as f64), j.confidence as f64);
        }
        if let Some(mean) = acc.mean(min_weight as f64) {
            *joint = Joint::new(mean.x as f32, mean.y as f32, joint.confidence);
        }
    }

    Ok(out)
}

/// Smoothed frames for `start..start + length`, in order.
///
/// Fails with `IndexOutOfRange` if the range leaves the sequence.
pub fn smooth_range(
    sequence: &[Frame],
    start: usize,
    length: usize,
    window: usize,
    min_weight: f32,
) -> Result<Vec<Frame>, ContractError> {
    let end = start.checked_add(length).unwrap_or(usize::MAX);
    if length > 0 && end > sequence.len() {
        return Err(ContractError::IndexOutOfRange {
            index: end - 1,
            len: sequence.len(),
        });
    }

    (start..end)
        .into_par_iter()
        .map(|index| smooth_with_min_weight(sequence, index, window, min_weight))
        .collect()
}
