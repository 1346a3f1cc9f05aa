//! Keypoint normalizer.
//!
//! Maps a raw frame to a position/scale invariant pose: confident joints are
//! expressed relative to the centre of their bounding box and divided by the
//! box's larger side.

use contracts::{ContractError, DegenerateReason, Frame, NormalizedPose, NormalizerConfig, JOINT_COUNT};
use nalgebra::Vector2;

/// Normalize a frame, returning `DegenerateFrame` when it carries no usable signal
pub fn try_normalize(frame: &Frame, config: &NormalizerConfig) -> Result<NormalizedPose, ContractError> {
    let mut visible = [false; JOINT_COUNT];
    let mut lower = Vector2::repeat(f64::INFINITY);
    let mut upper = Vector2::repeat(f64::NEG_INFINITY);
    let mut count = 0usize;

    for (k, joint) in frame.joints.iter().enumerate() {
        let usable = joint.confidence.is_finite()
            && joint.confidence > 0.0
            && joint.confidence >= config.confidence_threshold
            && joint.x.is_finite()
            && joint.y.is_finite();
        if !usable {
            continue;
        }
        let p = Vector2::new(joint.x as f64, joint.y as f64);
        lower = lower.inf(&p);
        upper = upper.sup(&p);
        visible[k] = true;
        count += 1;
    }

    let required = config.min_visible_joints.max(1);
    if count < required {
        return Err(ContractError::DegenerateFrame {
            reason: DegenerateReason::TooFewJoints {
                visible: count,
                required,
            },
        });
    }

    let extent = upper - lower;
    let scale = extent.x.max(extent.y);
    // Negated comparison so NaN lands here too
    if !(scale >= config.min_scale as f64) {
        return Err(ContractError::DegenerateFrame {
            reason: DegenerateReason::ZeroScale { scale: scale as f32 },
        });
    }

    let origin = (lower + upper) * 0.5;
    let mut coords = [[0.0f32; 2]; JOINT_COUNT];
    let mut weights = [0.0f32; JOINT_COUNT];
    for (k, joint) in frame.joints.iter().enumerate() {
        if !visible[k] {
            continue;
        }
        let p = (Vector2::new(joint.x as f64, joint.y as f64) - origin) / scale;
        coords[k] = [p.x as f32, p.y as f32];
        weights[k] = joint.confidence;
    }

    Ok(NormalizedPose::new(coords, weights))
}

/// Normalize a frame, substituting the "no signal" sentinel for degenerate frames
pub fn normalize(frame: &Frame, config: &NormalizerConfig) -> NormalizedPose {
    try_normalize(frame, config).unwrap_or_else(|_| NormalizedPose::no_signal())
}
