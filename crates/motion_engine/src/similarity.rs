//! Frame similarity matrix builder.
//!
//! Rows are student frames and columns teacher frames. Rows are filled in
//! parallel; each worker owns a disjoint row slice of the output buffer.

use contracts::{Frame, NormalizedPose, NormalizerConfig, SimilarityMatrix};
use rayon::prelude::*;
use tracing::instrument;

use crate::metric::PoseMetric;
use crate::normalizer::normalize;

/// Normalize every frame of a sequence (order preserved)
pub fn normalize_sequence(frames: &[Frame], config: &NormalizerConfig) -> Vec<NormalizedPose> {
    frames.par_iter().map(|frame| normalize(frame, config)).collect()
}

/// Similarity of one student/teacher pair.
///
/// With mirroring, the student is also compared against the mirrored teacher
/// and the better match wins.
#[inline]
pub fn pair_similarity(
    metric: &dyn PoseMetric,
    student: &NormalizedPose,
    teacher: &NormalizedPose,
    mirrored_teacher: Option<&NormalizedPose>,
) -> f32 {
    let direct = metric.similarity(student, teacher);
    match mirrored_teacher {
        Some(mirrored) => direct.max(metric.similarity(student, mirrored)),
        None => direct,
    }
}

/// Build the `student.len() x teacher.len()` similarity matrix.
///
/// Swapping the arguments yields the transpose, bit for bit.
#[instrument(
    level = "debug",
    name = "motion_engine.build_matrix",
    skip_all,
    fields(rows = student.len(), cols = teacher.len(), metric = metric.name())
)]
pub fn build_matrix(
    teacher: &[NormalizedPose],
    student: &[NormalizedPose],
    metric: &dyn PoseMetric,
    mirror_matching: bool,
) -> SimilarityMatrix {
    let rows = student.len();
    let cols = teacher.len();
    let mut matrix = SimilarityMatrix::zeros(rows, cols);
    if matrix.is_empty() {
        return matrix;
    }

    let mirrored: Option<Vec<NormalizedPose>> =
        mirror_matching.then(|| teacher.iter().map(NormalizedPose::mirrored).collect());

    matrix
        .as_mut_slice()
        .par_chunks_mut(cols)
        .zip(student.par_iter())
        .for_each(|(out, s)| {
            for (t, cell) in out.iter_mut().enumerate() {
                *cell = pair_similarity(
                    metric,
                    s,
                    &teacher[t],
                    mirrored.as_ref().map(|m| &m[t]),
                );
            }
        });

    matrix
}
