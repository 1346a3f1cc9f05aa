//! Alignment selector.
//!
//! Scans every constant-offset diagonal of the similarity matrix for the
//! contiguous run maximising `Σ (s_i - θ_i)` with at least `min_length`
//! frames. `θ_i` is `match_threshold`, capped by the best self-similarity the
//! two frames of the cell can reach: a cell whose frames both lack the joints
//! to reach the threshold (two no-signal frames, two sparse detections) is
//! neutral instead of penalised. Diagonals are scanned in parallel; the
//! reduction is a sequential fold over offsets so the result does not depend
//! on scheduling.
//!
//! Ordering between candidates: higher score, then longer, then smaller
//! `|offset|`, then earlier teacher start, then earlier student start.

use std::cmp::Ordering;

use contracts::{AlignmentConfig, AlignmentResult, ContractError, SequenceSide, SimilarityMatrix};
use rayon::prelude::*;
use tracing::{instrument, trace};

/// Best run found on one diagonal
#[derive(Debug, Clone, PartialEq)]
struct Candidate {
    offset: i64,
    teacher_start: usize,
    student_start: usize,
    length: usize,
    score: f64,
}

impl Candidate {
    /// `Ordering::Greater` when `self` should win over `other`
    fn rank(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then(self.length.cmp(&other.length))
            .then(other.offset.unsigned_abs().cmp(&self.offset.unsigned_abs()))
            .then(other.teacher_start.cmp(&self.teacher_start))
            .then(other.student_start.cmp(&self.student_start))
    }
}

/// Per-frame similarity ceilings, usually each pose scored against itself
#[derive(Debug, Clone, Copy)]
pub struct FrameCeilings<'a> {
    pub teacher: &'a [f32],
    pub student: &'a [f32],
}

/// Threshold applied to each cell
struct Thresholds<'a> {
    base: f64,
    ceilings: Option<FrameCeilings<'a>>,
}

impl Thresholds<'_> {
    #[inline]
    fn at(&self, student: usize, teacher: usize) -> f64 {
        match self.ceilings {
            Some(c) => self
                .base
                .min(sanitize(c.teacher[teacher]).max(sanitize(c.student[student]))),
            None => self.base,
        }
    }
}

#[inline]
fn sanitize(value: f32) -> f64 {
    if value.is_finite() {
        value as f64
    } else {
        0.0
    }
}

/// Best run of `gains` as `(start, length)`
fn best_run(gains: &[f64], min_length: usize) -> Option<(usize, usize)> {
    let n = gains.len();
    if n < min_length {
        return None;
    }

    let mut prefix = Vec::with_capacity(n + 1);
    prefix.push(0.0f64);
    for &g in gains {
        let last = prefix[prefix.len() - 1];
        prefix.push(last + g);
    }

    // Earliest start with the smallest prefix among those leaving room for min_length
    let mut min_start = 0usize;
    let mut best: Option<(f64, usize, usize)> = None;
    for end in min_length..=n {
        let candidate_start = end - min_length;
        if prefix[candidate_start] < prefix[min_start] {
            min_start = candidate_start;
        }
        let value = prefix[end] - prefix[min_start];
        let len = end - min_start;
        let better = match best {
            None => true,
            Some((best_value, best_start, best_len)) => value
                .total_cmp(&best_value)
                .then(len.cmp(&best_len))
                .then(best_start.cmp(&min_start))
                .is_gt(),
        };
        if better {
            best = Some((value, min_start, len));
        }
    }

    best.map(|(_, start, len)| (start, len))
}

fn scan_diagonal(
    matrix: &SimilarityMatrix,
    offset: i64,
    thresholds: &Thresholds<'_>,
    min_length: usize,
    min_overlap: usize,
) -> Option<Candidate> {
    let (first_teacher, len) = matrix.diagonal_span(offset);
    if len < min_length || len < min_overlap {
        return None;
    }

    let gains: Vec<f64> = (0..len)
        .map(|i| {
            let t = first_teacher + i;
            let s = (t as i64 + offset) as usize;
            sanitize(matrix.get(s, t)) - thresholds.at(s, t)
        })
        .collect();
    let (start, length) = best_run(&gains, min_length)?;
    // Left to right from the run start so equal runs on different diagonals compare bit-equal
    let score = gains[start..start + length].iter().fold(0.0, |acc, g| acc + g);
    if score < 0.0 {
        return None;
    }

    let teacher_start = first_teacher + start;
    let student_start = (teacher_start as i64 + offset) as usize;
    trace!(offset, teacher_start, student_start, length, score, "diagonal candidate");
    Some(Candidate {
        offset,
        teacher_start,
        student_start,
        length,
        score,
    })
}

/// Select the best constant-offset segment of `matrix` (rows = student, cols = teacher).
///
/// Fails with `EmptySequence` when either side has no frames and with
/// `NoFeasibleAlignment` when no run of at least `min_length` frames reaches
/// the match threshold on average.
pub fn select(matrix: &SimilarityMatrix, config: &AlignmentConfig) -> Result<AlignmentResult, ContractError> {
    select_inner(matrix, None, config)
}

/// Like [`select`], with the threshold of each cell capped by the larger of
/// its two frame ceilings.
///
/// A ceiling slice whose length does not match its matrix axis is rejected.
pub fn select_with_ceilings(
    matrix: &SimilarityMatrix,
    ceilings: FrameCeilings<'_>,
    config: &AlignmentConfig,
) -> Result<AlignmentResult, ContractError> {
    if ceilings.teacher.len() != matrix.cols() || ceilings.student.len() != matrix.rows() {
        return Err(ContractError::Other(format!(
            "frame ceilings ({} teacher, {} student) do not match a {}x{} similarity matrix",
            ceilings.teacher.len(),
            ceilings.student.len(),
            matrix.rows(),
            matrix.cols()
        )));
    }
    select_inner(matrix, Some(ceilings), config)
}

#[instrument(
    level = "debug",
    name = "motion_engine.select",
    skip_all,
    fields(rows = matrix.rows(), cols = matrix.cols(), capped = ceilings.is_some())
)]
fn select_inner(
    matrix: &SimilarityMatrix,
    ceilings: Option<FrameCeilings<'_>>,
    config: &AlignmentConfig,
) -> Result<AlignmentResult, ContractError> {
    if matrix.cols() == 0 {
        return Err(ContractError::empty_sequence(SequenceSide::Teacher));
    }
    if matrix.rows() == 0 {
        return Err(ContractError::empty_sequence(SequenceSide::Student));
    }

    let thresholds = Thresholds {
        base: config.match_threshold as f64,
        ceilings,
    };
    let min_length = config.min_length.max(1);
    let shorter = matrix.rows().min(matrix.cols());
    let min_overlap = (config.min_overlap_fraction.clamp(0.0, 1.0) as f64 * shorter as f64).ceil() as usize;

    let no_feasible = || ContractError::NoFeasibleAlignment {
        teacher_len: matrix.cols(),
        student_len: matrix.rows(),
        min_length,
    };
    let (lowest, highest) = matrix.offset_range().ok_or_else(no_feasible)?;

    let candidates: Vec<Option<Candidate>> = (lowest..=highest)
        .into_par_iter()
        .map(|offset| scan_diagonal(matrix, offset, &thresholds, min_length, min_overlap))
        .collect();

    let best = candidates
        .into_iter()
        .flatten()
        .fold(None::<Candidate>, |best, candidate| match best {
            Some(current) if current.rank(&candidate).is_ge() => Some(current),
            _ => Some(candidate),
        })
        .ok_or_else(no_feasible)?;

    let per_frame_score = (0..best.length)
        .map(|i| sanitize(matrix.get(best.student_start + i, best.teacher_start + i)) as f32)
        .collect();

    Ok(AlignmentResult {
        teacher_start: best.teacher_start,
        student_start: best.student_start,
        length: best.length,
        per_frame_score,
        score: best.score,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(min_length: usize) -> AlignmentConfig {
        AlignmentConfig {
            match_threshold: 0.5,
            min_length,
            min_overlap_fraction: 0.0,
        }
    }

    fn gains(values: &[f64], threshold: f64) -> Vec<f64> {
        values.iter().map(|v| v - threshold).collect()
    }

    fn identity(n: usize) -> SimilarityMatrix {
        SimilarityMatrix::from_fn(n, n, |r, c| if r == c { 1.0 } else { 0.1 })
    }

    #[test]
    fn test_best_run_prefers_longest_on_equal_value() {
        // 0.5 cells contribute nothing at threshold 0.5; extending through them is free
        let values = gains(&[0.5, 0.9, 0.9, 0.5, 0.0], 0.5);
        assert_eq!(best_run(&values, 1), Some((0, 4)));
    }

    #[test]
    fn test_best_run_respects_min_length() {
        let values = gains(&[0.0, 1.0, 0.0, 0.0], 0.5);
        assert_eq!(best_run(&values, 1), Some((1, 1)));
        assert_eq!(best_run(&values, 3), Some((0, 3)));
        assert_eq!(best_run(&values, 5), None);
    }

    #[test]
    fn test_identity_selects_full_main_diagonal() {
        let result = select(&identity(8), &config(3)).unwrap();
        assert_eq!(result.offset(), 0);
        assert_eq!((result.teacher_start, result.student_start, result.length), (0, 0, 8));
        assert_eq!(result.per_frame_score, vec![1.0; 8]);
        assert!((result.score - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_offset_diagonal() {
        // student frames 2.. match teacher frames 0..
        let m = SimilarityMatrix::from_fn(7, 5, |s, t| if s == t + 2 { 0.95 } else { 0.05 });
        let result = select(&m, &config(3)).unwrap();
        assert_eq!(result.offset(), 2);
        assert_eq!((result.teacher_start, result.student_start, result.length), (0, 2, 5));
    }

    #[test]
    fn test_sub_segment_inside_diagonal() {
        let m = SimilarityMatrix::from_fn(10, 10, |s, t| {
            if s == t + 3 && t < 5 {
                1.0
            } else {
                0.0
            }
        });
        let result = select(&m, &config(3)).unwrap();
        assert_eq!((result.teacher_start, result.student_start, result.length), (0, 3, 5));
    }

    #[test]
    fn test_empty_sides() {
        let no_teacher = SimilarityMatrix::from_fn(4, 0, |_, _| 0.0);
        assert!(matches!(
            select(&no_teacher, &config(1)),
            Err(ContractError::EmptySequence {
                which: SequenceSide::Teacher
            })
        ));
        let no_student = SimilarityMatrix::from_fn(0, 4, |_, _| 0.0);
        assert!(matches!(
            select(&no_student, &config(1)),
            Err(ContractError::EmptySequence {
                which: SequenceSide::Student
            })
        ));
    }

    #[test]
    fn test_too_short_is_not_feasible() {
        let err = select(&identity(2), &config(3)).unwrap_err();
        assert!(matches!(
            err,
            ContractError::NoFeasibleAlignment {
                teacher_len: 2,
                student_len: 2,
                min_length: 3
            }
        ));
    }

    #[test]
    fn test_dissimilar_is_not_feasible() {
        let m = SimilarityMatrix::from_fn(6, 6, |_, _| 0.2);
        assert!(matches!(
            select(&m, &config(2)),
            Err(ContractError::NoFeasibleAlignment { .. })
        ));
    }

    #[test]
    fn test_tie_prefers_smaller_offset_then_earlier_start() {
        // Constant matrix: every diagonal ties per frame, the main one is the longest
        let m = SimilarityMatrix::from_fn(4, 4, |_, _| 0.8);
        let result = select(&m, &config(1)).unwrap();
        assert_eq!((result.teacher_start, result.student_start, result.length), (0, 0, 4));

        // Two equal runs at offsets -1 and +1 of equal length: teacher_start 0 wins
        let m = SimilarityMatrix::from_fn(3, 3, |s, t| {
            if s.abs_diff(t) == 1 {
                0.9
            } else {
                0.0
            }
        });
        let result = select(&m, &config(1)).unwrap();
        assert_eq!(result.offset(), 1);
        assert_eq!((result.teacher_start, result.student_start, result.length), (0, 1, 2));
    }

    #[test]
    fn test_min_overlap_skips_corner_diagonals() {
        // Only the corner cell is similar; with a 50% overlap floor it is unreachable
        let m = SimilarityMatrix::from_fn(6, 6, |s, t| if s == 5 && t == 0 { 1.0 } else { 0.0 });
        let mut cfg = config(1);
        assert_eq!(select(&m, &cfg).unwrap().offset(), 5);
        cfg.min_overlap_fraction = 0.5;
        assert!(select(&m, &cfg).is_err());
    }

    #[test]
    fn test_non_finite_cells_count_as_zero() {
        let m = SimilarityMatrix::from_fn(4, 4, |r, c| {
            if r == c {
                if r == 2 {
                    f32::NAN
                } else {
                    1.0
                }
            } else {
                0.0
            }
        });
        let result = select(&m, &config(1)).unwrap();
        assert!(result.per_frame_score.iter().all(|v| v.is_finite()));
        assert!(result.score.is_finite());
    }

    /// Identity with frames `gap` empty on both sides (self-similarity 0)
    fn identity_with_gap(n: usize, gap: std::ops::Range<usize>) -> (SimilarityMatrix, Vec<f32>) {
        let m = SimilarityMatrix::from_fn(n, n, |r, c| {
            if gap.contains(&r) || gap.contains(&c) {
                0.0
            } else if r == c {
                1.0
            } else {
                0.1
            }
        });
        let ceilings = (0..n).map(|i| if gap.contains(&i) { 0.0 } else { 1.0 }).collect();
        (m, ceilings)
    }

    #[test]
    fn test_unreachable_cells_are_neutral_with_ceilings() {
        let (m, ceilings) = identity_with_gap(13, 4..9);
        let capped = FrameCeilings {
            teacher: &ceilings,
            student: &ceilings,
        };

        // Without ceilings the gap splits the diagonal
        assert_eq!(select(&m, &config(3)).unwrap().length, 4);

        let result = select_with_ceilings(&m, capped, &config(3)).unwrap();
        assert_eq!((result.teacher_start, result.student_start, result.length), (0, 0, 13));
        assert!((result.score - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_against_real_frame_still_penalised() {
        // Student has two empty frames before an exact copy of the teacher
        let m = SimilarityMatrix::from_fn(8, 6, |s, t| if s >= 2 && s == t + 2 { 1.0 } else { 0.0 });
        let teacher = [1.0; 6];
        let student = [0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0];
        let ceilings = FrameCeilings {
            teacher: &teacher,
            student: &student,
        };
        let result = select_with_ceilings(&m, ceilings, &config(3)).unwrap();
        assert_eq!((result.teacher_start, result.student_start, result.length), (0, 2, 6));
    }

    #[test]
    fn test_sparse_self_match_not_trimmed() {
        // Frames 1..21 can only reach 0.47 against themselves
        let sparse = 1..21;
        let m = SimilarityMatrix::from_fn(22, 22, |r, c| match (r == c, sparse.contains(&r)) {
            (true, true) => 0.47,
            (true, false) => 1.0,
            _ => 0.0,
        });
        let ceilings: Vec<f32> = (0..22).map(|i| if sparse.contains(&i) { 0.47 } else { 1.0 }).collect();
        let capped = FrameCeilings {
            teacher: &ceilings,
            student: &ceilings,
        };

        assert_eq!(select(&m, &config(1)).unwrap().length, 1);
        let result = select_with_ceilings(&m, capped, &config(1)).unwrap();
        assert_eq!((result.teacher_start, result.length), (0, 22));
    }

    #[test]
    fn test_ceiling_length_mismatch_rejected() {
        let ceilings = [1.0; 3];
        let capped = FrameCeilings {
            teacher: &ceilings,
            student: &ceilings,
        };
        assert!(matches!(
            select_with_ceilings(&identity(4), capped, &config(1)),
            Err(ContractError::Other(_))
        ));
    }

    #[test]
    fn test_repeated_selection_is_bit_identical() {
        let m = SimilarityMatrix::from_fn(40, 33, |s, t| {
            let x = (s * 31 + t * 17) % 23;
            x as f32 / 22.0
        });
        let first = select(&m, &config(3)).unwrap();
        for _ in 0..5 {
            let again = select(&m, &config(3)).unwrap();
            assert_eq!(first, again);
            assert_eq!(first.score.to_bits(), again.score.to_bits());
        }
    }
}
