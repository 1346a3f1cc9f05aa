//! AlignmentResult - Alignment selector output
//!
//! The chosen constant-offset segment plus the per-frame score track built on it.

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Best-matching segment between teacher and student
///
/// Invariant: `teacher_start + length <= teacher.len()` and
/// `student_start + length <= student.len()`, `length > 0`,
/// `per_frame_score.len() == length`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentResult {
    pub teacher_start: usize,
    pub student_start: usize,
    pub length: usize,

    /// Raw similarity of each aligned frame pair, in playback order
    pub per_frame_score: Vec<f32>,

    /// Objective value of the segment (sum of similarity above each cell's match threshold)
    pub score: f64,
}

impl AlignmentResult {
    /// Constant offset `student_start - teacher_start`
    pub fn offset(&self) -> i64 {
        self.student_start as i64 - self.teacher_start as i64
    }

    pub fn teacher_range(&self) -> Range<usize> {
        self.teacher_start..self.teacher_start + self.length
    }

    pub fn student_range(&self) -> Range<usize> {
        self.student_start..self.student_start + self.length
    }

    /// Aligned `(teacher_frame, student_frame)` pairs in playback order
    pub fn frame_pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.length).map(move |i| (self.teacher_start + i, self.student_start + i))
    }

    /// Mean raw similarity over the segment
    pub fn mean_score(&self) -> f64 {
        if self.per_frame_score.is_empty() {
            return 0.0;
        }
        self.per_frame_score.iter().map(|&s| s as f64).sum::<f64>() / self.per_frame_score.len() as f64
    }
}

/// One frame of the rendered score track
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreSample {
    /// Position inside the aligned segment
    pub index: usize,
    pub teacher_frame: usize,
    pub student_frame: usize,

    /// Raw similarity of the aligned pair
    pub similarity: f32,

    /// Display similarity (max-pooled over nearby teacher frames)
    pub smoothed: f32,

    /// Running total of points
    pub cumulative: f64,

    /// Value currently shown on screen (advances in steps)
    pub displayed: f64,

    /// Emphasis factor for the renderer (e.g. font scale)
    pub emphasis: f32,
}
