//! Score track for the rendering collaborator.
//!
//! Turns the selected segment into a per-frame display curve (max-pooled over
//! nearby teacher frames so small timing slips are forgiven) and a running
//! on-screen score.

use contracts::{AlignmentResult, ScoreConfig, ScoreSample, SimilarityMatrix};

/// Display similarity for every aligned frame.
///
/// Entry `i` is the best similarity of student frame `student_start + i`
/// against the teacher frames inside the pooling window centred on
/// `teacher_start + i`.
pub fn score_curve(matrix: &SimilarityMatrix, alignment: &AlignmentResult, pooling_window: usize) -> Vec<f32> {
    let window = pooling_window.max(1);
    let before = (window - 1) / 2;
    let after = window / 2;

    alignment
        .frame_pairs()
        .map(|(teacher, student)| {
            if student >= matrix.rows() || teacher >= matrix.cols() {
                return 0.0;
            }
            let lo = teacher.saturating_sub(before);
            let hi = (teacher + after + 1).min(matrix.cols());
            matrix.row(student)[lo..hi]
                .iter()
                .copied()
                .filter(|v| v.is_finite())
                .fold(0.0f32, f32::max)
        })
        .collect()
}

/// Running on-screen score
///
/// The cumulative total grows every frame; the displayed value only catches up
/// once it trails by more than `display_step`.
#[derive(Debug, Clone)]
pub struct ScoreTracker {
    points_per_frame: f64,
    display_step: f64,
    min_emphasis: f32,
    cumulative: f64,
    displayed: f64,
}

impl ScoreTracker {
    pub fn new(config: &ScoreConfig) -> Self {
        Self {
            points_per_frame: config.points_per_frame,
            display_step: config.display_step,
            min_emphasis: config.min_emphasis,
            cumulative: 0.0,
            displayed: 0.0,
        }
    }

    /// Feed one frame's display similarity, returning `(cumulative, displayed, emphasis)`
    pub fn push(&mut self, similarity: f32) -> (f64, f64, f32) {
        let similarity = if similarity.is_finite() { similarity.clamp(0.0, 1.0) } else { 0.0 };
        self.cumulative += similarity as f64 * self.points_per_frame;
        if self.cumulative - self.displayed > self.display_step {
            self.displayed = self.cumulative;
        }
        (self.cumulative, self.displayed, similarity.max(self.min_emphasis))
    }

    pub fn cumulative(&self) -> f64 {
        self.cumulative
    }

    pub fn displayed(&self) -> f64 {
        self.displayed
    }
}

/// Full score track of an alignment, one sample per aligned frame
pub fn build_score_track(
    matrix: &SimilarityMatrix,
    alignment: &AlignmentResult,
    config: &ScoreConfig,
) -> Vec<ScoreSample> {
    let curve = score_curve(matrix, alignment, config.pooling_window);
    let mut tracker = ScoreTracker::new(config);

    alignment
        .frame_pairs()
        .zip(curve)
        .enumerate()
        .map(|(index, ((teacher_frame, student_frame), smoothed))| {
            let (cumulative, displayed, emphasis) = tracker.push(smoothed);
            ScoreSample {
                index,
                teacher_frame,
                student_frame,
                similarity: alignment.per_frame_score.get(index).copied().unwrap_or(0.0),
                smoothed,
                cumulative,
                displayed,
                emphasis,
            }
        })
        .collect()
}
