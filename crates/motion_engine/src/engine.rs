use std::time::Instant;

use contracts::{
    AlignmentResult, ContractError, EngineConfig, Frame, NormalizedPose, ScoreSample, SequenceSide,
    SimilarityMatrix,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::alignment::FrameCeilings;
use crate::metric::{metric_from_config, PoseMetric};
use crate::{alignment, score, similarity, smoother};

/// Output of a full teacher/student comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentOutcome {
    pub alignment: AlignmentResult,
    pub score_track: Vec<ScoreSample>,
}

/// Motion similarity and alignment engine
///
/// Holds only configuration and the chosen metric; every call is independent
/// and the caller's keypoint data is borrowed read-only.
#[derive(Debug)]
pub struct MotionEngine {
    config: EngineConfig,
    metric: Box<dyn PoseMetric>,
}

impl Default for MotionEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl MotionEngine {
    /// Create an engine using the metric selected in `config`
    pub fn new(config: EngineConfig) -> Self {
        let metric = metric_from_config(&config.similarity);
        Self { config, metric }
    }

    /// Create an engine with a custom metric
    pub fn with_metric(config: EngineConfig, metric: Box<dyn PoseMetric>) -> Self {
        Self { config, metric }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn metric(&self) -> &dyn PoseMetric {
        self.metric.as_ref()
    }

    /// Normalize a whole sequence; degenerate frames become the no-signal sentinel
    #[instrument(
        level = "debug",
        name = "motion_engine.normalize_sequence",
        skip_all,
        fields(side = side.as_str(), frames = frames.len())
    )]
    pub fn normalize_sequence(&self, frames: &[Frame], side: SequenceSide) -> Vec<NormalizedPose> {
        let poses = similarity::normalize_sequence(frames, &self.config.normalizer);
        let degenerate = poses.iter().filter(|p| p.is_no_signal()).count();

        metrics::counter!("motion_engine_frames_normalized_total", "side" => side.as_str())
            .increment(poses.len() as u64);
        metrics::counter!("motion_engine_degenerate_frames_total", "side" => side.as_str())
            .increment(degenerate as u64);
        debug!(degenerate, "sequence normalized");

        poses
    }

    /// Similarity matrix of two normalized sequences (rows = student, cols = teacher)
    pub fn build_matrix(&self, teacher: &[NormalizedPose], student: &[NormalizedPose]) -> SimilarityMatrix {
        let started = Instant::now();
        let matrix = similarity::build_matrix(
            teacher,
            student,
            self.metric.as_ref(),
            self.config.similarity.mirror_matching,
        );

        metrics::counter!("motion_engine_matrix_cells_total").increment((matrix.rows() * matrix.cols()) as u64);
        metrics::histogram!("motion_engine_matrix_build_ms").record(started.elapsed().as_secs_f64() * 1000.0);
        matrix
    }

    /// Best constant-offset segment of `matrix`
    pub fn select(&self, matrix: &SimilarityMatrix) -> Result<AlignmentResult, ContractError> {
        let result = alignment::select(matrix, &self.config.alignment);
        record_selection(&result);
        result
    }

    /// Similarity of every pose with itself; 0 for the no-signal sentinel
    pub fn self_similarity(&self, poses: &[NormalizedPose]) -> Vec<f32> {
        poses
            .iter()
            .map(|pose| self.metric.similarity(pose, pose))
            .collect()
    }

    /// Best constant-offset segment, with cells neither frame can fill made neutral
    pub fn select_with_ceilings(
        &self,
        matrix: &SimilarityMatrix,
        ceilings: FrameCeilings<'_>,
    ) -> Result<AlignmentResult, ContractError> {
        let result = alignment::select_with_ceilings(matrix, ceilings, &self.config.alignment);
        record_selection(&result);
        result
    }

    /// Per-frame score track of an alignment
    pub fn score_track(&self, matrix: &SimilarityMatrix, alignment: &AlignmentResult) -> Vec<ScoreSample> {
        score::build_score_track(matrix, alignment, &self.config.score)
    }

    /// Smoothed frame at `index` using the configured window
    pub fn smooth(&self, sequence: &[Frame], index: usize) -> Result<Frame, ContractError> {
        smoother::smooth_with_min_weight(
            sequence,
            index,
            self.config.smoother.window,
            self.config.smoother.min_weight,
        )
    }

    /// Smoothed frames for `start..start + length` using the configured window
    pub fn smooth_range(&self, sequence: &[Frame], start: usize, length: usize) -> Result<Vec<Frame>, ContractError> {
        smoother::smooth_range(
            sequence,
            start,
            length,
            self.config.smoother.window,
            self.config.smoother.min_weight,
        )
    }

    /// Normalize, compare and align two raw sequences.
    ///
    /// Empty inputs fail before any work is done, teacher first.
    #[instrument(
        level = "debug",
        name = "motion_engine.align",
        skip_all,
        fields(teacher = teacher.len(), student = student.len(), metric = self.metric.name())
    )]
    pub fn align(&self, teacher: &[Frame], student: &[Frame]) -> Result<AlignmentOutcome, ContractError> {
        if teacher.is_empty() {
            metrics::counter!("motion_engine_alignments_total", "status" => "empty").increment(1);
            return Err(ContractError::empty_sequence(SequenceSide::Teacher));
        }
        if student.is_empty() {
            metrics::counter!("motion_engine_alignments_total", "status" => "empty").increment(1);
            return Err(ContractError::empty_sequence(SequenceSide::Student));
        }

        let teacher_poses = self.normalize_sequence(teacher, SequenceSide::Teacher);
        let student_poses = self.normalize_sequence(student, SequenceSide::Student);
        let matrix = self.build_matrix(&teacher_poses, &student_poses);
        let teacher_ceilings = self.self_similarity(&teacher_poses);
        let student_ceilings = self.self_similarity(&student_poses);
        let alignment = self.select_with_ceilings(
            &matrix,
            FrameCeilings {
                teacher: &teacher_ceilings,
                student: &student_ceilings,
            },
        )?;
        let score_track = self.score_track(&matrix, &alignment);

        debug!(
            teacher_start = alignment.teacher_start,
            student_start = alignment.student_start,
            length = alignment.length,
            score = alignment.score,
            "alignment selected"
        );

        Ok(AlignmentOutcome {
            alignment,
            score_track,
        })
    }
}

fn record_selection(result: &Result<AlignmentResult, ContractError>) {
    match result {
        Ok(found) => {
            metrics::counter!("motion_engine_alignments_total", "status" => "ok").increment(1);
            metrics::histogram!("motion_engine_alignment_length_frames").record(found.length as f64);
            metrics::histogram!("motion_engine_alignment_mean_score").record(found.mean_score());
        }
        Err(ContractError::EmptySequence { .. }) => {
            metrics::counter!("motion_engine_alignments_total", "status" => "empty").increment(1);
        }
        Err(_) => {
            metrics::counter!("motion_engine_alignments_total", "status" => "no_feasible").increment(1);
        }
    }
}
