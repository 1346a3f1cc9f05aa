//! `align` command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use config_loader::ConfigLoader;
use contracts::{AlignmentResult, EngineConfig, Frame, KeypointSequence, ScoreSample, SequenceSide, DEFAULT_FPS};
use keypoint_store::FileKeypointStore;
use motion_engine::{AlignmentOutcome, MotionEngine};
use observability::{ScoreAggregator, ScoreSummary};
use serde::Serialize;
use tracing::{info, warn};

use crate::cli::AlignArgs;
use crate::commands::input::load_sequence;
use crate::error::CliError;

const FPS_TOLERANCE: f64 = 1e-6;

/// Full alignment report
#[derive(Serialize)]
struct AlignmentReport {
    generated_at: String,
    teacher: SourceInfo,
    student: SourceInfo,
    config: EngineConfig,
    alignment: AlignmentResult,
    summary: ScoreSummary,
    score_track: Vec<ScoreSample>,
    #[serde(skip_serializing_if = "Option::is_none")]
    keypoints: Option<AlignedKeypoints>,
}

#[derive(Serialize)]
struct SourceInfo {
    path: String,
    frames: usize,
    fps: f64,
    empty_frames: usize,
}

impl SourceInfo {
    fn new(path: &Path, sequence: &KeypointSequence) -> Self {
        Self {
            path: path.display().to_string(),
            frames: sequence.len(),
            fps: sequence.fps,
            empty_frames: sequence.empty_frame_count(),
        }
    }
}

/// Smoothed keypoints over both aligned ranges
#[derive(Serialize)]
struct AlignedKeypoints {
    teacher: Vec<Frame>,
    student: Vec<Frame>,
}

/// Execute the `align` command
pub fn run_align(args: &AlignArgs) -> Result<()> {
    let config = ConfigLoader::load_or_default(args.config.as_deref())
        .context("Failed to load engine configuration")?;

    // Recorder must exist before the engine emits anything
    let prometheus = match &args.metrics_out {
        Some(_) => Some(observability::install_prometheus_recorder()?),
        None => None,
    };

    let store = match &args.cache_dir {
        Some(dir) => FileKeypointStore::in_dir(dir),
        None => FileKeypointStore::beside_videos(),
    };

    let teacher = load_sequence(&args.teacher, SequenceSide::Teacher, &store)?;
    let student = load_sequence(&args.student, SequenceSide::Student, &store)?;
    check_frame_rates(&teacher, &student)?;

    let engine = MotionEngine::new(config);
    let outcome = engine
        .align(&teacher.frames, &student.frames)
        .map_err(CliError::from)?;

    let match_threshold = f64::from(engine.config().alignment.match_threshold);
    let summary = ScoreAggregator::from_track(&outcome.score_track, match_threshold).summary();
    observability::record_alignment_metrics(&outcome.alignment, &outcome.score_track);

    info!(
        offset = outcome.alignment.offset(),
        teacher_start = outcome.alignment.teacher_start,
        student_start = outcome.alignment.student_start,
        length = outcome.alignment.length,
        final_score = summary.final_score,
        "Alignment complete"
    );

    let (teacher_empty, student_empty) = (teacher.empty_frame_count(), student.empty_frame_count());
    if teacher_empty > 0 || student_empty > 0 {
        warn!(teacher_empty, student_empty, "Sequences contain frames without a detected person");
    }

    let keypoints = if args.with_keypoints {
        Some(smoothed_keypoints(&engine, &teacher, &student, &outcome)?)
    } else {
        None
    };

    let report = AlignmentReport {
        generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        teacher: SourceInfo::new(&args.teacher, &teacher),
        student: SourceInfo::new(&args.student, &student),
        config: engine.config().clone(),
        alignment: outcome.alignment,
        summary,
        score_track: outcome.score_track,
        keypoints,
    };

    if args.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{}", json);
    } else {
        print_report(&report);
    }

    if let Some(path) = &args.output {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        info!(path = %path.display(), "Report written");
    }

    if let (Some(path), Some(handle)) = (&args.metrics_out, prometheus) {
        std::fs::write(path, handle.render())
            .with_context(|| format!("Failed to write metrics to {}", path.display()))?;
        info!(path = %path.display(), "Metrics snapshot written");
    }

    Ok(())
}

/// Both sequences must share the engine's time base
fn check_frame_rates(teacher: &KeypointSequence, student: &KeypointSequence) -> Result<(), CliError> {
    if (teacher.fps - student.fps).abs() > FPS_TOLERANCE {
        return Err(CliError::FpsMismatch {
            teacher: teacher.fps,
            student: student.fps,
        });
    }
    for (which, sequence) in [(SequenceSide::Teacher, teacher), (SequenceSide::Student, student)] {
        if (sequence.fps - DEFAULT_FPS).abs() > FPS_TOLERANCE {
            return Err(CliError::UnsupportedFps {
                which,
                fps: sequence.fps,
                expected: DEFAULT_FPS,
            });
        }
    }
    Ok(())
}

fn smoothed_keypoints(
    engine: &MotionEngine,
    teacher: &KeypointSequence,
    student: &KeypointSequence,
    outcome: &AlignmentOutcome,
) -> Result<AlignedKeypoints> {
    let alignment = &outcome.alignment;
    let teacher_frames = engine.smooth_range(&teacher.frames, alignment.teacher_start, alignment.length)?;
    let student_frames = engine.smooth_range(&student.frames, alignment.student_start, alignment.length)?;
    Ok(AlignedKeypoints {
        teacher: teacher_frames,
        student: student_frames,
    })
}

fn print_report(report: &AlignmentReport) {
    let alignment = &report.alignment;
    let fps = report.teacher.fps;

    println!("✓ Alignment found");
    println!("\n  Teacher: {} ({} frames)", report.teacher.path, report.teacher.frames);
    println!("  Student: {} ({} frames)", report.student.path, report.student.frames);
    println!(
        "\n  Teacher frames: {}..{} ({:.2}s - {:.2}s)",
        alignment.teacher_start,
        alignment.teacher_start + alignment.length,
        alignment.teacher_start as f64 / fps,
        (alignment.teacher_start + alignment.length) as f64 / fps
    );
    println!(
        "  Student frames: {}..{} ({:.2}s - {:.2}s)",
        alignment.student_start,
        alignment.student_start + alignment.length,
        alignment.student_start as f64 / fps,
        (alignment.student_start + alignment.length) as f64 / fps
    );
    println!("  Offset: {} frames", alignment.offset());
    println!("  Mean similarity: {:.3}", alignment.mean_score());

    println!("\n{}", report.summary);
}
