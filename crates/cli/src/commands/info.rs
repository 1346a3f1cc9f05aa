//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::{CocoJoint, KeypointSequence, SequenceSide};
use keypoint_store::FileKeypointStore;
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;
use crate::commands::input::load_sequence;

/// Keypoint file info for JSON output
#[derive(Serialize)]
struct KeypointInfo {
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<String>,
    frames: usize,
    fps: f64,
    duration_s: f64,
    empty_frames: usize,
    mean_confidence: f32,
    joints: Vec<JointInfo>,
}

#[derive(Serialize)]
struct JointInfo {
    name: &'static str,
    mean_confidence: f32,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(keypoints = %args.keypoints.display(), "Loading keypoint info");

    let sequence = load_sequence(&args.keypoints, SequenceSide::Teacher, &FileKeypointStore::beside_videos())
        .with_context(|| format!("Failed to load keypoints from {}", args.keypoints.display()))?;

    let info = build_keypoint_info(&sequence, args);
    if args.json {
        let json = serde_json::to_string_pretty(&info).context("Failed to serialize keypoint info")?;
        println!("{}", json);
    } else {
        print_keypoint_info(&info);
    }

    Ok(())
}

fn build_keypoint_info(sequence: &KeypointSequence, args: &InfoArgs) -> KeypointInfo {
    let detected: Vec<_> = sequence.frames.iter().filter(|f| !f.is_empty()).collect();

    let joints = CocoJoint::ALL
        .iter()
        .map(|&joint| JointInfo {
            name: joint.name(),
            mean_confidence: mean(detected.iter().map(|f| f.joint(joint).confidence), detected.len()),
        })
        .collect();

    KeypointInfo {
        path: args.keypoints.display().to_string(),
        source: sequence.source.clone(),
        frames: sequence.len(),
        fps: sequence.fps,
        duration_s: sequence.duration_s(),
        empty_frames: sequence.empty_frame_count(),
        mean_confidence: mean(detected.iter().map(|f| f.mean_confidence()), detected.len()),
        joints,
    }
}

fn mean(values: impl Iterator<Item = f32>, count: usize) -> f32 {
    if count == 0 {
        0.0
    } else {
        values.sum::<f32>() / count as f32
    }
}

fn print_keypoint_info(info: &KeypointInfo) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                      Keypoint Sequence                       ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("🎞  Sequence");
    println!("   ├─ File: {}", info.path);
    if let Some(ref source) = info.source {
        println!("   ├─ Source: {}", source);
    }
    println!("   ├─ Frames: {} ({} without a person)", info.frames, info.empty_frames);
    println!("   ├─ Rate: {} fps", info.fps);
    println!("   ├─ Duration: {:.2}s", info.duration_s);
    println!("   └─ Mean confidence: {:.3}", info.mean_confidence);

    println!("\n🦴 Joints ({})", info.joints.len());
    for (i, joint) in info.joints.iter().enumerate() {
        let prefix = if i == info.joints.len() - 1 { "└─" } else { "├─" };
        println!("   {} {:<15} {:.3}", prefix, joint.name, joint.mean_confidence);
    }
}
