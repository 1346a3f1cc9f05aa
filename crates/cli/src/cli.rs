//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Motion Grader - compare a student dance video against a teacher video
#[derive(Parser, Debug)]
#[command(
    name = "motion-grader",
    author,
    version,
    about = "Motion similarity and temporal alignment for dance videos",
    long_about = "Scores how closely a student's motion follows a teacher's.\n\n\
                  Loads pre-extracted 2D keypoints for both videos, finds the best \n\
                  constant-offset alignment between them, and reports the aligned \n\
                  segment together with a per-frame score track."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "MOTION_GRADER_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "compact",
        global = true,
        env = "MOTION_GRADER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Align a student keypoint sequence against a teacher sequence
    Align(AlignArgs),

    /// Validate an engine configuration file
    Validate(ValidateArgs),

    /// Summarise a keypoint file
    Info(InfoArgs),
}

/// Arguments for the `align` command
#[derive(Parser, Debug, Clone)]
pub struct AlignArgs {
    /// Teacher keypoints (.json / .bin), or a video with cached keypoints
    #[arg(short, long)]
    pub teacher: PathBuf,

    /// Student keypoints (.json / .bin), or a video with cached keypoints
    #[arg(short, long)]
    pub student: PathBuf,

    /// Engine configuration file (TOML or JSON); defaults apply when omitted
    #[arg(short, long, env = "MOTION_GRADER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding `<video>_kpts.bin` caches (default: next to the video)
    #[arg(long, env = "MOTION_GRADER_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Print the report as JSON instead of a summary
    #[arg(long)]
    pub json: bool,

    /// Write the full JSON report to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Include smoothed keypoints of both aligned ranges in the report
    #[arg(long)]
    pub with_keypoints: bool,

    /// Write a Prometheus metrics snapshot to this file
    #[arg(long)]
    pub metrics_out: Option<PathBuf>,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "engine.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Keypoint file (.json / .bin)
    #[arg(short, long)]
    pub keypoints: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    Pretty,
    /// Compact single-line format
    #[default]
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
