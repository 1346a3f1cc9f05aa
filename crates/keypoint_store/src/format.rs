//! Keypoint file formats

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use contracts::{ContractError, Frame, KeypointSequence};
use serde::Deserialize;
use tracing::{debug, instrument};

/// On-disk encoding, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeypointFormat {
    /// `.json`: interchange with the external extractor
    Json,
    /// `.bin`: compact bincode cache
    Bincode,
}

impl KeypointFormat {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "bin" => Some(Self::Bincode),
            _ => None,
        }
    }
}

/// JSON accepts either a full sequence object or the extractor's bare frame array
#[derive(Deserialize)]
#[serde(untagged)]
enum JsonKeypoints {
    Sequence(KeypointSequence),
    Frames(Vec<Frame>),
}

fn format_error(path: &Path, message: impl Into<String>) -> ContractError {
    ContractError::keypoint_format(path.display().to_string(), message)
}

fn detect(path: &Path) -> Result<KeypointFormat, ContractError> {
    KeypointFormat::from_path(path)
        .ok_or_else(|| format_error(path, "unsupported extension (expected .json or .bin)"))
}

fn check_sequence(path: &Path, sequence: &KeypointSequence) -> Result<(), ContractError> {
    if !(sequence.fps.is_finite() && sequence.fps > 0.0) {
        return Err(format_error(path, format!("invalid fps {}", sequence.fps)));
    }
    Ok(())
}

/// Read a keypoint sequence from `.json` or `.bin`
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub fn read_keypoints(path: &Path) -> Result<KeypointSequence, ContractError> {
    let format = detect(path)?;
    let reader = BufReader::new(File::open(path)?);

    let mut sequence = match format {
        KeypointFormat::Json => match serde_json::from_reader(reader) {
            Ok(JsonKeypoints::Sequence(sequence)) => sequence,
            Ok(JsonKeypoints::Frames(frames)) => KeypointSequence::new(frames),
            Err(e) => return Err(format_error(path, e.to_string())),
        },
        KeypointFormat::Bincode => {
            bincode::deserialize_from(reader).map_err(|e| format_error(path, e.to_string()))?
        }
    };
    check_sequence(path, &sequence)?;

    if sequence.source.is_none() {
        sequence.source = Some(path.display().to_string());
    }
    debug!(frames = sequence.len(), fps = sequence.fps, "keypoints loaded");
    Ok(sequence)
}

/// Write a keypoint sequence as `.json` or `.bin`, creating parent directories
#[instrument(level = "debug", skip_all, fields(path = %path.display(), frames = sequence.len()))]
pub fn write_keypoints(path: &Path, sequence: &KeypointSequence) -> Result<(), ContractError> {
    let format = detect(path)?;
    check_sequence(path, sequence)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(path)?);
    match format {
        KeypointFormat::Json => serde_json::to_writer(&mut writer, sequence)
            .map_err(|e| format_error(path, e.to_string()))?,
        KeypointFormat::Bincode => bincode::serialize_into(&mut writer, sequence)
            .map_err(|e| format_error(path, e.to_string()))?,
    }
    writer.flush()?;
    Ok(())
}
