//! Keypoint input resolution shared by `align` and `info`.

use std::path::Path;

use contracts::{KeypointSequence, SequenceSide};
use keypoint_store::{read_keypoints, FileKeypointStore, KeypointFormat, KeypointStore};
use tracing::{debug, info};

use crate::error::{CliError, Result};

/// Load keypoints for one side.
///
/// `.json` / `.bin` paths are read directly; any other path is taken as a
/// video and resolved through the keypoint cache.
pub fn load_sequence(path: &Path, side: SequenceSide, store: &FileKeypointStore) -> Result<KeypointSequence> {
    let sequence = if KeypointFormat::from_path(path).is_some() {
        if !path.exists() {
            return Err(CliError::keypoints_not_found(path.display().to_string()));
        }
        read_keypoints(path)?
    } else {
        let cached = store.load(path)?;
        observability::record_cache_lookup(cached.is_some());
        match cached {
            Some(sequence) => {
                debug!(video = %path.display(), "Keypoint cache hit");
                sequence
            }
            None => {
                return Err(CliError::NotExtracted {
                    video: path.display().to_string(),
                    cache: store.cache_path(path).display().to_string(),
                })
            }
        }
    };

    let empty_frames = sequence.empty_frame_count();
    observability::record_keypoints_loaded(side, sequence.len(), empty_frames);
    info!(
        side = side.as_str(),
        frames = sequence.len(),
        empty_frames,
        fps = sequence.fps,
        "Keypoints loaded"
    );

    Ok(sequence)
}
