//! Per-video keypoint cache

use std::path::{Path, PathBuf};

use contracts::{ContractError, KeypointSequence};
use tracing::{debug, info, instrument, warn};

use crate::format::{read_keypoints, write_keypoints};

/// Suffix appended to the video stem for cache files
pub const CACHE_SUFFIX: &str = "_kpts.bin";

/// Keypoint cache keyed by source video
pub trait KeypointStore {
    /// Cached keypoints of `video`, `None` when nothing is cached
    fn load(&self, video: &Path) -> Result<Option<KeypointSequence>, ContractError>;

    /// Cache keypoints of `video`, returning where they were stored
    fn save(&self, video: &Path, sequence: &KeypointSequence) -> Result<PathBuf, ContractError>;
}

/// Stores `<video-stem>_kpts.bin` next to the video, or under a cache directory
#[derive(Debug, Clone, Default)]
pub struct FileKeypointStore {
    cache_dir: Option<PathBuf>,
}

impl FileKeypointStore {
    /// Cache files live next to their videos
    pub fn beside_videos() -> Self {
        Self { cache_dir: None }
    }

    /// Cache files live under `dir`
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: Some(dir.into()),
        }
    }

    /// Cache file path for `video`
    pub fn cache_path(&self, video: &Path) -> PathBuf {
        let stem = video
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "video".to_string());
        let file_name = format!("{stem}{CACHE_SUFFIX}");
        match &self.cache_dir {
            Some(dir) => dir.join(file_name),
            None => video.with_file_name(file_name),
        }
    }
}

impl KeypointStore for FileKeypointStore {
    fn load(&self, video: &Path) -> Result<Option<KeypointSequence>, ContractError> {
        let path = self.cache_path(video);
        if !path.exists() {
            return Ok(None);
        }
        read_keypoints(&path).map(Some)
    }

    fn save(&self, video: &Path, sequence: &KeypointSequence) -> Result<PathBuf, ContractError> {
        let path = self.cache_path(video);
        write_keypoints(&path, sequence)?;
        Ok(path)
    }
}

/// Cached keypoints of `video`, or run `extract` and cache its result.
///
/// An unreadable cache entry is treated as a miss and overwritten.
#[instrument(level = "debug", skip_all, fields(video = %video.display()))]
pub fn load_or_extract<S, F>(store: &S, video: &Path, extract: F) -> Result<KeypointSequence, ContractError>
where
    S: KeypointStore + ?Sized,
    F: FnOnce(&Path) -> Result<KeypointSequence, ContractError>,
{
    match store.load(video) {
        Ok(Some(sequence)) => {
            debug!(frames = sequence.len(), "keypoint cache hit");
            return Ok(sequence);
        }
        Ok(None) => debug!("keypoint cache miss"),
        Err(e) => warn!(error = %e, "keypoint cache unreadable, re-extracting"),
    }

    let mut sequence = extract(video)?;
    if sequence.source.is_none() {
        sequence.source = Some(video.display().to_string());
    }
    let path = store.save(video, &sequence)?;
    info!(path = %path.display(), frames = sequence.len(), "keypoints cached");
    Ok(sequence)
}
