//! # Keypoint Store
//!
//! Persists extracted keypoint sequences so repeated comparisons against the
//! same video skip pose extraction. The motion engine never touches this
//! crate; callers load sequences here and hand the frames to the engine.
//!
//! Formats (by extension):
//! - `.json`: `KeypointSequence` object or a bare `[[[x, y, conf]; 17], ...]` array
//! - `.bin`: bincode `KeypointSequence`, used for the per-video cache

mod format;
mod store;

pub use format::{read_keypoints, write_keypoints, KeypointFormat};
pub use store::{load_or_extract, FileKeypointStore, KeypointStore, CACHE_SUFFIX};
