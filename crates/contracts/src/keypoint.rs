//! Keypoint - Pose extractor output
//!
//! Raw per-frame body keypoints in the COCO 17-joint layout.

use serde::{Deserialize, Serialize};

/// Number of joints per frame (COCO layout)
pub const JOINT_COUNT: usize = 17;

/// Frame rate every sequence is expected to be sampled at
pub const DEFAULT_FPS: f64 = 30.0;

/// Left/right counterpart of every joint, used for mirroring
pub const FLIP_INDEX: [usize; JOINT_COUNT] = [0, 2, 1, 4, 3, 6, 5, 8, 7, 10, 9, 12, 11, 14, 13, 16, 15];

/// COCO joint order shared with the pose extractor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CocoJoint {
    Nose = 0,
    LeftEye = 1,
    RightEye = 2,
    LeftEar = 3,
    RightEar = 4,
    LeftShoulder = 5,
    RightShoulder = 6,
    LeftElbow = 7,
    RightElbow = 8,
    LeftWrist = 9,
    RightWrist = 10,
    LeftHip = 11,
    RightHip = 12,
    LeftKnee = 13,
    RightKnee = 14,
    LeftAnkle = 15,
    RightAnkle = 16,
}

impl CocoJoint {
    /// All joints in extractor order
    pub const ALL: [CocoJoint; JOINT_COUNT] = [
        Self::Nose,
        Self::LeftEye,
        Self::RightEye,
        Self::LeftEar,
        Self::RightEar,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
    ];

    /// Position of the joint inside a frame
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Mirrored counterpart (left <-> right)
    pub fn flipped(self) -> Self {
        Self::ALL[FLIP_INDEX[self.index()]]
    }

    /// Joint name as used by the extractor metadata
    pub fn name(self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::LeftEye => "left_eye",
            Self::RightEye => "right_eye",
            Self::LeftEar => "left_ear",
            Self::RightEar => "right_ear",
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftWrist => "left_wrist",
            Self::RightWrist => "right_wrist",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightAnkle => "right_ankle",
        }
    }
}

/// A single detected joint (image coordinates + confidence)
///
/// Serialized as `[x, y, confidence]` to match the extractor's array layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 3]", into = "[f32; 3]")]
pub struct Joint {
    pub x: f32,
    pub y: f32,
    /// Detection confidence (0-1)
    pub confidence: f32,
}

impl Joint {
    #[inline]
    pub const fn new(x: f32, y: f32, confidence: f32) -> Self {
        Self { x, y, confidence }
    }

    /// All-zero joint, the extractor's "nothing here" marker
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.confidence == 0.0
    }
}

impl From<[f32; 3]> for Joint {
    fn from(v: [f32; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl From<Joint> for [f32; 3] {
    fn from(j: Joint) -> Self {
        [j.x, j.y, j.confidence]
    }
}

/// All joints of one person at one time step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Frame {
    pub joints: [Joint; JOINT_COUNT],
}

impl Frame {
    pub const fn new(joints: [Joint; JOINT_COUNT]) -> Self {
        Self { joints }
    }

    /// Frame emitted when no person was detected
    pub const fn empty() -> Self {
        Self {
            joints: [Joint::new(0.0, 0.0, 0.0); JOINT_COUNT],
        }
    }

    /// True when the extractor found nobody (every joint all-zero)
    pub fn is_empty(&self) -> bool {
        self.joints.iter().all(Joint::is_zero)
    }

    #[inline]
    pub fn joint(&self, joint: CocoJoint) -> &Joint {
        &self.joints[joint.index()]
    }

    /// Mean confidence over all joints
    pub fn mean_confidence(&self) -> f32 {
        self.joints.iter().map(|j| j.confidence).sum::<f32>() / JOINT_COUNT as f32
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::empty()
    }
}

/// Keypoints of a whole video, one frame per time step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeypointSequence {
    /// Source video the keypoints were extracted from
    #[serde(default)]
    pub source: Option<String>,

    /// Sampling rate (frames per second)
    #[serde(default = "default_fps")]
    pub fps: f64,

    pub frames: Vec<Frame>,
}

fn default_fps() -> f64 {
    DEFAULT_FPS
}

impl KeypointSequence {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self {
            source: None,
            fps: DEFAULT_FPS,
            frames,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Duration in seconds at the recorded frame rate
    pub fn duration_s(&self) -> f64 {
        if self.fps > 0.0 {
            self.frames.len() as f64 / self.fps
        } else {
            0.0
        }
    }

    /// Number of frames in which nobody was detected
    pub fn empty_frame_count(&self) -> usize {
        self.frames.iter().filter(|f| f.is_empty()).count()
    }
}
