//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试
//! - 端到端对齐场景（归一化 -> 相似度矩阵 -> 对齐 -> 分数轨迹）
//! - 关键点缓存与配置加载联调

#[cfg(test)]
mod fixtures {
    use contracts::{Frame, Joint, JOINT_COUNT};
    use rand::{rngs::StdRng, Rng, SeedableRng};

    /// Random confident pose inside a 200x400 box
    pub fn random_pose(seed: u64) -> Frame {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut joints = [Joint::default(); JOINT_COUNT];
        for joint in joints.iter_mut() {
            *joint = Joint::new(
                rng.random_range(100.0..300.0),
                rng.random_range(50.0..450.0),
                rng.random_range(0.6..1.0),
            );
        }
        Frame::new(joints)
    }

    /// `len` mutually dissimilar poses
    pub fn dance(seed: u64, len: usize) -> Vec<Frame> {
        (0..len as u64).map(|i| random_pose(seed * 1_000 + i)).collect()
    }

    /// Same frame shifted and scaled in image space
    pub fn reframe(frame: &Frame, scale: f32, dx: f32, dy: f32) -> Frame {
        let mut out = *frame;
        for joint in out.joints.iter_mut() {
            joint.x = joint.x * scale + dx;
            joint.y = joint.y * scale + dy;
        }
        out
    }
}

#[cfg(test)]
mod contract_tests {
    use contracts::{EngineConfig, Frame, KeypointSequence, DEFAULT_FPS, JOINT_COUNT};

    #[test]
    fn test_contracts_compile() {
        // 验证 contracts crate 可编译
        let sequence = KeypointSequence::new(vec![Frame::empty()]);
        assert_eq!(sequence.fps, DEFAULT_FPS);
        assert_eq!(sequence.frames[0].joints.len(), JOINT_COUNT);
        let _ = EngineConfig::default();
    }

    #[test]
    fn test_extractor_frame_layout() {
        // 提取器输出：每帧 17 个 [x, y, confidence]
        let row: Vec<[f32; 3]> = (0..JOINT_COUNT).map(|i| [i as f32, 2.0 * i as f32, 0.5]).collect();
        let json = serde_json::to_string(&vec![row]).unwrap();
        let frames: Vec<Frame> = serde_json::from_str(&json).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].joints[3].y, 6.0);
        assert_eq!(serde_json::to_string(&frames).unwrap(), json);
    }
}

#[cfg(test)]
mod e2e_tests {
    use contracts::{ContractError, EngineConfig, Frame, SequenceSide};
    use motion_engine::MotionEngine;

    use crate::fixtures::{dance, reframe};

    /// End-to-end: identical copies align at offset 0 over the full length
    #[test]
    fn test_identical_copies_align_fully() {
        let frames = dance(1, 40);
        let outcome = MotionEngine::default().align(&frames, &frames).unwrap();

        assert_eq!(outcome.alignment.offset(), 0);
        assert_eq!(outcome.alignment.teacher_start, 0);
        assert_eq!(outcome.alignment.length, 40);
        assert!(outcome.alignment.per_frame_score.iter().all(|&s| s > 0.999));
    }

    /// Both copies start with frames where nobody was detected
    #[test]
    fn test_identical_copies_with_leading_empty_frames() {
        let mut frames = vec![Frame::empty(); 5];
        frames.extend(dance(13, 30));
        let outcome = MotionEngine::default().align(&frames, &frames).unwrap();

        assert_eq!(outcome.alignment.offset(), 0);
        assert_eq!(
            (outcome.alignment.teacher_start, outcome.alignment.length),
            (0, 35)
        );
    }

    /// Both copies lose the dancer for 20 frames mid-routine
    #[test]
    fn test_identical_copies_with_mid_sequence_dropout() {
        let mut frames = dance(14, 10);
        frames.extend(vec![Frame::empty(); 20]);
        frames.extend(dance(15, 10));
        let outcome = MotionEngine::default().align(&frames, &frames).unwrap();

        assert_eq!(outcome.alignment.offset(), 0);
        assert_eq!(
            (outcome.alignment.teacher_start, outcome.alignment.length),
            (0, 40)
        );
        assert_eq!(outcome.score_track.len(), 40);
    }

    /// Copies where only a couple of joints are visible still align in full
    #[test]
    fn test_identical_copies_with_sparse_frames() {
        let mut frames = dance(16, 30);
        for frame in frames[1..29].iter_mut() {
            for joint in frame.joints.iter_mut().skip(2) {
                joint.confidence = 0.0;
            }
        }
        let outcome = MotionEngine::default().align(&frames, &frames).unwrap();
        assert_eq!(outcome.alignment.offset(), 0);
        assert_eq!(outcome.alignment.length, 30);
    }

    /// End-to-end: prepending k empty frames to the student shifts student_start by k
    #[test]
    fn test_leading_no_signal_frames_shift_student_start() {
        let teacher = dance(2, 30);
        let engine = MotionEngine::default();
        let base = engine.align(&teacher, &teacher).unwrap().alignment;

        for k in [1usize, 4, 9] {
            let mut student = vec![Frame::empty(); k];
            student.extend_from_slice(&teacher);

            let shifted = engine.align(&teacher, &student).unwrap().alignment;
            assert_eq!(shifted.student_start, base.student_start + k, "k = {k}");
            assert_eq!(shifted.teacher_start, base.teacher_start);
            assert_eq!(shifted.length, base.length);
        }
    }

    /// End-to-end: student frames 3..8 repeat teacher frames 0..5, everything else differs
    #[test]
    fn test_ten_frame_partial_match() {
        let teacher = dance(3, 10);
        let mut student = dance(4, 10);
        student[3..8].copy_from_slice(&teacher[0..5]);

        let outcome = MotionEngine::default().align(&teacher, &student).unwrap();
        let alignment = &outcome.alignment;

        assert_eq!(
            (alignment.teacher_start, alignment.student_start, alignment.length),
            (0, 3, 5)
        );
        assert!(alignment.per_frame_score.iter().all(|&s| s > 0.999));
        assert_eq!(outcome.score_track.len(), 5);
        assert_eq!(outcome.score_track[0].student_frame, 3);
    }

    /// End-to-end: an empty teacher is an EmptySequence failure, not a zero-length success
    #[test]
    fn test_empty_teacher_fails() {
        let student = dance(5, 12);
        let err = MotionEngine::default().align(&[], &student).unwrap_err();
        assert!(matches!(
            err,
            ContractError::EmptySequence {
                which: SequenceSide::Teacher
            }
        ));
    }

    #[test]
    fn test_too_short_is_no_feasible_alignment() {
        let mut config = EngineConfig::default();
        config.alignment.min_length = 20;
        let frames = dance(6, 10);

        let err = MotionEngine::new(config).align(&frames, &frames).unwrap_err();
        assert!(matches!(err, ContractError::NoFeasibleAlignment { min_length: 20, .. }));
    }

    /// Recording the student further away and off-centre does not change the result
    #[test]
    fn test_alignment_ignores_camera_framing() {
        let teacher = dance(7, 25);
        let student: Vec<Frame> = teacher.iter().map(|f| reframe(f, 0.4, 310.0, 25.0)).collect();

        let outcome = MotionEngine::default().align(&teacher, &student).unwrap();
        assert_eq!(outcome.alignment.offset(), 0);
        assert_eq!(outcome.alignment.length, 25);
        assert!(outcome.alignment.per_frame_score.iter().all(|&s| s > 0.99));
    }

    #[test]
    fn test_swapping_inputs_transposes_matrix() {
        let engine = MotionEngine::default();
        let a = engine.normalize_sequence(&dance(8, 9), SequenceSide::Teacher);
        let b = engine.normalize_sequence(&dance(9, 6), SequenceSide::Student);

        let ab = engine.build_matrix(&a, &b);
        let ba = engine.build_matrix(&b, &a);
        assert_eq!(ab, ba.transpose());
    }

    #[test]
    fn test_alignment_is_deterministic() {
        let teacher = dance(10, 30);
        let mut student = dance(11, 35);
        student[12..30].copy_from_slice(&teacher[5..23]);

        let engine = MotionEngine::default();
        let first = engine.align(&teacher, &student).unwrap();
        let second = engine.align(&teacher, &student).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.alignment.score.to_bits(), second.alignment.score.to_bits());
    }

    #[test]
    fn test_score_track_accumulates_similarity() {
        let frames = dance(12, 15);
        let engine = MotionEngine::default();
        let outcome = engine.align(&frames, &frames).unwrap();

        let points = engine.config().score.points_per_frame;
        let last = outcome.score_track.last().unwrap();
        assert!((last.cumulative - 15.0 * points).abs() < 1e-2);
        assert!(outcome
            .score_track
            .windows(2)
            .all(|w| w[1].displayed >= w[0].displayed));
    }
}

#[cfg(test)]
mod smoother_tests {
    use contracts::EngineConfig;
    use motion_engine::{smooth, MotionEngine};

    use crate::fixtures::dance;

    #[test]
    fn test_window_one_returns_raw_frames() {
        let frames = dance(20, 8);
        for (i, frame) in frames.iter().enumerate() {
            assert_eq!(smooth(&frames, i, 1).unwrap(), *frame);
        }
    }

    #[test]
    fn test_large_window_at_boundaries() {
        let frames = dance(21, 6);
        let first = smooth(&frames, 0, 101).unwrap();
        let last = smooth(&frames, 5, 101).unwrap();

        // Both windows clamp to the whole sequence
        for k in 0..first.joints.len() {
            assert_eq!(first.joints[k].x, last.joints[k].x);
            assert_eq!(first.joints[k].y, last.joints[k].y);
            assert_eq!(first.joints[k].confidence, frames[0].joints[k].confidence);
            assert_eq!(last.joints[k].confidence, frames[5].joints[k].confidence);
        }
        assert!(smooth(&frames, 6, 3).is_err());
    }

    #[test]
    fn test_smooth_aligned_range() {
        let mut config = EngineConfig::default();
        config.smoother.window = 3;
        let engine = MotionEngine::new(config);

        let frames = dance(22, 20);
        let outcome = engine.align(&frames, &frames).unwrap();
        let smoothed = engine
            .smooth_range(&frames, outcome.alignment.student_start, outcome.alignment.length)
            .unwrap();

        assert_eq!(smoothed.len(), outcome.alignment.length);
        assert_eq!(smoothed[4], engine.smooth(&frames, 4).unwrap());
        assert_ne!(smoothed[4], frames[4]);
    }
}

#[cfg(test)]
mod store_tests {
    use std::cell::Cell;
    use std::path::Path;

    use contracts::{ContractError, KeypointSequence};
    use keypoint_store::{load_or_extract, read_keypoints, write_keypoints, FileKeypointStore};
    use motion_engine::MotionEngine;

    use crate::fixtures::dance;

    /// Keypoints extracted once per video, then served from cache for alignment
    #[test]
    fn test_cached_keypoints_feed_alignment() {
        let cache = tempfile::tempdir().unwrap();
        let store = FileKeypointStore::in_dir(cache.path());
        let extractions = Cell::new(0);

        let extract = |video: &Path| -> Result<KeypointSequence, ContractError> {
            extractions.set(extractions.get() + 1);
            Ok(KeypointSequence::new(dance(30, 24)).with_source(video.display().to_string()))
        };

        let teacher_video = Path::new("/videos/teacher.mp4");
        let teacher = load_or_extract(&store, teacher_video, extract).unwrap();
        let again = load_or_extract(&store, teacher_video, extract).unwrap();
        assert_eq!(extractions.get(), 1);
        assert_eq!(teacher, again);

        let outcome = MotionEngine::default().align(&teacher.frames, &again.frames).unwrap();
        assert_eq!(outcome.alignment.length, 24);
    }

    #[test]
    fn test_json_keypoints_round_trip_through_engine() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("student.json");
        let sequence = KeypointSequence::new(dance(32, 16));
        write_keypoints(&path, &sequence).unwrap();

        let loaded = read_keypoints(&path).unwrap();
        assert_eq!(loaded.frames, sequence.frames);

        let engine = MotionEngine::default();
        assert_eq!(
            engine.align(&sequence.frames, &loaded.frames).unwrap(),
            engine.align(&sequence.frames, &sequence.frames).unwrap()
        );
    }
}

#[cfg(test)]
mod config_tests {
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{ContractError, MetricKind};
    use motion_engine::MotionEngine;
    use observability::ScoreAggregator;

    use crate::fixtures::dance;

    #[test]
    fn test_loaded_config_drives_engine() {
        let config = ConfigLoader::load_from_str(
            r#"
[similarity]
metric = "cosine"

[alignment]
min_length = 50
"#,
            ConfigFormat::Toml,
        )
        .unwrap();
        assert_eq!(config.similarity.metric, MetricKind::Cosine);

        let engine = MotionEngine::new(config);
        assert_eq!(engine.metric().name(), "cosine");

        let frames = dance(40, 30);
        let err = engine.align(&frames, &frames).unwrap_err();
        assert!(matches!(err, ContractError::NoFeasibleAlignment { .. }));
    }

    #[test]
    fn test_score_summary_of_full_match() {
        let frames = dance(41, 20);
        let engine = MotionEngine::default();
        let outcome = engine.align(&frames, &frames).unwrap();

        let threshold = f64::from(engine.config().alignment.match_threshold);
        let summary = ScoreAggregator::from_track(&outcome.score_track, threshold).summary();
        assert_eq!(summary.total_frames, 20);
        assert_eq!(summary.matched_frames, 20);
        assert!((summary.match_rate - 100.0).abs() < 1e-9);
        assert_eq!(summary.final_score, outcome.score_track[19].cumulative);
    }
}
