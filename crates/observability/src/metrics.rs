//! Motion grader 指标收集模块
//!
//! 基于 AlignmentResult / ScoreSample 收集和统计对齐结果指标。

use contracts::{AlignmentResult, ScoreSample, SequenceSide};
use metrics::{counter, gauge, histogram};
use serde::Serialize;

/// 从 AlignmentResult 和分数轨迹记录指标
///
/// 每次对齐成功后调用此函数来记录指标。
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_alignment_metrics;
///
/// let outcome = engine.align(&teacher.frames, &student.frames)?;
/// record_alignment_metrics(&outcome.alignment, &outcome.score_track);
/// ```
pub fn record_alignment_metrics(alignment: &AlignmentResult, track: &[ScoreSample]) {
    // 对齐计数器
    counter!("motion_grader_alignments_reported_total").increment(1);

    // 偏移与长度
    gauge!("motion_grader_last_offset_frames").set(alignment.offset() as f64);
    gauge!("motion_grader_last_length_frames").set(alignment.length as f64);
    histogram!("motion_grader_segment_length_frames").record(alignment.length as f64);

    // 逐帧相似度
    for &similarity in &alignment.per_frame_score {
        histogram!("motion_grader_frame_similarity").record(similarity as f64);
    }

    // 最终分数
    if let Some(last) = track.last() {
        gauge!("motion_grader_last_final_score").set(last.cumulative);
    }
}

/// 记录关键点序列加载
pub fn record_keypoints_loaded(side: SequenceSide, frames: usize, empty_frames: usize) {
    counter!(
        "motion_grader_frames_loaded_total",
        "side" => side.as_str()
    )
    .increment(frames as u64);
    gauge!(
        "motion_grader_empty_frame_ratio",
        "side" => side.as_str()
    )
    .set(if frames > 0 {
        empty_frames as f64 / frames as f64
    } else {
        0.0
    });
}

/// 记录关键点缓存命中
pub fn record_cache_lookup(hit: bool) {
    let status = if hit { "hit" } else { "miss" };
    counter!("motion_grader_keypoint_cache_total", "status" => status).increment(1);
}

/// 分数轨迹聚合器
///
/// 在内存中聚合分数轨迹，便于统计和输出摘要。
#[derive(Debug, Clone, Default)]
pub struct ScoreAggregator {
    /// 总帧数
    pub total_frames: u64,

    /// 相似度达到阈值的帧数
    pub matched_frames: u64,

    /// 匹配阈值
    pub match_threshold: f64,

    /// 原始相似度统计
    pub similarity_stats: RunningStats,

    /// 显示曲线统计
    pub smoothed_stats: RunningStats,

    /// 最终累计分数
    pub final_score: f64,
}

impl ScoreAggregator {
    /// 创建新的聚合器
    pub fn new(match_threshold: f64) -> Self {
        Self {
            match_threshold,
            ..Self::default()
        }
    }

    /// 更新聚合统计
    pub fn update(&mut self, sample: &ScoreSample) {
        self.total_frames += 1;
        if sample.similarity as f64 >= self.match_threshold {
            self.matched_frames += 1;
        }
        self.similarity_stats.push(sample.similarity as f64);
        self.smoothed_stats.push(sample.smoothed as f64);
        self.final_score = sample.cumulative;
    }

    /// 聚合整条轨迹
    pub fn from_track(track: &[ScoreSample], match_threshold: f64) -> Self {
        let mut aggregator = Self::new(match_threshold);
        for sample in track {
            aggregator.update(sample);
        }
        aggregator
    }

    /// 生成摘要报告
    pub fn summary(&self) -> ScoreSummary {
        ScoreSummary {
            total_frames: self.total_frames,
            matched_frames: self.matched_frames,
            match_rate: if self.total_frames > 0 {
                self.matched_frames as f64 / self.total_frames as f64 * 100.0
            } else {
                0.0
            },
            similarity: StatsSummary::from(&self.similarity_stats),
            smoothed: StatsSummary::from(&self.smoothed_stats),
            final_score: self.final_score,
        }
    }
}

/// 分数摘要
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScoreSummary {
    pub total_frames: u64,
    pub matched_frames: u64,
    pub match_rate: f64,
    pub similarity: StatsSummary,
    pub smoothed: StatsSummary,
    pub final_score: f64,
}

impl std::fmt::Display for ScoreSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Score Summary ===")?;
        writeln!(f, "Aligned frames: {}", self.total_frames)?;
        writeln!(
            f,
            "Matched frames: {} ({:.2}%)",
            self.matched_frames, self.match_rate
        )?;
        writeln!(f, "Similarity: {}", self.similarity)?;
        writeln!(f, "Display curve: {}", self.smoothed)?;
        writeln!(f, "Final score: {:.0}", self.final_score)?;
        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// 样本数量
    pub fn count(&self) -> u64 {
        self.count
    }

    /// 均值
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// 标准差
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// 最小值
    pub fn min(&self) -> f64 {
        self.min
    }

    /// 最大值
    pub fn max(&self) -> f64 {
        self.max
    }
}
