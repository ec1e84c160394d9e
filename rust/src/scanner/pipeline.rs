use crate::core::audio::Transport;
use crate::core::video::Frame;
use crate::scanner::classifier::ColorThresholds;
use crate::scanner::sections::{SectionAggregator, SectionCounts};
use crate::scanner::selector::{select_dominant, DetectionResult};
use crate::scanner::smoother::PositionSmoother;
use crate::scanner::transport_mapper::{TrackingState, TransportEffects, TransportMapper};
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// 扫描配置，宿主可用 JSON 覆盖任意字段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// 横向分区数
    pub num_sections: usize,
    /// 采样步长（像素），两个方向相同
    pub sample_step: usize,
    /// 主分区计数必须严格大于该值才算检测到
    pub detection_threshold: u32,
    /// 指数平滑系数 (0, 1]，越大跟随越快、抖动越大
    pub smoothing_factor: f64,
    /// 播放位置与目标相差超过该秒数才 seek
    pub seek_epsilon: f64,
    pub color: ColorThresholds,
    /// 会话开始时先 play 再 pause，解锁自动播放限制
    pub prime_transport: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            num_sections: 12,
            sample_step: 6,
            detection_threshold: 20,
            smoothing_factor: 0.25,
            seek_epsilon: 0.35,
            color: ColorThresholds::default(),
            prime_transport: true,
        }
    }
}

impl ScanConfig {
    pub fn for_fast_tracking() -> Self {
        Self {
            smoothing_factor: 0.4,
            seek_epsilon: 0.25,
            ..Self::default()
        }
    }

    pub fn for_steady_tracking() -> Self {
        Self {
            smoothing_factor: 0.15,
            seek_epsilon: 0.5,
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: ScanConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_sections == 0 {
            return Err(ConfigError::Invalid("num_sections must be at least 1".into()));
        }
        if self.sample_step == 0 {
            return Err(ConfigError::Invalid("sample_step must be at least 1".into()));
        }
        if !(self.smoothing_factor > 0.0 && self.smoothing_factor <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "smoothing_factor must be in (0, 1], got {}",
                self.smoothing_factor
            )));
        }
        if !(self.seek_epsilon.is_finite() && self.seek_epsilon >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "seek_epsilon must be a non-negative number, got {}",
                self.seek_epsilon
            )));
        }
        Ok(())
    }
}

/// 扫描统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStats {
    pub processed_ticks: u64,
    pub skipped_ticks: u64,
    pub detected_ticks: u64,
    pub seeks_issued: u64,
    pub seeks_rejected: u64,
    pub play_requests: u64,
    pub plays_rejected: u64,
    pub pauses_issued: u64,
}

impl ScanStats {
    fn record(&mut self, detection: &DetectionResult, effects: &TransportEffects) {
        self.processed_ticks += 1;
        if detection.detected {
            self.detected_ticks += 1;
        }
        if effects.seek_to.is_some() {
            self.seeks_issued += 1;
        }
        if effects.seek_rejected {
            self.seeks_rejected += 1;
        }
        if effects.play_requested {
            self.play_requests += 1;
        }
        if effects.play_rejected {
            self.plays_rejected += 1;
        }
        if effects.paused {
            self.pauses_issued += 1;
        }
    }
}

/// Everything one analysis tick produced.
#[derive(Debug, Clone)]
pub struct TickReport {
    pub frame_number: u64,
    pub counts: SectionCounts,
    pub detection: DetectionResult,
    pub position: Option<f64>,
    pub tracking: TrackingState,
    pub effects: TransportEffects,
}

pub struct ScanPipeline {
    aggregator: SectionAggregator,
    smoother: PositionSmoother,
    mapper: TransportMapper,
    config: ScanConfig,
    stats: ScanStats,
}

impl ScanPipeline {
    pub fn new() -> Self {
        Self::with_config(ScanConfig::default())
    }

    pub fn with_config(config: ScanConfig) -> Self {
        Self {
            aggregator: SectionAggregator::new(
                config.num_sections,
                config.sample_step,
                config.color,
            ),
            smoother: PositionSmoother::new(config.num_sections, config.smoothing_factor),
            mapper: TransportMapper::new(config.seek_epsilon),
            config,
            stats: ScanStats::default(),
        }
    }

    /// Run one frame through classify → aggregate → select → smooth → map.
    pub fn process_frame<T: Transport + ?Sized>(
        &mut self,
        frame: &Frame,
        transport: &mut T,
    ) -> TickReport {
        let counts = self.aggregator.count(frame);
        let detection = select_dominant(&counts, self.config.detection_threshold);
        let position = self.smoother.update(&detection);
        let effects = self.mapper.apply(position, transport);

        self.stats.record(&detection, &effects);

        debug!(
            "frame {}: section {} count {} detected {} position {:?}",
            frame.frame_number,
            detection.dominant_index,
            detection.count,
            detection.detected,
            position
        );

        TickReport {
            frame_number: frame.frame_number,
            counts,
            detection,
            position,
            tracking: self.mapper.state(),
            effects,
        }
    }

    pub fn record_skipped(&mut self) {
        self.stats.skipped_ticks += 1;
    }

    pub fn smoothed_position(&self) -> Option<f64> {
        self.smoother.value()
    }

    pub fn play_in_flight(&self) -> bool {
        self.mapper.play_in_flight()
    }

    pub fn tracking_state(&self) -> TrackingState {
        self.mapper.state()
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn stats(&self) -> ScanStats {
        self.stats
    }

    /// Drop tracking state; stats are kept for the session report.
    pub fn reset(&mut self) {
        self.smoother.reset();
        self.mapper.reset();
    }
}

impl Default for ScanPipeline {
    fn default() -> Self {
        Self::new()
    }
}
