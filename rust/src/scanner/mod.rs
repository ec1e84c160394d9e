//! 扫描发声 - 从相机画面中定位彩色区域，映射为音轨播放位置
//!
//! 每拍流程：
//! 1. 分区统计 - 按列把采样到的彩色像素计入横向分区
//! 2. 主分区选择 - 计数最多且超过阈值的分区
//! 3. 位置平滑 - 指数平滑，检测丢失即清空
//! 4. 播放映射 - seek / play / pause 决策

pub mod classifier;
pub mod pipeline;
pub mod scheduler;
pub mod sections;
pub mod selector;
pub mod session;
pub mod smoother;
pub mod transport_mapper;

pub use classifier::ColorThresholds;
pub use pipeline::{ConfigError, ScanConfig, ScanPipeline, ScanStats, TickReport};
pub use scheduler::{ManualScheduler, TickScheduler};
pub use sections::{SectionAggregator, SectionCounts};
pub use selector::{select_dominant, DetectionResult};
pub use session::{ScanSession, ScanStatus, SessionError, TickOutcome};
pub use smoother::PositionSmoother;
pub use transport_mapper::{TrackingState, TransportEffects, TransportMapper};
