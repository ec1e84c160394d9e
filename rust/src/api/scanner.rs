//! 扫描发声器 - Flutter 侧入口

use crate::core::audio::{HostTransport, TransportCommand, TransportError, TransportSnapshot};
use crate::core::video::{AcquisitionError, Frame, HostFrameSource, RawFrame, RgbaFrameData};
use crate::scanner::{
    ConfigError, ManualScheduler, ScanConfig, ScanSession, ScanStats, ScanStatus, SessionError,
    TickOutcome, TickScheduler,
};
use flutter_rust_bridge::frb;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard};

type HostSession = ScanSession<HostFrameSource, HostTransport, ManualScheduler>;

/// 扫描 API 错误类型，FRB 友好的设计
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerApiError {
    pub error_type: String,
    pub message: String,
}

impl ScannerApiError {
    fn no_session() -> Self {
        Self {
            error_type: "NoSession".to_string(),
            message: "扫描会话尚未开始".to_string(),
        }
    }

    fn lock_poisoned() -> Self {
        Self {
            error_type: "LockPoisoned".to_string(),
            message: "会话锁已损坏".to_string(),
        }
    }
}

impl std::fmt::Display for ScannerApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.error_type, self.message)
    }
}

impl std::error::Error for ScannerApiError {}

impl From<ConfigError> for ScannerApiError {
    fn from(e: ConfigError) -> Self {
        Self {
            error_type: "InvalidConfig".to_string(),
            message: format!("配置无效: {}", e),
        }
    }
}

impl From<SessionError> for ScannerApiError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::Acquisition(AcquisitionError::PermissionDenied) => Self {
                error_type: "CameraPermissionDenied".to_string(),
                message: "相机权限被拒绝".to_string(),
            },
            SessionError::Acquisition(AcquisitionError::DeviceUnavailable(reason)) => Self {
                error_type: "CameraUnavailable".to_string(),
                message: format!("相机不可用: {}", reason),
            },
            SessionError::Config(e) => e.into(),
            SessionError::AlreadyActive => Self {
                error_type: "SessionActive".to_string(),
                message: "扫描会话已在运行".to_string(),
            },
        }
    }
}

/// 宿主获取相机的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraAvailability {
    Granted,
    PermissionDenied,
    DeviceUnavailable { reason: String },
}

impl CameraAvailability {
    fn into_source(self) -> HostFrameSource {
        match self {
            CameraAvailability::Granted => HostFrameSource::new(),
            CameraAvailability::PermissionDenied => {
                HostFrameSource::failing(AcquisitionError::PermissionDenied)
            }
            CameraAvailability::DeviceUnavailable { reason } => {
                HostFrameSource::failing(AcquisitionError::DeviceUnavailable(reason))
            }
        }
    }
}

/// 会话开始结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStartResult {
    /// Priming commands the host must apply to its player.
    pub commands: Vec<TransportCommand>,
    pub status: ScanStatus,
}

/// 单帧处理结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickResult {
    pub detected: bool,
    /// Dominant section of the analyzed frame, `None` when the tick was
    /// skipped or not due.
    pub dominant_index: Option<u32>,
    /// Smoothed position in [0, 1], `None` while nothing is tracked.
    pub position: Option<f64>,
    pub commands: Vec<TransportCommand>,
    pub status: ScanStatus,
    pub tick_scheduled: bool,
}

/// 扫描发声器 - 相机画面驱动音轨播放位置
///
/// ```dart
/// final scanner = SoundScanner.create();
/// final start = await scanner.beginSession(
///     camera: CameraAvailability.granted(), snapshot: player.snapshot());
/// player.apply(start.commands);
/// final tick = scanner.processRgbaFrame(frame: frame, snapshot: player.snapshot());
/// player.apply(tick.commands);
/// // when player.play() settles:
/// scanner.reportPlayResult(accepted: ok);
/// final stop = scanner.endSession(snapshot: player.snapshot());
/// player.apply(stop);
/// // on page teardown:
/// player.apply(scanner.dispose(snapshot: player.snapshot()));
/// ```
#[frb(opaque)]
pub struct SoundScanner {
    config: ScanConfig,
    session: Mutex<Option<HostSession>>,
}

impl SoundScanner {
    /// 使用默认配置创建
    #[frb(sync)]
    pub fn create() -> Self {
        info!("🎬 SoundScanner: created");
        Self::with_config(ScanConfig::default())
    }

    /// 使用 JSON 配置创建，未给出的字段取默认值
    #[frb(sync)]
    pub fn create_with_config_json(json: String) -> Result<Self, ScannerApiError> {
        let config = ScanConfig::from_json(&json)?;
        info!("🎬 SoundScanner: created with custom config");
        Ok(Self::with_config(config))
    }

    fn with_config(config: ScanConfig) -> Self {
        crate::init_logging();
        Self {
            config,
            session: Mutex::new(None),
        }
    }

    /// 开始扫描会话
    ///
    /// `camera` is the outcome of the host's own camera request. A failed
    /// acquisition leaves the scanner in `CameraUnavailable` until the next
    /// `begin_session`.
    #[frb(dart_async)]
    pub async fn begin_session(
        &self,
        camera: CameraAvailability,
        snapshot: TransportSnapshot,
    ) -> Result<SessionStartResult, ScannerApiError> {
        if self.lock_session()?.as_ref().is_some_and(|s| s.is_active()) {
            return Err(SessionError::AlreadyActive.into());
        }

        let mut session = ScanSession::new(
            self.config.clone(),
            camera.into_source(),
            HostTransport::new(snapshot),
            ManualScheduler::new(),
        )
        .map_err(SessionError::from)?;

        let started = session.begin().await;
        let result = self.install_session(session)?;

        started?;
        Ok(result)
    }

    /// Store a freshly begun session, unless another `begin_session` finished
    /// while this one awaited the camera.
    fn install_session(
        &self,
        mut session: HostSession,
    ) -> Result<SessionStartResult, ScannerApiError> {
        let mut guard = self.lock_session()?;
        if guard.as_ref().is_some_and(|s| s.is_active()) {
            session.end();
            return Err(SessionError::AlreadyActive.into());
        }

        let result = SessionStartResult {
            commands: session.transport_mut().take_commands(),
            status: session.status(),
        };
        *guard = Some(session);
        Ok(result)
    }

    /// 处理一帧 RGBA 画面
    #[frb(sync)]
    pub fn process_rgba_frame(
        &self,
        frame: RgbaFrameData,
        snapshot: TransportSnapshot,
    ) -> Result<TickResult, ScannerApiError> {
        self.process_frame(frame.into(), snapshot)
    }

    /// 处理一帧 YUV (I420) 画面
    #[frb(sync)]
    pub fn process_yuv_frame(
        &self,
        frame: RawFrame,
        snapshot: TransportSnapshot,
    ) -> Result<TickResult, ScannerApiError> {
        self.process_frame(frame.to_rgba(), snapshot)
    }

    fn process_frame(
        &self,
        frame: Frame,
        snapshot: TransportSnapshot,
    ) -> Result<TickResult, ScannerApiError> {
        let mut guard = self.lock_session()?;
        let session = guard.as_mut().ok_or_else(ScannerApiError::no_session)?;

        session.transport_mut().sync(snapshot);
        session.source_mut().push_frame(frame);

        let (detected, dominant_index, position) = match session.advance() {
            TickOutcome::Processed(report) => (
                report.detection.detected,
                Some(report.detection.dominant_index as u32),
                report.position,
            ),
            _ => (false, None, session.smoothed_position()),
        };

        Ok(TickResult {
            detected,
            dominant_index,
            position,
            commands: session.transport_mut().take_commands(),
            status: session.status(),
            tick_scheduled: session.scheduler().is_scheduled(),
        })
    }

    /// 上报播放请求结果（宿主 play() 完成或被拒绝后调用）
    #[frb(sync)]
    pub fn report_play_result(&self, accepted: bool) -> Result<(), ScannerApiError> {
        let mut guard = self.lock_session()?;
        let session = guard.as_mut().ok_or_else(ScannerApiError::no_session)?;

        let outcome = if accepted {
            Ok(())
        } else {
            Err(TransportError::PlayRejected("refused by host player".to_string()))
        };
        let resolved = session.transport_mut().resolve_pending_plays(outcome);
        if resolved == 0 {
            warn!("⚠️ SoundScanner: play result reported with no pending request");
        }
        Ok(())
    }

    /// 结束扫描会话，返回需要执行的暂停命令
    #[frb(sync)]
    pub fn end_session(
        &self,
        snapshot: TransportSnapshot,
    ) -> Result<Vec<TransportCommand>, ScannerApiError> {
        let mut guard = self.lock_session()?;
        let Some(session) = guard.as_mut() else {
            return Ok(Vec::new());
        };

        session.transport_mut().sync(snapshot);
        session.end();
        Ok(session.transport_mut().take_commands())
    }

    /// 释放扫描器（页面销毁时调用），返回需要执行的暂停命令
    ///
    /// Ends a running session and forgets it; stats and status read as
    /// defaults afterwards.
    #[frb(sync)]
    pub fn dispose(
        &self,
        snapshot: TransportSnapshot,
    ) -> Result<Vec<TransportCommand>, ScannerApiError> {
        let Some(mut session) = self.lock_session()?.take() else {
            return Ok(Vec::new());
        };

        session.transport_mut().sync(snapshot);
        session.end();
        info!("🧹 SoundScanner: disposed");
        Ok(session.transport_mut().take_commands())
    }

    /// 获取扫描统计（当前或最近一次会话）
    #[frb(sync, getter)]
    pub fn stats(&self) -> ScanStats {
        self.lock_session()
            .ok()
            .and_then(|guard| guard.as_ref().map(|s| s.stats()))
            .unwrap_or_default()
    }

    /// 获取会话状态
    #[frb(sync, getter)]
    pub fn status(&self) -> ScanStatus {
        self.lock_session()
            .ok()
            .and_then(|guard| guard.as_ref().map(|s| s.status()))
            .unwrap_or_default()
    }

    /// 当前配置
    #[frb(sync, getter)]
    pub fn config(&self) -> ScanConfig {
        self.config.clone()
    }

    fn lock_session(&self) -> Result<MutexGuard<'_, Option<HostSession>>, ScannerApiError> {
        self.session
            .lock()
            .map_err(|_| ScannerApiError::lock_poisoned())
    }
}

impl Drop for SoundScanner {
    fn drop(&mut self) {
        if let Ok(Some(session)) = self.session.get_mut().map(Option::as_mut) {
            if session.is_active() {
                // the camera is released, but the host never sees the pause
                warn!("⚠️ SoundScanner: dropped with a running session, call dispose() first");
                session.end();
            }
        }
        info!("🗑️ SoundScanner: released");
    }
}
