//! 扫描会话 - 相机获取、逐拍分析、结束时释放

use super::pipeline::{ConfigError, ScanConfig, ScanPipeline, ScanStats, TickReport};
use super::scheduler::TickScheduler;
use crate::core::audio::Transport;
use crate::core::video::{AcquisitionError, FrameSource};
use log::{error, info, trace};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("camera acquisition failed: {0}")]
    Acquisition(#[from] AcquisitionError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("a scan session is already running")]
    AlreadyActive,
}

/// 会话状态，宿主据此显示提示文字
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScanStatus {
    #[default]
    Idle,
    RequestingCamera,
    /// Camera is live but no frame has been analyzed yet.
    Analyzing,
    Searching,
    Detected,
    CameraUnavailable,
}

#[derive(Debug, Clone)]
pub enum TickOutcome {
    /// The scheduler had no tick outstanding.
    NotDue,
    /// The session is not running.
    Stopped,
    /// No usable frame this tick.
    Skipped,
    Processed(TickReport),
}

/// One camera-to-transport scanning session.
///
/// `begin` acquires the camera, after which every due tick pulls the latest
/// frame through the pipeline and reschedules itself until `end`.
pub struct ScanSession<S, T, K>
where
    S: FrameSource,
    T: Transport,
    K: TickScheduler,
{
    pipeline: ScanPipeline,
    source: S,
    transport: T,
    scheduler: K,
    status: ScanStatus,
    active: bool,
}

impl<S, T, K> ScanSession<S, T, K>
where
    S: FrameSource,
    T: Transport,
    K: TickScheduler,
{
    pub fn new(
        config: ScanConfig,
        source: S,
        transport: T,
        scheduler: K,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            pipeline: ScanPipeline::with_config(config),
            source,
            transport,
            scheduler,
            status: ScanStatus::Idle,
            active: false,
        })
    }

    /// Prime the transport, then acquire the camera and schedule the first
    /// tick. An acquisition failure ends the session for good.
    pub async fn begin(&mut self) -> Result<(), SessionError> {
        if self.active {
            return Err(SessionError::AlreadyActive);
        }

        if self.pipeline.config().prime_transport {
            self.prime_transport();
        }

        self.status = ScanStatus::RequestingCamera;
        info!("📷 ScanSession: requesting camera");

        match self.source.start().await {
            Ok(()) => {
                self.active = true;
                self.status = ScanStatus::Analyzing;
                self.scheduler.schedule_next();
                info!("🎯 ScanSession: started");
                Ok(())
            }
            Err(e) => {
                self.status = ScanStatus::CameraUnavailable;
                error!("❌ ScanSession: camera unavailable: {}", e);
                Err(e.into())
            }
        }
    }

    /// Run the tick if one is due.
    pub fn advance(&mut self) -> TickOutcome {
        if !self.scheduler.take_due() {
            return TickOutcome::NotDue;
        }
        self.tick()
    }

    /// Analyze the current frame and schedule the next tick.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.active {
            return TickOutcome::Stopped;
        }

        let outcome = match self.source.current_frame() {
            Some(frame) if frame.is_ready() => {
                let report = self.pipeline.process_frame(&frame, &mut self.transport);
                self.status = if report.detection.detected {
                    ScanStatus::Detected
                } else {
                    ScanStatus::Searching
                };
                TickOutcome::Processed(report)
            }
            _ => {
                trace!("ScanSession: no frame ready, skipping tick");
                self.pipeline.record_skipped();
                TickOutcome::Skipped
            }
        };

        self.scheduler.schedule_next();
        outcome
    }

    /// Stop ticking, release the camera and pause playback in place.
    pub fn end(&mut self) {
        self.scheduler.cancel();
        self.source.stop();
        self.status = ScanStatus::Idle;

        if !self.transport.is_paused() || self.pipeline.play_in_flight() {
            self.transport.pause();
        }
        self.pipeline.reset();

        if std::mem::take(&mut self.active) {
            let stats = self.pipeline.stats();
            info!(
                "⏹️ ScanSession: ended ({} processed, {} detected, {} skipped)",
                stats.processed_ticks, stats.detected_ticks, stats.skipped_ticks
            );
        }
    }

    /// One play immediately followed by a pause, so later plays are not
    /// blocked by the platform's autoplay policy.
    fn prime_transport(&mut self) {
        let mut request = self.transport.play();
        if let Some(Err(e)) = request.try_outcome() {
            trace!("ScanSession: priming play rejected: {}", e);
        }
        self.transport.pause();
    }

    pub fn status(&self) -> ScanStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn stats(&self) -> ScanStats {
        self.pipeline.stats()
    }

    pub fn config(&self) -> &ScanConfig {
        self.pipeline.config()
    }

    pub fn smoothed_position(&self) -> Option<f64> {
        self.pipeline.smoothed_position()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn scheduler(&self) -> &K {
        &self.scheduler
    }
}
