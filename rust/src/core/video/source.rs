//! 帧来源 - 相机流的抽象

use super::frame::Frame;
use log::{debug, info};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AcquisitionError {
    #[error("camera permission denied")]
    PermissionDenied,
    #[error("camera device unavailable: {0}")]
    DeviceUnavailable(String),
}

/// A live camera stream.
///
/// `start` is asynchronous because acquiring the camera waits on the platform
/// (permission prompt, device open). A failure there is terminal for the
/// session that requested it.
#[allow(async_fn_in_trait)]
pub trait FrameSource {
    async fn start(&mut self) -> Result<(), AcquisitionError>;

    /// The most recent frame, or `None` while the stream is still warming up.
    fn current_frame(&mut self) -> Option<Frame>;

    fn stop(&mut self);
}

/// 由宿主层（Flutter）推送帧的来源
///
/// The host owns the real camera; it reports whether acquisition succeeded and
/// then pushes one frame per display refresh. Each frame is handed out once.
#[derive(Debug, Default)]
pub struct HostFrameSource {
    latest: Option<Frame>,
    failure: Option<AcquisitionError>,
    started: bool,
}

impl HostFrameSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// A source whose `start` fails with `error`.
    pub fn failing(error: AcquisitionError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }

    pub fn push_frame(&mut self, frame: Frame) {
        if !self.started {
            debug!("HostFrameSource: dropping frame {} (not started)", frame.frame_number);
            return;
        }
        self.latest = Some(frame);
    }

    pub fn is_started(&self) -> bool {
        self.started
    }
}

impl FrameSource for HostFrameSource {
    async fn start(&mut self) -> Result<(), AcquisitionError> {
        if let Some(error) = self.failure.take() {
            return Err(error);
        }
        self.started = true;
        info!("📷 HostFrameSource: started");
        Ok(())
    }

    fn current_frame(&mut self) -> Option<Frame> {
        self.latest.take()
    }

    fn stop(&mut self) {
        if self.started {
            info!("📷 HostFrameSource: stopped");
        }
        self.started = false;
        self.latest = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    fn create_test_frame(frame_number: u64) -> Frame {
        Frame::new(8, 8, vec![0u8; 8 * 8 * 4], frame_number * 33, frame_number)
    }

    #[test]
    fn test_frames_handed_out_once() {
        let mut source = HostFrameSource::new();
        block_on(source.start()).unwrap();

        source.push_frame(create_test_frame(1));
        source.push_frame(create_test_frame(2));

        let frame = source.current_frame().unwrap();
        assert_eq!(frame.frame_number, 2);
        assert!(source.current_frame().is_none());
    }

    #[test]
    fn test_frames_dropped_before_start() {
        let mut source = HostFrameSource::new();
        source.push_frame(create_test_frame(1));
        assert!(source.current_frame().is_none());
    }

    #[test]
    fn test_failing_source() {
        let mut source = HostFrameSource::failing(AcquisitionError::PermissionDenied);
        let result = block_on(source.start());
        assert_eq!(result, Err(AcquisitionError::PermissionDenied));
        assert!(!source.is_started());
    }

    #[test]
    fn test_stop_releases_frame() {
        let mut source = HostFrameSource::new();
        block_on(source.start()).unwrap();
        source.push_frame(create_test_frame(1));

        source.stop();
        assert!(!source.is_started());
        assert!(source.current_frame().is_none());
    }
}
