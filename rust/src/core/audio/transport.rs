//! 音频播放控制 - 外部播放器的抽象

use super::error::TransportError;
use futures::channel::oneshot;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// External audio playback primitive.
///
/// Durations and times are in seconds. `duration()` is `0.0` until the track
/// metadata is loaded.
pub trait Transport {
    fn duration(&self) -> f64;
    fn current_time(&self) -> f64;
    fn seek(&mut self, time: f64) -> Result<(), TransportError>;
    fn play(&mut self) -> PlayRequest;
    fn pause(&mut self);
    fn is_paused(&self) -> bool;
}

/// Handle for an in-flight play request.
///
/// Platforms may refuse playback (autoplay policy), and they answer
/// asynchronously. The handle can be awaited, or polled without blocking
/// through [`PlayRequest::try_outcome`].
#[derive(Debug)]
pub struct PlayRequest {
    inner: RequestState,
}

#[derive(Debug)]
enum RequestState {
    Ready(Option<Result<(), TransportError>>),
    Pending(oneshot::Receiver<Result<(), TransportError>>),
}

impl PlayRequest {
    pub fn accepted() -> Self {
        Self {
            inner: RequestState::Ready(Some(Ok(()))),
        }
    }

    pub fn rejected(error: TransportError) -> Self {
        Self {
            inner: RequestState::Ready(Some(Err(error))),
        }
    }

    /// A request resolved later through the returned [`PlayCompleter`].
    pub fn pending() -> (Self, PlayCompleter) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                inner: RequestState::Pending(rx),
            },
            PlayCompleter { tx },
        )
    }

    /// `None` while the platform has not answered yet.
    ///
    /// A completer dropped without answering yields `Err(Abandoned)`. The
    /// outcome is handed out once; later calls report `Ok(())`.
    pub fn try_outcome(&mut self) -> Option<Result<(), TransportError>> {
        match &mut self.inner {
            RequestState::Ready(outcome) => Some(outcome.take().unwrap_or(Ok(()))),
            RequestState::Pending(rx) => match rx.try_recv() {
                Ok(Some(outcome)) => {
                    self.inner = RequestState::Ready(None);
                    Some(outcome)
                }
                Ok(None) => None,
                Err(oneshot::Canceled) => {
                    self.inner = RequestState::Ready(None);
                    Some(Err(TransportError::Abandoned))
                }
            },
        }
    }
}

impl Future for PlayRequest {
    type Output = Result<(), TransportError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match &mut this.inner {
            RequestState::Ready(outcome) => Poll::Ready(outcome.take().unwrap_or(Ok(()))),
            RequestState::Pending(rx) => Pin::new(rx)
                .poll(cx)
                .map(|received| received.unwrap_or(Err(TransportError::Abandoned))),
        }
    }
}

/// Resolves a pending [`PlayRequest`].
#[derive(Debug)]
pub struct PlayCompleter {
    tx: oneshot::Sender<Result<(), TransportError>>,
}

impl PlayCompleter {
    pub fn complete(self, outcome: Result<(), TransportError>) {
        // the request may already be dropped, nobody is waiting then
        let _ = self.tx.send(outcome);
    }
}
