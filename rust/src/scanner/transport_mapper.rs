use crate::core::audio::{PlayRequest, Transport};
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingState {
    Idle,
    Tracking,
}

/// 本帧对播放器产生的影响
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TransportEffects {
    pub seek_to: Option<f64>,
    pub seek_rejected: bool,
    pub play_requested: bool,
    /// An earlier play request was refused; observed on this tick.
    pub play_rejected: bool,
    pub paused: bool,
}

/// Translate the smoothed position into seek/play/pause requests.
pub struct TransportMapper {
    seek_epsilon: f64,
    state: TrackingState,
    pending_play: Option<PlayRequest>,
}

impl TransportMapper {
    pub fn new(seek_epsilon: f64) -> Self {
        Self {
            seek_epsilon,
            state: TrackingState::Idle,
            pending_play: None,
        }
    }

    pub fn state(&self) -> TrackingState {
        self.state
    }

    /// `position` is the smoothed position of this tick, `None` when nothing
    /// was detected.
    pub fn apply<T: Transport + ?Sized>(
        &mut self,
        position: Option<f64>,
        transport: &mut T,
    ) -> TransportEffects {
        let mut effects = TransportEffects {
            play_rejected: self.observe_pending_play(),
            ..TransportEffects::default()
        };

        match (self.state, position) {
            (_, Some(position)) => {
                self.state = TrackingState::Tracking;
                self.drive(position, transport, &mut effects);
            }
            (TrackingState::Tracking, None) => {
                self.state = TrackingState::Idle;
                // an unanswered play may still start the host player
                let play_in_flight = self.pending_play.take().is_some();
                if !transport.is_paused() || play_in_flight {
                    debug!("TransportMapper: detection lost, pausing");
                    transport.pause();
                    effects.paused = true;
                }
            }
            (TrackingState::Idle, None) => {}
        }

        effects
    }

    /// A play request has been issued and not answered yet.
    pub fn play_in_flight(&self) -> bool {
        self.pending_play.is_some()
    }

    pub fn reset(&mut self) {
        self.state = TrackingState::Idle;
        self.pending_play = None;
    }

    fn drive<T: Transport + ?Sized>(
        &mut self,
        position: f64,
        transport: &mut T,
        effects: &mut TransportEffects,
    ) {
        let duration = transport.duration();
        // metadata not loaded yet; the smoother keeps running so the next
        // tick can act as soon as it is
        if !(duration.is_finite() && duration > 0.0) {
            return;
        }

        let target_time = (position * duration).clamp(0.0, duration);
        if (transport.current_time() - target_time).abs() > self.seek_epsilon {
            match transport.seek(target_time) {
                Ok(()) => {
                    debug!("TransportMapper: seek to {:.2}s", target_time);
                    effects.seek_to = Some(target_time);
                }
                Err(e) => {
                    debug!("TransportMapper: seek to {:.2}s failed: {}", target_time, e);
                    effects.seek_rejected = true;
                }
            }
        }

        // asked again on every paused tick; an unanswered request is replaced
        if transport.is_paused() {
            debug!("TransportMapper: requesting play");
            let mut request = transport.play();
            effects.play_requested = true;
            self.pending_play = None;
            match request.try_outcome() {
                None => self.pending_play = Some(request),
                Some(Ok(())) => {}
                Some(Err(e)) => {
                    debug!("TransportMapper: play rejected: {}", e);
                    effects.play_rejected = true;
                }
            }
        }
    }

    /// Returns true when the outstanding play request turned out rejected.
    fn observe_pending_play(&mut self) -> bool {
        let Some(request) = self.pending_play.as_mut() else {
            return false;
        };
        match request.try_outcome() {
            None => false,
            Some(outcome) => {
                self.pending_play = None;
                if let Err(e) = outcome {
                    debug!("TransportMapper: earlier play rejected: {}", e);
                    return true;
                }
                false
            }
        }
    }
}
