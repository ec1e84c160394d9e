//! 宿主播放器适配 - 记录命令，由 Flutter 侧执行

use super::error::TransportError;
use super::transport::{PlayCompleter, PlayRequest, Transport};
use log::debug;
use serde::{Deserialize, Serialize};

/// 宿主播放器状态快照（每次调用时由宿主上报）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransportSnapshot {
    /// 总时长（秒），元数据未加载时为 0
    pub duration: f64,
    pub current_time: f64,
    pub paused: bool,
}

impl Default for TransportSnapshot {
    fn default() -> Self {
        Self {
            duration: 0.0,
            current_time: 0.0,
            paused: true,
        }
    }
}

/// 需要宿主执行的播放命令
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TransportCommand {
    Seek { time: f64 },
    Play,
    Pause,
}

/// How [`HostTransport`] answers play requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayPolicy {
    /// Playback starts immediately.
    Accept,
    /// Every play is refused, like a browser without a user gesture.
    Reject,
    /// The host answers later through [`HostTransport::resolve_pending_plays`].
    #[default]
    Defer,
}

/// A transport that mirrors a player living on the host side.
///
/// Requests are applied to the local snapshot right away (so later reads in
/// the same tick see them) and queued as [`TransportCommand`]s for the host.
#[derive(Debug, Default)]
pub struct HostTransport {
    snapshot: TransportSnapshot,
    commands: Vec<TransportCommand>,
    play_policy: PlayPolicy,
    reject_seeks: bool,
    pending_plays: Vec<PlayCompleter>,
}

impl HostTransport {
    pub fn new(snapshot: TransportSnapshot) -> Self {
        Self {
            snapshot,
            ..Self::default()
        }
    }

    pub fn with_play_policy(mut self, policy: PlayPolicy) -> Self {
        self.play_policy = policy;
        self
    }

    pub fn set_play_policy(&mut self, policy: PlayPolicy) {
        self.play_policy = policy;
    }

    pub fn set_reject_seeks(&mut self, reject: bool) {
        self.reject_seeks = reject;
    }

    /// Replace the local view with what the host reports.
    ///
    /// A host that reports playing has evidently honoured the outstanding
    /// play requests, so they resolve as accepted.
    pub fn sync(&mut self, snapshot: TransportSnapshot) {
        self.snapshot = snapshot;
        if !snapshot.paused {
            self.resolve_pending_plays(Ok(()));
        }
    }

    pub fn snapshot(&self) -> TransportSnapshot {
        self.snapshot
    }

    pub fn commands(&self) -> &[TransportCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<TransportCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn pending_plays(&self) -> usize {
        self.pending_plays.len()
    }

    /// Answer every deferred play request; returns how many were resolved.
    pub fn resolve_pending_plays(&mut self, outcome: Result<(), TransportError>) -> usize {
        let resolved = self.pending_plays.len();
        if outcome.is_ok() && resolved > 0 {
            self.snapshot.paused = false;
        }
        for completer in self.pending_plays.drain(..) {
            completer.complete(outcome.clone());
        }
        resolved
    }
}

impl Transport for HostTransport {
    fn duration(&self) -> f64 {
        self.snapshot.duration
    }

    fn current_time(&self) -> f64 {
        self.snapshot.current_time
    }

    fn seek(&mut self, time: f64) -> Result<(), TransportError> {
        if self.reject_seeks {
            return Err(TransportError::SeekRejected("host refused seek".into()));
        }
        let upper = self.snapshot.duration.max(0.0);
        let time = time.clamp(0.0, upper);
        self.snapshot.current_time = time;
        self.commands.push(TransportCommand::Seek { time });
        Ok(())
    }

    fn play(&mut self) -> PlayRequest {
        self.commands.push(TransportCommand::Play);
        match self.play_policy {
            PlayPolicy::Accept => {
                self.snapshot.paused = false;
                PlayRequest::accepted()
            }
            PlayPolicy::Reject => {
                debug!("HostTransport: play refused by policy");
                PlayRequest::rejected(TransportError::PlayRejected(
                    "playback not allowed".into(),
                ))
            }
            PlayPolicy::Defer => {
                // the host answers for its player, not per request; an older
                // unanswered play is superseded
                self.pending_plays.clear();
                let (request, completer) = PlayRequest::pending();
                self.pending_plays.push(completer);
                request
            }
        }
    }

    fn pause(&mut self) {
        self.commands.push(TransportCommand::Pause);
        self.snapshot.paused = true;
        if !self.pending_plays.is_empty() {
            debug!("HostTransport: pause cancels {} pending play", self.pending_plays.len());
            self.pending_plays.clear();
        }
    }

    fn is_paused(&self) -> bool {
        self.snapshot.paused
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded(duration: f64, current_time: f64, paused: bool) -> TransportSnapshot {
        TransportSnapshot {
            duration,
            current_time,
            paused,
        }
    }

    #[test]
    fn test_commands_recorded_in_order() {
        let mut transport =
            HostTransport::new(loaded(120.0, 0.0, true)).with_play_policy(PlayPolicy::Accept);

        transport.seek(55.0).unwrap();
        let _ = transport.play();
        transport.pause();

        assert_eq!(
            transport.take_commands(),
            vec![
                TransportCommand::Seek { time: 55.0 },
                TransportCommand::Play,
                TransportCommand::Pause,
            ]
        );
        assert!(transport.commands().is_empty());
        assert_eq!(transport.current_time(), 55.0);
    }

    #[test]
    fn test_seek_clamped_to_duration() {
        let mut transport = HostTransport::new(loaded(10.0, 0.0, true));
        transport.seek(12.5).unwrap();
        assert_eq!(transport.current_time(), 10.0);
    }

    #[test]
    fn test_rejected_seek_not_recorded() {
        let mut transport = HostTransport::new(loaded(10.0, 3.0, true));
        transport.set_reject_seeks(true);

        assert!(transport.seek(5.0).is_err());
        assert!(transport.commands().is_empty());
        assert_eq!(transport.current_time(), 3.0);
    }

    #[test]
    fn test_deferred_play_resolved_by_sync() {
        let mut transport = HostTransport::new(loaded(10.0, 0.0, true));
        let mut request = transport.play();

        assert!(transport.is_paused());
        assert_eq!(request.try_outcome(), None);

        transport.sync(loaded(10.0, 0.1, false));
        assert_eq!(request.try_outcome(), Some(Ok(())));
        assert_eq!(transport.pending_plays(), 0);
    }

    #[test]
    fn test_newer_play_supersedes_pending_one() {
        let mut transport = HostTransport::new(loaded(10.0, 0.0, true));
        let mut first = transport.play();
        let mut second = transport.play();

        assert_eq!(transport.pending_plays(), 1);
        assert_eq!(first.try_outcome(), Some(Err(TransportError::Abandoned)));

        assert_eq!(transport.resolve_pending_plays(Ok(())), 1);
        assert_eq!(second.try_outcome(), Some(Ok(())));
    }

    #[test]
    fn test_pause_cancels_pending_play() {
        let mut transport = HostTransport::new(loaded(10.0, 0.0, true));
        let mut request = transport.play();
        transport.pause();

        assert_eq!(transport.pending_plays(), 0);
        assert_eq!(request.try_outcome(), Some(Err(TransportError::Abandoned)));

        // a later "playing" report belongs to no request
        transport.sync(loaded(10.0, 0.0, false));
        assert!(!transport.is_paused());
    }

    #[test]
    fn test_deferred_play_rejected_by_host() {
        let mut transport = HostTransport::new(loaded(10.0, 0.0, true));
        let mut request = transport.play();

        let resolved =
            transport.resolve_pending_plays(Err(TransportError::PlayRejected("policy".into())));

        assert_eq!(resolved, 1);
        assert!(transport.is_paused());
        assert!(matches!(
            request.try_outcome(),
            Some(Err(TransportError::PlayRejected(_)))
        ));
    }
}
