/// Drives the per-refresh tick of a scan session.
///
/// A session asks for the next tick after every tick it runs and cancels on
/// `end`. At most one tick is ever outstanding.
pub trait TickScheduler {
    fn schedule_next(&mut self);

    fn cancel(&mut self);

    fn is_scheduled(&self) -> bool;

    /// Consume the outstanding tick, if any. Returns whether a tick was due.
    fn take_due(&mut self) -> bool;
}

/// 手动调度器 - 宿主每次显示刷新推一帧，即推进一拍
#[derive(Debug, Default)]
pub struct ManualScheduler {
    pending: bool,
    scheduled_total: u64,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many ticks have been requested over the scheduler's lifetime.
    pub fn scheduled_total(&self) -> u64 {
        self.scheduled_total
    }
}

impl TickScheduler for ManualScheduler {
    fn schedule_next(&mut self) {
        if !self.pending {
            self.pending = true;
            self.scheduled_total += 1;
        }
    }

    fn cancel(&mut self) {
        self.pending = false;
    }

    fn is_scheduled(&self) -> bool {
        self.pending
    }

    fn take_due(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_outstanding_tick() {
        let mut scheduler = ManualScheduler::new();
        scheduler.schedule_next();
        scheduler.schedule_next();

        assert!(scheduler.is_scheduled());
        assert_eq!(scheduler.scheduled_total(), 1);
        assert!(scheduler.take_due());
        assert!(!scheduler.take_due());
    }

    #[test]
    fn test_cancel_drops_pending_tick() {
        let mut scheduler = ManualScheduler::new();
        scheduler.schedule_next();
        scheduler.cancel();

        assert!(!scheduler.is_scheduled());
        assert!(!scheduler.take_due());
    }
}
