//! Polled interval timers.
//!
//! No callbacks and no interrupt dependency: the control loop passes the
//! current uptime in and asks whether the deadline has passed.

/// What happens when a timer expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerMode {
    /// Re-arms for another period (keep-alive announcements).
    Periodic,
    /// Stops (heartbeat pulse).
    OneShot,
}

#[derive(Debug, Clone, Copy)]
pub struct IntervalTimer {
    period_ms: u32,
    mode: TimerMode,
    running: bool,
    deadline_ms: u64,
}

impl IntervalTimer {
    /// A stopped timer.
    pub const fn new(period_ms: u32, mode: TimerMode) -> Self {
        Self {
            period_ms,
            mode,
            running: false,
            deadline_ms: 0,
        }
    }

    pub const fn periodic(period_ms: u32) -> Self {
        Self::new(period_ms, TimerMode::Periodic)
    }

    pub const fn one_shot(period_ms: u32) -> Self {
        Self::new(period_ms, TimerMode::OneShot)
    }

    /// (Re)start: the deadline is one period after `now_ms`.
    pub fn start(&mut self, now_ms: u64) {
        self.running = true;
        self.deadline_ms = now_ms.saturating_add(u64::from(self.period_ms));
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn period_ms(&self) -> u32 {
        self.period_ms
    }

    /// Deadline of the current run, `None` when stopped.
    pub fn deadline_ms(&self) -> Option<u64> {
        self.running.then_some(self.deadline_ms)
    }

    /// Pure check: running and `now_ms >= deadline`.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        self.running && now_ms >= self.deadline_ms
    }

    /// Consume an expiry.  Periodic timers re-arm from `now_ms` (a stalled
    /// loop yields one expiry, not a burst); one-shot timers stop.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        if !self.is_expired(now_ms) {
            return false;
        }
        match self.mode {
            TimerMode::Periodic => self.start(now_ms),
            TimerMode::OneShot => self.stop(),
        }
        true
    }
}
