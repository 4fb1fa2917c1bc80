//! Pure countdown state for timed sessions.
//!
//! The host scheduler calls [`Countdown::tick`] once per wall-clock second.
//! Expiry is reported exactly once; further ticks are inert.

/// Minutes allotted per question in test mode.
pub const TIME_PER_QUESTION_MIN: f64 = 1.2;

/// Remaining time at or below which the countdown is considered low.
pub const LOW_TIME_SECS: u32 = 30;

/// Seconds allotted for a test of `count` questions: `round(count * 1.2 * 60)`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn time_for_questions(count: usize) -> u32 {
    let secs = (count as f64 * TIME_PER_QUESTION_MIN * 60.0).round();
    if secs >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        secs as u32
    }
}

/// Outcome of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Still counting; carries the seconds left.
    Running(u32),
    /// The countdown just reached zero. Reported once.
    Expired,
    /// Already expired or stopped; nothing happened.
    Idle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Running,
    Expired,
    Stopped,
}

/// Monotonically non-increasing countdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    total: u32,
    remaining: u32,
    phase: Phase,
}

impl Countdown {
    /// Start counting down from `total_secs`.
    ///
    /// A zero-length countdown starts already expired and never reports
    /// `Tick::Expired`; callers should treat it as immediately due.
    #[must_use]
    pub fn start(total_secs: u32) -> Self {
        Self {
            total: total_secs,
            remaining: total_secs,
            phase: if total_secs == 0 {
                Phase::Expired
            } else {
                Phase::Running
            },
        }
    }

    pub fn tick(&mut self) -> Tick {
        if self.phase != Phase::Running {
            return Tick::Idle;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.phase = Phase::Expired;
            Tick::Expired
        } else {
            Tick::Running(self.remaining)
        }
    }

    /// Cancel the countdown. Idempotent.
    pub fn stop(&mut self) {
        if self.phase == Phase::Running {
            self.phase = Phase::Stopped;
        }
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.phase == Phase::Expired
    }

    #[must_use]
    pub fn is_low(&self) -> bool {
        self.remaining <= LOW_TIME_SECS
    }
}
