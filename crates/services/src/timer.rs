//! Wall-clock driver for timed sessions.
//!
//! `QuizTimer` emits one [`Pulse`] per second on a channel for a bounded number
//! of seconds. The host loop feeds each pulse to `QuizLoopService::tick`, which
//! keeps every state change on the host's single task. Dropping the timer (or
//! starting another countdown) cancels the pending pulses.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// One elapsed second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pulse;

/// Cancellable once-per-second pulse source. At most one countdown is active.
#[derive(Debug, Default)]
pub struct QuizTimer {
    task: Option<JoinHandle<()>>,
}

impl QuizTimer {
    #[must_use]
    pub fn new() -> Self {
        Self { task: None }
    }

    /// Start emitting `total_secs` pulses, one per second, then close the channel.
    ///
    /// Any countdown already running is stopped first. Must be called from
    /// within a tokio runtime.
    pub fn start(&mut self, total_secs: u32) -> mpsc::UnboundedReceiver<Pulse> {
        self.stop();
        let (tx, rx) = mpsc::unbounded_channel();
        let period = Duration::from_secs(1);
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Burst);
            for _ in 0..total_secs {
                interval.tick().await;
                if tx.send(Pulse).is_err() {
                    break;
                }
            }
        });
        self.task = Some(task);
        tracing::debug!(total_secs, "timer started");
        rx
    }

    /// Cancel pending pulses. Safe to call when nothing is running.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::debug!("timer stopped");
        }
    }
}

impl Drop for QuizTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn emits_one_pulse_per_second_then_closes() {
        let mut timer = QuizTimer::new();
        let started = Instant::now();
        let mut rx = timer.start(3);

        let mut pulses = 0;
        while rx.recv().await.is_some() {
            pulses += 1;
            assert!(started.elapsed() >= Duration::from_secs(pulses));
        }
        assert_eq!(pulses, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_cancels_pending_pulses() {
        let mut timer = QuizTimer::new();
        let mut rx = timer.start(100);
        assert_eq!(rx.recv().await, Some(Pulse));

        timer.stop();
        timer.stop();
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn starting_again_replaces_previous_countdown() {
        let mut timer = QuizTimer::new();
        let mut first = timer.start(100);
        let mut second = timer.start(2);

        assert_eq!(first.recv().await, None);
        assert_eq!(second.recv().await, Some(Pulse));
        assert_eq!(second.recv().await, Some(Pulse));
        assert_eq!(second.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_timer_closes_channel() {
        let mut timer = QuizTimer::new();
        let mut rx = timer.start(10);
        drop(timer);
        assert_eq!(rx.recv().await, None);
    }
}
