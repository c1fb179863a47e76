//! Resend-eligibility countdown.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Seconds before a new code may be requested.
pub const RESEND_COOLDOWN_SECS: u64 = 60;

/// Per-second countdown running as a tokio task.
///
/// Independent of the code's own validity window. Aborted on drop.
#[derive(Debug)]
pub struct Countdown {
    remaining: watch::Receiver<u64>,
    task: JoinHandle<()>,
}

impl Countdown {
    /// Start counting down from `secs`. Must be called within a tokio runtime.
    #[must_use]
    pub fn start(secs: u64) -> Self {
        let (tx, remaining) = watch::channel(secs);
        let task = tokio::spawn(async move {
            let period = Duration::from_secs(1);
            let mut ticks = tokio::time::interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            while *tx.borrow() > 0 {
                ticks.tick().await;
                tx.send_modify(|left| *left = left.saturating_sub(1));
            }
        });
        Self { remaining, task }
    }

    /// Seconds left.
    #[must_use]
    pub fn remaining(&self) -> u64 {
        *self.remaining.borrow()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.remaining() == 0
    }

    /// Receive every tick.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.remaining.clone()
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_counts_down_to_zero() {
        let countdown = Countdown::start(RESEND_COOLDOWN_SECS);
        assert_eq!(countdown.remaining(), 60);

        tokio::time::sleep(Duration::from_millis(10_500)).await;
        assert_eq!(countdown.remaining(), 50);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(countdown.remaining(), 0);
        assert!(countdown.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_ticking() {
        let countdown = Countdown::start(5);
        let mut rx = countdown.subscribe();
        drop(countdown);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(*rx.borrow_and_update(), 5);
    }

    #[tokio::test]
    async fn test_zero_is_finished_immediately() {
        assert!(Countdown::start(0).is_finished());
    }
}
