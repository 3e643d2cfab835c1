use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

/// The session's single timer source: one tick per elapsed second.
///
/// The ticking task is aborted on [`Countdown::stop`] and on drop, so a
/// torn-down session can never receive further ticks. The channel holds at
/// most one tick: while the receiver is busy (a submission in flight), the
/// ticker parks instead of piling up elapsed seconds.
#[derive(Debug)]
pub struct Countdown {
    ticks: mpsc::Receiver<()>,
    handle: JoinHandle<()>,
}

impl Countdown {
    /// Spawn the one-second ticker. Requires a tokio runtime.
    #[must_use]
    pub fn start() -> Self {
        Self::with_period(Duration::from_secs(1))
    }

    /// Spawn a ticker with a custom, non-zero period.
    ///
    /// # Panics
    ///
    /// Panics if `period` is zero (the underlying interval requires it).
    #[must_use]
    pub fn with_period(period: Duration) -> Self {
        let (tx, rx) = mpsc::channel(1);
        let handle = tokio::spawn(async move {
            let mut interval = time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first interval tick completes immediately; skip it so the
            // first delivered tick marks one fully elapsed period.
            interval.tick().await;
            loop {
                interval.tick().await;
                if tx.send(()).await.is_err() {
                    break;
                }
            }
        });
        Self { ticks: rx, handle }
    }

    /// Wait for the next elapsed second.
    ///
    /// Returns `None` once the ticker has been stopped.
    pub async fn tick(&mut self) -> Option<()> {
        self.ticks.recv().await
    }

    /// Discard any tick buffered while the receiver was busy.
    ///
    /// Useful after a failed submission so time spent waiting on the network
    /// is not deducted from the countdown.
    pub fn drain(&mut self) {
        while self.ticks.try_recv().is_ok() {}
    }

    /// Stop the ticker deterministically. Subsequent `tick` calls return
    /// `None` once the buffer is empty.
    pub fn stop(&mut self) {
        self.handle.abort();
        self.ticks.close();
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn delivers_one_tick_per_period() {
        let mut countdown = Countdown::with_period(Duration::from_millis(10));
        for _ in 0..3 {
            assert_eq!(countdown.tick().await, Some(()));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stop_ends_the_stream() {
        let mut countdown = Countdown::with_period(Duration::from_millis(10));
        assert_eq!(countdown.tick().await, Some(()));

        countdown.stop();
        countdown.drain();
        assert_eq!(countdown.tick().await, None);
    }
}
