use std::time::Duration;

use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};
use tracing::debug;

/// Default autoplay period.
pub const DEFAULT_AUTOPLAY_INTERVAL: Duration = Duration::from_millis(4000);

/// A cancellable repeating task: "fire every `period`" or nothing at all.
///
/// Holds at most one interval. Arming always replaces the previous interval,
/// and disarming returns to the no-pending-task state, so rapid toggling can
/// never stack timers.
#[derive(Debug)]
pub struct RepeatingTask {
    period: Duration,
    interval: Option<Interval>,
}

impl RepeatingTask {
    /// A zero period is raised to one millisecond.
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(Duration::from_millis(1)),
            interval: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Starts (or restarts) the schedule; the first tick is one period away.
    pub fn arm(&mut self) {
        self.disarm();
        let mut interval = interval_at(Instant::now() + self.period, self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.interval = Some(interval);
        debug!(period_ms = self.period.as_millis() as u64, "autoplay: armed");
    }

    pub fn disarm(&mut self) {
        if self.interval.take().is_some() {
            debug!("autoplay: disarmed");
        }
    }

    /// Arms or disarms to match `playing`.
    pub fn sync(&mut self, playing: bool) {
        if playing {
            self.arm();
        } else {
            self.disarm();
        }
    }

    pub fn is_armed(&self) -> bool {
        self.interval.is_some()
    }

    /// Number of live timers; never more than one.
    pub fn active_count(&self) -> usize {
        usize::from(self.is_armed())
    }

    /// Resolves on the next tick. Never resolves while disarmed, which keeps
    /// the branch inert inside `select!`.
    pub async fn tick(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
    }
}

impl Default for RepeatingTask {
    fn default() -> Self {
        Self::new(DEFAULT_AUTOPLAY_INTERVAL)
    }
}
