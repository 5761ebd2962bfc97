use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Periodic refresh timer. At most one interval task exists at a time.
pub struct RefreshScheduler<E> {
    period: Duration,
    tick: fn() -> E,
    task: Option<JoinHandle<()>>,
}

impl<E: Send + 'static> RefreshScheduler<E> {
    /// `tick` builds the event posted on every period.
    pub fn new(period: Duration, tick: fn() -> E) -> Self {
        Self {
            period,
            tick,
            task: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Start a fresh timer; the first tick lands one full period from now.
    ///
    /// Any running timer is cancelled first, so enabling twice never doubles
    /// the tick rate.
    pub fn enable(&mut self, tx: UnboundedSender<E>) {
        self.disable();
        let period = self.period;
        let tick = self.tick;
        self.task = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(tick()).is_err() {
                    debug!("Refresh receiver closed, stopping timer");
                    break;
                }
            }
        }));
        info!("Auto-refresh enabled (every {}s)", period.as_secs());
    }

    pub fn disable(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            info!("Auto-refresh disabled");
        }
    }
}

impl<E> Drop for RefreshScheduler<E> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
