//! Wall-clock driver for [`QuizSession::tick`](quiz_core::model::QuizSession::tick).

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::trace;

/// Emits one tick per `period` until cancelled or dropped.
///
/// The first tick arrives one full period after `start`. Ticks that come due
/// while the consumer is busy are queued, so a slow consumer still sees one
/// tick per elapsed period.
pub struct CountdownTicker {
    ticks: mpsc::UnboundedReceiver<()>,
    task: JoinHandle<()>,
}

impl CountdownTicker {
    #[must_use]
    pub fn start(period: Duration) -> Self {
        let (tx, ticks) = mpsc::unbounded_channel();
        let task = tokio::spawn(async move {
            let mut interval = time::interval_at(time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Burst);
            loop {
                interval.tick().await;
                trace!("countdown tick");
                if tx.send(()).is_err() {
                    break;
                }
            }
        });
        Self { ticks, task }
    }

    /// One-second ticker used by the quiz loop.
    #[must_use]
    pub fn every_second() -> Self {
        Self::start(Duration::from_secs(1))
    }

    /// Wait for the next tick; `None` once the ticker is cancelled.
    pub async fn recv(&mut self) -> Option<()> {
        self.ticks.recv().await
    }

    pub fn cancel(&mut self) {
        self.task.abort();
        self.ticks.close();
    }
}

impl Drop for CountdownTicker {
    fn drop(&mut self) {
        self.task.abort();
    }
}
