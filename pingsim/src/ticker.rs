use std::time::Duration;
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};

/// Handle on the repeating timer of a running session.
///
/// The timer runs as its own task and calls `on_tick` once per period,
/// the first call one full period after [`ProbeTicker::spawn`].
///
/// Cancelling only prevents future ticks: work already started by a tick
/// (a probe waiting for its reply) is not interrupted. Dropping the ticker
/// cancels it too.
pub(crate) struct ProbeTicker {
    cancel: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ProbeTicker {
    /// must be called from within a tokio runtime
    pub(crate) fn spawn<F>(period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let (cancel, mut cancelled) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut ticks = tokio::time::interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    // also resolves (with an error) if the ticker is dropped
                    _ = cancelled.wait_for(|stop| *stop) => break,
                    _ = ticks.tick() => on_tick(),
                }
            }
        });

        Self { cancel, task }
    }

    /// idempotent. A tick runs synchronously between two suspension
    /// points, so aborting the timer task never cuts one in half.
    pub(crate) fn cancel(&self) {
        self.cancel.send_replace(true);
        self.task.abort();
    }

    #[cfg(test)]
    pub(crate) fn is_cancelled(&self) -> bool {
        *self.cancel.borrow()
    }

    #[cfg(test)]
    pub(crate) fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for ProbeTicker {
    fn drop(&mut self) {
        self.cancel();
    }
}
