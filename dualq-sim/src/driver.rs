use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::SharedDualQueue;

/// Runs the periodic controller update of a [`SharedDualQueue`].
///
/// Enqueues and dequeues already advance the controller, but an idle queue sees neither; the
/// driver keeps the probability decaying while nothing arrives. Missed ticks are delayed rather
/// than bursted, since every update uses the actual elapsed time.
///
/// Dropping the driver stops its task.
#[derive(Debug)]
pub struct TickDriver {
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl TickDriver {
    /// Spawns the update task on the current runtime. Returns `None` if the queue's controller
    /// has no update interval.
    pub fn spawn(queue: SharedDualQueue) -> Option<Self> {
        let interval = queue.update_interval()?;
        let token = CancellationToken::new();
        let cancelled = token.clone();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            debug!(?interval, "tick driver started");

            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    _ = ticker.tick() => {
                        if queue.advance() {
                            trace!(probabilities = ?queue.probabilities(), "controller updated");
                        }
                    }
                }
            }

            debug!("tick driver stopped");
        });

        Some(Self { token, task: Some(task) })
    }

    /// Stops the task and waits for it to finish.
    pub async fn shutdown(mut self) {
        self.token.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for TickDriver {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
