use std::{sync::Arc, time::Duration};

use dualq_aqm::{
    ConfigError, DualQConfig, DualQueue, EmptyQueue, PacketItem, Probabilities, QueueStats,
    Verdict,
};
use parking_lot::Mutex;
use tokio::{sync::Notify, time::Instant};

/// A [`DualQueue`] shared between tasks.
///
/// Every operation takes the lock once and runs to completion under it, so an enqueue, a
/// dequeue and a controller update never interleave. Time is measured from the moment the
/// queue was created, on the tokio clock.
#[derive(Debug, Clone)]
pub struct SharedDualQueue {
    inner: Arc<Shared>,
}

#[derive(Debug)]
struct Shared {
    queue: Mutex<DualQueue>,
    epoch: Instant,
    /// Woken on every admitted packet.
    admitted: Notify,
}

impl SharedDualQueue {
    /// Creates a shared queue from `config`.
    pub fn new(config: DualQConfig) -> Result<Self, ConfigError> {
        DualQueue::new(config).map(Self::from_queue)
    }

    /// Wraps an existing queue. Its epoch starts now.
    pub fn from_queue(queue: DualQueue) -> Self {
        Self {
            inner: Arc::new(Shared {
                queue: Mutex::new(queue),
                epoch: Instant::now(),
                admitted: Notify::new(),
            }),
        }
    }

    /// Time elapsed since the queue was created.
    #[inline]
    pub fn now(&self) -> Duration {
        self.inner.epoch.elapsed()
    }

    /// Offers `item` to the queue.
    pub fn enqueue(&self, item: PacketItem) -> Verdict {
        let now = self.now();
        let verdict = self.inner.queue.lock().enqueue(item, now);

        if verdict.is_admitted() {
            self.inner.admitted.notify_one();
        }

        verdict
    }

    /// Removes the next packet, L4S first.
    pub fn dequeue(&self) -> Result<PacketItem, EmptyQueue> {
        let now = self.now();
        self.inner.queue.lock().dequeue(now)
    }

    /// Advances a periodic controller to the current time. Returns `true` if an update ran.
    pub fn advance(&self) -> bool {
        let now = self.now();
        self.inner.queue.lock().advance(now)
    }

    /// Runs `f` with exclusive access to the queue.
    pub fn with_queue<T>(&self, f: impl FnOnce(&mut DualQueue) -> T) -> T {
        f(&mut *self.inner.queue.lock())
    }

    /// The controller's update interval, or `None` if it has no timer.
    pub fn update_interval(&self) -> Option<Duration> {
        self.inner.queue.lock().controller().update_interval()
    }

    #[inline]
    pub fn stats(&self) -> QueueStats {
        self.inner.queue.lock().stats()
    }

    #[inline]
    pub fn probabilities(&self) -> Probabilities {
        self.inner.queue.lock().probabilities()
    }

    #[inline]
    pub fn occupancy(&self) -> u64 {
        self.inner.queue.lock().occupancy()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.queue.lock().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.queue.lock().is_empty()
    }

    /// Waits until a packet is admitted. A packet admitted while nobody waits wakes the next
    /// caller immediately.
    pub(crate) async fn admitted(&self) {
        self.inner.admitted.notified().await;
    }
}
