use std::{fmt, time::Duration};

use rand::{rngs::StdRng, SeedableRng};
use tracing::{debug, trace};

use crate::{
    config::{ConfigError, DualQConfig},
    controller::{self, ControlInput, ProbabilityController},
    coupling::{CouplingPolicy, Probabilities},
    item::{Class, PacketItem},
    queue::{EmptyQueue, QueueMode, SubQueue},
    rng::UniformSource,
    stats::QueueStats,
};

/// Why a packet was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// The queue limit was reached.
    Forced,
    /// The Classic probability fired on a packet that is not ECN-capable.
    Unforced,
}

/// The outcome of an enqueue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Admitted unmodified.
    Enqueued,
    /// Admitted with the congestion experienced mark set.
    Marked,
    /// Discarded.
    Dropped(DropReason),
}

impl Verdict {
    /// Returns `true` if the packet is now queued.
    #[inline]
    pub fn is_admitted(&self) -> bool {
        !matches!(self, Self::Dropped(_))
    }
}

/// A DualQ Coupled AQM queue.
///
/// Holds a Classic and an L4S sub-queue that share one limit. Every enqueue is checked against
/// the limit, then against the coupled probabilities; every dequeue serves the L4S sub-queue
/// first. All operations take the current time from the caller, and the queue is not
/// thread-safe: hosts that share it between tasks must put the whole queue behind one lock.
pub struct DualQueue<R = StdRng> {
    config: DualQConfig,
    classic: SubQueue,
    l4s: SubQueue,
    controller: Box<dyn ProbabilityController>,
    coupling: CouplingPolicy,
    /// Probabilities derived at the latest controller update.
    probabilities: Probabilities,
    /// Sojourn time of the most recently dequeued packet.
    queue_delay: Duration,
    /// Time of the latest controller update. `None` until the queue first sees time.
    last_update: Option<Duration>,
    stats: QueueStats,
    rng: R,
}

impl DualQueue<StdRng> {
    /// Creates a new queue, with a [`StdRng`] seeded from `config.seed`.
    pub fn new(config: DualQConfig) -> Result<Self, ConfigError> {
        let rng = StdRng::seed_from_u64(config.seed);
        Self::with_rng(config, rng)
    }
}

impl<R: UniformSource> DualQueue<R> {
    /// Creates a new queue that draws its random decisions from `rng`.
    pub fn with_rng(config: DualQConfig, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;

        debug!(?config, "creating dual queue");

        Ok(Self {
            classic: SubQueue::new(Class::Classic),
            l4s: SubQueue::new(Class::L4s),
            controller: controller::from_config(&config.controller),
            coupling: CouplingPolicy::new(config.coupling_factor),
            probabilities: Probabilities::default(),
            queue_delay: Duration::ZERO,
            last_update: None,
            stats: QueueStats::default(),
            rng,
            config,
        })
    }

    /// Replaces the configured controller with `controller`.
    pub fn with_controller(mut self, controller: impl ProbabilityController + 'static) -> Self {
        self.controller = Box::new(controller);
        self.probabilities = self.couple(self.controller.base_probability());
        self
    }

    /// Offers `item` to the queue at time `now`.
    pub fn enqueue(&mut self, mut item: PacketItem, now: Duration) -> Verdict {
        self.advance(now);
        if self.controller.update_interval().is_none() {
            let elapsed = self.last_update.map_or(Duration::ZERO, |last| now.saturating_sub(last));
            self.update_controller(now, elapsed);
        }

        let class = item.class();
        let occupancy = self.occupancy();
        if occupancy + self.config.mode.units(&item) > u64::from(self.config.queue_limit) {
            self.stats.record_forced_drop();
            trace!(%class, size = item.size(), occupancy, "forced drop");
            return Verdict::Dropped(DropReason::Forced);
        }

        // An overloaded L4S queue no longer shields its packets from the Classic signal.
        let path = if class.is_l4s() && self.is_l4s_overloaded() { Class::Classic } else { class };

        let verdict = match path {
            Class::L4s => {
                if (self.is_l4s_step_marking(now)
                    || self.rng.next_uniform() < self.probabilities.l4s)
                    && item.mark()
                {
                    self.stats.record_unforced_mark(Class::L4s);
                    Verdict::Marked
                } else {
                    Verdict::Enqueued
                }
            }
            Class::Classic => {
                if self.rng.next_uniform() >= self.probabilities.classic {
                    Verdict::Enqueued
                } else if item.is_ecn_capable() {
                    item.mark();
                    self.stats.record_unforced_mark(Class::Classic);
                    Verdict::Marked
                } else {
                    self.stats.record_unforced_drop();
                    trace!(%class, size = item.size(), p = self.probabilities.classic, "unforced drop");
                    return Verdict::Dropped(DropReason::Unforced);
                }
            }
        };

        trace!(%class, size = item.size(), ?verdict, "enqueue");
        self.sub_queue_mut(class).push(item, now);

        verdict
    }

    /// Removes the next packet at time `now`. The L4S sub-queue is always served first.
    pub fn dequeue(&mut self, now: Duration) -> Result<PacketItem, EmptyQueue> {
        self.advance(now);

        let queue = if self.l4s.is_empty() { &mut self.classic } else { &mut self.l4s };
        let item = queue.pop()?;

        if let Some(enqueued_at) = item.enqueued_at() {
            self.queue_delay = now.saturating_sub(enqueued_at);
        }

        trace!(class = %item.class(), sojourn = ?self.queue_delay, "dequeue");

        Ok(item)
    }

    /// Returns the packet the next [`DualQueue::dequeue`] would return, without removing it.
    pub fn peek(&self) -> Result<&PacketItem, EmptyQueue> {
        self.l4s.peek().or_else(|_| self.classic.peek())
    }

    /// Advances a periodic controller to `now`, running an update if at least one update
    /// interval has passed since the previous one. Returns `true` if an update ran.
    ///
    /// The update uses the actual elapsed time, so calling this late is safe. Enqueue and
    /// dequeue call this themselves; hosts with idle periods should also call it from a timer.
    pub fn advance(&mut self, now: Duration) -> bool {
        let Some(interval) = self.controller.update_interval() else {
            return false;
        };

        let Some(last) = self.last_update else {
            self.last_update = Some(now);
            return false;
        };

        let elapsed = now.saturating_sub(last);
        if elapsed < interval {
            return false;
        }

        self.update_controller(now, elapsed);
        true
    }

    /// Time at which the next periodic update is due, if the controller is periodic.
    pub fn next_update_at(&self) -> Option<Duration> {
        let interval = self.controller.update_interval()?;
        Some(self.last_update.unwrap_or_default() + interval)
    }

    /// Clears both sub-queues, the controller state and the statistics.
    pub fn reset(&mut self) {
        self.classic.clear();
        self.l4s.clear();
        self.controller.reset();
        self.probabilities = self.couple(self.controller.base_probability());
        self.queue_delay = Duration::ZERO;
        self.last_update = None;
        self.stats = QueueStats::default();
    }

    fn update_controller(&mut self, now: Duration, elapsed: Duration) {
        let input = ControlInput { now, elapsed, classic_delay: self.classic.head_sojourn(now) };
        let base = self.controller.update(input);
        self.probabilities = self.couple(base);
        self.last_update = Some(now);
    }

    /// Couples a controller output, clamped to `[0, 1]` since custom controllers may overshoot.
    fn couple(&self, base: f64) -> Probabilities {
        self.coupling.couple(controller::clamp_probability(base))
    }

    fn is_l4s_overloaded(&self) -> bool {
        self.config
            .l4s_threshold
            .is_some_and(|threshold| self.l4s.occupancy(self.config.mode) > u64::from(threshold))
    }

    fn is_l4s_step_marking(&self, now: Duration) -> bool {
        self.l4s.head_sojourn(now) > self.config.l4s_mark_threshold
            && self.l4s.byte_len() > u64::from(self.config.l4s_min_mark_bytes)
    }

    fn sub_queue_mut(&mut self, class: Class) -> &mut SubQueue {
        match class {
            Class::Classic => &mut self.classic,
            Class::L4s => &mut self.l4s,
        }
    }
}

impl<R> DualQueue<R> {
    /// Combined occupancy of both sub-queues, in the configured unit.
    #[inline]
    pub fn occupancy(&self) -> u64 {
        self.classic.occupancy(self.config.mode) + self.l4s.occupancy(self.config.mode)
    }

    /// Occupancy of one sub-queue, in the configured unit.
    pub fn occupancy_of(&self, class: Class) -> u64 {
        self.sub_queue(class).occupancy(self.config.mode)
    }

    /// The sub-queue holding `class` traffic.
    pub fn sub_queue(&self, class: Class) -> &SubQueue {
        match class {
            Class::Classic => &self.classic,
            Class::L4s => &self.l4s,
        }
    }

    /// Number of queued packets.
    #[inline]
    pub fn len(&self) -> usize {
        self.classic.len() + self.l4s.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.classic.is_empty() && self.l4s.is_empty()
    }

    /// Number of queued bytes.
    #[inline]
    pub fn byte_len(&self) -> u64 {
        self.classic.byte_len() + self.l4s.byte_len()
    }

    /// Sojourn time of the most recently dequeued packet.
    #[inline]
    pub fn queue_delay(&self) -> Duration {
        self.queue_delay
    }

    /// How long the Classic head packet has been queued at `now`.
    pub fn classic_delay(&self, now: Duration) -> Duration {
        self.classic.head_sojourn(now)
    }

    /// The probabilities derived at the latest controller update.
    #[inline]
    pub fn probabilities(&self) -> Probabilities {
        self.probabilities
    }

    /// A snapshot of the decision counters.
    #[inline]
    pub fn stats(&self) -> QueueStats {
        self.stats
    }

    #[inline]
    pub fn mode(&self) -> QueueMode {
        self.config.mode
    }

    #[inline]
    pub fn config(&self) -> &DualQConfig {
        &self.config
    }

    /// The active probability controller.
    pub fn controller(&self) -> &dyn ProbabilityController {
        self.controller.as_ref()
    }
}

impl<R> fmt::Debug for DualQueue<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DualQueue")
            .field("config", &self.config)
            .field("classic", &self.classic)
            .field("l4s", &self.l4s)
            .field("controller", &self.controller)
            .field("probabilities", &self.probabilities)
            .field("queue_delay", &self.queue_delay)
            .field("last_update", &self.last_update)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
