use std::fmt;

use crate::item::Class;

/// Decision counters of a dual queue.
///
/// All counters only ever increase; they are cleared only when the queue is reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// Probabilistic drops of Classic traffic (proactive).
    pub unforced_classic_drop: u64,
    /// Probabilistic marks of ECN-capable Classic traffic (proactive).
    pub unforced_classic_mark: u64,
    /// Marks of L4S traffic, probabilistic or from the step threshold (proactive).
    pub unforced_l4s_mark: u64,
    /// Drops because the queue limit was reached (reactive).
    pub forced_drop: u64,
}

impl QueueStats {
    #[inline]
    pub(crate) fn record_forced_drop(&mut self) {
        self.forced_drop += 1;
    }

    #[inline]
    pub(crate) fn record_unforced_drop(&mut self) {
        self.unforced_classic_drop += 1;
    }

    /// Records an unforced mark on a packet that took the `class` decision path.
    #[inline]
    pub(crate) fn record_unforced_mark(&mut self, class: Class) {
        match class {
            Class::Classic => self.unforced_classic_mark += 1,
            Class::L4s => self.unforced_l4s_mark += 1,
        }
    }

    /// Total number of dropped packets.
    pub fn drops(&self) -> u64 {
        self.unforced_classic_drop + self.forced_drop
    }

    /// Total number of marked packets.
    pub fn marks(&self) -> u64 {
        self.unforced_classic_mark + self.unforced_l4s_mark
    }
}

impl fmt::Display for QueueStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\t {} Unforced drops (Classic traffic)", self.unforced_classic_drop)?;
        writeln!(f, "\t {} Unforced marks (Classic traffic)", self.unforced_classic_mark)?;
        writeln!(f, "\t {} Unforced marks (L4S traffic)", self.unforced_l4s_mark)?;
        write!(f, "\t {} Forced drops", self.forced_drop)
    }
}
