use std::{fmt, time::Duration};

use bytes::Bytes;

/// The traffic class of a packet, decided upstream from its transport metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Class {
    /// Conventional, loss-based congestion response.
    Classic,
    /// Scalable congestion response that expects early ECN marking.
    L4s,
}

impl Class {
    /// Returns `true` for [`Class::L4s`].
    #[inline]
    pub const fn is_l4s(self) -> bool {
        matches!(self, Self::L4s)
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Classic => write!(f, "classic"),
            Self::L4s => write!(f, "l4s"),
        }
    }
}

/// A packet held by the dual queue.
///
/// Size, class and ECN capability are fixed at creation. The only mutable state is the
/// congestion mark, which can be applied at most once, and the enqueue timestamp, which is
/// stamped by the sub-queue that admits the packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketItem {
    /// Size in bytes.
    size: u32,
    /// Traffic class.
    class: Class,
    /// Whether the sender negotiated ECN. L4S traffic always does.
    ecn_capable: bool,
    /// Set once the packet has been ECN-marked (CE).
    marked: bool,
    /// Time at which the packet was admitted to a sub-queue.
    enqueued_at: Option<Duration>,
    /// Opaque payload, if the host attached one.
    payload: Option<Bytes>,
}

impl PacketItem {
    /// Creates a new packet of the given class and size. L4S packets are ECN-capable,
    /// Classic packets are not; use [`PacketItem::with_ecn_capable`] to override.
    pub fn new(class: Class, size: u32) -> Self {
        Self {
            size,
            class,
            ecn_capable: class.is_l4s(),
            marked: false,
            enqueued_at: None,
            payload: None,
        }
    }

    /// Creates a Classic packet of the given size.
    pub fn classic(size: u32) -> Self {
        Self::new(Class::Classic, size)
    }

    /// Creates an L4S packet of the given size.
    pub fn l4s(size: u32) -> Self {
        Self::new(Class::L4s, size)
    }

    /// Creates a packet carrying `payload`. The packet size is the payload length.
    ///
    /// Sizes are accounted in `u32`: a payload longer than `u32::MAX` bytes is accounted as
    /// `u32::MAX` bytes, so in byte mode it is force-dropped by any queue limit below that.
    pub fn with_payload(class: Class, payload: Bytes) -> Self {
        let size = accounted_size(payload.len());
        Self { payload: Some(payload), ..Self::new(class, size) }
    }

    /// Sets the ECN capability of the packet.
    pub fn with_ecn_capable(mut self, ecn_capable: bool) -> Self {
        self.ecn_capable = ecn_capable;
        self
    }

    #[inline]
    pub fn size(&self) -> u32 {
        self.size
    }

    #[inline]
    pub fn class(&self) -> Class {
        self.class
    }

    #[inline]
    pub fn is_l4s(&self) -> bool {
        self.class.is_l4s()
    }

    #[inline]
    pub fn is_ecn_capable(&self) -> bool {
        self.ecn_capable
    }

    #[inline]
    pub fn is_marked(&self) -> bool {
        self.marked
    }

    /// Time at which the packet entered its sub-queue, if it has been admitted.
    #[inline]
    pub fn enqueued_at(&self) -> Option<Duration> {
        self.enqueued_at
    }

    #[inline]
    pub fn payload(&self) -> Option<&Bytes> {
        self.payload.as_ref()
    }

    /// Consumes the packet and returns its payload.
    pub fn into_payload(self) -> Option<Bytes> {
        self.payload
    }

    /// Applies the congestion experienced mark. Returns `false` if the packet is not
    /// ECN-capable or was already marked.
    pub(crate) fn mark(&mut self) -> bool {
        if !self.ecn_capable || self.marked {
            return false;
        }

        self.marked = true;
        true
    }

    pub(crate) fn stamp(&mut self, now: Duration) {
        self.enqueued_at = Some(now);
    }
}

/// Size of a payload of `len` bytes, saturating at `u32::MAX`.
#[inline]
fn accounted_size(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}
