//! The DualQ Coupled AQM.
//!
//! A [`DualQueue`] keeps Classic and L4S traffic in two sub-queues under one shared limit. A
//! single base probability, computed by a [`ProbabilityController`] from the Classic queuing
//! delay, drives both classes: Classic packets are dropped (or marked, if ECN-capable) with the
//! base probability, L4S packets are marked with a coupled, higher probability. The L4S
//! sub-queue is always served first.
//!
//! The queue never reads a clock. Every operation takes the current time as a [`Duration`]
//! since an epoch chosen by the host, which makes it equally usable from a discrete-event
//! simulator and from a runtime that reads a monotonic clock.
//!
//! ```
//! use std::time::Duration;
//!
//! use dualq_aqm::{DualQConfig, DualQueue, PacketItem};
//!
//! let mut queue = DualQueue::new(DualQConfig::default().with_l4s_threshold(20)).unwrap();
//!
//! queue.enqueue(PacketItem::classic(1000), Duration::ZERO);
//! queue.enqueue(PacketItem::l4s(1000), Duration::ZERO);
//!
//! let first = queue.dequeue(Duration::from_millis(1)).unwrap();
//! assert!(first.is_l4s());
//! ```
//!
//! [`Duration`]: std::time::Duration

mod config;
pub use config::{
    ConfigError, ControllerConfig, CurvyRedConfig, DualQConfig, PiSquareConfig, MTU_ETHERNET,
};

pub mod controller;
pub use controller::{ControlInput, CurvyRed, PiSquare, ProbabilityController};

mod coupling;
pub use coupling::{CouplingPolicy, Probabilities};

mod item;
pub use item::{Class, PacketItem};

mod queue;
pub use queue::{EmptyQueue, QueueMode, SubQueue};

mod rng;
pub use rng::UniformSource;

mod scheduler;
pub use scheduler::{DropReason, DualQueue, Verdict};

mod stats;
pub use stats::QueueStats;
