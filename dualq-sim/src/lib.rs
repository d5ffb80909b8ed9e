//! Runs a [`DualQueue`](dualq_aqm::DualQueue) inside a tokio application.
//!
//! - [`SharedDualQueue`] puts the queue behind a single lock and reads time from the tokio
//!   clock, so producers, the link and the timer all see one consistent queue.
//! - [`TickDriver`] runs the periodic controller update while the queue is idle.
//! - [`BottleneckLink`] drains the queue at a fixed bandwidth.
//!
//! Both tasks stop when their handle is dropped.

mod driver;
pub use driver::TickDriver;

mod link;
pub use link::{BottleneckLink, LinkError};

mod shared;
pub use shared::SharedDualQueue;
