use std::time::Duration;

use dualq_aqm::{EmptyQueue, PacketItem};
use thiserror::Error;
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::SharedDualQueue;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Invalid link parameters.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("link bandwidth must be non-zero")]
    ZeroBandwidth,
}

/// A link draining a [`SharedDualQueue`] at a fixed bandwidth.
///
/// The link dequeues one packet, holds it for its serialization delay, then forwards it on the
/// output channel. When the queue is empty it parks until the next admitted packet. Dropping
/// the link stops its task at once, even while the output channel is full, and closes the
/// channel. A packet in transmission at that moment is lost, as on a link going down; packets
/// still queued stay in the queue.
#[derive(Debug)]
pub struct BottleneckLink {
    bandwidth_bps: u64,
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl BottleneckLink {
    /// Spawns the link on the current runtime. Transmitted packets are sent on the returned
    /// channel, which holds up to `buffer` packets.
    pub fn spawn(
        queue: SharedDualQueue,
        bandwidth_bps: u64,
        buffer: usize,
    ) -> Result<(Self, mpsc::Receiver<PacketItem>), LinkError> {
        if bandwidth_bps == 0 {
            return Err(LinkError::ZeroBandwidth);
        }

        let (tx, rx) = mpsc::channel(buffer.max(1));
        let token = CancellationToken::new();
        let cancelled = token.clone();

        let task = tokio::spawn(async move {
            debug!(bandwidth_bps, "link started");

            while !cancelled.is_cancelled() {
                let item = match queue.dequeue() {
                    Ok(item) => item,
                    Err(EmptyQueue) => {
                        tokio::select! {
                            biased;
                            _ = cancelled.cancelled() => break,
                            _ = queue.admitted() => {}
                        }
                        continue;
                    }
                };

                let tx_time = transmission_time(item.size(), bandwidth_bps);
                trace!(class = %item.class(), size = item.size(), ?tx_time, "transmitting");

                tokio::select! {
                    biased;
                    _ = cancelled.cancelled() => break,
                    _ = tokio::time::sleep(tx_time) => {}
                }

                tokio::select! {
                    biased;
                    _ = cancelled.cancelled() => break,
                    sent = tx.send(item) => {
                        if sent.is_err() {
                            debug!("link output closed");
                            break;
                        }
                    }
                }
            }

            debug!("link stopped");
        });

        Ok((Self { bandwidth_bps, token, task: Some(task) }, rx))
    }

    #[inline]
    pub fn bandwidth_bps(&self) -> u64 {
        self.bandwidth_bps
    }

    /// Stops the task and waits for it to finish.
    pub async fn shutdown(mut self) {
        self.token.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for BottleneckLink {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Time to serialize `size` bytes at `bandwidth_bps`, rounded up to the nanosecond.
fn transmission_time(size: u32, bandwidth_bps: u64) -> Duration {
    let bits = u128::from(size) * 8;
    let bps = u128::from(bandwidth_bps);
    let nanos = (bits * NANOS_PER_SEC).div_ceil(bps);

    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
}
