use std::time::Duration;

use dualq::{BottleneckLink, Class, DualQConfig, PacketItem, SharedDualQueue, TickDriver};
use tokio::time::MissedTickBehavior;

const PACKET_SIZE: u32 = 1000;
const SOURCE_RATE_BPS: u64 = 10_000_000;
const LINK_RATE_BPS: u64 = 1_500_000;
const RUN_TIME: Duration = Duration::from_secs(3);

/// Two unresponsive 10 Mb/s sources, one Classic and one L4S, sharing a 1.5 Mb/s bottleneck.
#[tokio::main]
async fn main() {
    let _ = tracing_subscriber::fmt::try_init();

    let config = DualQConfig::default().with_queue_limit(100).with_l4s_threshold(5);
    let queue = SharedDualQueue::new(config).unwrap();

    let driver = TickDriver::spawn(queue.clone());
    let (link, mut output) = BottleneckLink::spawn(queue.clone(), LINK_RATE_BPS, 64).unwrap();

    let mut sources = Vec::new();
    for class in [Class::Classic, Class::L4s] {
        let queue = queue.clone();
        sources.push(tokio::spawn(async move {
            let gap = u64::from(PACKET_SIZE) * 8 * 1_000_000_000 / SOURCE_RATE_BPS;
            let mut ticker = tokio::time::interval(Duration::from_nanos(gap));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                queue.enqueue(PacketItem::new(class, PACKET_SIZE));
            }
        }));
    }

    let mut delivered = [0u64; 2];
    let mut marked = [0u64; 2];
    let deadline = tokio::time::sleep(RUN_TIME);
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = &mut deadline => break,
            Some(item) = output.recv() => {
                let idx = usize::from(item.is_l4s());
                delivered[idx] += 1;
                marked[idx] += u64::from(item.is_marked());
            }
        }
    }

    for source in sources {
        source.abort();
        let _ = source.await;
    }

    link.shutdown().await;
    if let Some(driver) = driver {
        driver.shutdown().await;
    }

    tracing::info!(?delivered, ?marked, "run finished");
    println!(
        "delivered: {} Classic ({} marked), {} L4S ({} marked)",
        delivered[0], marked[0], delivered[1], marked[1]
    );
    println!("{}", queue.stats());
}
