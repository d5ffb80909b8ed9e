use std::time::Duration;

use dualq_aqm::{
    Class, CurvyRedConfig, DropReason, DualQConfig, DualQueue, PacketItem, PiSquareConfig,
    QueueMode, QueueStats, Verdict,
};

mod limits;
mod scenarios;

const PACKET_SIZE: u32 = 1000;
const LIMIT_PACKETS: u32 = 50;
const ENQUEUE_INTERVAL: Duration = Duration::from_millis(10);
const DEQUEUE_INTERVAL: Duration = Duration::from_millis(12);

/// A queue limited to 50 packets' worth of `mode` units.
fn config(mode: QueueMode) -> DualQConfig {
    let limit = match mode {
        QueueMode::Packets => LIMIT_PACKETS,
        QueueMode::Bytes => LIMIT_PACKETS * PACKET_SIZE,
    };

    DualQConfig::default().with_mode(mode).with_queue_limit(limit)
}

/// PI Square with gains gentle enough for a standing Classic queue to build before the
/// controller saturates.
fn pi_square(mode: QueueMode) -> DualQConfig {
    config(mode).with_pi_square(PiSquareConfig { alpha: 5.0, beta: 50.0, ..Default::default() })
}

fn curvy_red(mode: QueueMode) -> DualQConfig {
    config(mode).with_curvy_red(CurvyRedConfig {
        classic_scaling: Duration::from_millis(200),
        ..Default::default()
    })
}

#[derive(Debug, Clone, Copy)]
enum Event {
    Enqueue(Class),
    Dequeue,
}

/// Offers `l4s` L4S and `classic` Classic packets, one of each class every 10ms from time zero,
/// and dequeues every 12ms. Events at the same instant run L4S enqueue, Classic enqueue, then
/// dequeue. Checks the occupancy, priority and probability invariants along the way.
fn run_traffic(queue: &mut DualQueue, l4s: u32, classic: u32) -> QueueStats {
    let mut events = Vec::new();
    events.extend((0..l4s).map(|i| (i * ENQUEUE_INTERVAL, Event::Enqueue(Class::L4s))));
    events.extend((0..classic).map(|i| (i * ENQUEUE_INTERVAL, Event::Enqueue(Class::Classic))));
    events.extend((1..=l4s + classic).map(|i| (i * DEQUEUE_INTERVAL, Event::Dequeue)));
    events.sort_by_key(|(at, _)| *at);

    let limit = u64::from(queue.config().queue_limit);
    let mode = queue.mode();
    let mut admitted = 0u64;
    let mut departed = 0u64;

    for (now, event) in events {
        match event {
            Event::Enqueue(class) => {
                let item = PacketItem::new(class, PACKET_SIZE);
                let units = mode.units(&item);
                let verdict = queue.enqueue(item, now);

                if class.is_l4s() {
                    assert_ne!(verdict, Verdict::Dropped(DropReason::Unforced));
                }
                if verdict.is_admitted() {
                    admitted += units;
                }
            }
            Event::Dequeue => {
                let l4s_waiting = queue.occupancy_of(Class::L4s) > 0;
                match queue.dequeue(now) {
                    Ok(item) => {
                        assert_eq!(item.is_l4s(), l4s_waiting, "L4S must be served first");
                        departed += mode.units(&item);
                    }
                    Err(_) => assert!(queue.is_empty()),
                }
            }
        }

        assert!(queue.occupancy() <= limit);
        assert_eq!(queue.occupancy(), admitted - departed);

        let p = queue.probabilities();
        assert!((0.0..=1.0).contains(&p.classic));
        assert!((0.0..=1.0).contains(&p.l4s));
        assert!(p.l4s >= p.classic);
    }

    queue.stats()
}
