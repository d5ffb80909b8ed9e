use std::time::Duration;

use dualq_aqm::{
    Class, ConfigError, DropReason, DualQConfig, DualQueue, EmptyQueue, PacketItem,
    PiSquareConfig, QueueMode, QueueStats, Verdict,
};

use crate::{config, PACKET_SIZE};

#[test]
fn fresh_queue_round_trip() {
    let mut queue = DualQueue::new(DualQConfig::default()).unwrap();

    assert_eq!(queue.occupancy(), 0);
    assert!(queue.is_empty());
    assert_eq!(queue.stats(), QueueStats::default());

    for _ in 0..4 {
        let classic = queue.enqueue(PacketItem::classic(PACKET_SIZE), Duration::ZERO);
        let l4s = queue.enqueue(PacketItem::l4s(PACKET_SIZE), Duration::ZERO);
        assert_eq!((classic, l4s), (Verdict::Enqueued, Verdict::Enqueued));
    }
    assert_eq!(queue.len(), 8);
    assert_eq!(queue.byte_len(), 8 * u64::from(PACKET_SIZE));

    let classes: Vec<Class> =
        (0..8).map(|_| queue.dequeue(Duration::ZERO).unwrap().class()).collect();
    assert_eq!(&classes[..4], &[Class::L4s; 4]);
    assert_eq!(&classes[4..], &[Class::Classic; 4]);

    assert_eq!(queue.dequeue(Duration::ZERO), Err(EmptyQueue));
    assert_eq!(queue.occupancy(), 0);
    assert_eq!(queue.stats(), QueueStats::default());
}

#[test]
fn occupancy_caps_at_limit() {
    for mode in [QueueMode::Packets, QueueMode::Bytes] {
        let mut queue = DualQueue::new(config(mode)).unwrap();
        let limit = u64::from(queue.config().queue_limit);

        let verdicts: Vec<Verdict> = (0..60)
            .map(|_| queue.enqueue(PacketItem::classic(PACKET_SIZE), Duration::ZERO))
            .collect();

        assert!(verdicts[..50].iter().all(Verdict::is_admitted), "{mode:?}");
        assert!(
            verdicts[50..].iter().all(|v| *v == Verdict::Dropped(DropReason::Forced)),
            "{mode:?}"
        );
        assert_eq!(queue.occupancy(), limit);
        assert_eq!(queue.sub_queue(Class::Classic).len(), 50);
        assert_eq!(queue.stats().forced_drop, 10);

        // Freeing one slot admits exactly one more.
        queue.dequeue(Duration::ZERO).unwrap();
        assert!(queue.enqueue(PacketItem::l4s(PACKET_SIZE), Duration::ZERO).is_admitted());
        assert_eq!(
            queue.enqueue(PacketItem::l4s(PACKET_SIZE), Duration::ZERO),
            Verdict::Dropped(DropReason::Forced)
        );
    }
}

#[test]
fn invalid_config_is_rejected() {
    let err = DualQueue::new(DualQConfig::default().with_queue_limit(10).with_l4s_threshold(11))
        .unwrap_err();
    assert_eq!(err, ConfigError::L4sThresholdAboveLimit { threshold: 11, limit: 10 });

    let err = DualQueue::new(DualQConfig::default().with_pi_square(PiSquareConfig {
        t_update: Duration::ZERO,
        ..Default::default()
    }))
    .unwrap_err();
    assert_eq!(err, ConfigError::ZeroUpdateInterval);

    let err = DualQueue::new(DualQConfig::default().with_queue_limit(0)).unwrap_err();
    assert_eq!(err, ConfigError::ZeroQueueLimit);
}

#[test]
fn idle_queue_decays_through_advance() {
    let mut queue = DualQueue::new(DualQConfig::default()).unwrap();
    queue.enqueue(PacketItem::classic(PACKET_SIZE), Duration::ZERO);

    let mut now = Duration::ZERO;
    while now < Duration::from_millis(500) {
        now += Duration::from_millis(16);
        queue.advance(now);
    }
    assert!(queue.probabilities().base > 0.0);

    queue.dequeue(now).unwrap();
    assert_eq!(queue.queue_delay(), now);

    // With nothing queued the delay is zero and the probability integrates back down.
    for _ in 0..1000 {
        now += Duration::from_millis(16);
        queue.advance(now);
    }
    assert_eq!(queue.classic_delay(now), Duration::ZERO);
    assert_eq!(queue.probabilities().base, 0.0);
}
