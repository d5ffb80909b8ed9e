use std::time::Duration;

use dualq::{Class, CurvyRedConfig, DualQConfig, DualQueue, PacketItem};

/// Offers 200 Classic and 200 L4S packets, one of each every 10ms, to a 50 packet queue that is
/// dequeued every 12ms, then prints the decision counters.
fn main() {
    let _ = tracing_subscriber::fmt::try_init();

    let curvy = std::env::args().any(|arg| arg == "--curvy-red");
    let mut config = DualQConfig::default().with_queue_limit(50);
    if curvy {
        config = config.with_curvy_red(CurvyRedConfig::default());
    }

    let mut queue = DualQueue::new(config).unwrap();

    let mut next_dequeue = Duration::from_millis(12);
    for i in 0..200 {
        let now = Duration::from_millis(10) * i;
        while next_dequeue < now {
            let _ = queue.dequeue(next_dequeue);
            next_dequeue += Duration::from_millis(12);
        }

        for class in [Class::L4s, Class::Classic] {
            queue.enqueue(PacketItem::new(class, 1000), now);
        }
    }

    while queue.dequeue(next_dequeue).is_ok() {
        next_dequeue += Duration::from_millis(12);
    }

    println!("{} statistics:", if curvy { "Curvy RED" } else { "PI Square" });
    println!("{}", queue.stats());
    println!("final probabilities: {:?}", queue.probabilities());
}
