use dualq_aqm::{CurvyRedConfig, DualQConfig, DualQueue, QueueMode};

use crate::{config, curvy_red, pi_square, run_traffic};

const MODES: [QueueMode; 2] = [QueueMode::Packets, QueueMode::Bytes];

fn controllers(mode: QueueMode) -> [(&'static str, DualQConfig); 2] {
    [("pi square", pi_square(mode)), ("curvy red", curvy_red(mode))]
}

#[test]
fn l4s_only_is_marked_not_dropped() {
    let _ = tracing_subscriber::fmt::try_init();

    for mode in MODES {
        for (name, config) in controllers(mode) {
            let mut queue = DualQueue::new(config).unwrap();
            let stats = run_traffic(&mut queue, 400, 0);

            assert_eq!(stats.unforced_classic_drop, 0, "{name} {mode:?}: {stats:?}");
            assert_eq!(stats.unforced_classic_mark, 0, "{name} {mode:?}: {stats:?}");
            assert!(stats.unforced_l4s_mark > 0, "{name} {mode:?}: {stats:?}");
        }
    }
}

#[test]
fn classic_only_is_dropped_not_marked() {
    let _ = tracing_subscriber::fmt::try_init();

    for mode in MODES {
        for (name, config) in controllers(mode) {
            let mut queue = DualQueue::new(config).unwrap();
            let stats = run_traffic(&mut queue, 0, 400);

            assert_eq!(stats.unforced_l4s_mark, 0, "{name} {mode:?}: {stats:?}");
            assert!(stats.unforced_classic_drop > 0, "{name} {mode:?}: {stats:?}");
        }
    }
}

#[test]
fn mixed_traffic_sees_every_decision() {
    let _ = tracing_subscriber::fmt::try_init();

    for mode in MODES {
        for (name, config) in controllers(mode) {
            let mut queue = DualQueue::new(config).unwrap();
            let stats = run_traffic(&mut queue, 200, 200);

            assert!(stats.unforced_l4s_mark > 0, "{name} {mode:?}: {stats:?}");
            assert!(stats.unforced_classic_drop > 0, "{name} {mode:?}: {stats:?}");
            assert!(stats.forced_drop > 0, "{name} {mode:?}: {stats:?}");
        }
    }
}

#[test]
fn default_gains_starve_classic_before_the_limit() {
    let _ = tracing_subscriber::fmt::try_init();

    for mode in MODES {
        let defaults = [
            ("pi square", config(mode)),
            ("curvy red", config(mode).with_curvy_red(CurvyRedConfig::default())),
        ];

        for (name, defaults) in defaults {
            let mut queue = DualQueue::new(defaults).unwrap();
            let stats = run_traffic(&mut queue, 200, 200);

            // The base probability saturates while Classic waits behind L4S, so Classic is
            // dropped early and the shared limit is never reached.
            assert!(stats.unforced_l4s_mark > 0, "{name} {mode:?}: {stats:?}");
            assert!(stats.unforced_classic_drop > 150, "{name} {mode:?}: {stats:?}");
            assert_eq!(stats.forced_drop, 0, "{name} {mode:?}: {stats:?}");
        }
    }
}

#[test]
fn same_seed_same_outcome() {
    for (_, config) in controllers(QueueMode::Packets) {
        let mut a = DualQueue::new(config.clone().with_seed(7)).unwrap();
        let mut b = DualQueue::new(config.with_seed(7)).unwrap();

        assert_eq!(run_traffic(&mut a, 200, 200), run_traffic(&mut b, 200, 200));
    }
}
