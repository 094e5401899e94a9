mod common;

use std::sync::Arc;

use common::{MINUTE, minute_window};
use crpt_client::{ManualClock, SharedSlidingWindow, TimeUnit, WindowConfig};

#[test]
fn capacity_law_holds_for_every_limit() {
    for limit in 1..=5 {
        let clock = ManualClock::new(MINUTE);
        let mut window = minute_window(limit, &clock);

        for _ in 0..limit {
            assert!(window.try_reserve());
            clock.advance(MINUTE / 10);
        }
        assert!(window.is_at_capacity());
        assert!(!window.try_reserve());
        assert_eq!(window.len(), limit as usize);
    }
}

#[test]
fn expiry_boundary_for_limit_one() {
    let clock = ManualClock::new(3 * MINUTE);
    let t0 = 3 * MINUTE;
    let mut window = minute_window(1, &clock);
    assert!(window.try_reserve());

    for probe in [t0, t0 + 1, t0 + MINUTE - 1, t0 + MINUTE] {
        clock.set(probe);
        assert!(window.is_at_capacity(), "expected full at {probe}");
    }
    for probe in [t0 + MINUTE + 1, t0 + 2 * MINUTE] {
        clock.set(probe);
        assert!(!window.is_at_capacity(), "expected free at {probe}");
    }
}

#[test]
fn shared_window_matches_single_owner() {
    let clock = ManualClock::new(MINUTE);
    let config = WindowConfig::new(Some(TimeUnit::Minutes), 2).unwrap();
    let shared = Arc::new(SharedSlidingWindow::with_clock(config, clock.clone()));

    assert!(shared.try_reserve());
    assert!(shared.try_reserve());
    assert!(!shared.try_reserve());
    assert_eq!(shared.len(), 2);

    clock.advance(MINUTE);
    assert!(shared.is_at_capacity());
    clock.advance(1);
    assert!(!shared.is_at_capacity());
    assert!(shared.is_empty());
    assert_eq!(shared.config().limit(), 2);
}
