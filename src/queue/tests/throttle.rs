#[cfg(test)]
mod tests {
    use crate::pool::WorkerPool;
    use crate::queue::throttle::CoalescingThrottle;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
    use std::thread;
    use std::time::{Duration, Instant};

    fn wait_for(condition: impl Fn() -> bool, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            thread::sleep(Duration::from_millis(1));
        }
        condition()
    }

    #[test]
    fn test_single_dispatch_is_delivered() {
        let delivered = Arc::new(AtomicU64::new(0));
        let target = Arc::clone(&delivered);
        let throttle = CoalescingThrottle::new("single", move |value: u64| {
            target.store(value, Ordering::Release);
        });
        throttle.dispatch(99);
        assert!(wait_for(
            || delivered.load(Ordering::Acquire) == 99,
            Duration::from_secs(5)
        ));
    }

    #[test]
    fn test_burst_delivers_final_value() {
        let last = Arc::new(AtomicU64::new(0));
        let target = Arc::clone(&last);
        let throttle = CoalescingThrottle::new("burst", move |value: u64| {
            target.store(value, Ordering::Release);
        });
        for value in 1..=1_000u64 {
            throttle.dispatch(value);
        }
        // Intermediate values may coalesce away, but the final value must
        // eventually arrive.
        assert!(wait_for(
            || last.load(Ordering::Acquire) == 1_000,
            Duration::from_secs(5)
        ));
    }

    #[test]
    fn test_callback_never_overlaps_itself() {
        let in_callback = Arc::new(AtomicBool::new(false));
        let overlaps = Arc::new(AtomicUsize::new(0));
        let deliveries = Arc::new(AtomicUsize::new(0));

        let throttle = {
            let in_callback = Arc::clone(&in_callback);
            let overlaps = Arc::clone(&overlaps);
            let deliveries = Arc::clone(&deliveries);
            CoalescingThrottle::new("overlap", move |_: u64| {
                if in_callback.swap(true, Ordering::AcqRel) {
                    overlaps.fetch_add(1, Ordering::Relaxed);
                }
                thread::sleep(Duration::from_millis(1));
                deliveries.fetch_add(1, Ordering::Relaxed);
                in_callback.store(false, Ordering::Release);
            })
        };

        let throttle = Arc::new(throttle);
        let producers: Vec<_> = (0..4)
            .map(|p| {
                let throttle = Arc::clone(&throttle);
                thread::spawn(move || {
                    for i in 0..250u64 {
                        throttle.dispatch(p * 1_000 + i);
                    }
                })
            })
            .collect();
        for producer in producers {
            producer.join().unwrap();
        }

        assert!(wait_for(
            || deliveries.load(Ordering::Relaxed) > 0,
            Duration::from_secs(5)
        ));
        // Let any trailing drain cycle settle before checking.
        thread::sleep(Duration::from_millis(100));
        assert_eq!(overlaps.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_values_coalesce_under_slow_callback() {
        let deliveries = Arc::new(AtomicUsize::new(0));
        let pool = Arc::new(WorkerPool::new(2).unwrap());
        let throttle = {
            let deliveries = Arc::clone(&deliveries);
            CoalescingThrottle::with_pool(
                "slow",
                move |_: u64| {
                    thread::sleep(Duration::from_millis(5));
                    deliveries.fetch_add(1, Ordering::Relaxed);
                },
                pool,
            )
        };
        for value in 0..100u64 {
            throttle.dispatch(value);
        }
        thread::sleep(Duration::from_millis(500));
        let count = deliveries.load(Ordering::Relaxed);
        assert!(count >= 1, "at least one delivery required");
        assert!(count < 100, "bursts must coalesce, saw {count} deliveries");
    }

    #[test]
    fn test_panicking_callback_does_not_stop_throttle() {
        let deliveries = Arc::new(AtomicUsize::new(0));
        let throttle = {
            let deliveries = Arc::clone(&deliveries);
            CoalescingThrottle::new("panics", move |value: u64| {
                if value == 1 {
                    panic!("bad value");
                }
                deliveries.fetch_add(1, Ordering::Relaxed);
            })
        };
        throttle.dispatch(1);
        assert!(wait_for(
            || {
                // A later dispatch must still get through.
                throttle.dispatch(2);
                deliveries.load(Ordering::Relaxed) > 0
            },
            Duration::from_secs(5)
        ));
    }

    #[test]
    fn test_close_suppresses_dispatch() {
        let deliveries = Arc::new(AtomicUsize::new(0));
        let throttle = {
            let deliveries = Arc::clone(&deliveries);
            CoalescingThrottle::new("closed", move |_: u64| {
                deliveries.fetch_add(1, Ordering::Relaxed);
            })
        };
        throttle.close();
        assert!(throttle.is_closed());
        throttle.dispatch(1);
        thread::sleep(Duration::from_millis(100));
        assert_eq!(deliveries.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_name() {
        let throttle = CoalescingThrottle::new("refresh", |_: u64| {});
        assert_eq!(throttle.name(), "refresh");
    }
}
