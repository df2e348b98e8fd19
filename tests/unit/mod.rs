/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 30/8/25
******************************************************************************/

use dispatchq::{
    CoalescingThrottle, DispatchQueue, LogRouter, LogSink, MemorySink, Priority, PriorityCoalescingMap,
    PriorityFifo, RouterConfig, Severity, WorkerPool, setup_logger,
};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

#[cfg(test)]
mod integration_tests {
    use super::*;

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
    fn test_fifo_queue_end_to_end() {
        setup_logger();
        let queue = DispatchQueue::new("integration-fifo", PriorityFifo::new());
        let delivered = Arc::new(AtomicUsize::new(0));
        for _ in 0..5_000 {
            let delivered = Arc::clone(&delivered);
            queue.enqueue(
                1usize,
                move |n| {
                    delivered.fetch_add(n, Ordering::Relaxed);
                },
                Priority::Normal,
            );
        }
        assert_eq!(queue.wait_until_empty(Duration::from_secs(30)), 0);
        assert!(wait_for(
            || delivered.load(Ordering::Relaxed) == 5_000,
            Duration::from_secs(10)
        ));
        assert_eq!(queue.processed_count(), 5_000);
    }

    #[test]
    fn test_multi_producer_priority_fan_in() {
        let queue = DispatchQueue::new("integration-fan-in", PriorityFifo::new());
        let delivered = Arc::new(AtomicUsize::new(0));
        let producers: Vec<_> = (0..8)
            .map(|p| {
                let queue = queue.clone();
                let delivered = Arc::clone(&delivered);
                thread::spawn(move || {
                    let priority = Priority::from_index(p % 5).unwrap();
                    for _ in 0..1_000 {
                        let delivered = Arc::clone(&delivered);
                        queue.enqueue(
                            (),
                            move |_| {
                                delivered.fetch_add(1, Ordering::Relaxed);
                            },
                            priority,
                        );
                    }
                })
            })
            .collect();
        for producer in producers {
            producer.join().unwrap();
        }
        assert_eq!(queue.wait_until_empty(Duration::from_secs(30)), 0);
        assert!(wait_for(
            || delivered.load(Ordering::Relaxed) == 8_000,
            Duration::from_secs(10)
        ));
    }

    #[test]
    fn test_coalescing_queue_collapses_ticker_updates() {
        let pool = Arc::new(WorkerPool::new(2).unwrap());
        let queue = DispatchQueue::with_pool(
            "integration-coalesce",
            PriorityCoalescingMap::new(),
            pool,
        );
        let delivered = Arc::new(Mutex::new(Vec::<(String, u64)>::new()));
        // A blocking item at the top level holds the drain back so every
        // later update lands in storage before any is removed.
        let (release_tx, release_rx) = crossbeam::channel::bounded::<()>(1);
        queue.enqueue_keyed(
            0u64,
            move |_| {
                let _ = release_rx.recv();
            },
            Priority::Highest,
            "gate",
        );
        for round in 0..100u64 {
            for symbol in ["AAA", "BBB", "CCC"] {
                let delivered = Arc::clone(&delivered);
                let symbol_owned = symbol.to_string();
                queue.enqueue_keyed(
                    round,
                    move |price| {
                        delivered.lock().unwrap().push((symbol_owned, price));
                    },
                    Priority::Normal,
                    symbol,
                );
            }
        }
        release_tx.send(()).unwrap();
        assert_eq!(queue.wait_until_empty(Duration::from_secs(30)), 0);
        thread::sleep(Duration::from_millis(50));

        let snapshot = delivered.lock().unwrap().clone();
        // 100 bursts per symbol collapse to one delivery of the final state.
        assert_eq!(snapshot.len(), 3);
        for symbol in ["AAA", "BBB", "CCC"] {
            let last = snapshot.iter().rev().find(|(s, _)| s == symbol);
            assert_eq!(last.map(|(_, p)| *p), Some(99), "symbol {symbol}");
        }
    }

    #[test]
    fn test_throttle_delivers_latest_of_burst() {
        let last = Arc::new(AtomicU64::new(0));
        let target = Arc::clone(&last);
        let throttle = CoalescingThrottle::new("integration-throttle", move |v: u64| {
            target.store(v, Ordering::Release);
        });
        for value in 1..=10_000u64 {
            throttle.dispatch(value);
        }
        assert!(wait_for(
            || last.load(Ordering::Acquire) == 10_000,
            Duration::from_secs(10)
        ));
    }

    #[test]
    fn test_router_async_shutdown_under_load() {
        let sink = Arc::new(MemorySink::new());
        let config = RouterConfig {
            format: "{severity},{prefix}{text}{suffix}".to_string(),
            prefix: "[".to_string(),
            suffix: "]".to_string(),
            split_lines: true,
        };
        let router = LogRouter::with_config(Arc::clone(&sink) as Arc<dyn LogSink>, config)
            .unwrap()
            .with_shutdown_timeout(Duration::from_secs(30));
        router.set_async_io(true);
        for i in 0..1_000 {
            router.log(Severity::Info, &format!("entry-{i}"));
        }
        let remaining = router.dispose();
        assert_eq!(remaining, 0);
        assert!(wait_for(
            || sink.record_count() >= 1_000,
            Duration::from_secs(10)
        ));
        assert_eq!(sink.flush_count(), 1);
        let records = sink.records();
        assert!(
            records
                .iter()
                .any(|(s, t)| *s == Severity::Info && t == "INFO ,[entry-999]")
        );
    }

    #[test]
    fn test_queue_feeds_throttle_pipeline() {
        // Queue delivery fans into a throttle, the common shape for
        // "process every event, render only the latest state".
        let rendered = Arc::new(AtomicU64::new(0));
        let target = Arc::clone(&rendered);
        let throttle = Arc::new(CoalescingThrottle::new(
            "integration-render",
            move |state: u64| {
                target.store(state, Ordering::Release);
            },
        ));
        let queue = DispatchQueue::new("integration-pipeline", PriorityFifo::new());
        let state = Arc::new(AtomicU64::new(0));
        for _ in 0..1_000u64 {
            let throttle = Arc::clone(&throttle);
            let state = Arc::clone(&state);
            queue.enqueue(
                (),
                move |_| {
                    let next = state.fetch_add(1, Ordering::AcqRel) + 1;
                    throttle.dispatch(next);
                },
                Priority::Normal,
            );
        }
        assert_eq!(queue.wait_until_empty(Duration::from_secs(30)), 0);
        assert!(wait_for(
            || rendered.load(Ordering::Acquire) == 1_000,
            Duration::from_secs(10)
        ));
    }
}
