//! Polling loop timing, error tolerance and shutdown.

mod test_helpers;

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bluray_state::{PlaybackState, PollingScheduler, RefreshSource, Snapshot, StateError};
use test_helpers::*;
use tokio::time::Instant;

/// Fails the first `failures` ticks, then succeeds.
struct FlakySource {
    calls: AtomicU32,
    failures: u32,
}

#[async_trait]
impl RefreshSource for FlakySource {
    async fn refresh_and_publish(&self) -> bluray_state::Result<Snapshot> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call <= self.failures {
            Err(StateError::Worker(format!("tick {call} failed")))
        } else {
            Ok(Snapshot::default())
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_tick_publishes_snapshot() {
    let (client, coordinator, _store) = create_test_coordinator();
    client.set_status("PLAYING");
    let mut snapshots = coordinator.subscribe();
    let start = Instant::now();

    let polling = coordinator.start_polling();
    snapshots.changed().await.unwrap();

    assert_eq!(snapshots.borrow().state, PlaybackState::Playing);
    assert_eq!(start.elapsed(), Duration::from_secs(60));
    assert!(coordinator.is_initialized());

    let stats = polling.stats().await;
    assert_eq!(stats.poll_count, 1);
    assert!(stats.last_success);
    polling.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_failures_do_not_stop_the_loop() {
    let source = Arc::new(FlakySource {
        calls: AtomicU32::new(0),
        failures: 2,
    });
    let polling = PollingScheduler::start(Arc::clone(&source), Duration::from_secs(10));

    tokio::time::sleep(Duration::from_secs(25)).await;
    let stats = polling.stats().await;
    assert_eq!(stats.poll_count, 2);
    assert_eq!(stats.error_count, 2);
    assert!(!stats.last_success);
    assert!(stats.is_running);

    tokio::time::sleep(Duration::from_secs(10)).await;
    let stats = polling.stats().await;
    assert_eq!(stats.poll_count, 3);
    assert_eq!(stats.error_count, 0);
    assert!(polling.last_success());

    polling.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_interrupts_interval_wait() {
    let source = Arc::new(FlakySource {
        calls: AtomicU32::new(0),
        failures: 0,
    });
    let polling = PollingScheduler::start(Arc::clone(&source), Duration::from_secs(3600));
    tokio::task::yield_now().await;
    assert!(polling.is_running());

    let start = Instant::now();
    polling.shutdown().await.unwrap();

    assert!(start.elapsed() < Duration::from_secs(1));
    assert_eq!(source.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_drop_stops_the_loop() {
    let source = Arc::new(FlakySource {
        calls: AtomicU32::new(0),
        failures: 0,
    });
    let polling = PollingScheduler::start(Arc::clone(&source), Duration::from_secs(10));
    tokio::time::sleep(Duration::from_secs(15)).await;
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);

    drop(polling);
    tokio::time::sleep(Duration::from_secs(60)).await;

    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    assert_eq!(Arc::strong_count(&source), 1);
}

#[test]
fn test_stats_display() {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .start_paused(true)
        .build()
        .unwrap();

    runtime.block_on(async {
        let source = Arc::new(FlakySource {
            calls: AtomicU32::new(0),
            failures: 0,
        });
        let polling = PollingScheduler::start(source, Duration::from_secs(60));
        let rendered = polling.stats().await.to_string();
        assert!(rendered.contains("Interval: 60s"));
        assert!(rendered.contains("Polls: 0"));
        polling.shutdown().await.unwrap();
    });
}
