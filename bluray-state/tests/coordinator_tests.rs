//! Refresh and bootstrap behaviour of the coordinator.

mod test_helpers;

use std::sync::Arc;
use std::time::Duration;

use bluray_api::mock::{MockDeviceClient, MockFailure};
use bluray_api::DeviceClient;
use bluray_state::{Coordinator, CoordinatorConfig, PlaybackState};
use identity_store::IdentityStore;
use test_helpers::*;

// ============================================================================
// Bootstrap
// ============================================================================

#[tokio::test]
async fn test_unreachable_player_never_initializes() {
    let (client, coordinator, store) = create_test_coordinator();
    client.set_probe(Err(MockFailure::Connection));

    for _ in 0..3 {
        let snapshot = coordinator.refresh().await.unwrap();
        assert_eq!(snapshot.state, PlaybackState::Off);
    }

    assert!(!coordinator.is_initialized());
    assert!(coordinator.last_update_success());
    assert!(store.is_empty());
    assert_eq!(client.call_count("probe"), 3);
    assert_eq!(client.call_count("playing_status"), 0);
}

#[tokio::test]
async fn test_reachable_player_initializes_in_one_refresh() {
    let (client, coordinator, store) = create_test_coordinator();
    client.set_status("IDLE");

    let snapshot = coordinator.refresh().await.unwrap();

    assert!(coordinator.is_initialized());
    assert_eq!(snapshot.state, PlaybackState::Idle);
    let saved = store.load().unwrap().unwrap();
    assert_eq!(saved["host"], TEST_HOST);
    assert_eq!(saved["mac"], "AA:BB:CC:DD:EE:FF");
    assert!(coordinator.client().commands().contains(&"Eject".to_string()));
}

#[tokio::test]
async fn test_probe_error_retries_from_scratch() {
    let (client, coordinator, store) = create_test_coordinator();
    client.set_probe(Err(MockFailure::Request));

    coordinator.refresh().await.unwrap();
    coordinator.refresh().await.unwrap();

    assert!(!coordinator.is_initialized());
    assert!(store.is_empty());
    assert_eq!(client.call_count("probe"), 2);
    assert_eq!(client.call_count("init_device"), 0);

    client.set_probe(Ok(()));
    coordinator.refresh().await.unwrap();
    assert!(coordinator.is_initialized());
    assert!(!store.is_empty());
}

#[tokio::test]
async fn test_discovery_failure_is_retried() {
    let (client, coordinator, _store) = create_test_coordinator();
    client.set_init_failure(Some(MockFailure::Request));

    coordinator.refresh().await.unwrap();
    assert!(!coordinator.is_initialized());

    client.set_init_failure(None);
    coordinator.refresh().await.unwrap();
    assert!(coordinator.is_initialized());
    assert_eq!(client.call_count("init_device"), 2);
}

#[tokio::test]
async fn test_restore_runs_at_most_once() {
    let (client, coordinator, store) = create_test_coordinator();
    seed_identity(&store, "Bedroom");

    for _ in 0..3 {
        coordinator.refresh().await.unwrap();
    }

    assert!(coordinator.is_initialized());
    assert_eq!(client.call_count("load_from_identity_blob"), 1);
    assert_eq!(client.call_count("probe"), 0);
    assert_eq!(client.call_count("playing_status"), 3);
    assert_eq!(coordinator.client().nickname(), "Bedroom");
}

#[tokio::test]
async fn test_persistence_failure_is_not_fatal() {
    let client = MockDeviceClient::new(TEST_HOST);
    let store = Arc::new(FailingStore::default());
    let coordinator =
        Coordinator::new(client.clone(), Arc::clone(&store), CoordinatorConfig::default()).unwrap();

    coordinator.refresh().await.unwrap();

    assert!(coordinator.is_initialized());
    assert!(coordinator.last_update_success());
    assert_eq!(store.save_attempts(), 1);
}

#[test]
fn test_invalid_config_rejected() {
    let config = CoordinatorConfig::default().with_convergence(0, std::time::Duration::ZERO);
    let result = Coordinator::new(
        MockDeviceClient::new(TEST_HOST),
        Arc::new(identity_store::MemoryStore::new()),
        config,
    );
    assert!(result.is_err());
}

// ============================================================================
// Playback refresh
// ============================================================================

#[tokio::test]
async fn test_paused_status_queries_position() {
    let (client, coordinator, _store) = create_test_coordinator();
    client.set_status("PAUSED_PLAYBACK");
    client.set_position(position("2:00:00", "0:45:30"));

    let snapshot = coordinator.refresh().await.unwrap();

    assert_eq!(snapshot.state, PlaybackState::Paused);
    assert_eq!(client.call_count("position_info"), 1);
    let info = snapshot.position_info.unwrap();
    assert_eq!(info.duration_secs, 7200);
    assert_eq!(info.position_secs, 2730);
}

#[tokio::test]
async fn test_null_position_retains_previous_value() {
    let (client, coordinator, _store) = create_test_coordinator();
    client.set_status("PLAYING");
    client.set_position(position("1:30:00", "0:10:00"));
    let first = coordinator.refresh().await.unwrap();

    client.set_position(None);
    let second = coordinator.refresh().await.unwrap();

    assert_eq!(second.state, PlaybackState::Playing);
    assert!(second.position_info.is_some());
    assert_eq!(second.position_info, first.position_info);
}

#[tokio::test]
async fn test_oversized_position_retains_previous_value() {
    let (client, coordinator, _store) = create_test_coordinator();
    client.set_status("PLAYING");
    client.set_position(position("1:30:00", "0:10:00"));
    let first = coordinator.refresh().await.unwrap();

    client.set_position(position("10000000000000000:00:00", "0:00:01"));
    let second = coordinator.refresh().await.unwrap();

    assert_eq!(second.state, PlaybackState::Playing);
    assert_eq!(second.position_info, first.position_info);
}

#[tokio::test(start_paused = true)]
async fn test_oversized_position_keeps_polling_alive() {
    let (client, coordinator, _store) = create_test_coordinator();
    client.set_status("PLAYING");
    client.set_position(position("10000000000000000:00:00", "0:00:01"));

    let polling = coordinator.start_polling();
    tokio::time::sleep(Duration::from_secs(61)).await;

    assert!(polling.is_running());
    assert_eq!(polling.stats().await.poll_count, 1);
    assert_eq!(coordinator.state(), PlaybackState::Playing);
    assert!(coordinator.snapshot().position_info.is_none());
    polling.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_off_skips_position_and_hides_it() {
    let (client, coordinator, _store) = create_test_coordinator();
    client.set_status("PLAYING");
    client.set_position(position("1:30:00", "0:10:00"));
    coordinator.refresh().await.unwrap();

    client.set_status("OFF");
    client.clear_calls();
    let snapshot = coordinator.refresh().await.unwrap();

    assert_eq!(snapshot.state, PlaybackState::Off);
    assert!(snapshot.position_info.is_none());
    assert_eq!(client.call_count("position_info"), 0);

    // The cached reading comes back once the player is on again
    client.set_status("PAUSED_PLAYBACK");
    client.set_position(None);
    let snapshot = coordinator.refresh().await.unwrap();
    assert_eq!(snapshot.position_info.map(|p| p.position_secs), Some(600));
}

#[tokio::test]
async fn test_status_failure_collapses_to_off() {
    let (client, coordinator, _store) = create_test_coordinator();
    client.set_status("PLAYING");
    coordinator.refresh().await.unwrap();

    client.set_status_failure(MockFailure::Connection);
    let snapshot = coordinator.refresh().await.unwrap();

    assert_eq!(snapshot.state, PlaybackState::Off);
    assert!(coordinator.last_update_success());
}

#[tokio::test]
async fn test_unknown_status_maps_to_on() {
    let (client, coordinator, _store) = create_test_coordinator();
    client.set_status("TRANSITIONING");

    let snapshot = coordinator.refresh().await.unwrap();

    assert_eq!(snapshot.state, PlaybackState::On);
    assert_eq!(client.call_count("position_info"), 1);
}

#[tokio::test]
async fn test_subscribers_see_published_changes() {
    let (client, coordinator, _store) = create_test_coordinator();
    let mut snapshots = coordinator.subscribe();
    client.set_status("PLAYING");

    assert!(coordinator.request_refresh().await);

    assert!(snapshots.has_changed().unwrap());
    assert_eq!(snapshots.borrow_and_update().state, PlaybackState::Playing);

    // Same state again: nothing new is published
    coordinator.refresh().await.unwrap();
    assert!(!snapshots.has_changed().unwrap());
    assert_eq!(coordinator.state(), PlaybackState::Playing);
}
