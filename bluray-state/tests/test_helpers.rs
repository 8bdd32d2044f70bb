//! Shared fixtures for the coordinator integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bluray_api::mock::MockDeviceClient;
use bluray_api::{DeviceClient, RawPositionInfo};
use bluray_state::{Coordinator, CoordinatorConfig};
use identity_store::{IdentityStore, MemoryStore, StoreError};
use serde_json::Value;

pub const TEST_HOST: &str = "192.168.1.40";

pub type TestCoordinator = Coordinator<MockDeviceClient, MemoryStore>;

/// A mock client, the coordinator that owns a clone of it, and its store.
pub fn create_test_coordinator() -> (MockDeviceClient, TestCoordinator, Arc<MemoryStore>) {
    create_test_coordinator_with(CoordinatorConfig::default())
}

pub fn create_test_coordinator_with(
    config: CoordinatorConfig,
) -> (MockDeviceClient, TestCoordinator, Arc<MemoryStore>) {
    let client = MockDeviceClient::new(TEST_HOST);
    let store = Arc::new(MemoryStore::new());
    let coordinator = Coordinator::new(client.clone(), Arc::clone(&store), config).unwrap();
    (client, coordinator, store)
}

/// Store an identity as if the player had been discovered in an earlier run.
pub fn seed_identity(store: &MemoryStore, nickname: &str) {
    let previous = MockDeviceClient::new(TEST_HOST);
    previous.init_device().unwrap();
    let mut blob = previous.save_to_identity_blob().unwrap();
    blob["nickname"] = Value::String(nickname.to_string());
    store.save(&blob).unwrap();
}

pub fn position(duration: &str, position: &str) -> Option<RawPositionInfo> {
    Some(RawPositionInfo::new(duration, position))
}

/// Compressed convergence timings for tests that do not care about them.
pub fn quick_config() -> CoordinatorConfig {
    CoordinatorConfig::default()
        .with_poll_interval(Duration::from_secs(10))
        .with_convergence(3, Duration::from_millis(100))
}

/// Store that loads nothing and refuses every write.
#[derive(Debug, Default)]
pub struct FailingStore {
    saves: AtomicU32,
}

impl FailingStore {
    pub fn save_attempts(&self) -> u32 {
        self.saves.load(Ordering::SeqCst)
    }
}

impl IdentityStore for FailingStore {
    fn key(&self) -> &str {
        "read-only.json"
    }

    fn load(&self) -> identity_store::Result<Option<Value>> {
        Ok(None)
    }

    fn save(&self, _data: &Value) -> identity_store::Result<()> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::Encode("read-only file system".to_string()))
    }

    fn remove(&self) -> identity_store::Result<()> {
        Ok(())
    }
}
