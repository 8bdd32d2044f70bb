//! One-time device bootstrap
//!
//! A freshly created coordinator knows only the player's address. Before the
//! first status poll it needs a complete identity, which either comes from
//! the identity store or from a discovery pass against the live device:
//!
//! ```text
//! load stored identity ──found──▶ restore client ─────────────▶ initialized
//!        │ absent / unreadable
//!        ▼
//!     probe ──connection error──▶ not ready (retry next tick)
//!        │  ──other error───────▶ failed    (retry next tick)
//!        ▼
//!  init_device ──error──▶ failed
//!        ▼
//!  save identity (failure logged) ──▶ initialized
//! ```
//!
//! Once initialized, [`Bootstrap::run`] short-circuits.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bluray_api::DeviceClient;
use identity_store::IdentityStore;
use tracing::{debug, error, info, warn};

use crate::worker::{run_blocking, ClientSlot};
use crate::Result;

/// What a single bootstrap pass did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// An earlier pass already succeeded
    AlreadyInitialized,
    /// The identity was restored from the store
    Restored,
    /// The identity was discovered from the device and persisted
    Discovered,
    /// The device is not reachable yet
    NotReady,
    /// The device answered with an error
    Failed,
}

impl BootstrapOutcome {
    pub fn is_initialized(&self) -> bool {
        matches!(
            self,
            BootstrapOutcome::AlreadyInitialized
                | BootstrapOutcome::Restored
                | BootstrapOutcome::Discovered
        )
    }
}

/// Bootstrap state for one device
pub struct Bootstrap<S> {
    store: Arc<S>,
    initialized: AtomicBool,
}

impl<S: IdentityStore> Bootstrap<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            initialized: AtomicBool::new(false),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Run one bootstrap pass
    ///
    /// Device failures are reported through the outcome. Only a failed
    /// blocking worker is returned as an error.
    pub async fn run<C: DeviceClient>(&self, slot: &ClientSlot<C>) -> Result<BootstrapOutcome> {
        if self.is_initialized() {
            return Ok(BootstrapOutcome::AlreadyInitialized);
        }

        let client = slot.current();

        if let Some(restored) = self.restore(&client).await? {
            slot.replace(restored);
            self.mark_initialized();
            info!("Restored identity from {}", self.store.key());
            return Ok(BootstrapOutcome::Restored);
        }

        let probe_client = Arc::clone(&client);
        if let Err(e) = run_blocking(move || probe_client.probe()).await? {
            if e.is_connection() {
                debug!("Player not reachable yet: {}", e);
                return Ok(BootstrapOutcome::NotReady);
            }
            error!("Player probe failed: {}", e);
            return Ok(BootstrapOutcome::Failed);
        }

        let init_client = Arc::clone(&client);
        if let Err(e) = run_blocking(move || init_client.init_device()).await? {
            error!("Device discovery failed: {}", e);
            return Ok(BootstrapOutcome::Failed);
        }

        self.persist(client).await?;
        self.mark_initialized();
        Ok(BootstrapOutcome::Discovered)
    }

    async fn restore<C: DeviceClient>(&self, client: &Arc<C>) -> Result<Option<C>> {
        let store = Arc::clone(&self.store);
        let blob = match run_blocking(move || store.load()).await? {
            Ok(Some(blob)) => blob,
            Ok(None) => {
                debug!("No stored identity in {}", self.store.key());
                return Ok(None);
            }
            Err(e) => {
                warn!("Ignoring unreadable stored identity: {}", e);
                return Ok(None);
            }
        };

        let template = Arc::clone(client);
        match run_blocking(move || template.load_from_identity_blob(&blob)).await? {
            Ok(restored) => Ok(Some(restored)),
            Err(e) => {
                warn!("Ignoring undecodable stored identity: {}", e);
                Ok(None)
            }
        }
    }

    async fn persist<C: DeviceClient>(&self, client: Arc<C>) -> Result<()> {
        let store = Arc::clone(&self.store);
        let saved = run_blocking(move || -> std::result::Result<(), String> {
            let blob = client.save_to_identity_blob().map_err(|e| e.to_string())?;
            store.save(&blob).map_err(|e| e.to_string())
        })
        .await?;

        match saved {
            Ok(()) => info!("Discovered player identity saved to {}", self.store.key()),
            Err(e) => error!("Failed to save player identity: {}", e),
        }
        Ok(())
    }

    fn mark_initialized(&self) {
        self.initialized.store(true, Ordering::Release);
    }
}
