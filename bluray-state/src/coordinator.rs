//! Per-device coordinator
//!
//! The coordinator owns everything needed to keep one player's cached state
//! in sync: the active client, the bootstrap state, the playback store and
//! the busy flag for commands. Every state write goes through [`Coordinator::refresh`],
//! which holds the playback lock for the whole routine and publishes the
//! resulting [`Snapshot`] to subscribers.
//!
//! # Example
//!
//! ```rust,ignore
//! use bluray_state::{Coordinator, CoordinatorConfig, PlaybackState, StateTarget};
//!
//! let coordinator = Coordinator::new(client, store, CoordinatorConfig::default())?;
//! coordinator.refresh().await?;
//! let polling = coordinator.start_polling();
//!
//! let outcome = coordinator
//!     .execute(StateTarget::Fixed(PlaybackState::Playing), |client| client.play())
//!     .await?;
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bluray_api::{DeviceClient, Result as ApiResult};
use identity_store::IdentityStore;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use crate::bootstrap::Bootstrap;
use crate::config::CoordinatorConfig;
use crate::executor::{converge, BusyFlag, ConvergenceOutcome, StateTarget};
use crate::model::{PlaybackState, Snapshot};
use crate::playback::PlaybackStore;
use crate::scheduler::{PollingScheduler, RefreshSource};
use crate::worker::{run_blocking, ClientSlot};
use crate::Result;

struct Inner<C, S> {
    client: ClientSlot<C>,
    bootstrap: Bootstrap<S>,
    config: CoordinatorConfig,
    playback: Mutex<PlaybackStore>,
    busy: BusyFlag,
    snapshot_tx: watch::Sender<Snapshot>,
    last_update_success: AtomicBool,
}

/// Shared handle to one player's synchronization state
pub struct Coordinator<C, S> {
    inner: Arc<Inner<C, S>>,
}

impl<C, S> Clone for Coordinator<C, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: DeviceClient, S: IdentityStore> Coordinator<C, S> {
    pub fn new(client: C, store: Arc<S>, config: CoordinatorConfig) -> Result<Self> {
        config.validate()?;

        let (snapshot_tx, _) = watch::channel(Snapshot::default());
        Ok(Self {
            inner: Arc::new(Inner {
                client: ClientSlot::new(client),
                bootstrap: Bootstrap::new(store),
                config,
                playback: Mutex::new(PlaybackStore::new()),
                busy: BusyFlag::new(),
                snapshot_tx,
                last_update_success: AtomicBool::new(true),
            }),
        })
    }

    /// Run the refresh routine and publish the result
    ///
    /// Bootstraps first if needed; while the device is not bootstrapped the
    /// cached state is left alone. Device errors collapse the state to off
    /// instead of failing the call.
    pub async fn refresh(&self) -> Result<Snapshot> {
        let result = self.refresh_locked().await;
        self.inner
            .last_update_success
            .store(result.is_ok(), Ordering::Release);
        result
    }

    async fn refresh_locked(&self) -> Result<Snapshot> {
        let mut playback = self.inner.playback.lock().await;

        let outcome = self.inner.bootstrap.run(&self.inner.client).await?;
        if outcome.is_initialized() {
            playback.refresh(self.inner.client.current()).await?;
        } else {
            debug!("Player not bootstrapped ({:?}), skipping status poll", outcome);
        }

        let snapshot = playback.snapshot();
        self.inner.snapshot_tx.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot.clone();
                true
            }
        });
        Ok(snapshot)
    }

    /// Refresh now, logging instead of returning a failure
    pub async fn request_refresh(&self) -> bool {
        match self.refresh().await {
            Ok(_) => true,
            Err(e) => {
                warn!("Requested refresh failed: {}", e);
                false
            }
        }
    }

    /// Send a command and wait for the player to reach `target`
    ///
    /// Returns [`ConvergenceOutcome::Superseded`] without touching the
    /// device when another command is still converging. An error from
    /// `action` is returned as is; the busy flag is cleared either way.
    pub async fn execute<F>(&self, target: StateTarget, action: F) -> Result<ConvergenceOutcome>
    where
        F: FnOnce(&C) -> ApiResult<()> + Send + 'static,
    {
        let Some(_busy) = self.inner.busy.try_acquire() else {
            debug!("Command dropped, another one is in flight ({:?})", target);
            return Ok(ConvergenceOutcome::Superseded);
        };

        let expected = target.resolve(self.snapshot().state);
        debug!("Executing command, expecting {}", expected);

        let client = self.inner.client.current();
        run_blocking(move || action(client.as_ref())).await??;

        let outcome = converge(
            expected,
            self.inner.config.convergence_attempts,
            self.inner.config.convergence_delay,
            move || async move { self.refresh().await.map(|snapshot| snapshot.state) },
        )
        .await?;

        if let ConvergenceOutcome::TimedOut { last_observed, .. } = outcome {
            info!(
                "Player did not reach {} after {} attempts, last reported {}",
                expected, self.inner.config.convergence_attempts, last_observed
            );
        }
        Ok(outcome)
    }

    /// Send a command without waiting for any state change
    pub async fn run_action<F>(&self, action: F) -> Result<()>
    where
        F: FnOnce(&C) -> ApiResult<()> + Send + 'static,
    {
        let client = self.inner.client.current();
        run_blocking(move || action(client.as_ref())).await??;
        Ok(())
    }

    /// Start the scheduled refresh loop
    pub fn start_polling(&self) -> PollingScheduler {
        PollingScheduler::start(Arc::new(self.clone()), self.inner.config.poll_interval)
    }

    /// Last published snapshot
    pub fn snapshot(&self) -> Snapshot {
        self.inner.snapshot_tx.borrow().clone()
    }

    pub fn state(&self) -> PlaybackState {
        self.inner.snapshot_tx.borrow().state
    }

    /// Watch published snapshots; only changes wake receivers
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.inner.snapshot_tx.subscribe()
    }

    /// The active client; replaced once if an identity is restored
    pub fn client(&self) -> Arc<C> {
        self.inner.client.current()
    }

    pub fn store(&self) -> &Arc<S> {
        self.inner.bootstrap.store()
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.bootstrap.is_initialized()
    }

    pub fn is_busy(&self) -> bool {
        self.inner.busy.is_busy()
    }

    pub fn last_update_success(&self) -> bool {
        self.inner.last_update_success.load(Ordering::Acquire)
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.inner.config
    }
}

#[async_trait]
impl<C: DeviceClient, S: IdentityStore> RefreshSource for Coordinator<C, S> {
    async fn refresh_and_publish(&self) -> Result<Snapshot> {
        self.refresh().await
    }
}
