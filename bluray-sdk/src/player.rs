//! Configured player lifecycle: setup, unload and remove

use std::sync::Arc;

use bluray_api::{AuthenticationResult, DeviceClient};
use bluray_state::{Coordinator, CoordinatorConfig, PollingScheduler, Snapshot};
use identity_store::IdentityStore;
use tracing::{debug, error, info, warn};

use crate::config::{DeviceConfig, EntryConfig};
use crate::controls::{Button, MediaPlayer, Remote};
use crate::{Result, SdkError};

/// A set-up player with its coordinator and polling task
///
/// Call [`Player::unload`] to stop polling and wait for the task to end.
/// Dropping the handle only signals the task to stop.
pub struct Player<C, S> {
    config: DeviceConfig,
    coordinator: Coordinator<C, S>,
    polling: Option<PollingScheduler>,
}

impl<C: DeviceClient, S: IdentityStore> Player<C, S> {
    /// Connect to a configured player and start keeping its state
    ///
    /// `connect` builds the client for the effective configuration. Fails
    /// with [`SdkError::AuthenticationRequired`] if the player wants a PIN
    /// that was never entered, and with [`SdkError::NotReady`] if the player
    /// cannot be brought up yet.
    pub async fn setup<F>(
        entry: &EntryConfig,
        connect: F,
        store: Arc<S>,
        coordinator_config: CoordinatorConfig,
    ) -> Result<Self>
    where
        F: FnOnce(&DeviceConfig) -> C,
    {
        let config = entry.effective();
        config.validate()?;
        let mut client = connect(&config);

        if config.needs_registration() {
            let (registered, result) = tokio::task::spawn_blocking(move || {
                let result = client.register();
                (client, result)
            })
            .await
            .map_err(|e| SdkError::NotReady(e.to_string()))?;
            client = registered;

            match result {
                AuthenticationResult::Success => debug!("Registered with {}", config.host),
                AuthenticationResult::PinNeeded => return Err(SdkError::AuthenticationRequired),
                AuthenticationResult::Error => {
                    warn!("Registration with {} failed, continuing", config.host)
                }
            }
        }

        let coordinator = Coordinator::new(client, store, coordinator_config)?;
        coordinator
            .refresh()
            .await
            .map_err(|e| SdkError::NotReady(e.to_string()))?;

        let polling = coordinator.start_polling();
        info!(
            "Player {} set up (initialized: {})",
            config.host,
            coordinator.is_initialized()
        );

        Ok(Self {
            config,
            coordinator,
            polling: Some(polling),
        })
    }

    /// Stop polling
    pub async fn unload(mut self) -> Result<()> {
        if let Some(polling) = self.polling.take() {
            polling.shutdown().await?;
        }
        info!("Player {} unloaded", self.config.host);
        Ok(())
    }

    /// Effective configuration the player was set up with
    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn coordinator(&self) -> &Coordinator<C, S> {
        &self.coordinator
    }

    pub fn snapshot(&self) -> Snapshot {
        self.coordinator.snapshot()
    }

    pub fn polling(&self) -> Option<&PollingScheduler> {
        self.polling.as_ref()
    }

    pub fn media_player(&self) -> MediaPlayer<C, S> {
        MediaPlayer::new(self.coordinator.clone())
    }

    pub fn remote(&self) -> Remote<C, S> {
        Remote::new(self.coordinator.clone())
    }

    /// One button per command the player advertises
    pub fn buttons(&self) -> Vec<Button<C, S>> {
        self.coordinator
            .client()
            .commands()
            .into_iter()
            .map(|command| Button::new(self.coordinator.clone(), command))
            .collect()
    }
}

/// Delete the persisted identity of a removed player
///
/// Nothing stored counts as success; other failures are logged only.
pub async fn remove<S: IdentityStore>(store: Arc<S>) {
    let key = store.key().to_string();
    match tokio::task::spawn_blocking(move || store.remove()).await {
        Ok(Ok(())) => info!("Removed stored identity {}", key),
        Ok(Err(e)) => error!("Error removing stored identity {}: {}", key, e),
        Err(e) => error!("Error removing stored identity {}: {}", key, e),
    }
}
