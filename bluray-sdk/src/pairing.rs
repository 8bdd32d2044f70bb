//! Interactive pairing
//!
//! Pairing may need two rounds: the first submission carries the host and
//! ports, and if the player pops up a PIN the operator submits again with
//! just the PIN. Submissions are merged, so later rounds only need the
//! fields that changed.
//!
//! ```text
//!                 register() ok
//! Unregistered ─────────────────────────────▶ Authenticated
//!      │ register() wants PIN                       ▲
//!      ▼                                            │ send_authentication(pin)
//!  PinPending ──────────────────────────────────────┘
//!
//!  register() error / PIN rejected / transport error ──▶ Failed
//! ```
//!
//! A failed flow takes further submissions, so a mistyped PIN can be
//! entered again.

use std::marker::PhantomData;
use std::sync::Arc;

use bluray_api::{AuthenticationResult, DeviceClient};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::config::DeviceConfig;
use crate::{Result, SdkError};

/// One round of operator input; missing fields keep earlier values
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairingInput {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub pin: Option<String>,
    #[serde(default)]
    pub app_port: Option<u16>,
    #[serde(default)]
    pub dmr_port: Option<u16>,
    #[serde(default)]
    pub ircc_port: Option<u16>,
}

impl PairingInput {
    pub fn host(host: impl Into<String>) -> Self {
        Self {
            host: Some(host.into()),
            ..Default::default()
        }
    }

    pub fn pin(pin: impl Into<String>) -> Self {
        Self {
            pin: Some(pin.into()),
            ..Default::default()
        }
    }

    pub fn with_pin(mut self, pin: impl Into<String>) -> Self {
        self.pin = Some(pin.into());
        self
    }

    pub fn with_ports(mut self, app_port: u16, dmr_port: u16, ircc_port: u16) -> Self {
        self.app_port = Some(app_port);
        self.dmr_port = Some(dmr_port);
        self.ircc_port = Some(ircc_port);
        self
    }

    /// Overlay the fields set in `newer`
    pub fn merge(&mut self, newer: PairingInput) {
        if newer.host.is_some() {
            self.host = newer.host;
        }
        if newer.pin.is_some() {
            self.pin = newer.pin;
        }
        if newer.app_port.is_some() {
            self.app_port = newer.app_port;
        }
        if newer.dmr_port.is_some() {
            self.dmr_port = newer.dmr_port;
        }
        if newer.ircc_port.is_some() {
            self.ircc_port = newer.ircc_port;
        }
    }

    /// Build a configuration, filling in default ports
    pub fn to_config(&self) -> Result<DeviceConfig> {
        let host = self
            .host
            .clone()
            .ok_or_else(|| SdkError::InvalidConfig("Host is required".to_string()))?;

        let mut config = DeviceConfig::new(host);
        config.pin = self.pin.clone();
        if let Some(port) = self.app_port {
            config.app_port = port;
        }
        if let Some(port) = self.dmr_port {
            config.dmr_port = port;
        }
        if let Some(port) = self.ircc_port {
            config.ircc_port = port;
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairingState {
    Unregistered,
    /// The player is showing a PIN and waits for it to be submitted
    PinPending,
    Authenticated,
    Failed,
}

/// The result of a completed pairing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairedDevice {
    /// Merged input, with the MAC address learned while pairing
    pub config: DeviceConfig,
    /// Whether the player accepted this controller; a rejected PIN fails
    /// the submission instead of completing
    pub authenticated: bool,
    pub mac: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairingStep {
    /// Ask the operator for the PIN on the player's screen and submit again
    NeedPin,
    Complete(PairedDevice),
}

enum Attempt {
    PinNeeded,
    RegistrationError,
    Finished { authenticated: bool, mac: Option<String> },
}

/// Pairing flow for one player
///
/// `connect` builds a client for the configuration assembled from the
/// operator's input. Every submission builds a fresh one.
pub struct PairingFlow<C, F> {
    connect: Arc<F>,
    input: PairingInput,
    state: PairingState,
    _client: PhantomData<fn() -> C>,
}

impl<C, F> PairingFlow<C, F>
where
    C: DeviceClient,
    F: Fn(&DeviceConfig) -> C + Send + Sync + 'static,
{
    pub fn new(connect: F) -> Self {
        Self {
            connect: Arc::new(connect),
            input: PairingInput::default(),
            state: PairingState::Unregistered,
            _client: PhantomData,
        }
    }

    pub fn state(&self) -> PairingState {
        self.state
    }

    /// Everything submitted so far
    pub fn input(&self) -> &PairingInput {
        &self.input
    }

    /// Merge `input` and try to pair
    ///
    /// A failed flow can be retried with another submission; a completed
    /// one cannot.
    pub async fn submit(&mut self, input: PairingInput) -> Result<PairingStep> {
        if self.state == PairingState::Authenticated {
            return Err(SdkError::PairingComplete);
        }

        self.input.merge(input);
        let config = self.input.to_config()?;
        debug!("Pairing with {} ({:?})", config.host, self.state);

        let connect = Arc::clone(&self.connect);
        let attempt_config = config.clone();
        let attempt = tokio::task::spawn_blocking(move || {
            let client = (*connect)(&attempt_config);
            attempt_pairing(&client, &attempt_config)
        })
        .await
        .map_err(|e| SdkError::Worker(e.to_string()))?;

        match attempt {
            Ok(Attempt::PinNeeded) => {
                info!("Player at {} is showing a PIN", config.host);
                self.state = PairingState::PinPending;
                Ok(PairingStep::NeedPin)
            }
            Ok(Attempt::RegistrationError) => {
                error!("Registration with {} failed", config.host);
                self.state = PairingState::Failed;
                Err(SdkError::Registration(format!(
                    "Player at {} rejected registration",
                    config.host
                )))
            }
            Ok(Attempt::Finished {
                authenticated: false,
                ..
            }) => {
                warn!("Player at {} rejected the PIN", config.host);
                self.state = PairingState::Failed;
                Err(SdkError::PinRejected)
            }
            Ok(Attempt::Finished { mac, .. }) => {
                self.state = PairingState::Authenticated;
                let mut config = config;
                config.mac = mac.clone();
                info!("Paired with {}", config.host);
                Ok(PairingStep::Complete(PairedDevice {
                    config,
                    authenticated: true,
                    mac,
                }))
            }
            Err(e) => {
                error!("Pairing with {} failed: {}", config.host, e);
                self.state = PairingState::Failed;
                Err(e.into())
            }
        }
    }
}

fn attempt_pairing<C: DeviceClient>(
    client: &C,
    config: &DeviceConfig,
) -> bluray_api::Result<Attempt> {
    let authenticated = if config.needs_registration() {
        match client.register() {
            AuthenticationResult::Success => true,
            AuthenticationResult::PinNeeded => return Ok(Attempt::PinNeeded),
            AuthenticationResult::Error => return Ok(Attempt::RegistrationError),
        }
    } else {
        let pin = config.pin.as_deref().unwrap_or_default();
        client.send_authentication(pin)?
    };

    Ok(Attempt::Finished {
        authenticated,
        mac: client.mac(),
    })
}
