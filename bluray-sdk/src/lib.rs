//! Sony Blu-ray player SDK
//!
//! Pairs with a networked player, keeps its playback state in sync and
//! exposes media player, remote and button controls on top.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use bluray_sdk::{EntryConfig, PairingFlow, PairingInput, PairingStep, Player};
//! use bluray_state::CoordinatorConfig;
//! use identity_store::JsonFileStore;
//!
//! // Pair once
//! let mut flow = PairingFlow::new(|config| MyClient::new(config.identity()));
//! let paired = match flow.submit(PairingInput::host("192.168.1.40")).await? {
//!     PairingStep::Complete(paired) => paired,
//!     PairingStep::NeedPin => match flow.submit(PairingInput::pin(read_pin())).await? {
//!         PairingStep::Complete(paired) => paired,
//!         PairingStep::NeedPin => unreachable!(),
//!     },
//! };
//!
//! // Then on every start
//! let store = Arc::new(JsonFileStore::in_data_dir("bluray.json")?);
//! let player = Player::setup(
//!     &EntryConfig::new(paired.config),
//!     |config| MyClient::new(config.identity()),
//!     store,
//!     CoordinatorConfig::default(),
//! )
//! .await?;
//!
//! player.media_player().play().await?;
//! ```

pub mod config;
pub mod controls;
pub mod error;
pub mod pairing;
pub mod player;

pub use config::{DeviceConfig, DeviceOptions, EntryConfig};
pub use controls::{command_target, Button, MediaPlayer, Remote};
pub use error::{Result, SdkError};
pub use pairing::{PairedDevice, PairingFlow, PairingInput, PairingState, PairingStep};
pub use player::{remove, Player};

pub use bluray_api::{AuthenticationResult, DeviceClient, DeviceIdentity};
pub use bluray_state::{
    ConvergenceOutcome, CoordinatorConfig, PlaybackState, PositionInfo, Snapshot, StateTarget,
};
