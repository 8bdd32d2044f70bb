//! Blu-ray player state synchronization
//!
//! Keeps a local cache of a player's playback state consistent with the
//! device, which is slow, half-duplex and frequently switched off.
//!
//! # Architecture
//!
//! ```text
//!  PollingScheduler ─┐
//!  request_refresh ──┼─▶ Coordinator::refresh ─▶ Bootstrap ─▶ PlaybackStore ─▶ watch<Snapshot>
//!  execute (polls) ──┘        (one lock)          (once)      (sole writer)
//! ```
//!
//! - [`Bootstrap`] restores the player identity from an
//!   [`identity_store::IdentityStore`], or discovers and persists it.
//! - [`PlaybackStore`] maps raw status tokens onto [`PlaybackState`] and
//!   reports the player as off whenever it cannot be queried.
//! - [`Coordinator::execute`] sends one command at a time and waits for the
//!   player to reach the expected state.
//! - [`PollingScheduler`] refreshes on a fixed interval.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use bluray_state::{Coordinator, CoordinatorConfig};
//! use identity_store::JsonFileStore;
//!
//! let store = Arc::new(JsonFileStore::in_data_dir("bluray.json")?);
//! let coordinator = Coordinator::new(client, store, CoordinatorConfig::default())?;
//! coordinator.refresh().await?;
//! let polling = coordinator.start_polling();
//!
//! let mut snapshots = coordinator.subscribe();
//! while snapshots.changed().await.is_ok() {
//!     println!("Player is {}", snapshots.borrow().state);
//! }
//! ```

pub mod bootstrap;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod executor;
pub mod logging;
pub mod model;
pub mod playback;
pub mod scheduler;
mod worker;

pub use bootstrap::{Bootstrap, BootstrapOutcome};
pub use config::CoordinatorConfig;
pub use coordinator::Coordinator;
pub use error::{Result, StateError};
pub use executor::{toggle_power_target, BusyFlag, BusyGuard, ConvergenceOutcome, StateTarget};
pub use logging::{init_logging, init_logging_from_env, LoggingError, LoggingMode};
pub use model::{PlaybackState, PositionInfo, Snapshot};
pub use playback::PlaybackStore;
pub use scheduler::{PollingScheduler, PollingStats, RefreshSource};
pub use worker::ClientSlot;
