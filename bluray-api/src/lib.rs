//! Device client interface for networked Sony Blu-ray players
//!
//! This crate defines what the state synchronization layer needs from a
//! player client, without committing to a wire protocol:
//!
//! - [`DeviceClient`]: blocking capability trait (pairing, transport
//!   commands, status and position queries, identity persistence)
//! - [`DeviceIdentity`]: the persisted result of pairing and discovery
//! - [`ApiError`]: error type that separates "not reachable" from
//!   "reachable but failed"
//!
//! With the `test-support` feature, [`mock::MockDeviceClient`] provides a
//! scriptable in-memory implementation.

pub mod client;
pub mod error;
pub mod identity;
mod time;

#[cfg(any(test, feature = "test-support"))]
pub mod mock;

pub use client::{AuthenticationResult, DeviceClient, RawPositionInfo};
pub use error::{ApiError, Result};
pub use identity::{
    is_placeholder_pin, DeviceIdentity, DEFAULT_APP_PORT, DEFAULT_DMR_PORT, DEFAULT_IRCC_PORT,
    PLACEHOLDER_PIN,
};
pub use time::parse_time_to_secs;
