//! Playback state store and the refresh routine that feeds it
//!
//! [`PlaybackStore`] is the only writer of the cached playback state and
//! position. The coordinator keeps it behind an async mutex, so scheduled
//! ticks, explicit refresh requests and command convergence polls never run
//! the routine concurrently.

use std::sync::Arc;

use bluray_api::{ApiError, DeviceClient, RawPositionInfo};
use chrono::{DateTime, Utc};
use tracing::{debug, error, warn};

use crate::model::{PlaybackState, PositionInfo, Snapshot};
use crate::worker::run_blocking;
use crate::Result;

/// Last known playback state and position
#[derive(Debug, Clone, Default)]
pub struct PlaybackStore {
    state: PlaybackState,
    position_info: Option<PositionInfo>,
}

impl PlaybackStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Last position reading, kept even while the player is off
    pub fn position_info(&self) -> Option<&PositionInfo> {
        self.position_info.as_ref()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.state,
            position_info: if self.state.is_off() {
                None
            } else {
                self.position_info.clone()
            },
        }
    }

    pub(crate) fn apply_status(&mut self, status: &str) -> PlaybackState {
        self.state = PlaybackState::from_status(status);
        self.state
    }

    /// Replace the position, or keep the previous one when there is no data
    pub(crate) fn apply_position(&mut self, raw: Option<RawPositionInfo>, now: DateTime<Utc>) {
        let Some(raw) = raw else {
            debug!("No position data, keeping previous reading");
            return;
        };

        match PositionInfo::from_raw(&raw, now) {
            Some(info) => self.position_info = Some(info),
            None => warn!(
                "Unparsable position reading (duration {:?}, position {:?}), keeping previous",
                raw.duration, raw.position
            ),
        }
    }

    /// Report the player as off when its status cannot be determined
    pub(crate) fn collapse(&mut self, err: &ApiError) {
        error!("Player status unavailable, reporting off: {}", err);
        self.state = PlaybackState::Off;
    }

    /// Query status (and position, unless off) and update the cache
    ///
    /// Device errors collapse the state to off and are not returned; only
    /// a failed blocking worker is.
    pub async fn refresh<C: DeviceClient>(&mut self, client: Arc<C>) -> Result<()> {
        let status_client = Arc::clone(&client);
        let status = match run_blocking(move || status_client.playing_status()).await? {
            Ok(status) => status,
            Err(e) => {
                self.collapse(&e);
                return Ok(());
            }
        };

        let state = self.apply_status(&status);
        debug!("Player status {:?} mapped to {}", status, state);
        if state.is_off() {
            return Ok(());
        }

        match run_blocking(move || client.position_info()).await? {
            Ok(raw) => self.apply_position(raw, Utc::now()),
            Err(e) => self.collapse(&e),
        }

        Ok(())
    }
}
