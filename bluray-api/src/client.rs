//! The capability interface a player client must provide

use serde::{Deserialize, Serialize};

use crate::identity::DeviceIdentity;
use crate::Result;

/// Result of the zero-config registration attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthenticationResult {
    /// Registered without a PIN
    Success,
    /// The player displayed a PIN that must be entered by the operator
    PinNeeded,
    /// Registration failed for an unrecognized reason
    Error,
}

/// Position reading as reported by the player
///
/// Both fields are `HH:MM:SS` strings, see [`crate::parse_time_to_secs`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPositionInfo {
    pub duration: String,
    pub position: String,
}

impl RawPositionInfo {
    pub fn new(duration: impl Into<String>, position: impl Into<String>) -> Self {
        Self {
            duration: duration.into(),
            position: position.into(),
        }
    }
}

/// A blocking client for one physical player
///
/// Every method may block on network I/O; async callers are expected to run
/// them on a blocking worker. Implementations carry their own interior
/// mutability, so all calls take `&self` and a client can be shared behind an
/// `Arc`.
pub trait DeviceClient: Send + Sync + Sized + 'static {
    /// Try to register this controller without a PIN
    fn register(&self) -> AuthenticationResult;

    /// Complete registration with the PIN shown on the player's screen
    fn send_authentication(&self, pin: &str) -> Result<bool>;

    /// Send a named IRCC command (e.g. `"Home"`, `"Eject"`)
    fn send_command(&self, name: &str) -> Result<()>;

    /// Power the player on (wake-on-LAN) or off
    fn power(&self, on: bool) -> Result<()>;

    fn play(&self) -> Result<()>;

    fn pause(&self) -> Result<()>;

    fn stop(&self) -> Result<()>;

    fn next(&self) -> Result<()>;

    fn prev(&self) -> Result<()>;

    /// Raw transport status token (`"PLAYING"`, `"PAUSED_PLAYBACK"`, ...)
    fn playing_status(&self) -> Result<String>;

    /// Current position, or `None` when the player reports nothing
    fn position_info(&self) -> Result<Option<RawPositionInfo>>;

    /// Cheap request used to check that the player is reachable
    fn probe(&self) -> Result<()>;

    /// One-time capability and identity discovery
    ///
    /// Fills in the MAC address, nickname, client id and command list.
    fn init_device(&self) -> Result<()>;

    /// Snapshot of the identity this client currently holds
    fn identity(&self) -> DeviceIdentity;

    /// Serialize the identity for persistence
    fn save_to_identity_blob(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self.identity())?)
    }

    /// Build a client from a persisted blob
    ///
    /// `self` acts as a template for transport settings (timeouts, HTTP
    /// agent); identity fields come from the blob.
    fn load_from_identity_blob(&self, blob: &serde_json::Value) -> Result<Self>;

    fn commands(&self) -> Vec<String> {
        self.identity().commands.into_iter().collect()
    }

    fn mac(&self) -> Option<String> {
        self.identity().mac
    }

    fn nickname(&self) -> String {
        self.identity().nickname
    }

    fn client_id(&self) -> String {
        self.identity().client_id
    }

    fn host(&self) -> String {
        self.identity().host
    }
}
