//! Device identity captured during pairing and bootstrap

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Default port of the player's application (pairing/registration) service
pub const DEFAULT_APP_PORT: u16 = 50202;

/// Default port of the player's DLNA media renderer service
pub const DEFAULT_DMR_PORT: u16 = 52323;

/// Default port of the player's IRCC remote-control service
pub const DEFAULT_IRCC_PORT: u16 = 50001;

/// Placeholder PIN used by the zero-config registration path
pub const PLACEHOLDER_PIN: &str = "0000";

/// Whether a PIN is missing or only the zero-config placeholder
pub fn is_placeholder_pin(pin: Option<&str>) -> bool {
    match pin {
        None => true,
        Some(pin) => pin.is_empty() || pin == PLACEHOLDER_PIN,
    }
}

/// Everything needed to talk to an already paired player
///
/// Created once by capability discovery, persisted, and restored on every
/// later start instead of pairing again. Only `pin` changes after that, when
/// the player is paired again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    pub host: String,
    pub app_port: u16,
    pub dmr_port: u16,
    pub ircc_port: u16,
    #[serde(default)]
    pub pin: Option<String>,
    #[serde(default)]
    pub mac: Option<String>,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub nickname: String,
    /// Names of the IRCC commands the player advertises
    #[serde(default)]
    pub commands: BTreeSet<String>,
}

impl DeviceIdentity {
    /// Identity for a host on the default ports, before discovery
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            app_port: DEFAULT_APP_PORT,
            dmr_port: DEFAULT_DMR_PORT,
            ircc_port: DEFAULT_IRCC_PORT,
            pin: None,
            mac: None,
            client_id: String::new(),
            nickname: String::new(),
            commands: BTreeSet::new(),
        }
    }

    pub fn with_ports(mut self, app_port: u16, dmr_port: u16, ircc_port: u16) -> Self {
        self.app_port = app_port;
        self.dmr_port = dmr_port;
        self.ircc_port = ircc_port;
        self
    }

    pub fn with_pin(mut self, pin: Option<String>) -> Self {
        self.pin = pin;
        self
    }

    pub fn with_mac(mut self, mac: Option<String>) -> Self {
        self.mac = mac;
        self
    }

    /// Whether the player advertises the given command
    pub fn supports(&self, command: &str) -> bool {
        self.commands.contains(command)
    }

    /// MAC address without separators, suitable for stable identifiers
    pub fn clean_mac(&self) -> Option<String> {
        self.mac
            .as_ref()
            .map(|mac| mac.chars().filter(|c| *c != '-' && *c != ':').collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let identity = DeviceIdentity::new("192.168.1.40");
        assert_eq!(identity.app_port, 50202);
        assert_eq!(identity.dmr_port, 52323);
        assert_eq!(identity.ircc_port, 50001);
        assert!(identity.commands.is_empty());
    }

    #[test]
    fn test_placeholder_pin() {
        assert!(is_placeholder_pin(None));
        assert!(is_placeholder_pin(Some("")));
        assert!(is_placeholder_pin(Some("0000")));
        assert!(!is_placeholder_pin(Some("1234")));
    }

    #[test]
    fn test_clean_mac() {
        let identity = DeviceIdentity::new("h").with_mac(Some("AA:BB-CC:DD:EE:FF".to_string()));
        assert_eq!(identity.clean_mac().as_deref(), Some("AABBCCDDEEFF"));
        assert_eq!(DeviceIdentity::new("h").clean_mac(), None);
    }

    #[test]
    fn test_deserialize_minimal_blob() {
        let identity: DeviceIdentity = serde_json::from_str(
            r#"{"host":"10.0.0.2","app_port":1,"dmr_port":2,"ircc_port":3}"#,
        )
        .unwrap();
        assert_eq!(identity.host, "10.0.0.2");
        assert_eq!(identity.pin, None);
        assert!(identity.commands.is_empty());
    }
}
