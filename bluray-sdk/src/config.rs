//! Per-player configuration
//!
//! A configured player has the data captured when it was paired plus
//! operator options that may later move it to another host or ports.
//! [`EntryConfig::effective`] merges the two, preferring options.

use bluray_api::{
    is_placeholder_pin, DeviceIdentity, DEFAULT_APP_PORT, DEFAULT_DMR_PORT, DEFAULT_IRCC_PORT,
};
use serde::{Deserialize, Serialize};

use crate::{Result, SdkError};

fn default_app_port() -> u16 {
    DEFAULT_APP_PORT
}

fn default_dmr_port() -> u16 {
    DEFAULT_DMR_PORT
}

fn default_ircc_port() -> u16 {
    DEFAULT_IRCC_PORT
}

/// Connection settings and pairing result for one player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub host: String,

    /// PIN shown by the player during pairing; empty or `"0000"` means none
    #[serde(default)]
    pub pin: Option<String>,

    /// Default: 50202
    #[serde(default = "default_app_port")]
    pub app_port: u16,

    /// Default: 52323
    #[serde(default = "default_dmr_port")]
    pub dmr_port: u16,

    /// Default: 50001
    #[serde(default = "default_ircc_port")]
    pub ircc_port: u16,

    /// Needed to power the player on over the network
    #[serde(default, rename = "mac_address", alias = "mac")]
    pub mac: Option<String>,
}

impl DeviceConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            pin: None,
            app_port: DEFAULT_APP_PORT,
            dmr_port: DEFAULT_DMR_PORT,
            ircc_port: DEFAULT_IRCC_PORT,
            mac: None,
        }
    }

    pub fn with_pin(mut self, pin: impl Into<String>) -> Self {
        self.pin = Some(pin.into());
        self
    }

    pub fn with_ports(mut self, app_port: u16, dmr_port: u16, ircc_port: u16) -> Self {
        self.app_port = app_port;
        self.dmr_port = dmr_port;
        self.ircc_port = ircc_port;
        self
    }

    pub fn with_mac(mut self, mac: impl Into<String>) -> Self {
        self.mac = Some(mac.into());
        self
    }

    /// Whether the controller has to register before talking to the player
    pub fn needs_registration(&self) -> bool {
        is_placeholder_pin(self.pin.as_deref())
    }

    /// Identity a client for this player starts from, before discovery
    pub fn identity(&self) -> DeviceIdentity {
        let pin = self.pin.clone().filter(|pin| !is_placeholder_pin(Some(pin)));
        DeviceIdentity::new(self.host.clone())
            .with_ports(self.app_port, self.dmr_port, self.ircc_port)
            .with_pin(pin)
            .with_mac(self.mac.clone())
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(SdkError::InvalidConfig("Host must not be empty".to_string()));
        }

        for (name, port) in [
            ("app", self.app_port),
            ("DMR", self.dmr_port),
            ("IRCC", self.ircc_port),
        ] {
            if port == 0 {
                return Err(SdkError::InvalidConfig(format!(
                    "{} port must be greater than 0",
                    name
                )));
            }
        }

        Ok(())
    }
}

/// Operator overrides applied on top of the paired configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceOptions {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub app_port: Option<u16>,
    #[serde(default)]
    pub dmr_port: Option<u16>,
    #[serde(default)]
    pub ircc_port: Option<u16>,
}

impl DeviceOptions {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Stored configuration of one player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryConfig {
    pub data: DeviceConfig,
    #[serde(default)]
    pub options: DeviceOptions,
}

impl EntryConfig {
    pub fn new(data: DeviceConfig) -> Self {
        Self {
            data,
            options: DeviceOptions::default(),
        }
    }

    pub fn with_options(mut self, options: DeviceOptions) -> Self {
        self.options = options;
        self
    }

    /// Paired data with every option that is set taking precedence
    pub fn effective(&self) -> DeviceConfig {
        let options = &self.options;
        DeviceConfig {
            host: options.host.clone().unwrap_or_else(|| self.data.host.clone()),
            app_port: options.app_port.unwrap_or(self.data.app_port),
            dmr_port: options.dmr_port.unwrap_or(self.data.dmr_port),
            ircc_port: options.ircc_port.unwrap_or(self.data.ircc_port),
            ..self.data.clone()
        }
    }
}
