//! Store trait and the versioned envelope every backend persists

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, StoreError};

/// Schema version written into every envelope
pub const STORAGE_VERSION: u32 = 1;

/// Minor schema version; bumps are backwards compatible
pub const STORAGE_MINOR_VERSION: u32 = 1;

/// Default resource name of the stored identity
pub const DEFAULT_KEY: &str = "bluray.json";

/// On-disk wrapper around the opaque identity blob
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredBlob {
    pub version: u32,
    #[serde(default)]
    pub minor_version: u32,
    pub key: String,
    pub data: Value,
}

impl StoredBlob {
    /// Wrap `data` with the current schema version
    pub fn new(key: impl Into<String>, data: Value) -> Self {
        Self {
            version: STORAGE_VERSION,
            minor_version: STORAGE_MINOR_VERSION,
            key: key.into(),
            data,
        }
    }

    /// Reject envelopes written by a newer major version
    pub fn check_version(&self) -> Result<()> {
        if self.version > STORAGE_VERSION {
            return Err(StoreError::UnsupportedVersion {
                found: self.version,
                supported: STORAGE_VERSION,
            });
        }
        Ok(())
    }

    pub fn into_data(self) -> Value {
        self.data
    }
}

/// Persistence for exactly one named blob
///
/// All methods are blocking. `remove` must succeed when nothing is stored.
pub trait IdentityStore: Send + Sync + 'static {
    /// Resource name of the blob
    fn key(&self) -> &str;

    /// Load the stored blob, `None` if nothing has been saved
    fn load(&self) -> Result<Option<Value>>;

    /// Replace the stored blob
    fn save(&self, data: &Value) -> Result<()>;

    /// Delete the stored blob
    fn remove(&self) -> Result<()>;
}

impl<S: IdentityStore + ?Sized> IdentityStore for Arc<S> {
    fn key(&self) -> &str {
        (**self).key()
    }

    fn load(&self) -> Result<Option<Value>> {
        (**self).load()
    }

    fn save(&self, data: &Value) -> Result<()> {
        (**self).save(data)
    }

    fn remove(&self) -> Result<()> {
        (**self).remove()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_shape() {
        let blob = StoredBlob::new(DEFAULT_KEY, json!({"host": "10.0.0.2"}));
        let value = serde_json::to_value(&blob).unwrap();
        assert_eq!(value["version"], 1);
        assert_eq!(value["minor_version"], 1);
        assert_eq!(value["key"], "bluray.json");
        assert_eq!(value["data"]["host"], "10.0.0.2");
    }

    #[test]
    fn test_newer_version_rejected() {
        let mut blob = StoredBlob::new(DEFAULT_KEY, json!({}));
        assert!(blob.check_version().is_ok());

        blob.version = 2;
        assert!(matches!(
            blob.check_version(),
            Err(StoreError::UnsupportedVersion { found: 2, supported: 1 })
        ));
    }

    #[test]
    fn test_missing_minor_version_defaults() {
        let blob: StoredBlob =
            serde_json::from_str(r#"{"version":1,"key":"bluray.json","data":null}"#).unwrap();
        assert_eq!(blob.minor_version, 0);
    }
}
