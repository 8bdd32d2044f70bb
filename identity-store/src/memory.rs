use std::sync::RwLock;

use serde_json::Value;

use crate::error::Result;
use crate::store::{IdentityStore, StoredBlob, DEFAULT_KEY};

/// Process-local store, mostly useful in tests and short-lived tools
#[derive(Debug)]
pub struct MemoryStore {
    key: String,
    blob: RwLock<Option<StoredBlob>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_key(DEFAULT_KEY)
    }

    pub fn with_key(key: &str) -> Self {
        Self {
            key: key.to_string(),
            blob: RwLock::new(None),
        }
    }

    /// Whether a blob is currently stored
    pub fn is_empty(&self) -> bool {
        self.blob
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .is_none()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityStore for MemoryStore {
    fn key(&self) -> &str {
        &self.key
    }

    fn load(&self) -> Result<Option<Value>> {
        let blob = self.blob.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        match blob.as_ref() {
            Some(stored) => {
                stored.check_version()?;
                Ok(Some(stored.data.clone()))
            }
            None => Ok(None),
        }
    }

    fn save(&self, data: &Value) -> Result<()> {
        let mut blob = self.blob.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *blob = Some(StoredBlob::new(self.key.clone(), data.clone()));
        Ok(())
    }

    fn remove(&self) -> Result<()> {
        let mut blob = self.blob.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *blob = None;
        Ok(())
    }
}
