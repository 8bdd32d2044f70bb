//! JSON file backend

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info};

use crate::error::{Result, StoreError};
use crate::store::{IdentityStore, StoredBlob};

/// Directory under the platform data dir that holds stored blobs
const STORAGE_DIR: &str = "bluray-sdk";

/// Stores the blob as a pretty-printed JSON envelope on disk
///
/// Writes go to a sibling temporary file that is then renamed over the
/// target, so a crash mid-write leaves the previous blob intact.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    key: String,
    path: PathBuf,
}

impl JsonFileStore {
    /// Store at an explicit path; the key is the file name
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let key = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { key, path }
    }

    /// Store named `key` under the platform data directory
    ///
    /// On Linux this resolves to `~/.local/share/bluray-sdk/<key>`.
    pub fn in_data_dir(key: &str) -> Result<Self> {
        let dir = dirs::data_dir().ok_or(StoreError::NoDataDir)?;
        Ok(Self {
            key: key.to_string(),
            path: dir.join(STORAGE_DIR).join(key),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl IdentityStore for JsonFileStore {
    fn key(&self) -> &str {
        &self.key
    }

    fn load(&self) -> Result<Option<Value>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No stored blob at {:?}", self.path);
                return Ok(None);
            }
            Err(e) => return Err(self.io_error(e)),
        };

        let blob: StoredBlob =
            serde_json::from_str(&content).map_err(|e| StoreError::Decode(e.to_string()))?;
        blob.check_version()?;

        debug!(
            "Loaded stored blob {} (version {}.{})",
            blob.key, blob.version, blob.minor_version
        );
        Ok(Some(blob.into_data()))
    }

    fn save(&self, data: &Value) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let blob = StoredBlob::new(self.key.clone(), data.clone());
        let json =
            serde_json::to_string_pretty(&blob).map_err(|e| StoreError::Encode(e.to_string()))?;

        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, json).map_err(|e| self.io_error(e))?;
        fs::rename(&tmp_path, &self.path).map_err(|e| self.io_error(e))?;

        info!("Saved stored blob to {:?}", self.path);
        Ok(())
    }

    fn remove(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!("Removed stored blob {:?}", self.path);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Stored blob {:?} already absent", self.path);
                Ok(())
            }
            Err(e) => Err(self.io_error(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_from_file_name() {
        let store = JsonFileStore::new("/var/lib/bluray/bluray.json");
        assert_eq!(store.key(), "bluray.json");
    }
}
