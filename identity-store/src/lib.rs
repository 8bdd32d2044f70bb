//! Identity persistence for paired players
//!
//! Pairing a player is slow and may need an operator to type a PIN, so the
//! identity obtained the first time is kept and restored on every later
//! start. This crate persists exactly one opaque JSON blob per store, wrapped
//! in a versioned envelope:
//!
//! ```text
//! { "version": 1, "minor_version": 1, "key": "bluray.json", "data": { ... } }
//! ```
//!
//! Backends implement [`IdentityStore`]; [`JsonFileStore`] writes to disk and
//! [`MemoryStore`] keeps the blob in process.

pub mod error;
pub mod file;
pub mod memory;
pub mod store;

pub use error::{Result, StoreError};
pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use store::{
    IdentityStore, StoredBlob, DEFAULT_KEY, STORAGE_MINOR_VERSION, STORAGE_VERSION,
};
