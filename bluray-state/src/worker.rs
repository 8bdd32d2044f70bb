//! Blocking worker helpers and the swappable client slot

use std::sync::Arc;

use parking_lot::RwLock;

use crate::{Result, StateError};

/// Run blocking device or store I/O off the async scheduler
pub(crate) async fn run_blocking<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| StateError::Worker(e.to_string()))
}

/// The active device client
///
/// Bootstrap swaps in a client restored from the stored identity; everyone
/// else takes a cheap `Arc` clone of whatever is current.
pub struct ClientSlot<C> {
    current: RwLock<Arc<C>>,
}

impl<C> ClientSlot<C> {
    pub fn new(client: C) -> Self {
        Self {
            current: RwLock::new(Arc::new(client)),
        }
    }

    pub fn current(&self) -> Arc<C> {
        Arc::clone(&self.current.read())
    }

    pub(crate) fn replace(&self, client: C) {
        *self.current.write() = Arc::new(client);
    }
}
