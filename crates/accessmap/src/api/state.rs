//! Shared application state.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::storage::Storage;

/// State shared by every request handler.
#[derive(Debug)]
pub struct AppState {
    /// Loaded configuration.
    pub config: Config,
    storage: Mutex<Storage>,
}

impl AppState {
    /// Wrap a configuration and an open store.
    #[must_use]
    pub fn new(config: Config, storage: Storage) -> Arc<Self> {
        Arc::new(Self {
            config,
            storage: Mutex::new(storage),
        })
    }

    /// Lock the store for the duration of one query.
    ///
    /// # Errors
    ///
    /// Returns an internal error if a previous holder panicked.
    pub fn storage(&self) -> Result<MutexGuard<'_, Storage>> {
        self.storage
            .lock()
            .map_err(|_| Error::internal("storage lock poisoned"))
    }
}
