//! Application state module.

use std::sync::Arc;

use crate::storage::EntryStore;

/// Shared state of the health server.
#[derive(Clone)]
pub struct AppState {
    /// Entry storage, probed by the readiness check
    pub store: Arc<dyn EntryStore>,
}

impl AppState {
    /// Creates a new `AppState` instance.
    #[must_use]
    pub fn new(store: Arc<dyn EntryStore>) -> Self {
        Self { store }
    }
}
