use std::sync::{Arc, Mutex, MutexGuard};

use edge_inference::Entrypoint;

pub struct ServeState {
    pub entrypoint: Box<dyn Entrypoint>,
    /// Payloads that produced a result.
    pub processed: u64,
    /// Payloads that were answered with an error.
    pub failed: u64,
}

impl ServeState {
    pub fn new(entrypoint: Box<dyn Entrypoint>) -> Self {
        ServeState { entrypoint, processed: 0, failed: 0 }
    }
}

/// Shared state type passed to every handler.
pub type SharedState = Arc<Mutex<ServeState>>;

/// Locks the state. A panic in another request thread leaves the entrypoint
/// untouched, so a poisoned lock is still usable.
pub fn lock(state: &SharedState) -> MutexGuard<'_, ServeState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
