use std::sync::Arc;

use jotter_core::{JotterEngine, Store};
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
pub enum StateError {
    /// A view asked for state before an engine was installed. That is a
    /// wiring mistake in the embedding layer; it surfaces loudly instead
    /// of letting views operate on missing state.
    #[error("application state accessed before initialization; install an engine first")]
    Uninitialized,
}

/// Shared handle the binding layer hands to every view.
///
/// Reads are concurrent, mutations exclusive, so every mutation is
/// applied against the latest committed state.
#[derive(Clone, Default)]
pub struct AppState {
    engine: Arc<RwLock<Option<JotterEngine>>>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the engine backing this state, replacing any previous one.
    pub async fn install(&self, engine: JotterEngine) {
        *self.engine.write().await = Some(engine);
    }

    /// Run a read against the current store snapshot.
    pub async fn read<R>(&self, f: impl FnOnce(&Store) -> R) -> Result<R, StateError> {
        let guard = self.engine.read().await;
        let engine = guard.as_ref().ok_or(StateError::Uninitialized)?;
        Ok(f(&engine.store))
    }

    /// Apply a mutation atomically under the write lock.
    pub async fn mutate<R>(&self, f: impl FnOnce(&mut JotterEngine) -> R) -> Result<R, StateError> {
        let mut guard = self.engine.write().await;
        let engine = guard.as_mut().ok_or(StateError::Uninitialized)?;
        Ok(f(engine))
    }
}
