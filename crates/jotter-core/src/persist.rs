use serde::{Deserialize, Serialize};

use crate::model::{Note, Theme, User};
use crate::storage::StorageBackend;
use crate::store::Store;

/// Fixed key the application record is stored under.
pub const STORAGE_KEY: &str = "jotter-storage";

/// The durable subset of the store. Filter and selection state are
/// ephemeral and intentionally absent.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    pub version: u32,
    pub user: Option<User>,
    pub theme: Theme,
    pub sidebar_collapsed: bool,
    pub notes: Vec<Note>,
}

impl PersistedState {
    pub const CURRENT_VERSION: u32 = 1;

    pub fn capture(store: &Store) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            user: store.user.clone(),
            theme: store.theme,
            sidebar_collapsed: store.sidebar_collapsed,
            notes: store.notes.clone(),
        }
    }

    /// Merge the persisted subset over `initial`, leaving the ephemeral
    /// fields untouched.
    pub fn restore(self, initial: Store) -> Store {
        Store {
            user: self.user,
            theme: self.theme,
            sidebar_collapsed: self.sidebar_collapsed,
            notes: self.notes,
            ..initial
        }
    }

    pub fn load(
        key: &str,
        storage: &dyn StorageBackend,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let buffer = storage.read(key)?;
        let state: PersistedState = serde_json::from_str(&buffer)?;

        if state.version != Self::CURRENT_VERSION {
            return Err("Incompatible storage version".into());
        }

        Ok(state)
    }

    pub fn save(
        &self,
        key: &str,
        storage: &dyn StorageBackend,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let buffer = serde_json::to_string(self)?;
        storage.write(key, &buffer)?;
        Ok(())
    }
}
