use std::sync::Arc;

use crate::model::{FolderId, NoteDraft, NoteId, NotePatch, Theme, User};
use crate::persist::PersistedState;
use crate::storage::StorageBackend;
use crate::store::Store;

/// The JotterEngine is the high-level facade over the store and its
/// persistence.
///
/// # Architecture Decision: Action vs Query Separation
///
/// *   **Actions (Write/Mutation)**: Unified in `JotterEngine`.
///     Every mutation goes through an engine method, so each committed
///     change to the durable subset is written back to storage in the
///     same call.
///
/// *   **Queries (Read)**: Access `engine.store` directly.
///     Derived reads (`filtered_notes`, `folder_count`, field access)
///     need no persistence and are not wrapped here.
pub struct JotterEngine {
    pub store: Store,
    storage: Arc<dyn StorageBackend>,
    storage_key: String,
}

impl JotterEngine {
    pub fn new(initial: Store, storage: Arc<dyn StorageBackend>, key: impl Into<String>) -> Self {
        Self {
            store: initial,
            storage,
            storage_key: key.into(),
        }
    }

    /// Rehydrate from storage. A missing, corrupt or version-mismatched
    /// record falls back to `initial` without surfacing an error.
    pub fn load(initial: Store, storage: Arc<dyn StorageBackend>, key: impl Into<String>) -> Self {
        let storage_key = key.into();
        let store = match PersistedState::load(&storage_key, &*storage) {
            Ok(state) => state.restore(initial),
            Err(err) => {
                log::warn!("no usable persisted state ({err}); starting fresh");
                initial
            }
        };
        Self {
            store,
            storage,
            storage_key,
        }
    }

    fn persist(&self) {
        let state = PersistedState::capture(&self.store);
        if let Err(err) = state.save(&self.storage_key, &*self.storage) {
            log::warn!("failed to persist state: {err}");
        }
    }

    // ------------------------------------------------------------------------
    // Durable subset (persisted after every committed change)
    // ------------------------------------------------------------------------

    pub fn set_user(&mut self, user: Option<User>) {
        self.store.set_user(user);
        self.persist();
    }

    pub fn login(&mut self, user: User) {
        self.store.login(user);
        self.persist();
    }

    pub fn logout(&mut self) {
        self.store.logout();
        self.persist();
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.store.set_theme(theme);
        self.persist();
    }

    /// Toggle as a pure function of the latest committed theme, applied
    /// atomically under this `&mut` borrow.
    pub fn toggle_theme(&mut self) {
        let next = self.store.theme.flipped();
        self.store.set_theme(next);
        self.persist();
    }

    pub fn toggle_sidebar(&mut self) {
        self.store.toggle_sidebar();
        self.persist();
    }

    pub fn add_note(&mut self, draft: NoteDraft) {
        self.store.add_note(draft);
        self.persist();
    }

    pub fn update_note(&mut self, id: &str, patch: NotePatch) -> bool {
        let changed = self.store.update_note(id, patch);
        if changed {
            self.persist();
        }
        changed
    }

    pub fn delete_note(&mut self, id: &str) -> bool {
        let removed = self.store.delete_note(id);
        if removed {
            self.persist();
        }
        removed
    }

    // ------------------------------------------------------------------------
    // Ephemeral state (never persisted)
    // ------------------------------------------------------------------------

    pub fn set_selected_note(&mut self, id: Option<NoteId>) {
        self.store.set_selected_note(id);
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.store.set_search_query(query);
    }

    pub fn set_selected_folder(&mut self, folder_id: impl Into<FolderId>) {
        self.store.set_selected_folder(folder_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::STORAGE_KEY;
    use crate::storage::{FileStorage, MemoryStorage, StorageBackend};
    use tempfile::TempDir;

    fn draft(title: &str, folder_id: &str) -> NoteDraft {
        NoteDraft {
            title: title.to_string(),
            content: String::new(),
            created_at: "2024-01-15".to_string(),
            updated_at: "2024-01-15".to_string(),
            folder_id: folder_id.to_string(),
        }
    }

    #[test]
    fn every_durable_mutation_survives_a_reload() {
        let temp_dir = TempDir::new().unwrap();
        let storage = Arc::new(FileStorage::new(temp_dir.path().to_path_buf()));

        let mut engine = JotterEngine::new(Store::new(), storage.clone(), STORAGE_KEY);
        engine.login(User { name: "Ada".to_string() });
        engine.toggle_theme();
        engine.toggle_sidebar();
        engine.add_note(draft("Sprint planning", "work"));

        let reloaded = JotterEngine::load(Store::new(), storage, STORAGE_KEY);
        assert_eq!(reloaded.store.user, Some(User { name: "Ada".to_string() }));
        assert_eq!(reloaded.store.theme, Theme::Dark);
        assert!(reloaded.store.sidebar_collapsed);
        assert_eq!(reloaded.store.notes.len(), 1);
        assert_eq!(reloaded.store.notes[0].title, "Sprint planning");
    }

    #[test]
    fn ephemeral_state_does_not_survive_a_reload() {
        let storage = Arc::new(MemoryStorage::new());

        let mut engine = JotterEngine::new(Store::new(), storage.clone(), STORAGE_KEY);
        engine.add_note(draft("Sprint planning", "work"));
        let id = engine.store.notes[0].id.clone();
        engine.set_selected_note(Some(id));
        engine.set_search_query("sprint");
        engine.set_selected_folder("work");

        let reloaded = JotterEngine::load(Store::new(), storage, STORAGE_KEY);
        assert_eq!(reloaded.store.selected_note_id, None);
        assert_eq!(reloaded.store.search_query, "");
        assert_eq!(reloaded.store.selected_folder, "all");
        assert_eq!(reloaded.store.notes.len(), 1);
    }

    #[test]
    fn corrupt_record_falls_back_to_initial_state() {
        let storage = Arc::new(MemoryStorage::new());
        storage.write(STORAGE_KEY, "{ not json").unwrap();

        let engine = JotterEngine::load(Store::new(), storage, STORAGE_KEY);
        assert_eq!(engine.store, Store::new());
    }

    #[test]
    fn absent_record_falls_back_to_injected_initial_state() {
        let storage = Arc::new(MemoryStorage::new());

        let mut initial = Store::new();
        initial.set_selected_folder("work");
        let engine = JotterEngine::load(initial, storage, STORAGE_KEY);
        assert_eq!(engine.store.selected_folder, "work");
    }

    #[test]
    fn noop_mutations_do_not_rewrite_storage() {
        let storage = Arc::new(MemoryStorage::new());
        let mut engine = JotterEngine::new(Store::new(), storage.clone(), STORAGE_KEY);

        assert!(!engine.update_note("no-such-id", NotePatch::default()));
        assert!(!engine.delete_note("no-such-id"));
        assert!(storage.read(STORAGE_KEY).is_err(), "nothing was committed");
    }
}
