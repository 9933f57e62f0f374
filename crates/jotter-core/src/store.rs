use crate::model::{FolderId, Note, NoteDraft, NoteId, NotePatch, Theme, User, FOLDER_ALL};
use crate::utils::id::generate_note_id;

/// In memory. Single mutable source of truth for application-level
/// state: session, theme, the notes collection and the UI filters.
///
/// Every mutation takes `&mut self`, so each operation is atomic with
/// respect to the in-memory state and immediately visible to subsequent
/// reads. No operation panics under normal use; update/delete on an
/// absent id are silent no-ops.
#[derive(Debug, Clone, PartialEq)]
pub struct Store {
    pub user: Option<User>,
    pub theme: Theme,
    pub sidebar_collapsed: bool,
    /// Insertion order is the default list order.
    pub notes: Vec<Note>,
    pub selected_note_id: Option<NoteId>,
    pub search_query: String,
    pub selected_folder: FolderId,
}

impl Default for Store {
    fn default() -> Self {
        Self {
            user: None,
            theme: Theme::Light,
            sidebar_collapsed: false,
            notes: Vec::new(),
            selected_note_id: None,
            search_query: String::new(),
            selected_folder: FOLDER_ALL.to_string(),
        }
    }
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_user(&mut self, user: Option<User>) {
        self.user = user;
    }

    // Currently equivalent to set_user(Some(..)); kept as a separate
    // intent on the public surface.
    pub fn login(&mut self, user: User) {
        self.user = Some(user);
    }

    pub fn logout(&mut self) {
        self.user = None;
    }

    /// Replace the theme unconditionally. Toggling is the caller's
    /// business, via `Theme::flipped` applied under the same borrow.
    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    /// Flip computed from the value under this borrow, so no caller can
    /// interleave and lose an update.
    pub fn toggle_sidebar(&mut self) {
        self.sidebar_collapsed = !self.sidebar_collapsed;
    }

    /// Append a new note with a freshly assigned id.
    pub fn add_note(&mut self, draft: NoteDraft) {
        let note = Note {
            id: generate_note_id(),
            title: draft.title,
            content: draft.content,
            created_at: draft.created_at,
            updated_at: draft.updated_at,
            folder_id: draft.folder_id,
        };
        self.notes.push(note);
    }

    /// Merge `patch` over the matching note in place. The sequence keeps
    /// its order and length. Returns whether a note was changed; an
    /// absent id is a silent no-op.
    pub fn update_note(&mut self, id: &str, patch: NotePatch) -> bool {
        let Some(note) = self.notes.iter_mut().find(|note| note.id == id) else {
            return false;
        };
        if let Some(title) = patch.title {
            note.title = title;
        }
        if let Some(content) = patch.content {
            note.content = content;
        }
        if let Some(updated_at) = patch.updated_at {
            note.updated_at = updated_at;
        }
        if let Some(folder_id) = patch.folder_id {
            note.folder_id = folder_id;
        }
        true
    }

    /// Remove the matching note, clearing the selection when it pointed
    /// at the removed note. Returns whether a note was removed.
    pub fn delete_note(&mut self, id: &str) -> bool {
        let before = self.notes.len();
        self.notes.retain(|note| note.id != id);
        let removed = self.notes.len() != before;
        if removed && self.selected_note_id.as_deref() == Some(id) {
            self.selected_note_id = None;
        }
        removed
    }

    pub fn set_selected_note(&mut self, id: Option<NoteId>) {
        self.selected_note_id = id;
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    pub fn set_selected_folder(&mut self, folder_id: impl Into<FolderId>) {
        self.selected_folder = folder_id.into();
    }

    pub fn note(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }

    /// Pure derived read over the latest committed state: restrict by
    /// folder equality (skipped for the `all` wildcard), then by
    /// case-insensitive substring match against title or content
    /// (skipped for an empty query). Relative order is preserved.
    /// Recomputed on every call; O(n) is fine at this scale.
    pub fn filtered_notes(&self) -> Vec<&Note> {
        let query = self.search_query.to_lowercase();
        self.notes
            .iter()
            .filter(|note| {
                self.selected_folder == FOLDER_ALL || note.folder_id == self.selected_folder
            })
            .filter(|note| {
                query.is_empty()
                    || note.title.to_lowercase().contains(&query)
                    || note.content.to_lowercase().contains(&query)
            })
            .collect()
    }

    /// Number of notes a folder would show, the wildcard counting all.
    pub fn folder_count(&self, folder_id: &str) -> usize {
        if folder_id == FOLDER_ALL {
            return self.notes.len();
        }
        self.notes
            .iter()
            .filter(|note| note.folder_id == folder_id)
            .count()
    }
}
