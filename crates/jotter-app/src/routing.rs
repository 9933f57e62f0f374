use std::sync::Arc;

use jotter_core::model::{NoteDraft, NoteId, NotePatch};
use jotter_core::Store;

use crate::client::NotesClient;
use crate::queries::QueryError;
use crate::state::{AppState, StateError};

/// Where the binding layer can point the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// The collection's empty/landing view.
    NotesRoot,
    /// Detail view of one note.
    NoteDetail(NoteId),
}

/// Router seam. The path-matching machinery behind it is not this
/// crate's business; the binding layer only issues commands.
pub trait Navigator: Send + Sync {
    fn navigate(&self, destination: Destination);
}

/// Parameters the router extracted from the current path.
#[derive(Debug, Clone, Default)]
pub struct RouteParams {
    pub note_id: Option<NoteId>,
}

/// Everything a view needs, passed explicitly as a parameter instead of
/// looked up from ambient context.
#[derive(Clone)]
pub struct ViewContext {
    pub state: AppState,
    pub client: NotesClient,
    pub params: RouteParams,
}

/// Data states a view renders from. Failure is distinct from both
/// loading and empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState<T> {
    Loading,
    Ready(T),
    Empty,
    Failed(String),
}

impl<T> ViewState<Vec<T>> {
    /// Collapse a query result into what the view shows.
    pub fn from_list(result: Result<Vec<T>, QueryError>) -> Self {
        match result {
            Ok(items) if items.is_empty() => ViewState::Empty,
            Ok(items) => ViewState::Ready(items),
            Err(err) => ViewState::Failed(err.to_string()),
        }
    }
}

/// Binding for the notes screen: store intents plus the one
/// synchronization rule between folder selection and the router.
pub struct NotesRoute {
    state: AppState,
    navigator: Arc<dyn Navigator>,
}

impl NotesRoute {
    pub fn new(state: AppState, navigator: Arc<dyn Navigator>) -> Self {
        Self { state, navigator }
    }

    /// Change the active folder.
    ///
    /// When the selection actually changes, the router is pointed at the
    /// first note of the newly filtered collection, or at the collection
    /// root when it is empty. Re-selecting the current folder is a
    /// no-op, and nothing else re-triggers this rule; additions and
    /// edits never navigate.
    pub async fn select_folder(&self, folder_id: &str) -> Result<(), StateError> {
        let target = self
            .state
            .mutate(|engine| {
                if engine.store.selected_folder == folder_id {
                    return None;
                }
                engine.set_selected_folder(folder_id.to_string());
                let destination = resolve_target(&engine.store);
                engine.set_selected_note(opened_note(&destination));
                Some(destination)
            })
            .await?;

        if let Some(destination) = target {
            self.navigator.navigate(destination);
        }
        Ok(())
    }

    /// Open a note from the list.
    pub async fn open_note(&self, id: &str) -> Result<(), StateError> {
        self.state
            .mutate(|engine| engine.set_selected_note(Some(id.to_string())))
            .await?;
        self.navigator.navigate(Destination::NoteDetail(id.to_string()));
        Ok(())
    }

    /// Create a note. Never navigates: the synchronization rule is keyed
    /// on folder selection, not on the filtered list's contents.
    pub async fn add_note(&self, draft: NoteDraft) -> Result<(), StateError> {
        self.state.mutate(|engine| engine.add_note(draft)).await
    }

    pub async fn update_note(&self, id: &str, patch: NotePatch) -> Result<bool, StateError> {
        self.state.mutate(|engine| engine.update_note(id, patch)).await
    }

    /// Delete a note. Removing the note currently open re-resolves the
    /// destination exactly like a folder change; removing any other note
    /// leaves the router alone.
    pub async fn delete_note(&self, id: &str) -> Result<(), StateError> {
        let target = self
            .state
            .mutate(|engine| {
                let was_open = engine.store.selected_note_id.as_deref() == Some(id);
                let removed = engine.delete_note(id);
                if !(removed && was_open) {
                    return None;
                }
                let destination = resolve_target(&engine.store);
                engine.set_selected_note(opened_note(&destination));
                Some(destination)
            })
            .await?;

        if let Some(destination) = target {
            self.navigator.navigate(destination);
        }
        Ok(())
    }

    pub async fn set_search(&self, query: &str) -> Result<(), StateError> {
        self.state
            .mutate(|engine| engine.set_search_query(query.to_string()))
            .await
    }
}

fn resolve_target(store: &Store) -> Destination {
    match store.filtered_notes().first() {
        Some(note) => Destination::NoteDetail(note.id.clone()),
        None => Destination::NotesRoot,
    }
}

fn opened_note(destination: &Destination) -> Option<NoteId> {
    match destination {
        Destination::NoteDetail(id) => Some(id.clone()),
        Destination::NotesRoot => None,
    }
}
