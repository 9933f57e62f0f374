use std::sync::Arc;

use crate::api::{DeleteAck, NewNote, NoteService, NoteUpdate, Profile, RemoteNote, UpdatedNote};
use crate::queries::{keys, QueryClient, QueryError};

/// Typed read/write surface over the cache layer.
///
/// Reads go through the cache; a successful mutation applies its
/// invalidation rules before returning, so a read issued after the
/// mutation resolves never sees pre-mutation data.
#[derive(Clone)]
pub struct NotesClient {
    queries: QueryClient,
    service: Arc<dyn NoteService>,
}

impl NotesClient {
    pub fn new(queries: QueryClient, service: Arc<dyn NoteService>) -> Self {
        Self { queries, service }
    }

    pub fn queries(&self) -> &QueryClient {
        &self.queries
    }

    pub async fn notes(&self) -> Result<Vec<RemoteNote>, QueryError> {
        let service = self.service.clone();
        self.queries
            .fetch(keys::notes_list(), move || {
                let service = service.clone();
                async move { service.get_notes().await }
            })
            .await
    }

    pub async fn note(&self, id: &str) -> Result<RemoteNote, QueryError> {
        let service = self.service.clone();
        let note_id = id.to_string();
        self.queries
            .fetch(keys::note_detail(id), move || {
                let service = service.clone();
                let note_id = note_id.clone();
                async move { service.get_note(&note_id).await }
            })
            .await
    }

    pub async fn user(&self, id: &str) -> Result<Profile, QueryError> {
        let service = self.service.clone();
        let user_id = id.to_string();
        self.queries
            .fetch(keys::user_detail(id), move || {
                let service = service.clone();
                let user_id = user_id.clone();
                async move { service.get_user(&user_id).await }
            })
            .await
    }

    /// Create a note remotely. Success invalidates the list scope.
    pub async fn create_note(&self, data: NewNote) -> Result<RemoteNote, QueryError> {
        let created = self.service.create_note(data).await?;
        self.queries.invalidate(&keys::notes_list());
        Ok(created)
    }

    /// Update a note remotely. Success invalidates the list scope and
    /// the note's detail key.
    pub async fn update_note(&self, id: &str, data: NoteUpdate) -> Result<UpdatedNote, QueryError> {
        let updated = self.service.update_note(id, data).await?;
        self.queries.invalidate(&keys::notes_list());
        self.queries.invalidate(&keys::note_detail(id));
        Ok(updated)
    }

    /// Delete a note remotely. Success invalidates the list scope and
    /// removes the detail entry entirely.
    pub async fn delete_note(&self, id: &str) -> Result<DeleteAck, QueryError> {
        let ack = self.service.delete_note(id).await?;
        self.queries.invalidate(&keys::notes_list());
        self.queries.remove(&keys::note_detail(id));
        Ok(ack)
    }
}
