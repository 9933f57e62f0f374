use serde::{Deserialize, Serialize};

/// Identifier of a note. Assigned by the store at creation time and
/// never reused within a session.
pub type NoteId = String;

/// Identifier of a folder. Folders are fixed configuration, not stored
/// entities.
pub type FolderId = String;

/// Filter wildcard: selecting this folder shows every note.
pub const FOLDER_ALL: &str = "all";

/// Authenticated-user marker. Absent means logged out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    /// The other theme. Toggling is expressed as a pure function of the
    /// latest committed state and applied under the same mutable borrow.
    pub fn flipped(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
    pub folder_id: FolderId,
}

/// Fields a caller supplies when creating a note. The id is assigned by
/// the store, never by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
    pub folder_id: FolderId,
}

/// Partial update merged over an existing note. Absent fields keep
/// their current values; the note id itself cannot be patched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub updated_at: Option<String>,
    pub folder_id: Option<FolderId>,
}
