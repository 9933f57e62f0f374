use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure surfaced by the remote facade.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("service unavailable: {0}")]
    Unavailable(String),
    #[error("no such note: {0}")]
    NoSuchNote(String),
}

/// Note as the remote service represents it. Independent of the local
/// store's notes model; the two are parallel, never conflated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteNote {
    pub id: String,
    pub title: String,
    pub content: String,
    pub created_at: String,
    pub folder_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNote {
    pub title: String,
    pub content: String,
    pub folder_id: String,
}

/// Fields of an update request; absent fields stay as they are.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub folder_id: Option<String>,
}

/// Echo of an accepted update: the id plus whatever was changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatedNote {
    pub id: String,
    #[serde(flatten)]
    pub fields: NoteUpdate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteAck {
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar: String,
}

/// Abstract interface to the notes backend.
#[async_trait]
pub trait NoteService: Send + Sync {
    async fn get_notes(&self) -> Result<Vec<RemoteNote>, ApiError>;
    async fn get_note(&self, id: &str) -> Result<RemoteNote, ApiError>;
    async fn create_note(&self, data: NewNote) -> Result<RemoteNote, ApiError>;
    async fn update_note(&self, id: &str, data: NoteUpdate) -> Result<UpdatedNote, ApiError>;
    async fn delete_note(&self, id: &str) -> Result<DeleteAck, ApiError>;
    async fn get_user(&self, id: &str) -> Result<Profile, ApiError>;
}

/// Stand-in backend resolving fabricated data after a simulated network
/// delay. Correctness hardening is explicitly not its job; only the
/// contract shape matters to callers.
pub struct MockService {
    latency: Duration,
    notes: Mutex<Vec<RemoteNote>>,
    calls: AtomicU64,
    fail_next: AtomicUsize,
}

impl MockService {
    pub fn new() -> Self {
        Self::with_latency(Duration::from_millis(500))
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency,
            notes: Mutex::new(seed_notes()),
            calls: AtomicU64::new(0),
            fail_next: AtomicUsize::new(0),
        }
    }

    /// Make the next `n` calls fail, for exercising retry handling.
    pub fn fail_next(&self, n: usize) {
        self.fail_next.store(n, Ordering::SeqCst);
    }

    /// Total calls that reached the service, shared requests counted once.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    async fn simulate(&self) -> Result<(), ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.latency).await;
        if self.take_failure() {
            return Err(ApiError::Unavailable("injected failure".to_string()));
        }
        Ok(())
    }

    fn take_failure(&self) -> bool {
        let mut remaining = self.fail_next.load(Ordering::SeqCst);
        while remaining > 0 {
            match self.fail_next.compare_exchange(
                remaining,
                remaining - 1,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => return true,
                Err(current) => remaining = current,
            }
        }
        false
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NoteService for MockService {
    async fn get_notes(&self) -> Result<Vec<RemoteNote>, ApiError> {
        self.simulate().await?;
        Ok(self.notes.lock().unwrap().clone())
    }

    async fn get_note(&self, id: &str) -> Result<RemoteNote, ApiError> {
        self.simulate().await?;
        self.notes
            .lock()
            .unwrap()
            .iter()
            .find(|note| note.id == id)
            .cloned()
            .ok_or_else(|| ApiError::NoSuchNote(id.to_string()))
    }

    async fn create_note(&self, data: NewNote) -> Result<RemoteNote, ApiError> {
        self.simulate().await?;
        // Server-assigned id, independent of the store's id scheme
        let note = RemoteNote {
            id: nanoid::nanoid!(12),
            title: data.title,
            content: data.content,
            created_at: jotter_core::utils::time::now_millis().to_string(),
            folder_id: data.folder_id,
        };
        self.notes.lock().unwrap().push(note.clone());
        Ok(note)
    }

    async fn update_note(&self, id: &str, data: NoteUpdate) -> Result<UpdatedNote, ApiError> {
        self.simulate().await?;
        let mut notes = self.notes.lock().unwrap();
        if let Some(note) = notes.iter_mut().find(|note| note.id == id) {
            if let Some(title) = &data.title {
                note.title = title.clone();
            }
            if let Some(content) = &data.content {
                note.content = content.clone();
            }
            if let Some(folder_id) = &data.folder_id {
                note.folder_id = folder_id.clone();
            }
        }
        Ok(UpdatedNote {
            id: id.to_string(),
            fields: data,
        })
    }

    async fn delete_note(&self, id: &str) -> Result<DeleteAck, ApiError> {
        self.simulate().await?;
        self.notes.lock().unwrap().retain(|note| note.id != id);
        Ok(DeleteAck { success: true })
    }

    async fn get_user(&self, id: &str) -> Result<Profile, ApiError> {
        self.simulate().await?;
        Ok(Profile {
            id: id.to_string(),
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            avatar: "https://api.dicebear.com/7.x/avataaars/svg?seed=Ada".to_string(),
        })
    }
}

fn seed_notes() -> Vec<RemoteNote> {
    vec![
        RemoteNote {
            id: "1".to_string(),
            title: "Sprint planning".to_string(),
            content: "Walked through the release checklist and assigned owners.".to_string(),
            created_at: "2024-01-15".to_string(),
            folder_id: "work".to_string(),
        },
        RemoteNote {
            id: "2".to_string(),
            title: "Retro actions".to_string(),
            content: "Fewer standing meetings, more focus time.".to_string(),
            created_at: "2024-01-16".to_string(),
            folder_id: "work".to_string(),
        },
        RemoteNote {
            id: "3".to_string(),
            title: "Trip packing list".to_string(),
            content: "Boots, rain jacket, charger, spare batteries.".to_string(),
            created_at: "2024-01-18".to_string(),
            folder_id: "personal".to_string(),
        },
    ]
}
