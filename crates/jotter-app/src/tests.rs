use std::sync::{Arc, Mutex};
use std::time::Duration;

use jotter_core::model::NoteDraft;
use jotter_core::storage::MemoryStorage;
use jotter_core::{JotterEngine, Store};

use crate::api::{ApiError, MockService, NewNote, NoteUpdate};
use crate::client::NotesClient;
use crate::queries::{keys, QueryClient, QueryConfig, QueryError};
use crate::routing::{Destination, Navigator, NotesRoute, RouteParams, ViewContext, ViewState};
use crate::state::{AppState, StateError};

/// Test double recording every navigation command.
#[derive(Default)]
struct RecordingNavigator {
    log: Mutex<Vec<Destination>>,
}

impl RecordingNavigator {
    fn last(&self) -> Option<Destination> {
        self.log.lock().unwrap().last().cloned()
    }

    fn count(&self) -> usize {
        self.log.lock().unwrap().len()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, destination: Destination) {
        self.log.lock().unwrap().push(destination);
    }
}

fn draft(title: &str, folder_id: &str) -> NoteDraft {
    NoteDraft {
        title: title.to_string(),
        content: String::new(),
        created_at: "2024-01-15".to_string(),
        updated_at: "2024-01-15".to_string(),
        folder_id: folder_id.to_string(),
    }
}

async fn notes_route() -> (NotesRoute, AppState, Arc<RecordingNavigator>) {
    let state = AppState::new();
    let storage = Arc::new(MemoryStorage::new());
    state
        .install(JotterEngine::new(Store::new(), storage, "jotter-storage"))
        .await;
    let navigator = Arc::new(RecordingNavigator::default());
    let route = NotesRoute::new(state.clone(), navigator.clone());
    (route, state, navigator)
}

fn mock_client(latency: Duration) -> (NotesClient, Arc<MockService>) {
    let service = Arc::new(MockService::with_latency(latency));
    let client = NotesClient::new(QueryClient::new(QueryConfig::default()), service.clone());
    (client, service)
}

// ------------------------------------------------------------------------
// Folder selection / navigation synchronization
// ------------------------------------------------------------------------

#[tokio::test]
async fn folder_change_navigates_to_the_first_matching_note() {
    let (route, state, navigator) = notes_route().await;
    route.add_note(draft("Sprint planning", "work")).await.unwrap();
    route.add_note(draft("Trip packing list", "personal")).await.unwrap();
    let personal_id = state
        .read(|store| store.notes[1].id.clone())
        .await
        .unwrap();

    route.select_folder("personal").await.unwrap();

    assert_eq!(navigator.last(), Some(Destination::NoteDetail(personal_id.clone())));
    let selected = state.read(|store| store.selected_note_id.clone()).await.unwrap();
    assert_eq!(selected, Some(personal_id));
}

#[tokio::test]
async fn folder_change_to_an_empty_folder_navigates_to_the_root() {
    let (route, _state, navigator) = notes_route().await;
    route.add_note(draft("Sprint planning", "work")).await.unwrap();

    route.select_folder("personal").await.unwrap();

    assert_eq!(navigator.last(), Some(Destination::NotesRoot));
}

#[tokio::test]
async fn reselecting_the_current_folder_does_not_navigate() {
    let (route, _state, navigator) = notes_route().await;
    route.add_note(draft("Sprint planning", "work")).await.unwrap();

    route.select_folder("work").await.unwrap();
    assert_eq!(navigator.count(), 1);

    route.select_folder("work").await.unwrap();
    assert_eq!(navigator.count(), 1, "the rule is keyed on selection changes only");
}

#[tokio::test]
async fn adding_a_note_does_not_navigate() {
    let (route, _state, navigator) = notes_route().await;
    route.select_folder("work").await.unwrap();
    let after_selection = navigator.count();

    route.add_note(draft("Sprint planning", "work")).await.unwrap();
    route.add_note(draft("Retro actions", "work")).await.unwrap();

    assert_eq!(navigator.count(), after_selection);
}

#[tokio::test]
async fn deleting_the_open_note_renavigates_and_an_empty_set_lands_on_root() {
    let (route, state, navigator) = notes_route().await;
    route.add_note(draft("Sprint planning", "work")).await.unwrap();
    route.add_note(draft("Trip packing list", "personal")).await.unwrap();
    let personal_id = state.read(|store| store.notes[1].id.clone()).await.unwrap();

    route.select_folder("personal").await.unwrap();
    assert_eq!(navigator.last(), Some(Destination::NoteDetail(personal_id.clone())));

    route.delete_note(&personal_id).await.unwrap();

    assert_eq!(navigator.last(), Some(Destination::NotesRoot));
    let selected = state.read(|store| store.selected_note_id.clone()).await.unwrap();
    assert_eq!(selected, None);
}

#[tokio::test]
async fn deleting_the_open_note_falls_back_to_the_next_filtered_note() {
    let (route, state, navigator) = notes_route().await;
    route.add_note(draft("Sprint planning", "work")).await.unwrap();
    route.add_note(draft("Retro actions", "work")).await.unwrap();
    let (first_id, second_id) = state
        .read(|store| (store.notes[0].id.clone(), store.notes[1].id.clone()))
        .await
        .unwrap();

    route.select_folder("work").await.unwrap();
    assert_eq!(navigator.last(), Some(Destination::NoteDetail(first_id.clone())));

    route.delete_note(&first_id).await.unwrap();

    assert_eq!(navigator.last(), Some(Destination::NoteDetail(second_id)));
}

#[tokio::test]
async fn deleting_an_unrelated_note_leaves_the_router_alone() {
    let (route, state, navigator) = notes_route().await;
    route.add_note(draft("Sprint planning", "work")).await.unwrap();
    route.add_note(draft("Retro actions", "work")).await.unwrap();
    let second_id = state.read(|store| store.notes[1].id.clone()).await.unwrap();

    route.select_folder("work").await.unwrap();
    let after_selection = navigator.count();

    route.delete_note(&second_id).await.unwrap();

    assert_eq!(navigator.count(), after_selection);
}

#[tokio::test]
async fn accessing_state_before_install_fails_fast() {
    let state = AppState::new();
    let navigator = Arc::new(RecordingNavigator::default());
    let route = NotesRoute::new(state.clone(), navigator);

    let result = route.select_folder("work").await;
    assert!(matches!(result, Err(StateError::Uninitialized)));

    let read = state.read(|store| store.notes.len()).await;
    assert!(matches!(read, Err(StateError::Uninitialized)));
}

// ------------------------------------------------------------------------
// Cache layer over the mock facade
// ------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn concurrent_list_reads_hit_the_service_once() {
    let (client, service) = mock_client(Duration::from_millis(300));

    let a = {
        let client = client.clone();
        tokio::spawn(async move { client.notes().await })
    };
    let b = {
        let client = client.clone();
        tokio::spawn(async move { client.notes().await })
    };

    let first = a.await.unwrap().unwrap();
    let second = b.await.unwrap().unwrap();
    assert_eq!(first, second);
    assert_eq!(service.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn create_invalidates_the_list_scope() {
    let (client, service) = mock_client(Duration::from_millis(300));

    let before = client.notes().await.unwrap();
    assert_eq!(before.len(), 3);

    let created = client
        .create_note(NewNote {
            title: "Quarterly goals".to_string(),
            content: "Draft the planning doc.".to_string(),
            folder_id: "work".to_string(),
        })
        .await
        .unwrap();

    let after = client.notes().await.unwrap();
    assert_eq!(after.len(), 4, "the list read after the mutation must refetch");
    assert!(after.iter().any(|note| note.id == created.id));
    assert_eq!(service.calls(), 3, "list, create, refetched list");
}

#[tokio::test(start_paused = true)]
async fn update_invalidates_both_list_and_detail() {
    let (client, _service) = mock_client(Duration::from_millis(300));

    let before = client.note("1").await.unwrap();
    assert_eq!(before.title, "Sprint planning");

    client
        .update_note(
            "1",
            NoteUpdate {
                title: Some("Sprint planning v2".to_string()),
                ..NoteUpdate::default()
            },
        )
        .await
        .unwrap();

    let after = client.note("1").await.unwrap();
    assert_eq!(after.title, "Sprint planning v2");

    let list = client.notes().await.unwrap();
    assert!(list.iter().any(|note| note.title == "Sprint planning v2"));
}

#[tokio::test(start_paused = true)]
async fn delete_removes_the_detail_entry_outright() {
    let (client, _service) = mock_client(Duration::from_millis(300));

    let _ = client.note("2").await.unwrap();
    assert!(client.queries().contains(&keys::note_detail("2")));

    let ack = client.delete_note("2").await.unwrap();
    assert!(ack.success);
    assert!(!client.queries().contains(&keys::note_detail("2")));

    let list = client.notes().await.unwrap();
    assert!(list.iter().all(|note| note.id != "2"));
}

#[tokio::test(start_paused = true)]
async fn facade_failures_surface_after_the_retry_budget() {
    let (client, service) = mock_client(Duration::from_millis(300));
    service.fail_next(2);

    let result = client.notes().await;
    assert!(matches!(result, Err(QueryError::Fetch(ApiError::Unavailable(_)))));
    assert_eq!(service.calls(), 2, "one initial attempt plus the single retry");
}

#[tokio::test(start_paused = true)]
async fn a_single_injected_failure_is_absorbed_by_the_retry() {
    let (client, service) = mock_client(Duration::from_millis(300));
    service.fail_next(1);

    let notes = client.notes().await.unwrap();
    assert_eq!(notes.len(), 3);
    assert_eq!(service.calls(), 2);
}

// ------------------------------------------------------------------------
// View plumbing
// ------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn view_context_is_an_explicit_bundle() {
    let (route, state, _navigator) = notes_route().await;
    route.add_note(draft("Sprint planning", "work")).await.unwrap();

    let (client, _service) = mock_client(Duration::from_millis(300));
    let context = ViewContext {
        state: state.clone(),
        client,
        params: RouteParams { note_id: None },
    };

    let local_count = context.state.read(|store| store.notes.len()).await.unwrap();
    assert_eq!(local_count, 1);

    let remote = context.client.notes().await.unwrap();
    assert_eq!(remote.len(), 3, "remote and local notes are parallel models");
    assert_eq!(context.params.note_id, None);
}

#[tokio::test(start_paused = true)]
async fn view_states_keep_failure_distinct_from_loading_and_empty() {
    let (client, service) = mock_client(Duration::from_millis(300));
    service.fail_next(2);

    let failed = ViewState::from_list(client.notes().await);
    assert!(matches!(failed, ViewState::Failed(_)));

    let ready = ViewState::from_list(client.notes().await);
    assert!(matches!(ready, ViewState::Ready(_)));

    let empty = ViewState::from_list(Ok(Vec::<String>::new()));
    assert_eq!(empty, ViewState::Empty);
    assert_ne!(ViewState::<Vec<String>>::Loading, empty);
}
