//! Jotter Demo Binary Entry Point

use std::sync::Arc;
use std::time::Duration;

use jotter_app::api::{MockService, NewNote};
use jotter_app::routing::{Destination, Navigator, NotesRoute};
use jotter_app::sweeper::RetentionSweeper;
use jotter_app::{AppState, NotesClient, QueryClient, QueryConfig};
use jotter_core::model::NoteDraft;
use jotter_core::storage::FileStorage;
use jotter_core::utils::time;
use jotter_core::{JotterConfig, JotterEngine, Store};

/// Stand-in for the router black box: echoes every command.
struct EchoNavigator;

impl Navigator for EchoNavigator {
    fn navigate(&self, destination: Destination) {
        match destination {
            Destination::NotesRoot => eprintln!("📂 route -> /notes"),
            Destination::NoteDetail(id) => eprintln!("📝 route -> /notes/{id}"),
        }
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();

    eprintln!("🚀 Jotter starting...");

    let config = JotterConfig::default();
    let storage = Arc::new(FileStorage::new(config.storage.dir.clone()));
    let engine = JotterEngine::load(Store::new(), storage, config.storage.key.clone());

    if config.logging.show_startup_summary {
        eprintln!("📒 {} local notes restored", engine.store.notes.len());
    }

    let state = AppState::new();
    state.install(engine).await;

    let queries = QueryClient::new(QueryConfig::from_windows(&config.queries));
    let service = Arc::new(MockService::new());
    let client = NotesClient::new(queries.clone(), service);

    let (sweep_tx, sweep_rx) = tokio::sync::mpsc::unbounded_channel();
    let sweeper = RetentionSweeper::new(queries, sweep_rx, Duration::from_secs(60));
    tokio::spawn(sweeper.start());

    let route = NotesRoute::new(state.clone(), Arc::new(EchoNavigator));

    // Seed a local note per folder, then walk the folder filters; each
    // selection change echoes the navigation it triggers.
    let stamp = time::now_millis().to_string();
    route
        .add_note(NoteDraft {
            title: "Sprint planning".to_string(),
            content: "Release checklist and owners.".to_string(),
            created_at: stamp.clone(),
            updated_at: stamp.clone(),
            folder_id: "work".to_string(),
        })
        .await
        .expect("engine installed above");
    route
        .add_note(NoteDraft {
            title: "Trip packing list".to_string(),
            content: "Boots, rain jacket, charger.".to_string(),
            created_at: stamp.clone(),
            updated_at: stamp,
            folder_id: "personal".to_string(),
        })
        .await
        .expect("engine installed above");

    for folder in &config.notebook.folders {
        eprintln!("📁 selecting folder '{}'", folder.name);
        route
            .select_folder(&folder.id)
            .await
            .expect("engine installed above");
    }

    // Remote side: list, create, list again. The second list read sees
    // post-mutation data because the mutation invalidated the list scope.
    match client.notes().await {
        Ok(notes) => eprintln!("🌐 {} remote notes", notes.len()),
        Err(err) => eprintln!("❌ list failed: {err}"),
    }
    match client
        .create_note(NewNote {
            title: "Quarterly goals".to_string(),
            content: "Draft the planning doc.".to_string(),
            folder_id: "work".to_string(),
        })
        .await
    {
        Ok(created) => eprintln!("🌐 created remote note {}", created.id),
        Err(err) => eprintln!("❌ create failed: {err}"),
    }
    match client.notes().await {
        Ok(notes) => eprintln!("🌐 {} remote notes after create", notes.len()),
        Err(err) => eprintln!("❌ list failed: {err}"),
    }

    let _ = sweep_tx.send(());
    drop(sweep_tx);
    eprintln!("✅ Done");
}
