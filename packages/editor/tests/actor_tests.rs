//! Editor actor against a scripted preview

use pagewright_bridge::{pair, Action, BarrierOutcome, Envelope, Message, Origin, Port};
use pagewright_document::{Command, GlobalStyles, Section, Settings};
use pagewright_editor::{
    EditorActor, EditorError, EditorSession, MemoryStore, SavedSettings, SettingsStore,
    StoreError,
};
use pagewright_registry::catalog;
use serde_json::json;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn session() -> EditorSession {
    EditorSession::new("ed", "pv", Arc::new(catalog::standard()))
}

fn add(id: &str) -> Command {
    Command::AddSection {
        section: Section::new(id, "hero"),
        index: None,
    }
}

/// Preview stand-in: answers flush requests, first pushing an inline edit
fn spawn_flushing_preview(mut port: Port) -> tokio::task::JoinHandle<Vec<String>> {
    tokio::spawn(async move {
        let mut tags = Vec::new();
        while let Some(raw) = port.recv().await {
            let envelope = Envelope::decode(&raw).unwrap();
            tags.push(envelope.message.tag().to_string());

            if let Message::ActionRequest { action, request_id } = envelope.message {
                let mut updates = Settings::new();
                updates.insert("title".into(), json!("typed inline"));

                let origin = Origin::preview("pv");
                port.send(&Envelope::new(
                    origin.clone(),
                    envelope.revision,
                    Message::UpdateSection {
                        section_id: "s1".into(),
                        updates,
                    },
                ))
                .unwrap();
                port.send(&Envelope::new(
                    origin,
                    envelope.revision,
                    Message::ActionComplete { action, request_id },
                ))
                .unwrap();
            }
        }
        tags
    })
}

#[tokio::test]
async fn test_save_waits_for_flushed_inline_edits() {
    let (editor_port, preview_port) = pair();
    let preview = spawn_flushing_preview(preview_port);
    let store = Arc::new(MemoryStore::new());

    let (handle, task) = EditorActor::spawn(session(), editor_port, store.clone());
    handle.dispatch(add("s1")).unwrap();

    let report = handle.save().await.unwrap();

    assert_eq!(report.flush, BarrierOutcome::Completed);
    assert_eq!(report.revision, 2);
    assert_eq!(report.sections, 1);

    let saved = store.load().unwrap();
    assert_eq!(saved.sections[0].setting("title"), Some(&json!("typed inline")));

    drop(handle);
    task.await.unwrap();
    let tags = preview.await.unwrap();
    assert_eq!(
        tags,
        vec![
            "RESTORE_HISTORY",
            "VIEWPORT_CHANGE",
            "ADD_SECTION",
            "ACTION_REQUEST",
            "UPDATE_SECTION"
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_save_with_silent_preview_times_out_softly() {
    let (editor_port, _silent_preview) = pair();
    let store = Arc::new(MemoryStore::new());
    let session = session().with_barrier_timeout(Duration::from_secs(3));

    let (handle, _task) = EditorActor::spawn(session, editor_port, store.clone());
    handle.dispatch(add("s1")).unwrap();

    let started = tokio::time::Instant::now();
    let report = handle.save().await.unwrap();

    assert_eq!(report.flush, BarrierOutcome::TimedOut);
    assert!(started.elapsed() >= Duration::from_secs(3));
    assert_eq!(store.save_count(), 1);
    assert_eq!(store.load().unwrap().sections.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_save_with_disconnected_preview_still_persists() {
    let (editor_port, preview_port) = pair();
    drop(preview_port);
    let store = Arc::new(MemoryStore::new());

    let (handle, _task) = EditorActor::spawn(session(), editor_port, store.clone());
    let report = handle.save().await.unwrap();

    assert_eq!(report.flush, BarrierOutcome::TimedOut);
    assert_eq!(store.save_count(), 1);
}

#[derive(Default)]
struct StylesheetStore {
    inner: MemoryStore,
    written: Mutex<Option<GlobalStyles>>,
}

impl SettingsStore for StylesheetStore {
    fn load(&self) -> Result<SavedSettings, StoreError> {
        self.inner.load()
    }

    fn save(&self, settings: &SavedSettings) -> Result<(), StoreError> {
        self.inner.save(settings)
    }

    fn regenerate_stylesheet(&self, styles: &GlobalStyles) -> Result<Option<PathBuf>, StoreError> {
        *self.written.lock().unwrap() = Some(styles.clone());
        Ok(Some(PathBuf::from("theme.css")))
    }
}

#[tokio::test(start_paused = true)]
async fn test_save_regenerates_stylesheet_from_current_styles() {
    let (editor_port, _preview) = pair();
    let store = Arc::new(StylesheetStore::default());

    let (handle, _task) = EditorActor::spawn(session(), editor_port, store.clone());

    let mut branding = Settings::new();
    branding.insert("colorScheme".into(), json!("dark"));
    handle
        .update_styles(pagewright_document::StyleScope::Branding, branding)
        .unwrap();

    let report = handle.save().await.unwrap();

    assert_eq!(report.stylesheet, Some(PathBuf::from("theme.css")));
    let written = store.written.lock().unwrap().clone().unwrap();
    assert_eq!(written.color_scheme.as_deref(), Some("dark"));
}

#[tokio::test]
async fn test_snapshot_reflects_dispatched_commands() {
    let (editor_port, _preview) = pair();
    let (handle, _task) = EditorActor::spawn(session(), editor_port, Arc::new(MemoryStore::new()));

    handle.dispatch(add("s1")).unwrap();
    handle.dispatch(add("s2")).unwrap();
    handle.dispatch(Command::Undo).unwrap();
    handle.select(Some("s1".into())).unwrap();

    let snapshot = handle.snapshot().await.unwrap();

    assert_eq!(snapshot.state.revision(), 3);
    assert_eq!(snapshot.state.document().len(), 1);
    assert!(snapshot.state.history().can_redo());
    assert_eq!(snapshot.selection, Some("s1".into()));
}

#[tokio::test]
async fn test_handle_reports_stopped_actor() {
    let (editor_port, _preview) = pair();
    let (handle, task) = EditorActor::spawn(session(), editor_port, Arc::new(MemoryStore::new()));

    task.abort();
    let _ = task.await;

    assert!(matches!(handle.dispatch(Command::Undo), Err(EditorError::ActorStopped)));
    assert!(matches!(handle.snapshot().await, Err(EditorError::ActorStopped)));
}

#[tokio::test]
async fn test_stray_action_request_is_answered() {
    let (editor_port, mut preview_port) = pair();
    let (_handle, _task) =
        EditorActor::spawn(session(), editor_port, Arc::new(MemoryStore::new()));

    // skip RESTORE_HISTORY and VIEWPORT_CHANGE
    preview_port.recv().await.unwrap();
    preview_port.recv().await.unwrap();

    let request_id = pagewright_bridge::RequestId(42);
    preview_port
        .send(&Envelope::new(
            Origin::preview("pv"),
            0,
            Message::ActionRequest {
                action: Action::FlushEditable,
                request_id,
            },
        ))
        .unwrap();

    let reply = Envelope::decode(&preview_port.recv().await.unwrap()).unwrap();
    assert_eq!(
        reply.message,
        Message::ActionComplete {
            action: Action::FlushEditable,
            request_id
        }
    );
}
