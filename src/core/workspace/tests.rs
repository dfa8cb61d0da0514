use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::StatusCode;
use tempfile::tempdir;

use super::*;
use crate::core::completion::{CompletionBackend, CompletionError, CompletionRequest};
use crate::core::config::GlobalSettings;
use crate::core::message::Role;

/// Records every request and answers with a canned reply or a 500.
struct FakeBackend {
    reply: Option<String>,
    calls: AtomicUsize,
    requests: Mutex<Vec<(String, CompletionRequest)>>,
}

impl FakeBackend {
    fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn failing() -> Self {
        Self {
            reply: None,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn last_request(&self) -> (String, CompletionRequest) {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request recorded")
    }
}

#[async_trait]
impl CompletionBackend for FakeBackend {
    async fn complete(
        &self,
        api_key: &str,
        request: CompletionRequest,
    ) -> Result<String, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap()
            .push((api_key.to_string(), request));
        match &self.reply {
            Some(reply) => Ok(reply.clone()),
            None => Err(CompletionError::Status {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: "boom".to_string(),
            }),
        }
    }
}

fn store_with_thread() -> (WorkspaceStore, ThreadRef) {
    let mut store = WorkspaceStore::new();
    let thread_ref = store.ensure_current().unwrap();
    (store, thread_ref)
}

#[test]
fn ensure_current_creates_default_workspace_once() {
    let mut store = WorkspaceStore::new();
    let first = store.ensure_current().unwrap();
    let second = store.ensure_current().unwrap();
    assert_eq!(first, second);
    assert_eq!(store.workspaces().len(), 1);
    assert_eq!(store.workspaces()[0].name, "Default");
    assert_eq!(store.thread(&first).unwrap().name, DEFAULT_THREAD_NAME);
}

#[test]
fn find_workspace_matches_name_case_insensitively() {
    let mut store = WorkspaceStore::new();
    let id = store.create_workspace("Research").id.clone();
    assert_eq!(store.find_workspace("research").unwrap().id, id);
    assert_eq!(store.find_workspace(&id).unwrap().name, "Research");
    assert!(matches!(
        store.find_workspace("nope"),
        Err(StoreError::WorkspaceNotFound(_))
    ));
}

#[test]
fn deleting_current_workspace_clears_selection() {
    let (mut store, thread_ref) = store_with_thread();
    store.delete_workspace(&thread_ref.workspace_id).unwrap();
    assert!(store.current().is_none());
    let replacement = store.ensure_current().unwrap();
    assert_ne!(replacement.workspace_id, thread_ref.workspace_id);
}

#[test]
fn threads_can_be_created_renamed_and_deleted() {
    let (mut store, thread_ref) = store_with_thread();
    let second = store
        .create_thread(&thread_ref.workspace_id, Some("  Ideas  "))
        .unwrap();
    assert_eq!(store.thread(&second).unwrap().name, "Ideas");

    store.rename_thread(&second, "Plans").unwrap();
    assert_eq!(store.thread(&second).unwrap().name, "Plans");

    let blank = store.create_thread(&thread_ref.workspace_id, Some("   ")).unwrap();
    assert_eq!(store.thread(&blank).unwrap().name, DEFAULT_THREAD_NAME);

    store.delete_thread(&second).unwrap();
    assert!(matches!(
        store.thread(&second),
        Err(StoreError::ThreadNotFound(_))
    ));
}

#[test]
fn open_thread_finds_by_name_or_creates() {
    let (mut store, first) = store_with_thread();
    let research = store.create_workspace("Research").id.clone();

    let opened = store.open_thread(Some("research"), Some("Reading list")).unwrap();
    assert_eq!(opened.workspace_id, research);
    assert_eq!(store.thread(&opened).unwrap().name, "Reading list");
    assert_eq!(store.current(), Some(opened.clone()));

    let again = store.open_thread(Some("Research"), Some("reading LIST")).unwrap();
    assert_eq!(again, opened);

    let back = store.open_thread(Some("Default"), None).unwrap();
    assert_eq!(back, first);

    assert!(matches!(
        store.open_thread(Some("Missing"), None),
        Err(StoreError::WorkspaceNotFound(_))
    ));
}

#[test]
fn selecting_persona_stores_weak_reference() {
    let (mut store, thread_ref) = store_with_thread();
    store
        .select_persona(&thread_ref.workspace_id, Some("deleted-persona"))
        .unwrap();
    let settings = &store.workspace(&thread_ref.workspace_id).unwrap().settings;
    assert_eq!(settings.selected_persona_id.as_deref(), Some("deleted-persona"));

    store.select_persona(&thread_ref.workspace_id, None).unwrap();
    let settings = &store.workspace(&thread_ref.workspace_id).unwrap().settings;
    assert_eq!(settings.selected_persona_id, None);
}

#[test]
fn custom_prompt_is_ignored_when_override_is_off() {
    let mut settings = WorkspaceSettings {
        custom_system_prompt: Some("Custom.".to_string()),
        ..Default::default()
    };
    assert_eq!(settings.custom_system_prompt(), Some("Custom."));
    settings.override_system_prompt = Some(false);
    assert_eq!(settings.custom_system_prompt(), None);
}

#[test]
fn knowledge_context_joins_items_in_context() {
    let (mut store, thread_ref) = store_with_thread();
    let ws = thread_ref.workspace_id.clone();
    let a = store
        .add_knowledge_item(KnowledgeItem::new("Doc A", "Alpha."))
        .id
        .clone();
    let b = store
        .add_knowledge_item(KnowledgeItem::new("Doc B", "Beta."))
        .id
        .clone();
    store.link_knowledge(&ws, &a).unwrap();
    store.link_knowledge(&ws, &a).unwrap();
    store.link_knowledge(&ws, &b).unwrap();
    assert_eq!(store.workspace(&ws).unwrap().linked_knowledge.len(), 2);

    assert_eq!(store.knowledge_context(&ws).unwrap(), "");
    assert!(!store.has_knowledge_in_context(&ws));

    store.set_knowledge_in_context(&ws, &a, true).unwrap();
    store.set_knowledge_in_context(&ws, &b, true).unwrap();
    assert_eq!(
        store.knowledge_context(&ws).unwrap(),
        "## Doc A\nAlpha.\n\n## Doc B\nBeta."
    );
    assert!(store.has_knowledge_in_context(&ws));

    store.unlink_knowledge(&ws, &a).unwrap();
    assert_eq!(store.knowledge_context(&ws).unwrap(), "## Doc B\nBeta.");
    assert!(matches!(
        store.unlink_knowledge(&ws, &a),
        Err(StoreError::KnowledgeNotLinked(_))
    ));
    assert!(matches!(
        store.set_knowledge_in_context(&ws, &a, true),
        Err(StoreError::KnowledgeNotLinked(_))
    ));
}

#[test]
fn deleting_knowledge_item_removes_workspace_references() {
    let (mut store, thread_ref) = store_with_thread();
    let ws = thread_ref.workspace_id.clone();
    let id = store
        .add_knowledge_item(KnowledgeItem::new("Doc", "Body"))
        .id
        .clone();
    store.link_knowledge(&ws, &id).unwrap();
    store.set_knowledge_in_context(&ws, &id, true).unwrap();

    store.delete_knowledge_item(&id).unwrap();
    let workspace = store.workspace(&ws).unwrap();
    assert!(workspace.linked_knowledge.is_empty());
    assert!(workspace.knowledge_in_context.is_empty());
    assert!(matches!(
        store.link_knowledge(&ws, &id),
        Err(StoreError::KnowledgeItemNotFound(_))
    ));
}

#[tokio::test]
async fn whitespace_input_never_reaches_backend() {
    let (mut store, thread_ref) = store_with_thread();
    let backend = FakeBackend::replying("unused");
    let settings = GlobalSettings::default();

    let result = store
        .send_message(&backend, &thread_ref, "  \n\t ", "Base.", &settings, "key")
        .await;

    assert!(matches!(result, Err(SendError::Store(StoreError::EmptyMessage))));
    assert_eq!(backend.calls(), 0);
    assert!(store.thread(&thread_ref).unwrap().messages.is_empty());
}

#[tokio::test]
async fn successful_send_appends_user_then_one_assistant_message() {
    let (mut store, thread_ref) = store_with_thread();
    let backend = FakeBackend::replying("Hi there.");
    let settings = GlobalSettings::default();

    let reply = store
        .send_message(&backend, &thread_ref, "Hello", "Base.", &settings, "key")
        .await
        .unwrap();
    assert_eq!(reply.role, Role::Assistant);
    assert_eq!(reply.content, "Hi there.");

    let messages = &store.thread(&thread_ref).unwrap().messages;
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[0].content, "Hello");
    assert_eq!(messages[1].role, Role::Assistant);
    assert!(messages.iter().all(|m| m.thread_id == thread_ref.thread_id));

    let (api_key, request) = backend.last_request();
    assert_eq!(api_key, "key");
    assert_eq!(request.model, settings.default_model());
    assert_eq!(request.messages.len(), 2);
    assert_eq!(request.messages[0].role, Role::System);
    assert_eq!(request.messages[0].content, "Base.");
    assert_eq!(request.knowledge_context, None);
}

#[tokio::test]
async fn user_input_is_trimmed_before_sending_and_storing() {
    let (mut store, thread_ref) = store_with_thread();
    let backend = FakeBackend::replying("r");
    let settings = GlobalSettings::default();

    store
        .send_message(&backend, &thread_ref, "  Hello\n\n", "Base.", &settings, "key")
        .await
        .unwrap();

    let (_, request) = backend.last_request();
    let sent = request.messages.last().unwrap();
    assert_eq!(sent.role, Role::User);
    assert_eq!(sent.content, "Hello");
    assert_eq!(store.thread(&thread_ref).unwrap().messages[0].content, "Hello");
}

#[tokio::test]
async fn history_is_sent_in_order_on_follow_up() {
    let (mut store, thread_ref) = store_with_thread();
    let backend = FakeBackend::replying("ok");
    let settings = GlobalSettings::default();

    store
        .send_message(&backend, &thread_ref, "first", "Base.", &settings, "key")
        .await
        .unwrap();
    store
        .send_message(&backend, &thread_ref, "second", "Base.", &settings, "key")
        .await
        .unwrap();

    let (_, request) = backend.last_request();
    let contents: Vec<&str> = request.messages.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["Base.", "first", "ok", "second"]);
    assert_eq!(store.thread(&thread_ref).unwrap().messages.len(), 4);
}

#[tokio::test]
async fn failed_send_leaves_thread_untouched() {
    let (mut store, thread_ref) = store_with_thread();
    let backend = FakeBackend::failing();
    let settings = GlobalSettings::default();

    let result = store
        .send_message(&backend, &thread_ref, "Hello", "Base.", &settings, "key")
        .await;

    assert!(matches!(result, Err(SendError::Completion(_))));
    assert_eq!(backend.calls(), 1);
    assert!(store.thread(&thread_ref).unwrap().messages.is_empty());
}

#[tokio::test]
async fn workspace_overrides_and_knowledge_flow_into_request() {
    let (mut store, thread_ref) = store_with_thread();
    let ws = thread_ref.workspace_id.clone();
    let doc = store
        .add_knowledge_item(KnowledgeItem::new("Doc X", "Doc X says Y."))
        .id
        .clone();
    store.link_knowledge(&ws, &doc).unwrap();
    store.set_knowledge_in_context(&ws, &doc, true).unwrap();
    store
        .update_workspace_settings(&ws, |s| {
            s.selected_model_id = Some("anthropic/claude-3-haiku".to_string());
            s.temperature = Some(0.1);
            s.api_key = Some("workspace-key".to_string());
        })
        .unwrap();

    let backend = FakeBackend::replying("ok");
    store
        .send_message(&backend, &thread_ref, "Hi", "Base.", &GlobalSettings::default(), "global-key")
        .await
        .unwrap();

    let (api_key, request) = backend.last_request();
    assert_eq!(api_key, "workspace-key");
    assert_eq!(request.model, "anthropic/claude-3-haiku");
    assert_eq!(request.temperature, 0.1);
    assert_eq!(
        request.knowledge_context.as_deref(),
        Some("## Doc X\nDoc X says Y.")
    );

    store
        .update_workspace_settings(&ws, |s| s.include_knowledge_in_prompt = Some(false))
        .unwrap();
    store
        .send_message(&backend, &thread_ref, "Again", "Base.", &GlobalSettings::default(), "k")
        .await
        .unwrap();
    let (_, request) = backend.last_request();
    assert_eq!(request.knowledge_context, None);
}

#[tokio::test]
async fn store_round_trips_through_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("workspaces.json");

    let (mut store, thread_ref) = store_with_thread();
    let backend = FakeBackend::replying("Saved reply.");
    store
        .send_message(&backend, &thread_ref, "Persist me", "Base.", &GlobalSettings::default(), "k")
        .await
        .unwrap();
    store
        .select_persona(&thread_ref.workspace_id, Some("mentor"))
        .unwrap();
    store.save_to_path(&path).unwrap();

    let loaded = WorkspaceStore::load_from_path(&path).unwrap();
    assert_eq!(loaded.current(), Some(thread_ref.clone()));
    assert_eq!(loaded.workspaces(), store.workspaces());
    let messages = &loaded.thread(&thread_ref).unwrap().messages;
    assert_eq!(messages[1].content, "Saved reply.");
}

#[test]
fn missing_store_file_loads_empty() {
    let dir = tempdir().unwrap();
    let store = WorkspaceStore::load_from_path(&dir.path().join("absent.json")).unwrap();
    assert!(store.workspaces().is_empty());
    assert!(store.current().is_none());
}

#[test]
fn corrupt_store_file_is_a_parse_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("workspaces.json");
    std::fs::write(&path, "{ not json").unwrap();
    assert!(matches!(
        WorkspaceStore::load_from_path(&path),
        Err(StoreError::Parse { .. })
    ));
}
