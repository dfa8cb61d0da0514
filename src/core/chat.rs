//! Chat view state: which thread is open, whether a submission is in flight,
//! and the transient notice shown under the input.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::core::completion::{format_api_error, CompletionError};
use crate::core::config::{GlobalSettings, SystemPersona};
use crate::core::message::Message;
use crate::core::persona::{resolve_system_prompt, PersonaCatalog};
use crate::core::workspace::{PendingSend, StoreError, ThreadRef, Workspace, WorkspaceStore};

pub const SEND_FAILED_NOTICE: &str = "Failed to send message. Please try again.";
pub const DEFAULT_PERSONA_NOTICE: &str = "Default Persona";
pub const MISSING_KEY_NOTICE: &str = "No API key configured. Run `mycelial auth` first.";
pub const NOTICE_TTL: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatState {
    Idle,
    Submitting,
    /// A submission failed; holds the summarised error until the view settles.
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub text: String,
    pub kind: NoticeKind,
    set_at: Instant,
}

impl Notice {
    fn new(text: impl Into<String>, kind: NoticeKind) -> Self {
        Self {
            text: text.into(),
            kind,
            set_at: Instant::now(),
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.set_at) >= NOTICE_TTL
    }
}

pub struct ChatSession {
    pub settings: GlobalSettings,
    pub store: WorkspaceStore,
    current: ThreadRef,
    state: ChatState,
    notice: Option<Notice>,
    api_key: Option<String>,
    store_path: Option<PathBuf>,
    /// Model chosen on the command line for this session only.
    model_override: Option<String>,
}

impl ChatSession {
    pub fn new(
        settings: GlobalSettings,
        store: WorkspaceStore,
        current: ThreadRef,
        api_key: Option<String>,
    ) -> Self {
        Self {
            settings,
            store,
            current,
            state: ChatState::Idle,
            notice: None,
            api_key,
            store_path: None,
            model_override: None,
        }
    }

    /// Save the workspace store to `path` after every committed change.
    pub fn with_store_path(mut self, path: PathBuf) -> Self {
        self.store_path = Some(path);
        self
    }

    pub fn with_model_override(mut self, model: Option<String>) -> Self {
        self.model_override = model.filter(|m| !m.trim().is_empty());
        self
    }

    pub fn state(&self) -> &ChatState {
        &self.state
    }

    pub fn input_enabled(&self) -> bool {
        self.state == ChatState::Idle
    }

    pub fn current(&self) -> &ThreadRef {
        &self.current
    }

    pub fn workspace(&self) -> Result<&Workspace, StoreError> {
        self.store.workspace(&self.current.workspace_id)
    }

    pub fn thread_name(&self) -> &str {
        self.store
            .thread(&self.current)
            .map(|t| t.name.as_str())
            .unwrap_or("")
    }

    pub fn messages(&self) -> &[Message] {
        self.store
            .thread(&self.current)
            .map(|t| t.messages.as_slice())
            .unwrap_or(&[])
    }

    pub fn selected_persona(&self) -> Option<&SystemPersona> {
        let selected = self
            .workspace()
            .ok()
            .and_then(|w| w.settings.selected_persona_id.as_deref());
        PersonaCatalog::from_settings(&self.settings).resolve_selected(selected)
    }

    pub fn system_prompt(&self) -> String {
        let custom = self
            .workspace()
            .ok()
            .and_then(|w| w.settings.custom_system_prompt());
        resolve_system_prompt(
            custom,
            self.settings.default_system_prompt(),
            self.selected_persona(),
        )
    }

    pub fn has_knowledge_in_context(&self) -> bool {
        self.store
            .has_knowledge_in_context(&self.current.workspace_id)
    }

    pub fn model(&self) -> String {
        if let Some(model) = &self.model_override {
            return model.clone();
        }
        self.workspace()
            .ok()
            .and_then(|w| w.settings.selected_model_id.clone())
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| self.settings.default_model().to_string())
    }

    /// The notice to display at `now`, dropping it once it has expired.
    pub fn active_notice(&mut self, now: Instant) -> Option<&Notice> {
        if self.notice.as_ref().is_some_and(|n| n.is_expired(now)) {
            self.notice = None;
        }
        self.notice.as_ref()
    }

    pub fn notify(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice::new(text, NoticeKind::Info));
    }

    fn notify_error(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice::new(text, NoticeKind::Error));
    }

    /// Start a submission. Returns `None`, without touching any state, for
    /// blank input or while another submission is in flight.
    pub fn begin_submit(&mut self, input: &str) -> Option<PendingSend> {
        if self.state != ChatState::Idle || input.trim().is_empty() {
            return None;
        }
        let workspace_key = self
            .workspace()
            .ok()
            .and_then(|w| w.settings.api_key.clone())
            .filter(|k| !k.trim().is_empty());
        let Some(api_key) = self.api_key.clone().or(workspace_key) else {
            self.notify_error(MISSING_KEY_NOTICE);
            return None;
        };

        let system_prompt = self.system_prompt();
        match self.store.prepare_send(
            &self.current,
            input,
            &system_prompt,
            &self.settings,
            &api_key,
        ) {
            Ok(mut pending) => {
                if let Some(model) = &self.model_override {
                    pending.request.model = model.clone();
                }
                self.state = ChatState::Submitting;
                Some(pending)
            }
            Err(err) => {
                warn!(error = %err, "Could not prepare message");
                self.notify_error(SEND_FAILED_NOTICE);
                None
            }
        }
    }

    /// Apply the completion result. On success both messages are committed;
    /// on failure nothing is appended and the view moves to `Error`.
    pub fn finish_submit(
        &mut self,
        pending: PendingSend,
        result: Result<String, CompletionError>,
    ) -> Result<(), StoreError> {
        match result {
            Ok(reply) => {
                self.store.complete_send(pending, reply)?;
                self.state = ChatState::Idle;
                self.persist();
                Ok(())
            }
            Err(err) => {
                let summary = match &err {
                    CompletionError::Status { body, .. } => format_api_error(body),
                    other => other.to_string(),
                };
                warn!(error = %err, "Failed to send message");
                self.state = ChatState::Error(summary);
                self.notify_error(SEND_FAILED_NOTICE);
                Ok(())
            }
        }
    }

    /// Final step of every submission: whatever happened, the view is
    /// interactive again.
    pub fn settle(&mut self) {
        self.state = ChatState::Idle;
    }

    /// Point the workspace at a persona (or none) and announce it.
    pub fn select_persona(&mut self, persona_id: Option<&str>) -> Result<(), StoreError> {
        self.store
            .select_persona(&self.current.workspace_id, persona_id)?;
        let notice = match self.selected_persona() {
            Some(persona) => format!("{} Selected", persona.name),
            None => DEFAULT_PERSONA_NOTICE.to_string(),
        };
        info!(persona = ?persona_id, "Persona selected");
        self.notify(notice);
        self.persist();
        Ok(())
    }

    pub fn new_thread(&mut self) -> Result<(), StoreError> {
        let thread_ref = self
            .store
            .create_thread(&self.current.workspace_id, None)?;
        self.store.set_current(&thread_ref)?;
        self.current = thread_ref;
        self.persist();
        Ok(())
    }

    fn persist(&self) {
        let Some(path) = &self.store_path else {
            return;
        };
        if let Err(err) = self.store.save_to_path(path) {
            warn!(error = %err, "Failed to save workspaces");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::workspace::KnowledgeItem;
    use reqwest::StatusCode;

    fn session() -> ChatSession {
        let mut store = WorkspaceStore::new();
        let current = store.ensure_current().unwrap();
        let mut settings = GlobalSettings::default();
        settings.seed_builtin_personas();
        ChatSession::new(settings, store, current, Some("key".to_string()))
    }

    #[test]
    fn blank_input_is_ignored_silently() {
        let mut session = session();
        assert!(session.begin_submit("   ").is_none());
        assert_eq!(session.state(), &ChatState::Idle);
        assert!(session.active_notice(Instant::now()).is_none());
        assert!(session.messages().is_empty());
    }

    #[test]
    fn successful_submission_returns_to_idle_with_reply() {
        let mut session = session();
        let pending = session.begin_submit("Hello").unwrap();
        assert_eq!(session.state(), &ChatState::Submitting);
        assert!(!session.input_enabled());
        assert!(session.begin_submit("again").is_none());

        session.finish_submit(pending, Ok("Hi!".to_string())).unwrap();
        session.settle();

        assert_eq!(session.state(), &ChatState::Idle);
        let messages = session.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].content, "Hi!");
    }

    #[test]
    fn submitted_text_is_trimmed() {
        let mut session = session();
        let pending = session.begin_submit("  Hello\n\n").unwrap();
        let sent = pending.request.messages.last().unwrap();
        assert_eq!(sent.content, "Hello");

        session.finish_submit(pending, Ok("r".to_string())).unwrap();
        assert_eq!(session.messages()[0].content, "Hello");
    }

    #[test]
    fn failed_submission_notifies_and_settles_idle() {
        let mut session = session();
        let pending = session.begin_submit("Hello").unwrap();
        let err = CompletionError::Status {
            status: StatusCode::UNAUTHORIZED,
            body: r#"{"error":{"message":"No auth credentials found"}}"#.to_string(),
        };

        session.finish_submit(pending, Err(err)).unwrap();
        assert!(matches!(session.state(), ChatState::Error(msg) if msg.contains("No auth")));
        let notice = session.active_notice(Instant::now()).unwrap();
        assert_eq!(notice.text, SEND_FAILED_NOTICE);
        assert_eq!(notice.kind, NoticeKind::Error);

        session.settle();
        assert!(session.input_enabled());
        assert!(session.messages().is_empty());
    }

    #[test]
    fn missing_api_key_blocks_submission() {
        let mut session = session();
        session.api_key = None;
        assert!(session.begin_submit("Hello").is_none());
        assert_eq!(session.state(), &ChatState::Idle);
        assert_eq!(
            session.active_notice(Instant::now()).map(|n| n.text.as_str()),
            Some(MISSING_KEY_NOTICE)
        );
    }

    #[test]
    fn persona_selection_changes_prompt_and_notice() {
        let mut session = session();
        let base = session.system_prompt();
        assert_eq!(base, session.settings.default_system_prompt());

        session.select_persona(Some("mentor")).unwrap();
        let persona = session.selected_persona().unwrap().clone();
        assert_eq!(
            session.active_notice(Instant::now()).unwrap().text,
            format!("{} Selected", persona.name)
        );
        assert_eq!(
            session.system_prompt(),
            format!("{}\n\n{}", persona.prompt_addition, base)
        );

        session.select_persona(None).unwrap();
        assert_eq!(
            session.active_notice(Instant::now()).unwrap().text,
            DEFAULT_PERSONA_NOTICE
        );
        assert_eq!(session.system_prompt(), base);
    }

    #[test]
    fn dangling_persona_announces_default() {
        let mut session = session();
        session.select_persona(Some("gone")).unwrap();
        assert!(session.selected_persona().is_none());
        assert_eq!(
            session.active_notice(Instant::now()).unwrap().text,
            DEFAULT_PERSONA_NOTICE
        );
    }

    #[test]
    fn notice_expires_after_ttl() {
        let mut session = session();
        session.notify("hello");
        let later = Instant::now() + NOTICE_TTL + Duration::from_millis(1);
        assert!(session.active_notice(later).is_none());
    }

    #[test]
    fn knowledge_badge_follows_workspace_context() {
        let mut session = session();
        assert!(!session.has_knowledge_in_context());
        let ws = session.current().workspace_id.clone();
        let id = session
            .store
            .add_knowledge_item(KnowledgeItem::new("Doc", "Body"))
            .id
            .clone();
        session.store.link_knowledge(&ws, &id).unwrap();
        session.store.set_knowledge_in_context(&ws, &id, true).unwrap();
        assert!(session.has_knowledge_in_context());
    }

    #[test]
    fn new_thread_switches_current() {
        let mut session = session();
        let before = session.current().clone();
        session.new_thread().unwrap();
        assert_ne!(session.current(), &before);
        assert_eq!(session.store.current().as_ref(), Some(session.current()));
    }

    #[test]
    fn model_override_wins_over_workspace_model() {
        let mut session = session().with_model_override(Some("meta/llama".into()));
        let ws = session.current().workspace_id.clone();
        session
            .store
            .update_workspace_settings(&ws, |s| s.selected_model_id = Some("openai/gpt-4o".into()))
            .unwrap();
        assert_eq!(session.model(), "meta/llama");
        let pending = session.begin_submit("Hi").unwrap();
        assert_eq!(pending.request.model, "meta/llama");
    }
}
