use tracing::{debug, warn};

use super::{SendError, StoreError, ThreadRef, WorkspaceStore};
use crate::api::ChatMessage;
use crate::core::completion::{CompletionBackend, CompletionRequest};
use crate::core::config::GlobalSettings;
use crate::core::message::{Message, Role};

/// A validated submission waiting on the completion backend.
///
/// Nothing has been written to the thread yet; the user message is only
/// committed together with the reply in [`WorkspaceStore::complete_send`].
#[derive(Debug, Clone)]
pub struct PendingSend {
    pub thread_ref: ThreadRef,
    pub user_message: Message,
    pub api_key: String,
    pub request: CompletionRequest,
}

impl WorkspaceStore {
    /// Build the outgoing request for `content` on the given thread.
    ///
    /// The message list is the resolved system prompt, then the thread's
    /// history, then the new user message. Model and temperature come from
    /// the workspace when set and from `settings` otherwise.
    pub fn prepare_send(
        &self,
        thread_ref: &ThreadRef,
        content: &str,
        system_prompt: &str,
        settings: &GlobalSettings,
        api_key: &str,
    ) -> Result<PendingSend, StoreError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(StoreError::EmptyMessage);
        }

        let workspace = self.workspace(&thread_ref.workspace_id)?;
        let thread = self.thread(thread_ref)?;
        let ws_settings = &workspace.settings;

        let mut messages = Vec::with_capacity(thread.messages.len() + 2);
        messages.push(ChatMessage::new(Role::System, system_prompt));
        messages.extend(
            thread
                .messages
                .iter()
                .map(|m| ChatMessage::new(m.role, m.content.clone())),
        );
        messages.push(ChatMessage::new(Role::User, content));

        let model = ws_settings
            .selected_model_id
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| settings.default_model().to_string());
        let temperature = ws_settings
            .temperature
            .unwrap_or_else(|| settings.temperature());
        let knowledge_context = if ws_settings.include_knowledge_in_prompt == Some(false) {
            None
        } else {
            Some(self.knowledge_context(&workspace.id)?).filter(|ctx| !ctx.is_empty())
        };
        let api_key = ws_settings
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .unwrap_or(api_key)
            .to_string();

        Ok(PendingSend {
            thread_ref: thread_ref.clone(),
            user_message: Message::user(thread.id.clone(), content),
            api_key,
            request: CompletionRequest {
                model,
                messages,
                temperature,
                knowledge_context,
            },
        })
    }

    /// Commit the user message and the assistant reply to the thread.
    pub fn complete_send(
        &mut self,
        pending: PendingSend,
        reply: String,
    ) -> Result<&Message, StoreError> {
        let thread_ref = pending.thread_ref;
        let assistant = Message::assistant(thread_ref.thread_id.clone(), reply);
        self.append_messages(&thread_ref, [pending.user_message, assistant])?;
        let thread = self.thread(&thread_ref)?;
        thread
            .messages
            .last()
            .ok_or_else(|| StoreError::ThreadNotFound(thread_ref.thread_id.clone()))
    }

    /// Prepare, call the backend and commit in one step. A failed call leaves
    /// the thread untouched.
    pub async fn send_message(
        &mut self,
        backend: &dyn CompletionBackend,
        thread_ref: &ThreadRef,
        content: &str,
        system_prompt: &str,
        settings: &GlobalSettings,
        api_key: &str,
    ) -> Result<&Message, SendError> {
        let pending = self.prepare_send(thread_ref, content, system_prompt, settings, api_key)?;
        debug!(
            workspace_id = %thread_ref.workspace_id,
            thread_id = %thread_ref.thread_id,
            model = %pending.request.model,
            "Submitting message"
        );
        let reply = match backend
            .complete(&pending.api_key, pending.request.clone())
            .await
        {
            Ok(reply) => reply,
            Err(err) => {
                warn!(error = %err, "Completion failed");
                return Err(err.into());
            }
        };
        Ok(self.complete_send(pending, reply)?)
    }
}
