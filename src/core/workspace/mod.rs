//! Workspaces, their threads, and the knowledge base they draw context from.
//!
//! [`WorkspaceStore`] owns all of it and is the only place these records are
//! mutated. It is passed explicitly to whatever needs it; there is no global
//! instance.

mod error;
mod io;
mod knowledge;
mod send;
mod store;

#[cfg(test)]
mod tests;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::message::Message;

pub use error::{SendError, StoreError};
pub use send::PendingSend;
pub use store::WorkspaceStore;

pub const DEFAULT_THREAD_NAME: &str = "New Thread";

/// Per-workspace overrides of the global settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceSettings {
    pub selected_model_id: Option<String>,
    pub temperature: Option<f32>,
    pub override_system_prompt: Option<bool>,
    pub custom_system_prompt: Option<String>,
    /// Weak reference into the global persona catalog.
    pub selected_persona_id: Option<String>,
    pub include_knowledge_in_prompt: Option<bool>,
    pub api_key: Option<String>,
}

impl WorkspaceSettings {
    /// The custom prompt, unless overriding has been switched off explicitly.
    pub fn custom_system_prompt(&self) -> Option<&str> {
        if self.override_system_prompt == Some(false) {
            return None;
        }
        self.custom_system_prompt.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
    pub name: String,
    pub workspace_id: String,
    #[serde(default)]
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Thread {
    pub fn new(workspace_id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            workspace_id: workspace_id.into(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub threads: Vec<Thread>,
    #[serde(default)]
    pub settings: WorkspaceSettings,
    /// Knowledge items attached to this workspace.
    #[serde(default)]
    pub linked_knowledge: Vec<String>,
    /// Subset of `linked_knowledge` injected into prompts.
    #[serde(default)]
    pub knowledge_in_context: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Workspace {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        let id = Uuid::new_v4().to_string();
        Self {
            threads: vec![Thread::new(id.clone(), DEFAULT_THREAD_NAME)],
            id,
            name: name.into(),
            settings: WorkspaceSettings::default(),
            linked_knowledge: Vec::new(),
            knowledge_in_context: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn thread(&self, thread_id: &str) -> Option<&Thread> {
        self.threads.iter().find(|t| t.id == thread_id)
    }

    /// Look a thread up by id, or by name ignoring case.
    pub fn find_thread(&self, key: &str) -> Option<&Thread> {
        self.thread(key).or_else(|| {
            self.threads
                .iter()
                .find(|t| t.name.eq_ignore_ascii_case(key.trim()))
        })
    }

    /// Most recently updated thread.
    pub fn latest_thread(&self) -> Option<&Thread> {
        self.threads.iter().max_by_key(|t| t.updated_at)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeItem {
    pub id: String,
    pub title: String,
    pub content: String,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl KnowledgeItem {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            content: content.into(),
            description: None,
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Identifies one thread inside one workspace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ThreadRef {
    pub workspace_id: String,
    pub thread_id: String,
}

impl ThreadRef {
    pub fn new(workspace_id: impl Into<String>, thread_id: impl Into<String>) -> Self {
        Self {
            workspace_id: workspace_id.into(),
            thread_id: thread_id.into(),
        }
    }
}
