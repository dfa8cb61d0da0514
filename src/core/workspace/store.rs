use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    KnowledgeItem, StoreError, Thread, ThreadRef, Workspace, WorkspaceSettings,
    DEFAULT_THREAD_NAME,
};
use crate::core::message::Message;

pub const DEFAULT_WORKSPACE_NAME: &str = "Default";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkspaceStore {
    #[serde(default)]
    pub(super) workspaces: Vec<Workspace>,
    #[serde(default)]
    pub(super) knowledge_items: Vec<KnowledgeItem>,
    #[serde(default)]
    pub(super) current_workspace_id: Option<String>,
    #[serde(default)]
    pub(super) current_thread_id: Option<String>,
}

impl WorkspaceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn workspaces(&self) -> &[Workspace] {
        &self.workspaces
    }

    pub fn workspace(&self, id: &str) -> Result<&Workspace, StoreError> {
        self.workspaces
            .iter()
            .find(|w| w.id == id)
            .ok_or_else(|| StoreError::WorkspaceNotFound(id.to_string()))
    }

    pub(super) fn workspace_mut(&mut self, id: &str) -> Result<&mut Workspace, StoreError> {
        self.workspaces
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or_else(|| StoreError::WorkspaceNotFound(id.to_string()))
    }

    /// Look a workspace up by id, or by name ignoring case.
    pub fn find_workspace(&self, key: &str) -> Result<&Workspace, StoreError> {
        self.workspaces
            .iter()
            .find(|w| w.id == key)
            .or_else(|| {
                self.workspaces
                    .iter()
                    .find(|w| w.name.eq_ignore_ascii_case(key))
            })
            .ok_or_else(|| StoreError::WorkspaceNotFound(key.to_string()))
    }

    pub fn create_workspace(&mut self, name: &str) -> &Workspace {
        let workspace = Workspace::new(name.trim());
        debug!(workspace_id = %workspace.id, name = %workspace.name, "Created workspace");
        if self.current_workspace_id.is_none() {
            self.current_workspace_id = Some(workspace.id.clone());
            self.current_thread_id = workspace.threads.first().map(|t| t.id.clone());
        }
        self.workspaces.push(workspace);
        &self.workspaces[self.workspaces.len() - 1]
    }

    pub fn rename_workspace(&mut self, id: &str, name: &str) -> Result<(), StoreError> {
        let workspace = self.workspace_mut(id)?;
        workspace.name = name.trim().to_string();
        workspace.touch();
        Ok(())
    }

    pub fn delete_workspace(&mut self, id: &str) -> Result<Workspace, StoreError> {
        let index = self
            .workspaces
            .iter()
            .position(|w| w.id == id)
            .ok_or_else(|| StoreError::WorkspaceNotFound(id.to_string()))?;
        if self.current_workspace_id.as_deref() == Some(id) {
            self.current_workspace_id = None;
            self.current_thread_id = None;
        }
        Ok(self.workspaces.remove(index))
    }

    pub fn create_thread(
        &mut self,
        workspace_id: &str,
        name: Option<&str>,
    ) -> Result<ThreadRef, StoreError> {
        let workspace = self.workspace_mut(workspace_id)?;
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_THREAD_NAME);
        let thread = Thread::new(workspace_id, name);
        let thread_ref = ThreadRef::new(workspace_id, thread.id.clone());
        workspace.threads.push(thread);
        workspace.touch();
        Ok(thread_ref)
    }

    pub fn rename_thread(&mut self, thread_ref: &ThreadRef, name: &str) -> Result<(), StoreError> {
        let thread = self.thread_mut(thread_ref)?;
        thread.name = name.trim().to_string();
        thread.updated_at = chrono::Utc::now();
        Ok(())
    }

    pub fn delete_thread(&mut self, thread_ref: &ThreadRef) -> Result<Thread, StoreError> {
        let workspace = self.workspace_mut(&thread_ref.workspace_id)?;
        let index = workspace
            .threads
            .iter()
            .position(|t| t.id == thread_ref.thread_id)
            .ok_or_else(|| StoreError::ThreadNotFound(thread_ref.thread_id.clone()))?;
        let removed = workspace.threads.remove(index);
        workspace.touch();
        if self.current_thread_id.as_deref() == Some(thread_ref.thread_id.as_str()) {
            self.current_thread_id = None;
        }
        Ok(removed)
    }

    pub fn thread(&self, thread_ref: &ThreadRef) -> Result<&Thread, StoreError> {
        self.workspace(&thread_ref.workspace_id)?
            .thread(&thread_ref.thread_id)
            .ok_or_else(|| StoreError::ThreadNotFound(thread_ref.thread_id.clone()))
    }

    fn thread_mut(&mut self, thread_ref: &ThreadRef) -> Result<&mut Thread, StoreError> {
        self.workspace_mut(&thread_ref.workspace_id)?
            .threads
            .iter_mut()
            .find(|t| t.id == thread_ref.thread_id)
            .ok_or_else(|| StoreError::ThreadNotFound(thread_ref.thread_id.clone()))
    }

    /// Append messages in order and bump the thread and workspace timestamps.
    pub(super) fn append_messages(
        &mut self,
        thread_ref: &ThreadRef,
        messages: impl IntoIterator<Item = Message>,
    ) -> Result<(), StoreError> {
        let thread = self.thread_mut(thread_ref)?;
        thread.messages.extend(messages);
        thread.updated_at = chrono::Utc::now();
        self.workspace_mut(&thread_ref.workspace_id)?.touch();
        Ok(())
    }

    pub fn update_workspace_settings<F>(&mut self, id: &str, update: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut WorkspaceSettings),
    {
        let workspace = self.workspace_mut(id)?;
        update(&mut workspace.settings);
        workspace.touch();
        Ok(())
    }

    /// Store a persona reference, or clear it with `None`. The id is not
    /// checked against the catalog; stale ids resolve to no persona.
    pub fn select_persona(
        &mut self,
        workspace_id: &str,
        persona_id: Option<&str>,
    ) -> Result<(), StoreError> {
        self.update_workspace_settings(workspace_id, |settings| {
            settings.selected_persona_id = persona_id.map(str::to_string);
        })
    }

    pub fn current(&self) -> Option<ThreadRef> {
        let workspace_id = self.current_workspace_id.as_deref()?;
        let thread_id = self.current_thread_id.as_deref()?;
        self.thread(&ThreadRef::new(workspace_id, thread_id))
            .ok()
            .map(|_| ThreadRef::new(workspace_id, thread_id))
    }

    pub fn set_current(&mut self, thread_ref: &ThreadRef) -> Result<(), StoreError> {
        self.thread(thread_ref)?;
        self.current_workspace_id = Some(thread_ref.workspace_id.clone());
        self.current_thread_id = Some(thread_ref.thread_id.clone());
        Ok(())
    }

    /// Return the current thread, creating a default workspace or thread when
    /// there is none yet.
    pub fn ensure_current(&mut self) -> Result<ThreadRef, StoreError> {
        if let Some(current) = self.current() {
            return Ok(current);
        }

        let existing_workspace = self
            .current_workspace_id
            .as_deref()
            .and_then(|id| self.workspace(id).ok())
            .or_else(|| self.workspaces.first())
            .map(|workspace| workspace.id.clone());
        let workspace_id = match existing_workspace {
            Some(id) => id,
            None => self.create_workspace(DEFAULT_WORKSPACE_NAME).id.clone(),
        };

        let existing_thread = self
            .workspace(&workspace_id)?
            .latest_thread()
            .map(|t| ThreadRef::new(workspace_id.as_str(), t.id.as_str()));
        let thread_ref = match existing_thread {
            Some(thread_ref) => thread_ref,
            None => self.create_thread(&workspace_id, None)?,
        };

        self.current_workspace_id = Some(thread_ref.workspace_id.clone());
        self.current_thread_id = Some(thread_ref.thread_id.clone());
        Ok(thread_ref)
    }

    /// Resolve `--workspace`/`--thread` style selectors into a thread and make
    /// it current. A thread key that matches nothing creates a thread with
    /// that name.
    pub fn open_thread(
        &mut self,
        workspace_key: Option<&str>,
        thread_key: Option<&str>,
    ) -> Result<ThreadRef, StoreError> {
        let workspace_id = match workspace_key {
            Some(key) => self.find_workspace(key)?.id.clone(),
            None if thread_key.is_none() => return self.ensure_current(),
            None => self.ensure_current()?.workspace_id,
        };

        let workspace = self.workspace(&workspace_id)?;
        let found = match thread_key {
            Some(key) => workspace.find_thread(key),
            None => workspace.latest_thread(),
        }
        .map(|t| ThreadRef::new(workspace_id.as_str(), t.id.as_str()));
        let thread_ref = match found {
            Some(thread_ref) => thread_ref,
            None => self.create_thread(&workspace_id, thread_key)?,
        };
        self.set_current(&thread_ref)?;
        Ok(thread_ref)
    }
}
