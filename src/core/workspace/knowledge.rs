use super::{KnowledgeItem, StoreError, WorkspaceStore};

impl WorkspaceStore {
    pub fn knowledge_items(&self) -> &[KnowledgeItem] {
        &self.knowledge_items
    }

    pub fn knowledge_item(&self, id: &str) -> Result<&KnowledgeItem, StoreError> {
        self.knowledge_items
            .iter()
            .find(|item| item.id == id)
            .ok_or_else(|| StoreError::KnowledgeItemNotFound(id.to_string()))
    }

    /// Look an item up by id, or by title ignoring case.
    pub fn find_knowledge_item(&self, key: &str) -> Result<&KnowledgeItem, StoreError> {
        self.knowledge_item(key).or_else(|_| {
            self.knowledge_items
                .iter()
                .find(|item| item.title.eq_ignore_ascii_case(key.trim()))
                .ok_or_else(|| StoreError::KnowledgeItemNotFound(key.to_string()))
        })
    }

    pub fn add_knowledge_item(&mut self, item: KnowledgeItem) -> &KnowledgeItem {
        self.knowledge_items.push(item);
        &self.knowledge_items[self.knowledge_items.len() - 1]
    }

    /// Remove an item and every workspace reference to it.
    pub fn delete_knowledge_item(&mut self, id: &str) -> Result<KnowledgeItem, StoreError> {
        let index = self
            .knowledge_items
            .iter()
            .position(|item| item.id == id)
            .ok_or_else(|| StoreError::KnowledgeItemNotFound(id.to_string()))?;
        for workspace in &mut self.workspaces {
            workspace.linked_knowledge.retain(|k| k != id);
            workspace.knowledge_in_context.retain(|k| k != id);
        }
        Ok(self.knowledge_items.remove(index))
    }

    /// Linking an already linked item is a no-op.
    pub fn link_knowledge(&mut self, workspace_id: &str, item_id: &str) -> Result<(), StoreError> {
        self.knowledge_item(item_id)?;
        let workspace = self.workspace_mut(workspace_id)?;
        if !workspace.linked_knowledge.iter().any(|k| k == item_id) {
            workspace.linked_knowledge.push(item_id.to_string());
            workspace.touch();
        }
        Ok(())
    }

    pub fn unlink_knowledge(&mut self, workspace_id: &str, item_id: &str) -> Result<(), StoreError> {
        let workspace = self.workspace_mut(workspace_id)?;
        let before = workspace.linked_knowledge.len();
        workspace.linked_knowledge.retain(|k| k != item_id);
        if workspace.linked_knowledge.len() == before {
            return Err(StoreError::KnowledgeNotLinked(item_id.to_string()));
        }
        workspace.knowledge_in_context.retain(|k| k != item_id);
        workspace.touch();
        Ok(())
    }

    /// Toggle whether a linked item is injected into prompts.
    pub fn set_knowledge_in_context(
        &mut self,
        workspace_id: &str,
        item_id: &str,
        in_context: bool,
    ) -> Result<(), StoreError> {
        let workspace = self.workspace_mut(workspace_id)?;
        if !workspace.linked_knowledge.iter().any(|k| k == item_id) {
            return Err(StoreError::KnowledgeNotLinked(item_id.to_string()));
        }
        let present = workspace.knowledge_in_context.iter().any(|k| k == item_id);
        match (in_context, present) {
            (true, false) => workspace.knowledge_in_context.push(item_id.to_string()),
            (false, true) => workspace.knowledge_in_context.retain(|k| k != item_id),
            _ => return Ok(()),
        }
        workspace.touch();
        Ok(())
    }

    /// Items marked in-context for the workspace, concatenated as markdown
    /// sections. Empty when nothing is selected.
    pub fn knowledge_context(&self, workspace_id: &str) -> Result<String, StoreError> {
        let workspace = self.workspace(workspace_id)?;
        let sections: Vec<String> = workspace
            .knowledge_in_context
            .iter()
            .filter_map(|id| self.knowledge_items.iter().find(|item| &item.id == id))
            .map(|item| format!("## {}\n{}", item.title, item.content))
            .collect();
        Ok(sections.join("\n\n"))
    }

    /// Whether the workspace has anything that would be injected.
    pub fn has_knowledge_in_context(&self, workspace_id: &str) -> bool {
        self.workspace(workspace_id)
            .map(|w| {
                w.settings.include_knowledge_in_prompt != Some(false)
                    && !w.knowledge_in_context.is_empty()
            })
            .unwrap_or(false)
    }
}
