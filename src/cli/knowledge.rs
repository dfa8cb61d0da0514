//! `mycelial knowledge`: the knowledge base and per-workspace links.

use std::error::Error;
use std::fs;

use crate::cli::context::load_store;
use crate::cli::KnowledgeCommands;
use crate::core::workspace::{KnowledgeItem, WorkspaceStore};

fn target_workspace(
    store: &mut WorkspaceStore,
    workspace: Option<&str>,
) -> Result<(String, String), Box<dyn Error>> {
    let id = match workspace {
        Some(key) => store.find_workspace(key)?.id.clone(),
        None => store.ensure_current()?.workspace_id,
    };
    let name = store.workspace(&id)?.name.clone();
    Ok((id, name))
}

pub fn run_knowledge(
    command: Option<KnowledgeCommands>,
    workspace: Option<&str>,
) -> Result<(), Box<dyn Error>> {
    let (mut store, path) = load_store()?;
    let command = command.unwrap_or(KnowledgeCommands::List);
    if let Some(message) = apply(&mut store, command, workspace)? {
        store.save_to_path(&path)?;
        println!("{message}");
    }
    Ok(())
}

fn apply(
    store: &mut WorkspaceStore,
    command: KnowledgeCommands,
    workspace: Option<&str>,
) -> Result<Option<String>, Box<dyn Error>> {
    let message = match command {
        KnowledgeCommands::List => {
            if store.knowledge_items().is_empty() {
                println!("The knowledge base is empty.");
                println!("💡 Add an item with: mycelial knowledge add <title> --file notes.md");
                return Ok(None);
            }
            let current = store.current().map(|c| c.workspace_id);
            let current = current.and_then(|id| store.workspace(&id).ok());
            for item in store.knowledge_items() {
                let state = match current {
                    Some(ws) if ws.knowledge_in_context.contains(&item.id) => " [in context]",
                    Some(ws) if ws.linked_knowledge.contains(&item.id) => " [linked]",
                    _ => "",
                };
                println!("  • {} ({}){}", item.title, item.id, state);
                if let Some(description) = item.description.as_deref() {
                    println!("    {description}");
                }
                if !item.tags.is_empty() {
                    println!("    Tags: {}", item.tags.join(", "));
                }
            }
            return Ok(None);
        }
        KnowledgeCommands::Add {
            title,
            content,
            file,
            description,
            tags,
        } => {
            let body = match file {
                Some(path) => fs::read_to_string(&path)
                    .map_err(|err| format!("Could not read {}: {err}", path.display()))?,
                None => content.join(" "),
            };
            if title.trim().is_empty() || body.trim().is_empty() {
                return Err("A knowledge item needs a title and some content".into());
            }
            let mut item = KnowledgeItem::new(title.trim(), body);
            item.description = description.filter(|d| !d.trim().is_empty());
            item.tags = tags;
            let added = store.add_knowledge_item(item);
            format!("✅ Added knowledge item '{}' ({})", added.title, added.id)
        }
        KnowledgeCommands::Remove { item } => {
            let id = store.find_knowledge_item(&item)?.id.clone();
            let removed = store.delete_knowledge_item(&id)?;
            format!("✅ Removed knowledge item '{}'", removed.title)
        }
        KnowledgeCommands::Link { item } => {
            let id = store.find_knowledge_item(&item)?.id.clone();
            let (ws_id, ws_name) = target_workspace(store, workspace)?;
            store.link_knowledge(&ws_id, &id)?;
            store.set_knowledge_in_context(&ws_id, &id, true)?;
            format!("✅ Linked '{item}' to workspace '{ws_name}'")
        }
        KnowledgeCommands::Unlink { item } => {
            let id = store.find_knowledge_item(&item)?.id.clone();
            let (ws_id, ws_name) = target_workspace(store, workspace)?;
            store.unlink_knowledge(&ws_id, &id)?;
            format!("✅ Unlinked '{item}' from workspace '{ws_name}'")
        }
        KnowledgeCommands::Context { item, state } => {
            let (ws_id, ws_name) = target_workspace(store, workspace)?;
            match item {
                Some(item) => {
                    let id = store.find_knowledge_item(&item)?.id.clone();
                    store.set_knowledge_in_context(&ws_id, &id, state.is_on())?;
                    format!(
                        "✅ '{item}' is {} the prompt context of '{ws_name}'",
                        if state.is_on() { "in" } else { "out of" }
                    )
                }
                None => {
                    store.update_workspace_settings(&ws_id, |s| {
                        s.include_knowledge_in_prompt = Some(state.is_on())
                    })?;
                    format!(
                        "✅ Knowledge injection {} for '{ws_name}'",
                        if state.is_on() { "enabled" } else { "disabled" }
                    )
                }
            }
        }
    };
    Ok(Some(message))
}
