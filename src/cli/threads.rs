//! `mycelial thread`: list, rename and delete threads of a workspace.

use std::error::Error;

use crate::cli::context::load_store;
use crate::cli::ThreadCommands;
use crate::core::workspace::{ThreadRef, WorkspaceStore};

fn target_workspace(
    store: &mut WorkspaceStore,
    workspace: Option<&str>,
) -> Result<String, Box<dyn Error>> {
    Ok(match workspace {
        Some(key) => store.find_workspace(key)?.id.clone(),
        None => store.ensure_current()?.workspace_id,
    })
}

fn find_thread(
    store: &WorkspaceStore,
    workspace_id: &str,
    key: &str,
) -> Result<ThreadRef, Box<dyn Error>> {
    let thread = store
        .workspace(workspace_id)?
        .find_thread(key)
        .ok_or_else(|| format!("Thread '{key}' not found"))?;
    Ok(ThreadRef::new(workspace_id, thread.id.clone()))
}

pub fn run_thread(
    command: Option<ThreadCommands>,
    workspace: Option<&str>,
) -> Result<(), Box<dyn Error>> {
    let (mut store, path) = load_store()?;
    let command = command.unwrap_or(ThreadCommands::List);
    if let Some(message) = apply(&mut store, command, workspace)? {
        store.save_to_path(&path)?;
        println!("{message}");
    }
    Ok(())
}

fn apply(
    store: &mut WorkspaceStore,
    command: ThreadCommands,
    workspace: Option<&str>,
) -> Result<Option<String>, Box<dyn Error>> {
    let ws_id = target_workspace(store, workspace)?;
    let message = match command {
        ThreadCommands::List => {
            let current = store.current().map(|c| c.thread_id);
            let ws = store.workspace(&ws_id)?;
            println!("Threads in '{}':", ws.name);
            for thread in &ws.threads {
                let marker = if current.as_deref() == Some(thread.id.as_str()) {
                    "*"
                } else {
                    "•"
                };
                println!(
                    "  {} {} ({} messages, updated {})",
                    marker,
                    thread.name,
                    thread.messages.len(),
                    thread.updated_at.format("%Y-%m-%d %H:%M")
                );
            }
            return Ok(None);
        }
        ThreadCommands::Rename { target, name } => {
            let name = name.join(" ");
            if name.trim().is_empty() {
                return Err("Thread name must not be empty".into());
            }
            let thread_ref = find_thread(store, &ws_id, &target)?;
            store.rename_thread(&thread_ref, &name)?;
            format!("✅ Renamed thread '{target}' to '{}'", name.trim())
        }
        ThreadCommands::Delete { target } => {
            let thread_ref = find_thread(store, &ws_id, &target)?;
            let removed = store.delete_thread(&thread_ref)?;
            format!(
                "✅ Deleted thread '{}' and its {} messages",
                removed.name,
                removed.messages.len()
            )
        }
    };
    Ok(Some(message))
}
