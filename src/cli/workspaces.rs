//! `mycelial workspace`: create, rename and configure workspaces.

use std::error::Error;

use crate::cli::context::{load_store, CliContext};
use crate::cli::WorkspaceCommands;
use crate::core::persona::PersonaCatalog;
use crate::core::workspace::{Workspace, WorkspaceStore};

fn workspace_lines(workspace: &Workspace, current: bool, catalog: &PersonaCatalog) -> Vec<String> {
    let marker = if current { "*" } else { "•" };
    let mut lines = vec![format!(
        "  {} {} ({} threads, {} knowledge items)",
        marker,
        workspace.name,
        workspace.threads.len(),
        workspace.linked_knowledge.len()
    )];
    let settings = &workspace.settings;
    if let Some(model) = settings.selected_model_id.as_deref() {
        lines.push(format!("    Model: {model}"));
    }
    if let Some(persona) = catalog.resolve_selected(settings.selected_persona_id.as_deref()) {
        lines.push(format!("    Persona: {}", persona.name));
    }
    if let Some(prompt) = settings.custom_system_prompt() {
        lines.push(format!("    Prompt: {prompt}"));
    }
    lines
}

pub fn run_workspace(
    ctx: &CliContext,
    command: Option<WorkspaceCommands>,
) -> Result<(), Box<dyn Error>> {
    let (mut store, path) = load_store()?;
    let message = apply(ctx, &mut store, command.unwrap_or(WorkspaceCommands::List))?;
    if let Some(message) = message {
        store.save_to_path(&path)?;
        println!("{message}");
    }
    Ok(())
}

/// Run one command against `store`. Returns the confirmation line when the
/// store changed and needs saving.
fn apply(
    ctx: &CliContext,
    store: &mut WorkspaceStore,
    command: WorkspaceCommands,
) -> Result<Option<String>, Box<dyn Error>> {
    let message = match command {
        WorkspaceCommands::List => {
            let catalog = PersonaCatalog::from_settings(&ctx.settings);
            let current = store.current().map(|c| c.workspace_id);
            if store.workspaces().is_empty() {
                println!("No workspaces yet. Create one with: mycelial workspace new <name>");
            }
            for workspace in store.workspaces() {
                let is_current = current.as_deref() == Some(workspace.id.as_str());
                for line in workspace_lines(workspace, is_current, &catalog) {
                    println!("{line}");
                }
            }
            return Ok(None);
        }
        WorkspaceCommands::New { name } => {
            let name = name.join(" ");
            if name.trim().is_empty() {
                return Err("Workspace name must not be empty".into());
            }
            let created = store.create_workspace(&name);
            format!("✅ Created workspace '{}'", created.name)
        }
        WorkspaceCommands::Rename { workspace, name } => {
            let name = name.join(" ");
            if name.trim().is_empty() {
                return Err("Workspace name must not be empty".into());
            }
            let id = store.find_workspace(&workspace)?.id.clone();
            store.rename_workspace(&id, &name)?;
            format!("✅ Renamed workspace '{workspace}' to '{}'", name.trim())
        }
        WorkspaceCommands::Delete { workspace } => {
            let id = store.find_workspace(&workspace)?.id.clone();
            let removed = store.delete_workspace(&id)?;
            format!(
                "✅ Deleted workspace '{}' and its {} threads",
                removed.name,
                removed.threads.len()
            )
        }
        WorkspaceCommands::Prompt {
            workspace,
            prompt,
            off,
        } => {
            let id = store.find_workspace(&workspace)?.id.clone();
            let prompt = prompt.join(" ");
            if off || prompt.trim().is_empty() {
                store.update_workspace_settings(&id, |s| s.override_system_prompt = Some(false))?;
                format!("✅ Workspace '{workspace}' uses the default system prompt")
            } else {
                store.update_workspace_settings(&id, |s| {
                    s.custom_system_prompt = Some(prompt.trim().to_string());
                    s.override_system_prompt = Some(true);
                })?;
                format!("✅ Set a custom system prompt for '{workspace}'")
            }
        }
        WorkspaceCommands::Persona { workspace, persona } => {
            let id = store.find_workspace(&workspace)?.id.clone();
            match persona.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
                Some(persona_id) => {
                    let catalog = PersonaCatalog::from_settings(&ctx.settings);
                    let persona = catalog.find(persona_id).ok_or_else(|| {
                        format!("Persona '{persona_id}' not found. See `mycelial personas`.")
                    })?;
                    store.select_persona(&id, Some(persona.id.as_str()))?;
                    format!("✅ Workspace '{workspace}' now uses persona '{}'", persona.name)
                }
                None => {
                    store.select_persona(&id, None)?;
                    format!("✅ Workspace '{workspace}' uses no persona")
                }
            }
        }
        WorkspaceCommands::Model { workspace, model } => {
            let id = store.find_workspace(&workspace)?.id.clone();
            let model = model.map(|m| m.trim().to_string()).filter(|m| !m.is_empty());
            let message = match model.as_deref() {
                Some(model) => format!("✅ Workspace '{workspace}' now uses model {model}"),
                None => format!(
                    "✅ Workspace '{workspace}' uses the default model ({})",
                    ctx.settings.default_model()
                ),
            };
            store.update_workspace_settings(&id, |s| s.selected_model_id = model)?;
            message
        }
    };
    Ok(Some(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::GlobalSettings;
    use crate::core::credentials::ApiKeyStore;

    fn ctx() -> CliContext {
        let mut settings = GlobalSettings::default();
        settings.seed_builtin_personas();
        CliContext {
            settings,
            keys: ApiKeyStore::new_with_keyring(false),
        }
    }

    fn words(s: &str) -> Vec<String> {
        s.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn new_and_rename_workspace() {
        let ctx = ctx();
        let mut store = WorkspaceStore::new();
        apply(&ctx, &mut store, WorkspaceCommands::New { name: words("Side project") }).unwrap();
        assert_eq!(store.workspaces()[0].name, "Side project");

        let message = apply(
            &ctx,
            &mut store,
            WorkspaceCommands::Rename {
                workspace: "side PROJECT".into(),
                name: words("Main project"),
            },
        )
        .unwrap();
        assert!(message.is_some());
        assert_eq!(store.workspaces()[0].name, "Main project");
    }

    #[test]
    fn persona_must_exist_in_catalog() {
        let ctx = ctx();
        let mut store = WorkspaceStore::new();
        store.create_workspace("Work");

        let result = apply(
            &ctx,
            &mut store,
            WorkspaceCommands::Persona {
                workspace: "Work".into(),
                persona: Some("nobody".into()),
            },
        );
        assert!(result.is_err());

        apply(
            &ctx,
            &mut store,
            WorkspaceCommands::Persona {
                workspace: "Work".into(),
                persona: Some("mentor".into()),
            },
        )
        .unwrap();
        assert_eq!(
            store.workspaces()[0].settings.selected_persona_id.as_deref(),
            Some("mentor")
        );
    }

    #[test]
    fn prompt_off_disables_override_but_keeps_text() {
        let ctx = ctx();
        let mut store = WorkspaceStore::new();
        store.create_workspace("Work");
        apply(
            &ctx,
            &mut store,
            WorkspaceCommands::Prompt {
                workspace: "Work".into(),
                prompt: words("Answer in French."),
                off: false,
            },
        )
        .unwrap();
        assert_eq!(
            store.workspaces()[0].settings.custom_system_prompt(),
            Some("Answer in French.")
        );

        apply(
            &ctx,
            &mut store,
            WorkspaceCommands::Prompt {
                workspace: "Work".into(),
                prompt: Vec::new(),
                off: true,
            },
        )
        .unwrap();
        let settings = &store.workspaces()[0].settings;
        assert_eq!(settings.custom_system_prompt(), None);
        assert_eq!(
            settings.custom_system_prompt.as_deref(),
            Some("Answer in French.")
        );
    }

    #[test]
    fn clearing_model_falls_back_to_default() {
        let ctx = ctx();
        let mut store = WorkspaceStore::new();
        store.create_workspace("Work");
        apply(
            &ctx,
            &mut store,
            WorkspaceCommands::Model {
                workspace: "Work".into(),
                model: Some("openai/gpt-4o".into()),
            },
        )
        .unwrap();
        assert_eq!(
            store.workspaces()[0].settings.selected_model_id.as_deref(),
            Some("openai/gpt-4o")
        );
        apply(
            &ctx,
            &mut store,
            WorkspaceCommands::Model {
                workspace: "Work".into(),
                model: None,
            },
        )
        .unwrap();
        assert_eq!(store.workspaces()[0].settings.selected_model_id, None);
    }
}
