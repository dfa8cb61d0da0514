//! TUI-less "say" command

use std::error::Error;
use std::io::{self, IsTerminal, Read};

use ratatui::style::Style;
use tracing::info;

use crate::cli::context::{load_store, CliContext};
use crate::core::persona::{resolve_system_prompt, PersonaCatalog};
use crate::core::workspace::{Workspace, WorkspaceStore};
use crate::ui::markdown::{render_markdown, render_plain};
use crate::ui::theme::Theme;

/// Everything a one-shot prompt needs from settings and the workspace.
#[derive(Debug, PartialEq)]
struct SayRequest {
    model: String,
    system_prompt: String,
    temperature: f32,
    knowledge_context: Option<String>,
    api_key_override: Option<String>,
}

fn build_request(
    ctx: &CliContext,
    store: &WorkspaceStore,
    workspace: Option<&Workspace>,
    model: Option<&str>,
) -> SayRequest {
    let settings = workspace.map(|w| &w.settings);
    let catalog = PersonaCatalog::from_settings(&ctx.settings);
    let persona =
        catalog.resolve_selected(settings.and_then(|s| s.selected_persona_id.as_deref()));
    let system_prompt = resolve_system_prompt(
        settings.and_then(|s| s.custom_system_prompt()),
        ctx.settings.default_system_prompt(),
        persona,
    );

    let model = model
        .map(str::to_string)
        .or_else(|| settings.and_then(|s| s.selected_model_id.clone()))
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| ctx.settings.default_model().to_string());
    let temperature = settings
        .and_then(|s| s.temperature)
        .unwrap_or_else(|| ctx.settings.temperature());

    let knowledge_context = workspace
        .filter(|w| w.settings.include_knowledge_in_prompt != Some(false))
        .and_then(|w| store.knowledge_context(&w.id).ok())
        .filter(|c| !c.is_empty());
    let api_key_override = settings
        .and_then(|s| s.api_key.clone())
        .filter(|k| !k.trim().is_empty());

    SayRequest {
        model,
        system_prompt,
        temperature,
        knowledge_context,
        api_key_override,
    }
}

fn read_prompt(words: Vec<String>) -> Result<String, Box<dyn Error>> {
    let prompt = words.join(" ");
    if !prompt.trim().is_empty() {
        return Ok(prompt);
    }
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Err("Usage: mycelial say <prompt>".into());
    }
    let mut piped = String::new();
    stdin.lock().read_to_string(&mut piped)?;
    if piped.trim().is_empty() {
        return Err("Usage: mycelial say <prompt>".into());
    }
    Ok(piped)
}

pub async fn run_say(
    ctx: &CliContext,
    prompt: Vec<String>,
    workspace: Option<String>,
    model: Option<String>,
    plain: bool,
) -> Result<(), Box<dyn Error>> {
    let prompt = read_prompt(prompt)?;
    let (store, _) = load_store()?;
    let selected = match workspace.as_deref() {
        Some(key) => Some(store.find_workspace(key)?),
        None => store
            .current()
            .and_then(|current| store.workspace(&current.workspace_id).ok()),
    };

    let request = build_request(ctx, &store, selected, model.as_deref());
    let api_key = match request.api_key_override.clone() {
        Some(key) => key,
        None => ctx.require_api_key()?,
    };
    info!(model = %request.model, "Sending one-shot prompt");

    let reply = ctx
        .completion_client()
        .call_with_prompt(
            &request.model,
            &prompt,
            Some(&request.system_prompt),
            request.temperature,
            &api_key,
            request.knowledge_context.as_deref(),
        )
        .await?;

    let lines = if plain || !ctx.settings.markdown_enabled() {
        render_plain(&reply, Style::default())
    } else {
        let theme = Theme::from_name(ctx.settings.theme_name());
        render_markdown(&reply, &theme, Style::default(), false)
    };
    for line in lines {
        println!("{line}");
    }
    Ok(())
}
