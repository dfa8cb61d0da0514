//! `mycelial models`: list completion-capable models.

use std::error::Error;

use crate::api::models::{fetch_models, sort_models};
use crate::api::ModelInfo;
use crate::cli::context::CliContext;

fn format_context_length(tokens: u64) -> String {
    if tokens >= 1_000_000 && tokens % 1_000_000 == 0 {
        format!("{}M", tokens / 1_000_000)
    } else if tokens >= 1_000 {
        format!("{}K", tokens / 1_000)
    } else {
        tokens.to_string()
    }
}

fn model_lines(model: &ModelInfo, default_model: &str) -> Vec<String> {
    let marker = if model.id == default_model { " (default)" } else { "" };
    let mut lines = vec![format!("  • {}{}", model.id, marker)];
    let name = model.display_name();
    if name != model.id {
        lines.push(format!("    Name: {name}"));
    }
    if let Some(tokens) = model.context_length.filter(|t| *t > 0) {
        lines.push(format!("    Context: {} tokens", format_context_length(tokens)));
    }
    lines
}

pub async fn list_models(ctx: &CliContext) -> Result<(), Box<dyn Error>> {
    let api_key = ctx.require_api_key()?;
    let base_url = ctx.settings.api_base_url();

    let client = reqwest::Client::new();
    let mut models = fetch_models(&client, base_url, &api_key).await?;
    sort_models(&mut models);

    println!("🤖 Available models at {base_url}");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!();
    if models.is_empty() {
        println!("No completion-capable models found.");
        return Ok(());
    }

    let default_model = ctx.settings.default_model();
    println!("Found {} models:", models.len());
    println!();
    for model in &models {
        for line in model_lines(model, default_model) {
            println!("{line}");
        }
    }
    println!();
    println!("💡 Set a default with: mycelial set default-model <id>");
    Ok(())
}
