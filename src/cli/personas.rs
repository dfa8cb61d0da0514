//! `mycelial personas`: manage the persona catalog.

use std::error::Error;

use crate::cli::context::CliContext;
use crate::cli::PersonaCommands;
use crate::core::config::SystemPersona;
use crate::core::constants::DEFAULT_GRADIENT;
use crate::ui::theme::parse_hex_color;

fn persona_line(persona: &SystemPersona) -> String {
    let mut tags = Vec::new();
    if persona.is_system() {
        tags.push("built-in");
    }
    if !persona.is_visible_in_chat() {
        tags.push("hidden");
    }
    let tags = if tags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", tags.join(", "))
    };
    let description = if persona.description.is_empty() {
        String::new()
    } else {
        format!(" - {}", persona.description)
    };
    format!("  • {} ({}){}{}", persona.name, persona.id, tags, description)
}

pub fn run_personas(
    ctx: &mut CliContext,
    command: Option<PersonaCommands>,
) -> Result<(), Box<dyn Error>> {
    match command.unwrap_or(PersonaCommands::List) {
        PersonaCommands::List => {
            println!("Personas:\n");
            for persona in &ctx.settings.system_personas {
                println!("{}", persona_line(persona));
            }
            println!("\n💡 Add your own with: mycelial personas add <name> --prompt <text>");
        }
        PersonaCommands::Add {
            name,
            prompt,
            color,
            description,
        } => {
            let prompt = prompt.join(" ");
            if prompt.trim().is_empty() {
                return Err("A persona needs a prompt (--prompt <text>)".into());
            }
            let color = color.unwrap_or_else(|| DEFAULT_GRADIENT.0.to_string());
            if parse_hex_color(&color).is_none() {
                return Err(format!("Invalid colour '{color}', expected #RRGGBB").into());
            }
            let id = ctx
                .settings
                .add_persona(&name, prompt.trim(), &color)?
                .id
                .clone();
            if let Some(description) = description {
                ctx.settings
                    .update_persona(&id, |p| p.description = description)?;
            }
            ctx.save_settings()?;
            println!("✅ Added persona '{name}' ({id})");
        }
        PersonaCommands::Remove { id } => {
            let removed = ctx.settings.remove_persona(&id)?;
            ctx.save_settings()?;
            println!("✅ Removed persona '{}'", removed.name);
        }
        PersonaCommands::Show { id } => {
            ctx.settings.set_persona_visibility(&id, true)?;
            ctx.save_settings()?;
            println!("✅ Persona '{id}' is shown in the chat picker");
        }
        PersonaCommands::Hide { id } => {
            ctx.settings.set_persona_visibility(&id, false)?;
            ctx.save_settings()?;
            println!("✅ Persona '{id}' is hidden from the chat picker");
        }
    }
    Ok(())
}
