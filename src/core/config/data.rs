use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A named system-prompt fragment that biases assistant behaviour when
/// selected. Workspaces refer to personas by `id` only.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SystemPersona {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub prompt_addition: String,
    pub icon_color: String,
    pub gradient_from: Option<String>,
    pub gradient_to: Option<String>,
    /// Shipped with the binary; may be hidden but not removed.
    pub is_system: Option<bool>,
    /// `None` counts as visible.
    pub visible_in_chat: Option<bool>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl SystemPersona {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        prompt_addition: impl Into<String>,
        icon_color: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            prompt_addition: prompt_addition.into(),
            icon_color: icon_color.into(),
            gradient_from: None,
            gradient_to: None,
            is_system: None,
            visible_in_chat: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_system(&self) -> bool {
        self.is_system.unwrap_or(false)
    }

    pub fn is_visible_in_chat(&self) -> bool {
        self.visible_in_chat != Some(false)
    }
}

/// Process-wide settings: API credentials, the default system prompt and the
/// persona catalog. Loaded at startup and saved on explicit updates.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct GlobalSettings {
    /// Plaintext fallback; the system keyring is preferred.
    pub openrouter_api_key: Option<String>,
    pub default_system_prompt: Option<String>,
    pub default_model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub api_base_url: Option<String>,
    /// Enable markdown rendering in the chat area
    pub markdown: Option<bool>,
    /// Enable syntax highlighting for fenced code blocks when markdown is enabled
    pub syntax: Option<bool>,
    /// Show the effective system prompt above the transcript
    pub show_system_prompt: Option<bool>,
    /// Colour theme for the chat view: "dark" or "light"
    pub theme: Option<String>,
    #[serde(default)]
    pub system_personas: Vec<SystemPersona>,
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}

/// Generate a persona id from a display name: lowercase, alphanumerics kept,
/// runs of anything else collapsed into a single dash.
pub fn suggest_persona_id(display_name: &str) -> String {
    let mut id = String::new();
    for c in display_name.trim().to_lowercase().chars() {
        if c.is_alphanumeric() {
            id.push(c);
        } else if !id.ends_with('-') && !id.is_empty() {
            id.push('-');
        }
    }
    id.trim_end_matches('-').to_string()
}
