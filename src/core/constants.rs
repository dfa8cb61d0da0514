//! Shared constants used across the application

/// Used whenever neither the workspace nor the global settings supply a
/// non-empty system prompt.
pub const FALLBACK_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

pub const DEFAULT_API_BASE_URL: &str = "https://openrouter.ai/api/v1";

pub const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";

pub const DEFAULT_TEMPERATURE: f32 = 0.7;

pub const DEFAULT_MAX_TOKENS: u32 = 4000;

pub const DEFAULT_THEME: &str = "dark";

/// Theme names accepted by `mycelial set theme`.
pub const THEME_NAMES: &[&str] = &["dark", "light"];

/// Sent as `X-Title` so the API dashboard can attribute traffic.
pub const APP_TITLE: &str = "Mycelial AI";

/// Sent as `HTTP-Referer`.
pub const APP_REFERER: &str = "https://github.com/mycelial-ai/mycelial";

/// Environment variable that overrides the stored API key.
pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// Gradient used for the persona swatch when no persona is selected.
pub const DEFAULT_GRADIENT: (&str, &str) = ("#9b87f5", "#D946EF");
