use super::{SettingError, SettingHandler};
use crate::core::config::GlobalSettings;
use crate::core::constants::{
    DEFAULT_API_BASE_URL, DEFAULT_MODEL, DEFAULT_THEME, FALLBACK_SYSTEM_PROMPT, THEME_NAMES,
};
use crate::utils::url::validate_base_url;

pub fn parse_bool(input: &str) -> Option<bool> {
    match input.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Some(true),
        "off" | "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

pub fn format_bool(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

fn required(
    args: &[String],
    hint: &'static str,
    example: &'static str,
) -> Result<String, SettingError> {
    let value = args.join(" ");
    if value.trim().is_empty() {
        return Err(SettingError::MissingArgs { hint, example });
    }
    Ok(value.trim().to_string())
}

/// On/off settings stored as `Option<bool>`.
pub struct BooleanHandler {
    key: &'static str,
    hint: &'static str,
    example: &'static str,
    default: bool,
    get: fn(&GlobalSettings) -> Option<bool>,
    set_field: fn(&mut GlobalSettings, Option<bool>),
}

impl SettingHandler for BooleanHandler {
    fn key(&self) -> &'static str {
        self.key
    }

    fn set(&self, args: &[String], settings: &mut GlobalSettings) -> Result<String, SettingError> {
        let input = required(args, self.hint, self.example)?;
        let value = parse_bool(&input).ok_or(SettingError::InvalidBoolean(input))?;
        (self.set_field)(settings, Some(value));
        Ok(format!("✅ Set {} to: {}", self.key, format_bool(value)))
    }

    fn unset(&self, settings: &mut GlobalSettings) -> String {
        (self.set_field)(settings, None);
        format!(
            "✅ Unset {} (will use default: {})",
            self.key,
            format_bool(self.default)
        )
    }

    fn format(&self, settings: &GlobalSettings) -> String {
        match (self.get)(settings) {
            Some(value) => format!("  {}: {}", self.key, format_bool(value)),
            None => format!(
                "  {}: (unset, default: {})",
                self.key,
                format_bool(self.default)
            ),
        }
    }
}

pub fn markdown_handler() -> BooleanHandler {
    BooleanHandler {
        key: "markdown",
        hint: "To set markdown rendering, specify on or off:",
        example: "mycelial set markdown off",
        default: true,
        get: |s| s.markdown,
        set_field: |s, v| s.markdown = v,
    }
}

pub fn syntax_handler() -> BooleanHandler {
    BooleanHandler {
        key: "syntax",
        hint: "To set syntax highlighting, specify on or off:",
        example: "mycelial set syntax off",
        default: true,
        get: |s| s.syntax,
        set_field: |s, v| s.syntax = v,
    }
}

pub fn show_system_prompt_handler() -> BooleanHandler {
    BooleanHandler {
        key: "show-system-prompt",
        hint: "To show the system prompt above the transcript, specify on or off:",
        example: "mycelial set show-system-prompt on",
        default: false,
        get: |s| s.show_system_prompt,
        set_field: |s, v| s.show_system_prompt = v,
    }
}

/// Free-text settings stored as `Option<String>`.
pub struct TextHandler {
    key: &'static str,
    hint: &'static str,
    example: &'static str,
    default: &'static str,
    get: fn(&GlobalSettings) -> Option<&str>,
    set_field: fn(&mut GlobalSettings, Option<String>),
}

impl SettingHandler for TextHandler {
    fn key(&self) -> &'static str {
        self.key
    }

    fn set(&self, args: &[String], settings: &mut GlobalSettings) -> Result<String, SettingError> {
        let value = required(args, self.hint, self.example)?;
        let message = format!("✅ Set {} to: {}", self.key, value);
        (self.set_field)(settings, Some(value));
        Ok(message)
    }

    fn unset(&self, settings: &mut GlobalSettings) -> String {
        (self.set_field)(settings, None);
        format!("✅ Unset {} (will use default: {})", self.key, self.default)
    }

    fn format(&self, settings: &GlobalSettings) -> String {
        match (self.get)(settings) {
            Some(value) => format!("  {}: {}", self.key, value),
            None => format!("  {}: (unset, default: {})", self.key, self.default),
        }
    }
}

pub fn default_system_prompt_handler() -> TextHandler {
    TextHandler {
        key: "default-system-prompt",
        hint: "To set the default system prompt, give the prompt text:",
        example: "mycelial set default-system-prompt You are a careful reviewer.",
        default: FALLBACK_SYSTEM_PROMPT,
        get: |s| s.default_system_prompt.as_deref(),
        set_field: |s, v| s.default_system_prompt = v,
    }
}

pub fn default_model_handler() -> TextHandler {
    TextHandler {
        key: "default-model",
        hint: "To set the default model, give a model id (see `mycelial models`):",
        example: "mycelial set default-model anthropic/claude-3.5-sonnet",
        default: DEFAULT_MODEL,
        get: |s| s.default_model.as_deref(),
        set_field: |s, v| s.default_model = v,
    }
}

pub struct TemperatureHandler;

impl SettingHandler for TemperatureHandler {
    fn key(&self) -> &'static str {
        "temperature"
    }

    fn set(&self, args: &[String], settings: &mut GlobalSettings) -> Result<String, SettingError> {
        let input = required(
            args,
            "To set the sampling temperature, give a number between 0 and 2:",
            "mycelial set temperature 0.3",
        )?;
        let value = input
            .parse::<f32>()
            .ok()
            .filter(|t| (0.0..=2.0).contains(t))
            .ok_or(SettingError::InvalidNumber {
                key: "temperature",
                input,
            })?;
        settings.temperature = Some(value);
        Ok(format!("✅ Set temperature to: {value}"))
    }

    fn unset(&self, settings: &mut GlobalSettings) -> String {
        settings.temperature = None;
        format!(
            "✅ Unset temperature (will use default: {})",
            settings.temperature()
        )
    }

    fn format(&self, settings: &GlobalSettings) -> String {
        match settings.temperature {
            Some(value) => format!("  temperature: {value}"),
            None => format!(
                "  temperature: (unset, default: {})",
                settings.temperature()
            ),
        }
    }
}

pub struct MaxTokensHandler;

impl SettingHandler for MaxTokensHandler {
    fn key(&self) -> &'static str {
        "max-tokens"
    }

    fn set(&self, args: &[String], settings: &mut GlobalSettings) -> Result<String, SettingError> {
        let input = required(
            args,
            "To cap reply length, give a positive token count:",
            "mycelial set max-tokens 2000",
        )?;
        let value = input
            .parse::<u32>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or(SettingError::InvalidNumber {
                key: "max-tokens",
                input,
            })?;
        settings.max_tokens = Some(value);
        Ok(format!("✅ Set max-tokens to: {value}"))
    }

    fn unset(&self, settings: &mut GlobalSettings) -> String {
        settings.max_tokens = None;
        format!(
            "✅ Unset max-tokens (will use default: {})",
            settings.max_tokens()
        )
    }

    fn format(&self, settings: &GlobalSettings) -> String {
        match settings.max_tokens {
            Some(value) => format!("  max-tokens: {value}"),
            None => format!("  max-tokens: (unset, default: {})", settings.max_tokens()),
        }
    }
}

pub struct ApiBaseUrlHandler;

impl SettingHandler for ApiBaseUrlHandler {
    fn key(&self) -> &'static str {
        "api-base-url"
    }

    fn set(&self, args: &[String], settings: &mut GlobalSettings) -> Result<String, SettingError> {
        let input = required(
            args,
            "To use another OpenAI-compatible endpoint, give its base URL:",
            "mycelial set api-base-url http://localhost:11434/v1",
        )?;
        let url = validate_base_url(&input).ok_or(SettingError::InvalidUrl(input))?;
        let message = format!("✅ Set api-base-url to: {url}");
        settings.api_base_url = Some(url);
        Ok(message)
    }

    fn unset(&self, settings: &mut GlobalSettings) -> String {
        settings.api_base_url = None;
        format!("✅ Unset api-base-url (will use default: {DEFAULT_API_BASE_URL})")
    }

    fn format(&self, settings: &GlobalSettings) -> String {
        match settings.api_base_url.as_deref() {
            Some(url) => format!("  api-base-url: {url}"),
            None => format!("  api-base-url: (unset, default: {DEFAULT_API_BASE_URL})"),
        }
    }
}

pub struct ThemeHandler;

impl SettingHandler for ThemeHandler {
    fn key(&self) -> &'static str {
        "theme"
    }

    fn set(&self, args: &[String], settings: &mut GlobalSettings) -> Result<String, SettingError> {
        let input = required(
            args,
            "To change the chat colours, pick a theme:",
            "mycelial set theme light",
        )?;
        let name = input.to_ascii_lowercase();
        if !THEME_NAMES.contains(&name.as_str()) {
            return Err(SettingError::InvalidChoice {
                key: "theme",
                input,
                choices: THEME_NAMES,
            });
        }
        let message = format!("✅ Set theme to: {name}");
        settings.theme = Some(name);
        Ok(message)
    }

    fn unset(&self, settings: &mut GlobalSettings) -> String {
        settings.theme = None;
        format!("✅ Unset theme (will use default: {DEFAULT_THEME})")
    }

    fn format(&self, settings: &GlobalSettings) -> String {
        match settings.theme.as_deref() {
            Some(name) => format!("  theme: {name}"),
            None => format!("  theme: (unset, default: {DEFAULT_THEME})"),
        }
    }
}
