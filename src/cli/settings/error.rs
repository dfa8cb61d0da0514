use std::fmt;

use crate::core::config::ConfigError;

#[derive(Debug)]
pub enum SettingError {
    UnknownKey(String),
    InvalidBoolean(String),
    InvalidNumber { key: &'static str, input: String },
    InvalidUrl(String),
    InvalidChoice {
        key: &'static str,
        input: String,
        choices: &'static [&'static str],
    },
    MissingArgs {
        hint: &'static str,
        example: &'static str,
    },
    Save(ConfigError),
}

impl SettingError {
    /// Print to stderr, with a hint line where one helps.
    pub fn print(&self) {
        match self {
            SettingError::InvalidBoolean(_) => {
                eprintln!("❌ {self}");
                eprintln!("   Use 'on' or 'off' (also accepts true/false, yes/no)");
            }
            SettingError::MissingArgs { hint, example } => {
                eprintln!("⚠️  {hint}");
                eprintln!("Example: {example}");
            }
            _ => eprintln!("❌ {self}"),
        }
    }
}

impl fmt::Display for SettingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingError::UnknownKey(key) => write!(f, "Unknown config key: {key}"),
            SettingError::InvalidBoolean(input) => write!(f, "Invalid boolean value: {input}"),
            SettingError::InvalidNumber { key, input } => {
                write!(f, "Invalid value for {key}: {input}")
            }
            SettingError::InvalidUrl(input) => {
                write!(f, "Invalid API base URL: {input} (expected http:// or https://)")
            }
            SettingError::InvalidChoice {
                key,
                input,
                choices,
            } => write!(
                f,
                "Invalid value for {key}: {input} (choose one of: {})",
                choices.join(", ")
            ),
            SettingError::MissingArgs { hint, .. } => write!(f, "{hint}"),
            SettingError::Save(err) => write!(f, "Failed to save configuration: {err}"),
        }
    }
}

impl std::error::Error for SettingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingError::Save(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ConfigError> for SettingError {
    fn from(err: ConfigError) -> Self {
        SettingError::Save(err)
    }
}
