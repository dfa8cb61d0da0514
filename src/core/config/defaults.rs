use crate::core::config::data::{GlobalSettings, SystemPersona};
use crate::core::constants::{
    DEFAULT_API_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE, DEFAULT_THEME,
    FALLBACK_SYSTEM_PROMPT,
};

struct BuiltinPersona {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    prompt_addition: &'static str,
    icon_color: &'static str,
    gradient: Option<(&'static str, &'static str)>,
}

const BUILTIN_PERSONAS: &[BuiltinPersona] = &[
    BuiltinPersona {
        id: "concise",
        name: "Concise",
        description: "Short, direct answers",
        prompt_addition: "Be terse. Answer in as few words as the question allows.",
        icon_color: "#14b8a6",
        gradient: None,
    },
    BuiltinPersona {
        id: "mentor",
        name: "Mentor",
        description: "Explains concepts step by step",
        prompt_addition: "Act as a patient mentor. Explain your reasoning step by step and check understanding with short examples.",
        icon_color: "#f59e0b",
        gradient: Some(("#f59e0b", "#ef4444")),
    },
    BuiltinPersona {
        id: "engineer",
        name: "Engineer",
        description: "Precise technical answers with code",
        prompt_addition: "Act as a senior software engineer. Prefer precise answers, show code in fenced blocks tagged with their language, and call out trade-offs.",
        icon_color: "#3b82f6",
        gradient: Some(("#3b82f6", "#8b5cf6")),
    },
    BuiltinPersona {
        id: "critic",
        name: "Critic",
        description: "Finds weaknesses and counterarguments",
        prompt_addition: "Act as a constructive critic. Point out weaknesses, missing evidence and counterarguments before agreeing with anything.",
        icon_color: "#e11d48",
        gradient: None,
    },
];

pub fn builtin_personas() -> Vec<SystemPersona> {
    BUILTIN_PERSONAS
        .iter()
        .map(|builtin| {
            let mut persona = SystemPersona::new(
                builtin.id,
                builtin.name,
                builtin.prompt_addition,
                builtin.icon_color,
            );
            persona.description = builtin.description.to_string();
            persona.gradient_from = builtin.gradient.map(|(from, _)| from.to_string());
            persona.gradient_to = builtin.gradient.map(|(_, to)| to.to_string());
            persona.is_system = Some(true);
            persona
        })
        .collect()
}

impl GlobalSettings {
    /// Add any built-in persona whose id is not already in the catalog.
    /// User edits to built-ins (such as hiding them) are preserved.
    pub fn seed_builtin_personas(&mut self) {
        for builtin in builtin_personas() {
            if !self.system_personas.iter().any(|p| p.id == builtin.id) {
                self.system_personas.push(builtin);
            }
        }
    }

    /// The configured default prompt, or the hard-coded fallback when it is
    /// unset or blank. Never empty.
    pub fn default_system_prompt(&self) -> &str {
        self.default_system_prompt
            .as_deref()
            .filter(|prompt| !prompt.is_empty())
            .unwrap_or(FALLBACK_SYSTEM_PROMPT)
    }

    pub fn default_model(&self) -> &str {
        self.default_model
            .as_deref()
            .filter(|model| !model.trim().is_empty())
            .unwrap_or(DEFAULT_MODEL)
    }

    pub fn temperature(&self) -> f32 {
        self.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)
    }

    pub fn api_base_url(&self) -> &str {
        self.api_base_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(DEFAULT_API_BASE_URL)
    }

    pub fn markdown_enabled(&self) -> bool {
        self.markdown.unwrap_or(true)
    }

    pub fn syntax_enabled(&self) -> bool {
        self.syntax.unwrap_or(true)
    }

    pub fn show_system_prompt(&self) -> bool {
        self.show_system_prompt.unwrap_or(false)
    }

    pub fn theme_name(&self) -> &str {
        self.theme
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(DEFAULT_THEME)
    }
}
