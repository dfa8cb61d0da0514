use crate::core::config::data::{suggest_persona_id, GlobalSettings, SystemPersona};
use crate::core::constants::{DEFAULT_GRADIENT, FALLBACK_SYSTEM_PROMPT};
use std::fmt;

/// Compose the effective system prompt.
///
/// The base is the workspace's custom prompt when it is non-empty, otherwise
/// the global default, otherwise [`FALLBACK_SYSTEM_PROMPT`]. A selected
/// persona's addition is placed in front of the base, separated by a blank
/// line. The result is never empty.
pub fn resolve_system_prompt(
    workspace_custom_prompt: Option<&str>,
    global_default_prompt: &str,
    persona: Option<&SystemPersona>,
) -> String {
    let base = workspace_custom_prompt
        .filter(|prompt| !prompt.is_empty())
        .or(Some(global_default_prompt).filter(|prompt| !prompt.is_empty()))
        .unwrap_or(FALLBACK_SYSTEM_PROMPT);

    match persona {
        Some(persona) => format!("{}\n\n{}", persona.prompt_addition, base),
        None => base.to_string(),
    }
}

/// Colour swatch shown next to a persona in the picker and input border.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersonaSwatch {
    Solid(String),
    Gradient { from: String, to: String },
}

impl PersonaSwatch {
    /// The swatch for an optional persona; no persona gets the workspace
    /// gradient.
    pub fn for_persona(persona: Option<&SystemPersona>) -> Self {
        match persona {
            Some(persona) => match (&persona.gradient_from, &persona.gradient_to) {
                (Some(from), Some(to)) => PersonaSwatch::Gradient {
                    from: from.clone(),
                    to: to.clone(),
                },
                _ => PersonaSwatch::Solid(persona.icon_color.clone()),
            },
            None => PersonaSwatch::Gradient {
                from: DEFAULT_GRADIENT.0.to_string(),
                to: DEFAULT_GRADIENT.1.to_string(),
            },
        }
    }

    /// The colour used where only one can be drawn (terminal cells).
    pub fn primary(&self) -> &str {
        match self {
            PersonaSwatch::Solid(color) => color,
            PersonaSwatch::Gradient { from, .. } => from,
        }
    }
}

/// Avatar label for assistant messages: first two characters of the persona
/// name, or `AI`.
pub fn avatar_initials(persona: Option<&SystemPersona>) -> String {
    persona
        .map(|persona| persona.name.chars().take(2).collect::<String>())
        .filter(|initials| !initials.is_empty())
        .unwrap_or_else(|| "AI".to_string())
}

/// Read-only view over the persona catalog held in [`GlobalSettings`].
pub struct PersonaCatalog<'a> {
    personas: &'a [SystemPersona],
}

impl<'a> PersonaCatalog<'a> {
    pub fn new(personas: &'a [SystemPersona]) -> Self {
        Self { personas }
    }

    pub fn from_settings(settings: &'a GlobalSettings) -> Self {
        Self::new(&settings.system_personas)
    }

    pub fn list(&self) -> &'a [SystemPersona] {
        self.personas
    }

    pub fn find(&self, id: &str) -> Option<&'a SystemPersona> {
        self.personas.iter().find(|p| p.id == id)
    }

    /// Resolve a workspace's persona reference. Ids that no longer exist in
    /// the catalog resolve to `None`.
    pub fn resolve_selected(&self, selected_id: Option<&str>) -> Option<&'a SystemPersona> {
        selected_id.and_then(|id| self.find(id))
    }

    /// Personas offered in the chat picker.
    pub fn visible_in_chat(&self) -> Vec<&'a SystemPersona> {
        self.personas
            .iter()
            .filter(|p| p.is_visible_in_chat())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersonaError {
    NotFound { id: String, available: Vec<String> },
    DuplicateId(String),
    BuiltinNotRemovable(String),
    EmptyName,
}

impl fmt::Display for PersonaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersonaError::NotFound { id, available } => write!(
                f,
                "Persona '{}' not found. Available personas: {}",
                id,
                available.join(", ")
            ),
            PersonaError::DuplicateId(id) => write!(f, "A persona with id '{id}' already exists"),
            PersonaError::BuiltinNotRemovable(id) => write!(
                f,
                "Persona '{id}' is built in and cannot be removed; hide it instead"
            ),
            PersonaError::EmptyName => write!(f, "Persona name must not be empty"),
        }
    }
}

impl std::error::Error for PersonaError {}

impl GlobalSettings {
    fn persona_not_found(&self, id: &str) -> PersonaError {
        PersonaError::NotFound {
            id: id.to_string(),
            available: self.system_personas.iter().map(|p| p.id.clone()).collect(),
        }
    }

    /// Add a user persona. The id is derived from the name.
    pub fn add_persona(
        &mut self,
        name: &str,
        prompt_addition: &str,
        icon_color: &str,
    ) -> Result<&SystemPersona, PersonaError> {
        let id = suggest_persona_id(name);
        if id.is_empty() {
            return Err(PersonaError::EmptyName);
        }
        if self.system_personas.iter().any(|p| p.id == id) {
            return Err(PersonaError::DuplicateId(id));
        }
        self.system_personas.push(SystemPersona::new(
            id,
            name.trim(),
            prompt_addition,
            icon_color,
        ));
        Ok(&self.system_personas[self.system_personas.len() - 1])
    }

    pub fn update_persona<F>(&mut self, id: &str, update: F) -> Result<(), PersonaError>
    where
        F: FnOnce(&mut SystemPersona),
    {
        let index = self
            .system_personas
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| self.persona_not_found(id))?;
        update(&mut self.system_personas[index]);
        Ok(())
    }

    pub fn set_persona_visibility(&mut self, id: &str, visible: bool) -> Result<(), PersonaError> {
        self.update_persona(id, |persona| persona.visible_in_chat = Some(visible))
    }

    /// Remove a user persona. Workspaces that still reference it fall back to
    /// no persona when resolved.
    pub fn remove_persona(&mut self, id: &str) -> Result<SystemPersona, PersonaError> {
        let index = self
            .system_personas
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| self.persona_not_found(id))?;
        if self.system_personas[index].is_system() {
            return Err(PersonaError::BuiltinNotRemovable(id.to_string()));
        }
        Ok(self.system_personas.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terse() -> SystemPersona {
        SystemPersona::new("terse", "Terse", "Be terse.", "#14b8a6")
    }

    fn create_test_settings() -> GlobalSettings {
        let mut gradient = SystemPersona::new("poet", "Poet", "Answer in verse.", "#ff00ff");
        gradient.gradient_from = Some("#111111".to_string());
        gradient.gradient_to = Some("#222222".to_string());
        let mut hidden = SystemPersona::new("hidden", "Hidden", "Secret.", "#000000");
        hidden.visible_in_chat = Some(false);
        let mut builtin = SystemPersona::new("builtin", "Builtin", "Shipped.", "#ffffff");
        builtin.is_system = Some(true);

        GlobalSettings {
            system_personas: vec![terse(), gradient, hidden, builtin],
            ..Default::default()
        }
    }

    #[test]
    fn test_persona_prefixes_default_prompt() {
        let persona = terse();
        let result = resolve_system_prompt(None, "You are a helpful assistant.", Some(&persona));
        assert_eq!(result, "Be terse.\n\nYou are a helpful assistant.");
    }

    #[test]
    fn test_custom_prompt_overrides_default() {
        assert_eq!(
            resolve_system_prompt(Some("Workspace prompt."), "Global.", None),
            "Workspace prompt."
        );
        let persona = terse();
        assert_eq!(
            resolve_system_prompt(Some("Workspace prompt."), "Global.", Some(&persona)),
            "Be terse.\n\nWorkspace prompt."
        );
    }

    #[test]
    fn test_no_persona_returns_base_exactly() {
        assert_eq!(resolve_system_prompt(None, "Global.", None), "Global.");
        assert_eq!(resolve_system_prompt(Some(""), "Global.", None), "Global.");
    }

    #[test]
    fn test_resolved_prompt_is_never_empty() {
        let empty_persona = SystemPersona::new("blank", "Blank", "", "#000000");
        let cases: [(Option<&str>, &str, Option<&SystemPersona>, String); 4] = [
            (None, "", None, FALLBACK_SYSTEM_PROMPT.to_string()),
            (Some(""), "", None, FALLBACK_SYSTEM_PROMPT.to_string()),
            (
                None,
                "",
                Some(&empty_persona),
                format!("\n\n{FALLBACK_SYSTEM_PROMPT}"),
            ),
            // Only the empty string counts as unset; whitespace is kept.
            (Some(" "), "", None, " ".to_string()),
        ];
        for (custom, default, persona, expected) in cases {
            let result = resolve_system_prompt(custom, default, persona);
            assert!(!result.is_empty());
            assert_eq!(result, expected);
        }
    }

    #[test]
    fn test_persona_addition_is_not_validated() {
        let persona = SystemPersona::new("blank", "Blank", "", "#000000");
        assert_eq!(
            resolve_system_prompt(None, "Base.", Some(&persona)),
            "\n\nBase."
        );
    }

    #[test]
    fn test_dangling_persona_reference_resolves_to_none() {
        let settings = create_test_settings();
        let catalog = PersonaCatalog::from_settings(&settings);
        assert!(catalog.resolve_selected(Some("deleted-persona")).is_none());
        assert!(catalog.resolve_selected(None).is_none());
        assert_eq!(
            catalog.resolve_selected(Some("terse")).map(|p| p.id.as_str()),
            Some("terse")
        );
    }

    #[test]
    fn test_removed_persona_dangles_safely() {
        let mut settings = create_test_settings();
        settings.remove_persona("terse").expect("remove");
        let catalog = PersonaCatalog::from_settings(&settings);
        let persona = catalog.resolve_selected(Some("terse"));
        assert!(persona.is_none());
        assert_eq!(resolve_system_prompt(None, "Base.", persona), "Base.");
    }

    #[test]
    fn test_visible_in_chat_filters_hidden() {
        let settings = create_test_settings();
        let catalog = PersonaCatalog::from_settings(&settings);
        let visible: Vec<&str> = catalog
            .visible_in_chat()
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(visible, vec!["terse", "poet", "builtin"]);
    }

    #[test]
    fn test_swatch_prefers_gradient() {
        let settings = create_test_settings();
        let catalog = PersonaCatalog::from_settings(&settings);
        assert_eq!(
            PersonaSwatch::for_persona(catalog.find("poet")),
            PersonaSwatch::Gradient {
                from: "#111111".into(),
                to: "#222222".into()
            }
        );
        assert_eq!(
            PersonaSwatch::for_persona(catalog.find("terse")),
            PersonaSwatch::Solid("#14b8a6".into())
        );
        assert_eq!(PersonaSwatch::for_persona(None).primary(), "#9b87f5");
    }

    #[test]
    fn test_avatar_initials() {
        let persona = terse();
        assert_eq!(avatar_initials(Some(&persona)), "Te");
        assert_eq!(avatar_initials(None), "AI");
        let nameless = SystemPersona::new("x", "", "", "#000000");
        assert_eq!(avatar_initials(Some(&nameless)), "AI");
    }

    #[test]
    fn test_add_and_remove_personas() {
        let mut settings = create_test_settings();
        let added = settings
            .add_persona("Code Reviewer", "Review code.", "#123456")
            .expect("add");
        assert_eq!(added.id, "code-reviewer");

        let duplicate = settings.add_persona("code reviewer", "Again.", "#123456");
        assert_eq!(
            duplicate.unwrap_err(),
            PersonaError::DuplicateId("code-reviewer".into())
        );
        assert_eq!(
            settings.add_persona("  ", "x", "#000000").unwrap_err(),
            PersonaError::EmptyName
        );

        assert!(matches!(
            settings.remove_persona("builtin"),
            Err(PersonaError::BuiltinNotRemovable(_))
        ));
        let err = settings.remove_persona("nope").unwrap_err();
        assert!(err.to_string().contains("Persona 'nope' not found"));
        assert!(err.to_string().contains("code-reviewer"));
    }

    #[test]
    fn test_hide_and_show_persona() {
        let mut settings = create_test_settings();
        settings.set_persona_visibility("builtin", false).expect("hide");
        assert!(!PersonaCatalog::from_settings(&settings)
            .find("builtin")
            .expect("still present")
            .is_visible_in_chat());
        settings.set_persona_visibility("builtin", true).expect("show");
        assert!(settings.system_personas[3].is_visible_in_chat());
        assert!(settings.set_persona_visibility("missing", true).is_err());
    }
}
