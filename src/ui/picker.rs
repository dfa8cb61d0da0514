use crate::core::chat::DEFAULT_PERSONA_NOTICE;
use crate::core::config::SystemPersona;
use crate::core::persona::PersonaSwatch;

#[derive(Debug, Clone, PartialEq)]
pub struct PickerItem {
    /// `None` is the "no persona" entry.
    pub id: Option<String>,
    pub label: String,
    pub description: String,
    pub color: String,
}

#[derive(Debug, Clone)]
pub struct PickerState {
    pub title: String,
    pub items: Vec<PickerItem>,
    pub selected: usize,
}

impl PickerState {
    pub fn new<T: Into<String>>(title: T, items: Vec<PickerItem>, selected: usize) -> Self {
        let selected = selected.min(items.len().saturating_sub(1));
        Self {
            title: title.into(),
            items,
            selected,
        }
    }

    /// Dropdown listing the default entry and every persona visible in chat,
    /// with the current selection highlighted.
    pub fn for_personas(personas: &[&SystemPersona], selected_id: Option<&str>) -> Self {
        let mut items = Vec::with_capacity(personas.len() + 1);
        items.push(PickerItem {
            id: None,
            label: DEFAULT_PERSONA_NOTICE.to_string(),
            description: "Workspace system prompt only".to_string(),
            color: PersonaSwatch::for_persona(None).primary().to_string(),
        });
        items.extend(personas.iter().map(|persona| PickerItem {
            id: Some(persona.id.clone()),
            label: persona.name.clone(),
            description: persona.description.clone(),
            color: PersonaSwatch::for_persona(Some(persona)).primary().to_string(),
        }));
        let selected = selected_id
            .and_then(|id| items.iter().position(|i| i.id.as_deref() == Some(id)))
            .unwrap_or(0);
        Self::new("Persona", items, selected)
    }

    pub fn selected_item(&self) -> Option<&PickerItem> {
        self.items.get(self.selected)
    }

    pub fn move_up(&mut self) {
        if !self.items.is_empty() {
            if self.selected == 0 {
                self.selected = self.items.len() - 1;
            } else {
                self.selected -= 1;
            }
        }
    }

    pub fn move_down(&mut self) {
        if !self.items.is_empty() {
            self.selected = (self.selected + 1) % self.items.len();
        }
    }
}
