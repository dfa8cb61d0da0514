use std::collections::HashMap;

use super::handlers::{
    default_model_handler, default_system_prompt_handler, markdown_handler,
    show_system_prompt_handler, syntax_handler, ApiBaseUrlHandler, MaxTokensHandler,
    TemperatureHandler, ThemeHandler,
};
use super::{SettingError, SettingHandler};
use crate::core::config::GlobalSettings;

pub struct SettingRegistry {
    handlers: HashMap<&'static str, Box<dyn SettingHandler>>,
    display_order: Vec<&'static str>,
}

impl Default for SettingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            handlers: HashMap::new(),
            display_order: Vec::new(),
        };

        registry.register(Box::new(default_system_prompt_handler()));
        registry.register(Box::new(default_model_handler()));
        registry.register(Box::new(TemperatureHandler));
        registry.register(Box::new(MaxTokensHandler));
        registry.register(Box::new(ApiBaseUrlHandler));
        registry.register(Box::new(markdown_handler()));
        registry.register(Box::new(syntax_handler()));
        registry.register(Box::new(show_system_prompt_handler()));
        registry.register(Box::new(ThemeHandler));

        registry
    }

    fn register(&mut self, handler: Box<dyn SettingHandler>) {
        let key = handler.key();
        self.display_order.push(key);
        self.handlers.insert(key, handler);
    }

    pub fn get(&self, key: &str) -> Result<&dyn SettingHandler, SettingError> {
        self.handlers
            .get(key)
            .map(|h| h.as_ref())
            .ok_or_else(|| SettingError::UnknownKey(key.to_string()))
    }

    pub fn keys(&self) -> &[&'static str] {
        &self.display_order
    }

    /// Lines describing every setting, in registration order.
    pub fn describe(&self, settings: &GlobalSettings) -> Vec<String> {
        self.display_order
            .iter()
            .filter_map(|key| self.handlers.get(key))
            .map(|handler| handler.format(settings))
            .collect()
    }
}
