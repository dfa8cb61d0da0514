use std::error::Error;
use std::path::PathBuf;

use tracing::debug;

use crate::core::completion::CompletionClient;
use crate::core::config::GlobalSettings;
use crate::core::constants::API_KEY_ENV;
use crate::core::credentials::ApiKeyStore;
use crate::core::workspace::WorkspaceStore;

/// Settings and credentials shared by every subcommand.
pub struct CliContext {
    pub settings: GlobalSettings,
    pub keys: ApiKeyStore,
}

impl CliContext {
    pub fn load() -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            settings: GlobalSettings::load()?,
            keys: ApiKeyStore::new(),
        })
    }

    pub fn api_key(&self) -> Option<String> {
        let (key, source) = self.keys.resolve(&self.settings)?;
        debug!(source = %source, "Resolved API key");
        Some(key)
    }

    pub fn require_api_key(&self) -> Result<String, Box<dyn Error>> {
        self.api_key().ok_or_else(|| {
            format!(
                "No API key configured.\n\nEither run `mycelial auth` or set {API_KEY_ENV}."
            )
            .into()
        })
    }

    pub fn completion_client(&self) -> CompletionClient {
        CompletionClient::new(reqwest::Client::new(), self.settings.api_base_url())
            .with_max_tokens(self.settings.max_tokens())
    }

    pub fn save_settings(&self) -> Result<(), Box<dyn Error>> {
        self.settings.save()?;
        Ok(())
    }
}

/// The workspace store and the path it was loaded from.
pub fn load_store() -> Result<(WorkspaceStore, PathBuf), Box<dyn Error>> {
    let path = WorkspaceStore::default_path()?;
    let store = WorkspaceStore::load_from_path(&path)?;
    Ok((store, path))
}
