//! `mycelial auth` and `mycelial deauth`.

use std::error::Error;

use crate::cli::prompt::{confirm, prompt_secret};
use crate::core::config::GlobalSettings;
use crate::core::constants::API_KEY_ENV;
use crate::core::credentials::ApiKeyStore;

const KEY_PROMPT: &str = "Enter your OpenRouter API key: ";

pub fn run_auth(keys: &ApiKeyStore) -> Result<(), Box<dyn Error>> {
    println!("🔐 Mycelial authentication");
    println!("Get a key at https://openrouter.ai/keys");
    println!();

    let token = prompt_secret(KEY_PROMPT)?;
    let token = token.trim();
    if token.is_empty() {
        return Err("No API key entered".into());
    }

    match keys.set(token) {
        Ok(()) => {
            println!("✅ API key stored in the system keyring");
        }
        Err(err) => {
            eprintln!("⚠️  Could not store the key in the system keyring: {err}");
            if !confirm("Store it in plain text in config.toml instead?")? {
                return Err("API key not stored".into());
            }
            let mut settings = GlobalSettings::load()?;
            settings.openrouter_api_key = Some(token.to_string());
            settings.save()?;
            println!("✅ API key stored in config.toml");
        }
    }

    if std::env::var(API_KEY_ENV).is_ok_and(|v| !v.trim().is_empty()) {
        println!("💡 {API_KEY_ENV} is set and takes precedence over the stored key.");
    }
    Ok(())
}

pub fn run_deauth(keys: &ApiKeyStore) -> Result<(), Box<dyn Error>> {
    let removed_from_keyring = keys.remove()?;

    let mut settings = GlobalSettings::load()?;
    let removed_from_config = settings.openrouter_api_key.take().is_some();
    if removed_from_config {
        settings.save()?;
    }

    match (removed_from_keyring, removed_from_config) {
        (false, false) => println!("No stored API key found."),
        (true, false) => println!("✅ Removed API key from the system keyring"),
        (false, true) => println!("✅ Removed API key from config.toml"),
        (true, true) => println!("✅ Removed API key from the system keyring and config.toml"),
    }
    Ok(())
}
