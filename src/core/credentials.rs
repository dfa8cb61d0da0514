//! API key lookup: environment, then the system keyring, then `config.toml`.

use std::error::Error;
use std::fmt;

use keyring::Entry;
use tracing::debug;

use crate::core::config::GlobalSettings;
use crate::core::constants::API_KEY_ENV;

const KEYRING_SERVICE: &str = "mycelial";
const KEYRING_USER: &str = "openrouter";

/// Describes failures when attempting to access the system keyring.
///
/// Recoverable errors mean the backend was temporarily unavailable, for
/// example a locked keychain.
#[derive(Debug)]
pub enum KeyringAccessError {
    Recoverable(keyring::Error),
    Permanent(keyring::Error),
}

impl KeyringAccessError {
    fn inner(&self) -> &keyring::Error {
        match self {
            KeyringAccessError::Recoverable(err) | KeyringAccessError::Permanent(err) => err,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        matches!(self, KeyringAccessError::Recoverable(_))
    }
}

impl From<keyring::Error> for KeyringAccessError {
    fn from(err: keyring::Error) -> Self {
        match err {
            keyring::Error::PlatformFailure(_) | keyring::Error::NoStorageAccess(_) => {
                KeyringAccessError::Recoverable(err)
            }
            other => KeyringAccessError::Permanent(other),
        }
    }
}

impl fmt::Display for KeyringAccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner())
    }
}

impl Error for KeyringAccessError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.inner())
    }
}

/// Where the resolved key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Environment,
    Keyring,
    Config,
}

impl fmt::Display for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            KeySource::Environment => API_KEY_ENV,
            KeySource::Keyring => "system keyring",
            KeySource::Config => "config.toml",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ApiKeyStore {
    use_keyring: bool,
}

impl Default for ApiKeyStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiKeyStore {
    pub fn new() -> Self {
        Self { use_keyring: true }
    }

    pub fn new_with_keyring(use_keyring: bool) -> Self {
        Self { use_keyring }
    }

    pub fn get(&self) -> Result<Option<String>, KeyringAccessError> {
        if !self.use_keyring {
            return Ok(None);
        }

        let entry = Entry::new(KEYRING_SERVICE, KEYRING_USER)?;
        match entry.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(err) => Err(KeyringAccessError::from(err)),
        }
    }

    pub fn set(&self, token: &str) -> Result<(), KeyringAccessError> {
        if !self.use_keyring {
            return Ok(());
        }

        let entry = Entry::new(KEYRING_SERVICE, KEYRING_USER)?;
        entry.set_password(token).map_err(KeyringAccessError::from)
    }

    /// Returns whether a stored key was actually removed.
    pub fn remove(&self) -> Result<bool, KeyringAccessError> {
        if !self.use_keyring {
            return Ok(false);
        }

        let entry = Entry::new(KEYRING_SERVICE, KEYRING_USER)?;
        match entry.delete_credential() {
            Ok(()) => Ok(true),
            Err(keyring::Error::NoEntry) => Ok(false),
            Err(err) => Err(KeyringAccessError::from(err)),
        }
    }

    /// Resolve the key to use for requests.
    ///
    /// A keyring failure is logged and treated as "no key there" so a locked
    /// keychain does not hide a key stored in the config file.
    pub fn resolve(&self, settings: &GlobalSettings) -> Option<(String, KeySource)> {
        let env_key = std::env::var(API_KEY_ENV).ok();
        let keyring_key = match self.get() {
            Ok(key) => key,
            Err(err) => {
                debug!(error = %err, recoverable = err.is_recoverable(), "Keyring lookup failed");
                None
            }
        };
        pick_api_key(
            env_key.as_deref(),
            keyring_key.as_deref(),
            settings.openrouter_api_key.as_deref(),
        )
    }
}

fn pick_api_key(
    env_key: Option<&str>,
    keyring_key: Option<&str>,
    config_key: Option<&str>,
) -> Option<(String, KeySource)> {
    [
        (env_key, KeySource::Environment),
        (keyring_key, KeySource::Keyring),
        (config_key, KeySource::Config),
    ]
    .into_iter()
    .find_map(|(key, source)| {
        key.map(str::trim)
            .filter(|k| !k.is_empty())
            .map(|k| (k.to_string(), source))
    })
}
