//! API key storage in the OS keyring

#[cfg(test)]
use std::cell::RefCell;

use thiserror::Error;

use super::config::APP_NAME;

/// Environment variable consulted when no key is stored.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

const KEYRING_USER: &str = "api_key";

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),
}

/// Get, set and delete the single stored API key. Absence is not an error.
pub trait CredentialStore {
    fn get(&self) -> Result<Option<String>, CredentialError>;
    fn set(&self, secret: &str) -> Result<(), CredentialError>;
    fn delete(&self) -> Result<(), CredentialError>;
}

pub struct KeyringCredentials {
    service: String,
}

impl KeyringCredentials {
    pub fn new() -> Self {
        Self {
            service: APP_NAME.to_string(),
        }
    }

    fn entry(&self) -> Result<keyring::Entry, CredentialError> {
        Ok(keyring::Entry::new(&self.service, KEYRING_USER)?)
    }
}

impl Default for KeyringCredentials {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for KeyringCredentials {
    fn get(&self) -> Result<Option<String>, CredentialError> {
        match self.entry()?.get_password() {
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, secret: &str) -> Result<(), CredentialError> {
        self.entry()?.set_password(secret)?;
        Ok(())
    }

    fn delete(&self) -> Result<(), CredentialError> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process store for tests
#[cfg(test)]
#[derive(Default)]
pub struct MemoryCredentials {
    secret: RefCell<Option<String>>,
}

#[cfg(test)]
impl CredentialStore for MemoryCredentials {
    fn get(&self) -> Result<Option<String>, CredentialError> {
        Ok(self.secret.borrow().clone())
    }

    fn set(&self, secret: &str) -> Result<(), CredentialError> {
        *self.secret.borrow_mut() = Some(secret.to_string());
        Ok(())
    }

    fn delete(&self) -> Result<(), CredentialError> {
        *self.secret.borrow_mut() = None;
        Ok(())
    }
}

/// Stored key if any, otherwise the environment variable.
///
/// Store failures are logged and treated as absence.
pub fn resolve_api_key(store: &dyn CredentialStore) -> Option<String> {
    resolve_with_env(store, std::env::var(API_KEY_ENV).ok())
}

fn resolve_with_env(store: &dyn CredentialStore, env_key: Option<String>) -> Option<String> {
    let stored = match store.get() {
        Ok(key) => key,
        Err(e) => {
            log::warn!("Error loading API key: {}", e);
            None
        }
    };

    stored
        .or(env_key)
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
}
