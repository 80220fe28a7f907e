//! Application state types
//!
//! Settings the main window edits: preferences and the stored API key.

use std::path::PathBuf;
use std::sync::Arc;

use crate::translate::{Translate, TranslationClient};

use super::config::{ConfigError, Preferences, Theme};
use super::credentials::{resolve_api_key, CredentialError, CredentialStore};

/// Main application state
pub struct AppState {
    /// Persisted user choices
    pub preferences: Preferences,
    /// Where preferences are written, `None` to keep them in memory
    preferences_path: Option<PathBuf>,
    credentials: Box<dyn CredentialStore>,
    /// Key currently used for translations
    api_key: Option<String>,
}

impl AppState {
    pub fn new(
        preferences: Preferences,
        preferences_path: Option<PathBuf>,
        credentials: Box<dyn CredentialStore>,
    ) -> Self {
        let api_key = resolve_api_key(credentials.as_ref());
        Self {
            preferences,
            preferences_path,
            credentials,
            api_key,
        }
    }

    /// Load preferences from the default location
    pub fn load(credentials: Box<dyn CredentialStore>) -> Self {
        let path = Preferences::default_path();
        let preferences = match path {
            Some(ref path) => Preferences::load_from(path),
            None => Preferences::default(),
        };
        Self::new(preferences, path, credentials)
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// A translator for the current key and endpoint overrides
    pub fn translator(&self) -> Arc<dyn Translate> {
        let mut client = TranslationClient::new(self.api_key.clone());
        if let Some(ref url) = self.preferences.api_base_url {
            client = client.with_base_url(url.clone());
        }
        if let Some(ref model) = self.preferences.model {
            client = client.with_model(model.clone());
        }
        Arc::new(client)
    }

    pub fn set_api_key(&mut self, key: &str) -> Result<(), CredentialError> {
        let key = key.trim();
        self.credentials.set(key)?;
        self.api_key = Some(key.to_string());
        log::info!("API key saved");
        Ok(())
    }

    /// Forget the stored key
    pub fn delete_api_key(&mut self) -> Result<(), CredentialError> {
        self.credentials.delete()?;
        self.api_key = None;
        log::info!("API key removed");
        Ok(())
    }

    pub fn set_language(&mut self, language: &str) {
        self.preferences.language = language.to_string();
        self.persist();
    }

    pub fn set_shortcut(&mut self, shortcut: &str) {
        self.preferences.shortcut = shortcut.to_string();
        self.persist();
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.preferences.theme = self.preferences.theme.toggled();
        self.persist();
        self.preferences.theme
    }

    /// Save preferences, logging failures
    fn persist(&self) {
        if let Err(e) = self.save_preferences() {
            log::warn!("Error saving preferences: {}", e);
        }
    }

    fn save_preferences(&self) -> Result<(), ConfigError> {
        match self.preferences_path {
            Some(ref path) => self.preferences.save_to(path),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::MemoryCredentials;
    use tempfile::tempdir;

    #[test]
    fn test_setters_persist_preferences() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        let mut state = AppState::new(
            Preferences::default(),
            Some(path.clone()),
            Box::new(MemoryCredentials::default()),
        );

        state.set_language("Hebrew");
        state.set_shortcut("ctrl+alt+t");
        assert_eq!(state.toggle_theme(), Theme::Light);

        let saved = Preferences::load_from(&path);
        assert_eq!(saved.language, "Hebrew");
        assert_eq!(saved.shortcut, "ctrl+alt+t");
        assert_eq!(saved.theme, Theme::Light);
    }

    #[test]
    fn test_api_key_set_and_delete() {
        let store = MemoryCredentials::default();
        store.set("stored-key").unwrap();
        let mut state = AppState::new(Preferences::default(), None, Box::new(store));
        assert_eq!(state.api_key(), Some("stored-key"));

        state.set_api_key("  fresh-key ").unwrap();
        assert_eq!(state.api_key(), Some("fresh-key"));

        state.delete_api_key().unwrap();
        assert_eq!(state.api_key(), None);
    }
}
