//! User preferences and themes
//!
//! Preferences are stored as JSON under the user's config directory. A
//! missing or unreadable file yields the defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::render::{RenderStyle, Rgb, ERROR_COLOR};

pub const APP_NAME: &str = "Transnap";
pub const DEFAULT_LANGUAGE: &str = "Farsi";
pub const DEFAULT_SHORTCUT: &str = "super+shift+a";
const PREFERENCES_FILE: &str = "preferences.json";

/// Target languages offered in the language selector
pub const LANGUAGES: &[&str] = &[
    "English",
    "Farsi",
    "German",
    "French",
    "Spanish",
    "Italian",
    "Portuguese",
    "Russian",
    "Chinese (Simplified)",
    "Japanese",
    "Korean",
    "Arabic",
    "Hindi",
    "Bengali",
    "Urdu",
    "Turkish",
    "Dutch",
    "Swedish",
    "Danish",
    "Norwegian",
    "Finnish",
    "Polish",
    "Czech",
    "Slovak",
    "Hungarian",
    "Romanian",
    "Bulgarian",
    "Croatian",
    "Serbian",
    "Slovenian",
    "Estonian",
    "Latvian",
    "Lithuanian",
    "Greek",
    "Hebrew",
    "Indonesian",
    "Malay",
    "Tagalog",
    "Vietnamese",
    "Thai",
    "Malayalam",
    "Tamil",
    "Telugu",
    "Kannada",
    "Marathi",
    "Nepali",
    "Punjabi",
    "Sinhala",
    "Swahili",
    "Afrikaans",
    "Kazakh",
    "Uzbek",
    "Ukrainian",
    "Albanian",
    "Pashto",
    "Odia",
    "Azerbaijani",
    "Belarusian",
    "Catalan",
    "Filipino",
];

#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    /// Bitmap style for result text in this theme
    pub fn render_style(self) -> RenderStyle {
        let (background, text) = match self {
            Theme::Dark => (Rgb::new(0x2d, 0x2d, 0x2d), Rgb::new(0xff, 0xff, 0xff)),
            Theme::Light => (Rgb::new(0xff, 0xff, 0xff), Rgb::new(0x00, 0x00, 0x00)),
        };
        RenderStyle {
            background,
            text,
            error: ERROR_COLOR,
            ..RenderStyle::default()
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to write preferences to {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize preferences: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Persisted user choices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub language: String,
    pub shortcut: String,
    pub theme: Theme,
    /// Override for the translation API base URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,
    /// Override for the translation model
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            shortcut: DEFAULT_SHORTCUT.to_string(),
            theme: Theme::default(),
            api_base_url: None,
            model: None,
        }
    }
}

impl Preferences {
    /// `$XDG_CONFIG_HOME/transnap/preferences.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("transnap").join(PREFERENCES_FILE))
    }

    pub fn load_from(path: &Path) -> Self {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No preferences at {:?}, using defaults", path);
                return Self::default();
            }
            Err(e) => {
                log::warn!("Error loading preferences from {:?}: {}", path, e);
                return Self::default();
            }
        };

        match serde_json::from_str::<Preferences>(&contents) {
            Ok(prefs) => prefs.sanitized(),
            Err(e) => {
                log::warn!("Ignoring malformed preferences in {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, json).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    fn sanitized(mut self) -> Self {
        match language_index(&self.language) {
            Some(index) => self.language = LANGUAGES[index].to_string(),
            None => {
                log::warn!(
                    "Unknown target language '{}', using {}",
                    self.language,
                    DEFAULT_LANGUAGE
                );
                self.language = DEFAULT_LANGUAGE.to_string();
            }
        }
        if self.shortcut.trim().is_empty() {
            self.shortcut = DEFAULT_SHORTCUT.to_string();
        }
        self
    }
}

/// Position of `language` in [`LANGUAGES`], ignoring case and surrounding space
pub fn language_index(language: &str) -> Option<usize> {
    let language = language.trim();
    LANGUAGES
        .iter()
        .position(|candidate| candidate.eq_ignore_ascii_case(language))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_language_list() {
        assert_eq!(LANGUAGES.len(), 60);
        assert!(LANGUAGES.contains(&DEFAULT_LANGUAGE));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let prefs = Preferences::load_from(&dir.path().join("absent.json"));
        assert_eq!(prefs, Preferences::default());
        assert_eq!(prefs.language, "Farsi");
        assert_eq!(prefs.theme, Theme::Dark);
    }

    #[test]
    fn test_corrupt_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        fs::write(&path, "{not json").unwrap();
        assert_eq!(Preferences::load_from(&path), Preferences::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        fs::write(&path, r#"{"language":"German","shortcut":""}"#).unwrap();

        let prefs = Preferences::load_from(&path);
        assert_eq!(prefs.language, "German");
        assert_eq!(prefs.shortcut, DEFAULT_SHORTCUT);
        assert_eq!(prefs.theme, Theme::Dark);
    }

    #[test]
    fn test_unknown_language_falls_back_to_listed_entry() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("preferences.json");

        fs::write(&path, r#"{"language":"Klingon"}"#).unwrap();
        let prefs = Preferences::load_from(&path);
        assert_eq!(prefs.language, DEFAULT_LANGUAGE);

        fs::write(&path, r#"{"language":" hebrew "}"#).unwrap();
        let prefs = Preferences::load_from(&path);
        assert_eq!(prefs.language, "Hebrew");
        assert_eq!(language_index(&prefs.language).map(|i| LANGUAGES[i]), Some("Hebrew"));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("preferences.json");
        let prefs = Preferences {
            language: "Japanese".to_string(),
            shortcut: "ctrl+alt+t".to_string(),
            theme: Theme::Light,
            api_base_url: Some("http://localhost:8080".to_string()),
            model: None,
        };

        prefs.save_to(&path).unwrap();
        assert_eq!(Preferences::load_from(&path), prefs);

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"theme\": \"light\""));
        assert!(!raw.contains("model"));
    }

    #[test]
    fn test_theme_render_styles() {
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!(Theme::Dark.render_style().background, Rgb::new(0x2d, 0x2d, 0x2d));

        let style = Theme::Light.render_style();
        assert_eq!(style.background, Rgb::new(0xff, 0xff, 0xff));
        assert_eq!(style.text, Rgb::new(0, 0, 0));
        assert_eq!(style.width, 470);
    }
}
