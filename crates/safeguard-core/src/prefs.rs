//! User preferences.
//!
//! Each preference lives under its own store key and is written the moment it
//! changes. Missing or unreadable values fall back to defaults; a storage
//! failure on load is logged and never fatal.

use std::fmt;
use std::sync::Arc;

use tracing::warn;

use crate::store::{keys, KeyValueStore, StorageError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    Pt,
    En,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::Pt => "pt",
            Language::En => "en",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "pt" | "pt-br" => Some(Language::Pt),
            "en" | "en-us" => Some(Language::En),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Language::Pt => "Português",
            Language::En => "English",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Language::Pt => Language::En,
            Language::En => Language::Pt,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preferences {
    pub notifications_enabled: bool,
    pub dark_mode: bool,
    pub language: Language,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            notifications_enabled: true,
            dark_mode: false,
            language: Language::Pt,
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

fn encode_bool(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

#[derive(Clone)]
pub struct PreferenceStore {
    store: Arc<dyn KeyValueStore>,
}

impl PreferenceStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "Could not read preference, using default");
                None
            }
        }
    }

    pub fn load(&self) -> Preferences {
        let defaults = Preferences::default();

        let bool_pref = |key: &str, default: bool| {
            self.read(key)
                .and_then(|v| {
                    let parsed = parse_bool(&v);
                    if parsed.is_none() {
                        warn!(key, value = %v, "Ignoring unrecognised preference value");
                    }
                    parsed
                })
                .unwrap_or(default)
        };

        Preferences {
            notifications_enabled: bool_pref(keys::NOTIFICATIONS, defaults.notifications_enabled),
            dark_mode: bool_pref(keys::DARK_MODE, defaults.dark_mode),
            language: self
                .read(keys::LANGUAGE)
                .and_then(|v| Language::from_code(&v))
                .unwrap_or(defaults.language),
        }
    }

    pub fn set_notifications(&self, enabled: bool) -> Result<(), StorageError> {
        self.store.set(keys::NOTIFICATIONS, encode_bool(enabled))
    }

    pub fn set_dark_mode(&self, enabled: bool) -> Result<(), StorageError> {
        self.store.set(keys::DARK_MODE, encode_bool(enabled))
    }

    pub fn set_language(&self, language: Language) -> Result<(), StorageError> {
        self.store.set(keys::LANGUAGE, language.code())
    }

    /// Write every default back and return them
    pub fn restore_defaults(&self) -> Result<Preferences, StorageError> {
        let defaults = Preferences::default();
        self.set_notifications(defaults.notifications_enabled)?;
        self.set_dark_mode(defaults.dark_mode)?;
        self.set_language(defaults.language)?;
        Ok(defaults)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FailingStore, FileStore, MemoryStore};

    #[test]
    fn test_defaults_when_empty() {
        let prefs = PreferenceStore::new(Arc::new(MemoryStore::new()));
        assert_eq!(prefs.load(), Preferences::default());
        assert!(prefs.load().notifications_enabled);
    }

    #[test]
    fn test_unreadable_store_gives_defaults() {
        let prefs = PreferenceStore::new(Arc::new(FailingStore));
        assert_eq!(prefs.load(), Preferences::default());
        assert!(prefs.set_dark_mode(true).is_err());
    }

    #[test]
    fn test_garbage_values_fall_back() {
        let store = MemoryStore::with_entries([
            ("notificacoes", "maybe"),
            ("modoEscuro", "true"),
            ("idioma", "fr"),
        ]);
        let loaded = PreferenceStore::new(Arc::new(store)).load();
        assert!(loaded.notifications_enabled);
        assert!(loaded.dark_mode);
        assert_eq!(loaded.language, Language::Pt);
    }

    #[test]
    fn test_setters_persist_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let prefs = PreferenceStore::new(Arc::new(FileStore::open(path.clone()).unwrap()));
        prefs.set_dark_mode(true).unwrap();
        prefs.set_language(Language::En).unwrap();
        prefs.set_notifications(false).unwrap();

        let reopened = PreferenceStore::new(Arc::new(FileStore::open(path.clone()).unwrap()));
        let loaded = reopened.load();
        assert!(loaded.dark_mode);
        assert!(!loaded.notifications_enabled);
        assert_eq!(loaded.language, Language::En);
    }

    #[test]
    fn test_restore_defaults() {
        let store = Arc::new(MemoryStore::new());
        let prefs = PreferenceStore::new(store.clone());
        prefs.set_dark_mode(true).unwrap();
        prefs.set_language(Language::En).unwrap();

        let restored = prefs.restore_defaults().unwrap();
        assert_eq!(restored, Preferences::default());
        assert_eq!(prefs.load(), Preferences::default());
        assert_eq!(store.get("idioma").unwrap().as_deref(), Some("pt"));
    }

    #[test]
    fn test_language_codes() {
        assert_eq!(Language::from_code("EN"), Some(Language::En));
        assert_eq!(Language::from_code("pt-BR"), Some(Language::Pt));
        assert_eq!(Language::Pt.toggled(), Language::En);
    }
}
