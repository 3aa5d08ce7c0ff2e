//! Client preferences with an explicit lifecycle
//!
//! Load once at startup with [`PreferenceStore::load`], change values through
//! setters, and persist with [`PreferenceStore::save`]. Nothing is written
//! implicitly.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub theme: Theme,
}

#[derive(Debug, Error)]
pub enum PreferencesError {
    #[error("failed to read preferences from {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write preferences to {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid preferences file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: basic_toml::Error,
    },
    #[error("failed to serialize preferences: {0}")]
    Serialize(basic_toml::Error),
}

/// File-backed preferences owned by whoever loaded them
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
    preferences: Preferences,
    dirty: bool,
}

impl PreferenceStore {
    /// Load preferences from `path`; a missing file yields defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PreferencesError> {
        let path = path.as_ref().to_path_buf();
        let preferences = match fs::read_to_string(&path) {
            Ok(contents) => basic_toml::from_str(&contents).map_err(|source| {
                PreferencesError::Parse {
                    path: path.clone(),
                    source,
                }
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No preferences at {}, using defaults", path.display());
                Preferences::default()
            }
            Err(source) => return Err(PreferencesError::Read { path, source }),
        };

        Ok(Self {
            path,
            preferences,
            dirty: false,
        })
    }

    #[must_use]
    pub fn theme(&self) -> Theme {
        self.preferences.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        if self.preferences.theme != theme {
            self.preferences.theme = theme;
            self.dirty = true;
        }
    }

    /// Whether there are changes not yet saved
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Persist the current preferences to the file they were loaded from
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails
    pub fn save(&mut self) -> Result<(), PreferencesError> {
        let contents =
            basic_toml::to_string(&self.preferences).map_err(PreferencesError::Serialize)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| PreferencesError::Write {
                path: self.path.clone(),
                source,
            })?;
        }
        fs::write(&self.path, contents).map_err(|source| PreferencesError::Write {
            path: self.path.clone(),
            source,
        })?;
        self.dirty = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_loads_defaults() {
        let dir = TempDir::new().unwrap();
        let store = PreferenceStore::load(dir.path().join("prefs.toml")).unwrap();
        assert_eq!(store.theme(), Theme::Light);
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_set_then_save_then_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("prefs.toml");

        let mut store = PreferenceStore::load(&path).unwrap();
        store.set_theme(Theme::Dark);
        assert!(store.is_dirty());
        // Nothing persisted before save
        assert!(!path.exists());

        store.save().unwrap();
        assert!(!store.is_dirty());

        let reloaded = PreferenceStore::load(&path).unwrap();
        assert_eq!(reloaded.theme(), Theme::Dark);
    }

    #[test]
    fn test_setting_same_theme_is_not_a_change() {
        let dir = TempDir::new().unwrap();
        let mut store = PreferenceStore::load(dir.path().join("prefs.toml")).unwrap();
        store.set_theme(Theme::Light);
        assert!(!store.is_dirty());
        store.set_theme(store.theme().toggled());
        assert_eq!(store.theme(), Theme::Dark);
    }

    #[test]
    fn test_invalid_file_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prefs.toml");
        fs::write(&path, "theme = \"sepia\"\n").unwrap();

        let err = PreferenceStore::load(&path).unwrap_err();
        assert!(matches!(err, PreferencesError::Parse { .. }));
    }
}
