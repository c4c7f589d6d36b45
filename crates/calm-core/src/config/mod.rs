//! Runtime configuration for the note store and its clients.
//!
//! Values come from an optional JSON document, then environment overrides,
//! then built-in defaults.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::util::normalize_text_option;

const APP_DIR_NAME: &str = "calm-notes";
const DATABASE_FILE_NAME: &str = "notes.db";

const DEFAULT_AUTOSAVE_DEBOUNCE_MS: u64 = 750;
const DEFAULT_UNDO_WINDOW_SECS: u64 = 8;

pub const ENV_DB_PATH: &str = "CALM_DB_PATH";
pub const ENV_AUTOSAVE_DEBOUNCE_MS: &str = "CALM_AUTOSAVE_DEBOUNCE_MS";
pub const ENV_UNDO_WINDOW_SECS: &str = "CALM_UNDO_WINDOW_SECS";

/// Store and editing-session settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Database file. `None` means the platform data directory.
    pub database_path: Option<PathBuf>,
    /// Quiet period before an edit is written to disk
    pub autosave_debounce_ms: u64,
    /// How long a bulk delete can be undone
    pub undo_window_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            autosave_debounce_ms: DEFAULT_AUTOSAVE_DEBOUNCE_MS,
            undo_window_secs: DEFAULT_UNDO_WINDOW_SECS,
        }
    }
}

impl StoreConfig {
    /// Parse a JSON config document. Missing fields take their defaults.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Defaults with process environment overrides applied.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (normally the process environment).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(path) = normalize_text_option(lookup(ENV_DB_PATH)) {
            self.database_path = Some(PathBuf::from(path));
        }
        if let Some(value) = normalize_text_option(lookup(ENV_AUTOSAVE_DEBOUNCE_MS)) {
            self.autosave_debounce_ms = parse_number(ENV_AUTOSAVE_DEBOUNCE_MS, &value)?;
        }
        if let Some(value) = normalize_text_option(lookup(ENV_UNDO_WINDOW_SECS)) {
            self.undo_window_secs = parse_number(ENV_UNDO_WINDOW_SECS, &value)?;
        }
        Ok(())
    }

    /// Resolved database file location.
    pub fn resolved_database_path(&self) -> Result<PathBuf> {
        match &self.database_path {
            Some(path) => Ok(path.clone()),
            None => default_database_path(),
        }
    }

    #[must_use]
    pub const fn autosave_debounce(&self) -> Duration {
        Duration::from_millis(self.autosave_debounce_ms)
    }

    #[must_use]
    pub const fn undo_window(&self) -> Duration {
        Duration::from_secs(self.undo_window_secs)
    }
}

/// `<data_local_dir>/calm-notes/notes.db`
pub fn default_database_path() -> Result<PathBuf> {
    dirs::data_local_dir()
        .map(|dir| dir.join(APP_DIR_NAME).join(DATABASE_FILE_NAME))
        .ok_or_else(|| Error::Config("No local data directory available".to_string()))
}

fn parse_number(key: &str, value: &str) -> Result<u64> {
    value
        .parse()
        .map_err(|_| Error::Config(format!("{key} must be a whole number, got {value:?}")))
}
