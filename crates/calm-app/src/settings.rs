//! Theme and font preferences.

use std::sync::Arc;

use calm_core::models::{clamp_font_size, ColorScheme};
use calm_core::{NoteStore, Settings};
use tokio::sync::watch;

/// Holds the active [`Settings`] and writes every change back to the store.
///
/// Persistence failures are logged and otherwise ignored: the preference
/// still applies for the rest of the session.
#[derive(Clone)]
pub struct SettingsController {
    store: NoteStore,
    settings: Arc<watch::Sender<Settings>>,
}

impl SettingsController {
    pub fn new(store: NoteStore) -> Self {
        let (settings, _) = watch::channel(Settings::default());
        Self {
            store,
            settings: Arc::new(settings),
        }
    }

    /// Read stored settings, keeping defaults if the store is unavailable.
    pub async fn load(&self) -> Settings {
        match self.store.load_settings().await {
            Ok(settings) => {
                self.settings.send_replace(settings.clone());
                settings
            }
            Err(error) => {
                tracing::warn!("Failed to load settings, using defaults: {}", error);
                self.current()
            }
        }
    }

    pub fn current(&self) -> Settings {
        self.settings.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Settings> {
        self.settings.subscribe()
    }

    pub async fn set_color_scheme(&self, color_scheme: ColorScheme) {
        self.apply(|settings| settings.color_scheme = color_scheme).await;
    }

    /// Set the editor font size, clamped to the supported range. Returns the
    /// size actually applied.
    pub async fn set_font_size(&self, font_size: u32) -> u32 {
        let font_size = clamp_font_size(font_size);
        self.apply(|settings| settings.font_size = font_size).await;
        font_size
    }

    /// Switch between light and dark. Returns the new scheme.
    pub async fn toggle_theme(&self) -> ColorScheme {
        let mut next = ColorScheme::default();
        self.apply(|settings| {
            settings.color_scheme = settings.color_scheme.toggled();
            next = settings.color_scheme;
        })
        .await;
        next
    }

    async fn apply(&self, modify: impl FnOnce(&mut Settings)) {
        self.settings.send_modify(modify);
        let settings = self.current();
        if let Err(error) = self.store.save_settings(&settings).await {
            tracing::warn!("Failed to save settings: {}", error);
        }
    }
}
