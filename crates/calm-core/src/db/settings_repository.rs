//! Settings repository implementation

use crate::error::Result;
use crate::models::{clamp_font_size, ColorScheme, Settings};
use libsql::Connection;

const COLOR_SCHEME_KEY: &str = "color_scheme";
const FONT_SIZE_KEY: &str = "font_size";

/// Trait for settings storage operations (async)
#[allow(async_fn_in_trait)]
pub trait SettingsRepository {
    /// Load settings from the database
    async fn load(&self) -> Result<Settings>;

    /// Save settings to the database
    async fn save(&self, settings: &Settings) -> Result<()>;
}

/// libSQL implementation of `SettingsRepository`
pub struct LibSqlSettingsRepository<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlSettingsRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl SettingsRepository for LibSqlSettingsRepository<'_> {
    async fn load(&self) -> Result<Settings> {
        let mut settings = Settings::default();

        if let Some(value) = self.get_setting(COLOR_SCHEME_KEY).await? {
            match value.parse::<ColorScheme>() {
                Ok(scheme) => settings.color_scheme = scheme,
                Err(error) => tracing::warn!("Ignoring stored color scheme: {error}"),
            }
        }

        if let Some(value) = self.get_setting(FONT_SIZE_KEY).await? {
            match value.trim().parse::<u32>() {
                Ok(size) => settings.font_size = clamp_font_size(size),
                Err(_) => tracing::warn!("Ignoring stored font size {value:?}"),
            }
        }

        Ok(settings)
    }

    async fn save(&self, settings: &Settings) -> Result<()> {
        self.set_setting(COLOR_SCHEME_KEY, settings.color_scheme.as_str())
            .await?;
        self.set_setting(FONT_SIZE_KEY, &settings.font_size.to_string())
            .await?;
        Ok(())
    }
}

impl LibSqlSettingsRepository<'_> {
    async fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let mut rows = self
            .conn
            .query("SELECT value FROM settings WHERE key = ?", [key])
            .await?;

        if let Some(row) = rows.next().await? {
            let value: String = row.get(0)?;
            Ok(Some(value))
        } else {
            Ok(None)
        }
    }

    async fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO settings (key, value) VALUES (?, ?)",
                [key, value],
            )
            .await?;
        Ok(())
    }
}
