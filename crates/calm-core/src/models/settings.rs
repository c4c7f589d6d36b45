//! Application settings model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Smallest font size the editor accepts
pub const MIN_FONT_SIZE: u32 = 10;
/// Largest font size the editor accepts
pub const MAX_FONT_SIZE: u32 = 32;

/// Color scheme options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    /// Light theme
    #[default]
    Light,
    /// Dark theme
    Dark,
}

impl ColorScheme {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// The other scheme
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColorScheme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(Error::InvalidInput(format!("Unknown color scheme: {other}"))),
        }
    }
}

/// Application settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Color scheme
    pub color_scheme: ColorScheme,
    /// Font size in points
    pub font_size: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color_scheme: ColorScheme::Light,
            font_size: 16,
        }
    }
}

/// Clamp a requested font size into the supported range.
#[must_use]
pub fn clamp_font_size(size: u32) -> u32 {
    size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_default() {
        let settings = Settings::default();
        assert_eq!(settings.font_size, 16);
        assert_eq!(settings.color_scheme, ColorScheme::Light);
    }

    #[test]
    fn test_color_scheme_parse_and_toggle() {
        assert_eq!("Dark".parse::<ColorScheme>().unwrap(), ColorScheme::Dark);
        assert!("sepia".parse::<ColorScheme>().is_err());
        assert_eq!(ColorScheme::Light.toggled(), ColorScheme::Dark);
        assert_eq!(ColorScheme::Dark.toggled(), ColorScheme::Light);
    }

    #[test]
    fn test_clamp_font_size() {
        assert_eq!(clamp_font_size(2), MIN_FONT_SIZE);
        assert_eq!(clamp_font_size(18), 18);
        assert_eq!(clamp_font_size(99), MAX_FONT_SIZE);
    }
}
