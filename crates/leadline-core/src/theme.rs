//! Light/dark theme preference.

use serde::{Deserialize, Serialize};

/// Rendering theme for the frontend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
}

impl ThemeMode {
    pub fn toggled(self) -> ThemeMode {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }

    /// Best-effort system preference from the `COLORFGBG` terminal hint
    /// (last field is the background color index; 0-6 and 8 are dark).
    ///
    /// Terminals without the hint report no preference.
    pub fn from_colorfgbg(hint: Option<&str>) -> Option<ThemeMode> {
        let hint = hint?;
        let bg = hint.rsplit(';').next()?.trim();
        let index: u8 = bg.parse().ok()?;
        if index <= 6 || index == 8 {
            Some(ThemeMode::Dark)
        } else {
            Some(ThemeMode::Light)
        }
    }
}

impl std::fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThemeMode::Light => write!(f, "light"),
            ThemeMode::Dark => write!(f, "dark"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle() {
        assert_eq!(ThemeMode::Light.toggled(), ThemeMode::Dark);
        assert_eq!(ThemeMode::Dark.toggled(), ThemeMode::Light);
    }

    #[test]
    fn test_colorfgbg_heuristic() {
        assert_eq!(
            ThemeMode::from_colorfgbg(Some("15;0")),
            Some(ThemeMode::Dark)
        );
        assert_eq!(
            ThemeMode::from_colorfgbg(Some("0;15")),
            Some(ThemeMode::Light)
        );
        assert_eq!(ThemeMode::from_colorfgbg(None), None);
        assert_eq!(ThemeMode::from_colorfgbg(Some("garbage")), None);
    }
}
