//! Theme preference with explicit injection.
//!
//! The provider is constructed once at startup and passed where rendering
//! needs it; there is no process-global theme. Resolution order: persisted
//! preference, then the terminal's `COLORFGBG` hint, then light.

use std::sync::Arc;

use leadline_core::error::Result;
use leadline_core::state::LocalStateRepository;
use leadline_core::theme::ThemeMode;

pub struct ThemeProvider {
    local: Arc<dyn LocalStateRepository>,
    current: ThemeMode,
}

impl ThemeProvider {
    /// Resolves the initial theme. `colorfgbg` is the raw `COLORFGBG`
    /// environment value, consulted only when no preference is stored.
    pub async fn load(
        local: Arc<dyn LocalStateRepository>,
        colorfgbg: Option<&str>,
    ) -> Self {
        let current = match local.theme().await {
            Some(saved) => saved,
            None => ThemeMode::from_colorfgbg(colorfgbg).unwrap_or(ThemeMode::Light),
        };
        tracing::debug!("[Theme] Resolved initial theme: {}", current);
        Self { local, current }
    }

    pub fn mode(&self) -> ThemeMode {
        self.current
    }

    /// Flips the theme and persists the choice.
    pub async fn toggle(&mut self) -> Result<ThemeMode> {
        self.current = self.current.toggled();
        self.local.set_theme(self.current).await?;
        Ok(self.current)
    }
}
