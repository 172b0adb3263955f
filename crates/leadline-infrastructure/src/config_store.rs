//! Loading and initializing `config.toml`.

use std::fs;
use std::path::Path;

use tracing::info;

use leadline_core::config::AppConfig;
use leadline_core::error::Result;

use crate::paths::LeadlinePaths;

/// Loads the application configuration, writing a default template on
/// first run so users have something to edit.
pub fn load_or_init(paths: &LeadlinePaths) -> Result<AppConfig> {
    let path = paths.config_file();
    if path.exists() {
        return load(&path);
    }

    let config = AppConfig::default();
    write_default(&path, &config)?;
    info!("[Config] Wrote default configuration to {}", path.display());
    Ok(config)
}

fn load(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    Ok(config)
}

fn write_default(path: &Path, config: &AppConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let body = toml::to_string_pretty(config)?;
    let content = format!(
        "# leadline client configuration\n\
         # Endpoint URLs and retry tuning. Missing keys fall back to defaults.\n\n{}",
        body
    );
    fs::write(path, content)?;
    Ok(())
}
