use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use crate::cli::ReportFormat;

/// Root configuration structure, deserialized from `.license-resolvr/config.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Where to read the license tables from.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// How verdicts are reported.
    #[serde(default)]
    pub report: ReportConfig,
}

/// Database document locations. Unset paths use the tables built into the binary.
/// Relative paths are taken relative to the config file.
#[derive(Debug, Default, Deserialize)]
pub struct DatabaseConfig {
    pub aliases: Option<PathBuf>,
    pub ambiguities: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReportConfig {
    /// Ambiguous verdicts do not fail the run. Defaults to `false`.
    #[serde(default)]
    pub allow_ambiguous: bool,
    /// Output format used when `--format` is not given.
    pub format: Option<ReportFormat>,
}

/// Load the configuration, searching in order:
///
/// 1. `config_override` — path passed via `--config`
/// 2. `<base>/.license-resolvr/config.toml`
/// 3. `~/.config/license-resolvr/config.toml`
/// 4. Built-in [`Config::default`]
pub fn load_config(base: &Path, config_override: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_override {
        return read_config(path);
    }

    let project_config = base.join(".license-resolvr").join("config.toml");
    if project_config.exists() {
        return read_config(&project_config);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home
            .join(".config")
            .join("license-resolvr")
            .join("config.toml");
        if home_config.exists() {
            return read_config(&home_config);
        }
    }

    debug!("no config file found, using defaults");
    Ok(Config::default())
}

fn read_config(path: &Path) -> Result<Config> {
    debug!(path = %path.display(), "reading config");
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("invalid config {}", path.display()))?;

    if let Some(dir) = path.parent() {
        config.database.aliases = config.database.aliases.map(|p| dir.join(p));
        config.database.ambiguities = config.database.ambiguities.map(|p| dir.join(p));
    }
    Ok(config)
}
