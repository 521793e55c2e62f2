use anyhow::{Context, Result};
use roundtrace_engine::CorrelationWindow;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "ROUNDTRACE_CONFIG";

#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub preview_chars: usize,
    pub window: CorrelationWindow,
    pub format: OutputFormat,
    pub color: ColorMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            preview_chars: 80,
            window: CorrelationWindow::Session,
            format: OutputFormat::Text,
            color: ColorMode::Auto,
        }
    }
}

/// Where the config file comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// `--config` or `ROUNDTRACE_CONFIG`; must exist
    Explicit(PathBuf),
    /// Per-user config directory; optional
    Default(PathBuf),
    None,
}

/// Resolve the config file path based on priority:
/// 1. Explicit `--config` path
/// 2. ROUNDTRACE_CONFIG environment variable
/// 3. `<config dir>/roundtrace/config.toml`
pub fn resolve_config_source(
    explicit_path: Option<&Path>,
    env_path: Option<&str>,
    config_dir: Option<PathBuf>,
) -> ConfigSource {
    if let Some(path) = explicit_path {
        return ConfigSource::Explicit(path.to_path_buf());
    }

    if let Some(path) = env_path.filter(|p| !p.is_empty()) {
        return ConfigSource::Explicit(PathBuf::from(path));
    }

    match config_dir {
        Some(dir) => ConfigSource::Default(dir.join("roundtrace").join("config.toml")),
        None => ConfigSource::None,
    }
}

impl Config {
    /// Load using the standard resolution order
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let env_path = std::env::var(CONFIG_ENV).ok();
        let source = resolve_config_source(explicit_path, env_path.as_deref(), dirs::config_dir());
        Self::load_source(&source)
    }

    pub fn load_source(source: &ConfigSource) -> Result<Self> {
        match source {
            ConfigSource::Explicit(path) => {
                if !path.exists() {
                    anyhow::bail!("Config file not found: {}", path.display());
                }
                Self::load_from(path)
            }
            ConfigSource::Default(path) => {
                if !path.exists() {
                    tracing::debug!(path = %path.display(), "no config file, using defaults");
                    return Ok(Self::default());
                }
                Self::load_from(path)
            }
            ConfigSource::None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }
}
