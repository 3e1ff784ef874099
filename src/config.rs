//! Configuration for dossier builds.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (DOSSIER_TITLE, DOSSIER_SITE)
//! 2. Config file (.dossier/config.yaml)
//! 3. Defaults
//!
//! Config file discovery:
//! - Searches current directory and parents for .dossier/config.yaml
//! - `site_dir` in the config file is relative to the project root (the
//!   parent of `.dossier/`)

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::ledger::TimelineSettings;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

const CONFIG_DIR: &str = ".dossier";
const CONFIG_FILE: &str = "config.yaml";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    /// Document title used in listings
    pub title: Option<String>,
    /// Default output directory
    pub site_dir: Option<String>,
    /// Name of the parts directory next to a source file
    pub parts_dir: Option<String>,
    #[serde(default)]
    pub timeline: TimelineConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimelineConfig {
    pub title_max_chars: Option<usize>,
    pub ellipsis: Option<String>,
}

/// Values taken from the process environment
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub title: Option<String>,
    pub site_dir: Option<String>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self {
            title: var("DOSSIER_TITLE"),
            site_dir: var("DOSSIER_SITE"),
        }
    }
}

/// Resolved configuration
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Explicit document title; when absent it is taken from the document
    pub title: Option<String>,
    /// Default output directory
    pub site_dir: PathBuf,
    /// Parts directory name looked up next to a source file
    pub parts_dir: String,
    pub title_max_chars: usize,
    pub ellipsis: String,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        let timeline = TimelineSettings::default();
        Self {
            title: None,
            site_dir: PathBuf::from("site"),
            parts_dir: "parts".to_string(),
            title_max_chars: timeline.title_max_chars,
            ellipsis: timeline.ellipsis,
            config_file: None,
        }
    }
}

impl ResolvedConfig {
    pub fn timeline(&self) -> TimelineSettings {
        TimelineSettings {
            title_max_chars: self.title_max_chars,
            ellipsis: self.ellipsis.clone(),
        }
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(CONFIG_DIR).join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the project root
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

/// Merge the config file (if any) and environment over the defaults
fn resolve(file: Option<(&Path, ConfigFile)>, env: EnvOverrides) -> ResolvedConfig {
    let mut resolved = ResolvedConfig::default();

    if let Some((config_path, config)) = file {
        // Project root is the parent of .dossier/
        let base_dir = config_path
            .parent()
            .and_then(|p| p.parent())
            .unwrap_or(Path::new("."));

        resolved.title = config.title.filter(|t| !t.trim().is_empty());
        if let Some(ref site) = config.site_dir {
            resolved.site_dir = resolve_path(base_dir, site);
        }
        if let Some(parts) = config.parts_dir {
            resolved.parts_dir = parts;
        }
        if let Some(max) = config.timeline.title_max_chars {
            resolved.title_max_chars = max;
        }
        if let Some(ellipsis) = config.timeline.ellipsis {
            resolved.ellipsis = ellipsis;
        }
        resolved.config_file = Some(config_path.to_path_buf());
    }

    if let Some(title) = env.title {
        resolved.title = Some(title);
    }
    if let Some(site) = env.site_dir {
        resolved.site_dir = PathBuf::from(site);
    }

    resolved
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let config_file = find_config_file();
    let env = EnvOverrides::from_env();

    match config_file {
        Some(ref path) => {
            let parsed = load_config_file(path)?;
            Ok(resolve(Some((path, parsed)), env))
        }
        None => Ok(resolve(None, env)),
    }
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}
