//! Persisted application configuration.
//!
//! Stored as JSON under the platform config directory. Every field carries a
//! serde default, so partial or missing files load cleanly and new fields do
//! not invalidate old installs.

use crate::save::DEFAULT_TEMPLATE;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_DIR_NAME: &str = "cropmark";
const SAVE_SUBDIR_NAME: &str = "Cropmark";

/// What the embedding shell puts on the clipboard after a save.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ClipboardMode {
    PathOnly,
    ImageOnly,
    ImageAndPath,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    #[serde(default = "default_save_directory")]
    pub save_directory: PathBuf,
    #[serde(default = "default_filename_template")]
    pub filename_template: String,
    #[serde(default = "default_show_notification")]
    pub show_notification: bool,
    #[serde(default = "default_clipboard_mode")]
    pub clipboard_mode: ClipboardMode,
    #[serde(default)]
    pub debug_logging: bool,
}

fn default_save_directory() -> PathBuf {
    dirs_next::picture_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(SAVE_SUBDIR_NAME)
}

fn default_filename_template() -> String {
    DEFAULT_TEMPLATE.to_owned()
}

fn default_show_notification() -> bool {
    true
}

fn default_clipboard_mode() -> ClipboardMode {
    ClipboardMode::PathOnly
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            save_directory: default_save_directory(),
            filename_template: default_filename_template(),
            show_notification: default_show_notification(),
            clipboard_mode: default_clipboard_mode(),
            debug_logging: false,
        }
    }
}

pub fn resolve_config_path() -> Result<PathBuf> {
    let base = dirs_next::config_dir().ok_or_else(|| anyhow!("no config directory on this platform"))?;
    Ok(base.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

pub fn load() -> Result<AppConfig> {
    let path = resolve_config_path()?;
    load_from_path(&path)
}

pub fn save(config: &AppConfig) -> Result<PathBuf> {
    let path = resolve_config_path()?;
    save_to_path(&path, config)?;
    Ok(path)
}

pub fn load_from_path(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("read config file {}", path.display()))?;

    if content.trim().is_empty() {
        return Ok(AppConfig::default());
    }

    serde_json::from_str(&content)
        .with_context(|| format!("deserialize config file {}", path.display()))
}

/// Like [`load_from_path`] but a broken file logs a warning and yields
/// defaults, so a stray edit never blocks a capture.
pub fn load_or_default(path: &Path) -> AppConfig {
    match load_from_path(path) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(error = %err, "config load failed, using defaults");
            AppConfig::default()
        }
    }
}

pub fn save_to_path(path: &Path, config: &AppConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create config parent folder {}", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(config).context("serialize config")?;
    std::fs::write(path, json).with_context(|| format!("write config file {}", path.display()))
}
