use crate::apply::RenameOptions;
use crate::metadata::TimestampSource;
use crate::{DEFAULT_FORMAT, DEFAULT_MAX_FILENAME_LEN};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub format: String,
    pub backup: bool,
    pub timestamp_sources: Vec<TimestampSource>,
    pub max_filename_len: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            format: DEFAULT_FORMAT.to_string(),
            backup: false,
            timestamp_sources: TimestampSource::DEFAULT_CHAIN.to_vec(),
            max_filename_len: DEFAULT_MAX_FILENAME_LEN,
        }
    }
}

impl AppConfig {
    pub fn rename_options(&self) -> RenameOptions {
        RenameOptions {
            create_backup: self.backup,
            format: self.format.clone(),
            timestamp_sources: self.timestamp_sources.clone(),
            max_filename_len: self.max_filename_len,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub config_path: PathBuf,
}

pub fn app_paths() -> Result<AppPaths> {
    let proj = ProjectDirs::from("io", "imagerenamer", "imagerenamer")
        .context("could not determine the per-user config directory")?;
    let config_dir = proj.config_dir().to_path_buf();
    Ok(AppPaths {
        config_path: config_dir.join("config.toml"),
        config_dir,
    })
}

/// Loads the per-user config, or defaults when no file has been written yet.
pub fn load_config() -> Result<AppConfig> {
    let paths = app_paths()?;
    if !paths.config_path.exists() {
        return Ok(AppConfig::default());
    }
    load_config_from(&paths.config_path)
}

pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
    let config = toml::from_str::<AppConfig>(&raw)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;
    Ok(config)
}

pub fn save_config(config: &AppConfig) -> Result<()> {
    let paths = app_paths()?;
    fs::create_dir_all(&paths.config_dir).with_context(|| {
        format!("failed to create config directory: {}", paths.config_dir.display())
    })?;
    save_config_to(config, &paths.config_path)
}

pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<()> {
    let body = toml::to_string_pretty(config).context("failed to serialize config")?;
    fs::write(path, body)
        .with_context(|| format!("failed to write config file: {}", path.display()))?;
    Ok(())
}
