//! Configuration loading from TOML files.
//!
//! Lookup order:
//! 1. `--config <path>` (must exist)
//! 2. `$SAFARI_BOOKMARKS_CONFIG`
//! 3. `~/.config/safari-bookmark-editor/config.toml`
//! 4. Built-in defaults (everything is optional)

use crate::infrastructure::converter::{Converter, PlistConverter, PlutilConverter};
use crate::infrastructure::locator::STORE_FILE_NAME;
use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use directories::BaseDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "SAFARI_BOOKMARKS_CONFIG";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub conversion: ConversionConfig,
}

/// Where the bookmark store lives.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Fixed store path. Default: `~/Library/Safari/Bookmarks.plist`.
    pub path: Option<PathBuf>,
    /// When set, search this tree for exactly one `file_name` instead.
    pub search_root: Option<PathBuf>,
    pub file_name: String,
    pub backup: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    pub converter: ConverterChoice,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ConverterChoice {
    /// In-process conversion
    #[default]
    Builtin,
    /// macOS `plutil`
    Plutil,
}

impl ConverterChoice {
    pub fn build(self) -> Converter {
        match self {
            ConverterChoice::Builtin => Converter::Builtin(PlistConverter),
            ConverterChoice::Plutil => Converter::Plutil(PlutilConverter::default()),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: None,
            search_root: None,
            file_name: STORE_FILE_NAME.into(),
            backup: false,
        }
    }
}

pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    if let Some(p) = explicit {
        if !p.exists() {
            bail!("config file not found: {}", p.display());
        }
        return read_config(p);
    }

    match config_path() {
        Some(p) if p.exists() => read_config(&p),
        _ => Ok(Config::default()),
    }
}

fn read_config(path: &Path) -> Result<Config> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

fn config_path() -> Option<PathBuf> {
    if let Ok(p) = std::env::var(CONFIG_ENV) {
        return Some(PathBuf::from(p));
    }

    BaseDirs::new().map(|dirs| {
        dirs.home_dir()
            .join(".config")
            .join("safari-bookmark-editor")
            .join("config.toml")
    })
}
