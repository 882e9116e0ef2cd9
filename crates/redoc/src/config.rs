//! Configuration file for redoc
//!
//! Holds defaults for values that rarely change between runs on one
//! machine, mostly where Lmod lives.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// redoc configuration (JSON)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Path to lmodrc.lua
    pub lmodrc_lua: Option<PathBuf>,

    /// Path to the Lmod spider executable
    pub lmod_spider: Option<PathBuf>,

    /// Directory the generated page is written to
    pub docs_dir: PathBuf,

    /// Template to use instead of the built-in one
    pub template: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lmodrc_lua: None,
            lmod_spider: None,
            docs_dir: PathBuf::from("docs"),
            template: None,
        }
    }
}

impl Config {
    /// Default config location (~/.config/redoc/config.json)
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("redoc")
            .join("config.json")
    }

    /// Load config from file, falling back to defaults when it does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }
}
