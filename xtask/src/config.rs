//! Optional `xtask.toml` at the project root.
//!
//! Every key has a default, so the file (and any section in it) may be
//! omitted entirely.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::platform::DEFAULT_WINDOWS_SOURCE_NAME;

pub const CONFIG_FILE: &str = "xtask.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct XtaskConfig {
    #[serde(default)]
    pub layout: LayoutConfig,

    #[serde(default)]
    pub windows: WindowsConfig,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayoutConfig {
    /// Where the `build_*.sh` scripts live, relative to the root.
    #[serde(default = "default_scripts_dir")]
    pub scripts_dir: PathBuf,

    /// Package directory the library is staged into, relative to the root.
    #[serde(default = "default_dest_dir")]
    pub dest_dir: PathBuf,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            scripts_dir: default_scripts_dir(),
            dest_dir: default_dest_dir(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WindowsConfig {
    /// File name the Windows cross-build leaves in `build/windowBuild/`.
    #[serde(default = "default_windows_source_name")]
    pub source_name: String,
}

impl Default for WindowsConfig {
    fn default() -> Self {
        WindowsConfig {
            source_name: default_windows_source_name(),
        }
    }
}

fn default_scripts_dir() -> PathBuf {
    PathBuf::from("scripts")
}
fn default_dest_dir() -> PathBuf {
    PathBuf::from("python/audioflux/lib")
}
fn default_windows_source_name() -> String {
    DEFAULT_WINDOWS_SOURCE_NAME.to_string()
}

impl XtaskConfig {
    /// Load `<root>/xtask.toml`, or defaults if it doesn't exist.
    pub fn load(root: &Path) -> Result<Self> {
        let config_path = root.join(CONFIG_FILE);

        if !config_path.exists() {
            return Ok(XtaskConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        Self::parse(&content).with_context(|| format!("Failed to parse {}", config_path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}
