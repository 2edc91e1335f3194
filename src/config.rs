//! Optional TOML defaults for the tsq binary
//!
//! Lookup order, first existing file wins:
//! 1. the path given with `--config`
//! 2. `./.tsq.toml`
//! 3. `<user config dir>/tsq/config.toml`
//!
//! ```toml
//! [defaults]
//! jobs = 4
//! max_bytes = 1048576
//! language = "go"
//! ignore_dirs = ["testdata"]
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TsqError};

/// Name of the per-project config file
pub const PROJECT_CONFIG_FILE: &str = ".tsq.toml";

/// Values from the `[defaults]` table; unset fields fall through to built-ins
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Defaults {
    pub jobs: Option<isize>,
    pub max_bytes: Option<u64>,
    pub max_source_lines: Option<usize>,
    pub outline_max_source_lines: Option<usize>,
    pub language: Option<String>,
    pub respect_gitignore: Option<bool>,
    /// Added to the built-in ignored directory names
    pub ignore_dirs: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub defaults: Defaults,

    /// File the config was read from
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Config {
    /// Load the first config found, or the defaults when there is none
    ///
    /// An explicitly requested file must exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(TsqError::Config {
                    path: path.to_path_buf(),
                    message: "file not found".to_string(),
                });
            }
            return Self::from_path(path);
        }

        for candidate in candidate_paths() {
            if candidate.is_file() {
                return Self::from_path(&candidate);
            }
        }

        log::debug!("No tsq config found, using built-in defaults");
        Ok(Self::default())
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| TsqError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let mut config = Self::parse(&text, path)?;
        config.source = Some(path.to_path_buf());
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse config text; `path` is only used in error messages
    pub fn parse(text: &str, path: &Path) -> Result<Self> {
        toml::from_str(text).map_err(|e| TsqError::Config {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })
    }
}

fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(PROJECT_CONFIG_FILE)];
    match dirs::config_dir() {
        Some(dir) => paths.push(dir.join("tsq").join("config.toml")),
        None => log::debug!("Could not determine user config directory"),
    }
    paths
}
