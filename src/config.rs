//! Run configuration: class catalog, valid backgrounds and reporting options, read
//! from YAML. The path comes from `--config`, else `SPELLCLASS_CONFIG`, else
//! `data/spellclass.yaml`.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::data::catalog::ClassCatalogEntry;
use crate::data::table::DEFAULT_SHEET_NAME;
use crate::error::ConfigError;

pub const DEFAULT_CONFIG_PATH: &str = "data/spellclass.yaml";
pub const CONFIG_ENV_VAR: &str = "SPELLCLASS_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub classes: Vec<ClassCatalogEntry>,
    #[serde(default)]
    pub valid_backgrounds: Vec<String>,
    /// Reserved for location filtering; carried but not consulted when annotating.
    #[serde(default)]
    pub locations: Vec<String>,
}

fn default_sheet_name() -> String {
    DEFAULT_SHEET_NAME.to_string()
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            sheet_name: default_sheet_name(),
            verbose: false,
            classes: Vec::new(),
            valid_backgrounds: Vec::new(),
            locations: Vec::new(),
        }
    }
}

impl RunConfig {
    pub fn from_yaml_str(raw: &str, path: &Path) -> Result<Self, ConfigError> {
        serde_yaml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&raw, path)
    }

    pub fn valid_background_set(&self) -> HashSet<String> {
        self.valid_backgrounds.iter().cloned().collect()
    }
}

/// Explicit path, then the environment override, then the default.
pub fn resolve_config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    std::env::var(CONFIG_ENV_VAR)
        .ok()
        .and_then(|value| {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(PathBuf::from(trimmed))
            }
        })
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
