//! Engine configuration.
//!
//! Priority: environment variables > config file > defaults. The config
//! file is JSON and every field is optional:
//!
//! ```json
//! { "engine": { "representation": "masks", "cache_enabled": true, "catalog": "tags.txt" } }
//! ```

use crate::engine::Representation;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "RANGEQ_CONFIG";
pub const REPRESENTATION_ENV: &str = "RANGEQ_REPRESENTATION";
pub const CACHE_ENV: &str = "RANGEQ_CACHE";
pub const CATALOG_ENV: &str = "RANGEQ_CATALOG";

/// Configuration file format (JSON)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub engine: EngineConfigFile,
}

/// Engine section of the config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfigFile {
    pub representation: Option<Representation>,
    pub cache_enabled: Option<bool>,
    /// Tag grid to load instead of the built-in catalog
    pub catalog: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Representation queries are evaluated in
    pub representation: Representation,
    /// Memoize results per expression
    pub cache_enabled: bool,
    /// Tag grid file; `None` selects a built-in catalog
    pub catalog: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            representation: Representation::Ranges,
            cache_enabled: true,
            catalog: None,
        }
    }
}

impl EngineConfig {
    /// Load config from `path`, or from the file named by `RANGEQ_CONFIG`,
    /// then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let env_path = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let mut config = Self::default();

        if let Some(path) = path.or(env_path.as_deref()) {
            config.apply_file(&read_config_file(path)?);
        }
        config.apply_env(|key| std::env::var(key).ok());

        Ok(config)
    }

    /// Overwrite the fields the file sets
    pub fn apply_file(&mut self, file: &ConfigFile) {
        if let Some(v) = file.engine.representation {
            self.representation = v;
        }
        if let Some(v) = file.engine.cache_enabled {
            self.cache_enabled = v;
        }
        if let Some(v) = &file.engine.catalog {
            self.catalog = Some(v.clone());
        }
    }

    /// Apply overrides from `lookup`; unparseable values are ignored
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup(REPRESENTATION_ENV) {
            if let Ok(repr) = val.parse() {
                self.representation = repr;
            }
        }

        if let Some(val) = lookup(CACHE_ENV) {
            if let Some(enabled) = parse_flag(&val) {
                self.cache_enabled = enabled;
            }
        }

        if let Some(val) = lookup(CATALOG_ENV) {
            if !val.trim().is_empty() {
                self.catalog = Some(PathBuf::from(val));
            }
        }
    }
}

fn read_config_file(path: &Path) -> Result<ConfigFile> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config {}", path.display()))
}

fn parse_flag(val: &str) -> Option<bool> {
    match val.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
