//! Configuration loading from diffcalls.toml.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::Path};

use crate::aggregate::ContextPolicy;
use crate::error::DiffcallsError;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "diffcalls.toml";

/// Main configuration structure for diffcalls.toml.
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DiffcallsConfig {
    /// Which files are picked up from the input directory.
    pub scan: Option<ScanConfig>,
    /// Call extraction and tallying.
    pub calls: Option<CallsConfig>,
    /// Output configuration.
    pub output: Option<OutputConfig>,
}

/// `[scan]` table.
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScanConfig {
    /// Accepted extensions; an empty list accepts every regular file.
    pub extensions: Option<Vec<String>>,
    pub recursive: Option<bool>,
    /// Directory names pruned from the walk.
    pub exclude: Option<Vec<String>>,
}

/// `[calls]` table.
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CallsConfig {
    /// Extra reserved keywords, added to the built-in set.
    pub keywords: Option<Vec<String>>,
    pub context_policy: Option<ContextPolicy>,
}

/// Output format configuration.
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Output format: "plain" or "json".
    pub format: Option<String>,
}

impl DiffcallsConfig {
    /// True when `[output] format = "json"`.
    pub fn wants_json(&self) -> bool {
        self.output
            .as_ref()
            .and_then(|o| o.format.as_deref())
            .is_some_and(|f| f.eq_ignore_ascii_case("json"))
    }
}

/// Loads configuration from diffcalls.toml in `dir` if it exists.
pub fn load_config(dir: &Path) -> Result<Option<DiffcallsConfig>> {
    let path = dir.join(CONFIG_FILE_NAME);
    if !path.exists() {
        return Ok(None);
    }
    load_config_file(&path).map(Some)
}

/// Loads configuration from an explicit path; a missing file is an error.
pub fn load_config_file(path: &Path) -> Result<DiffcallsConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let cfg = toml::from_str(&content)
        .map_err(|e| DiffcallsError::config(path, e.to_string()))
        .with_context(|| format!("Invalid {}", path.display()))?;
    Ok(cfg)
}
