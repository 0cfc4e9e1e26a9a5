//! Configuration loading and config file resolution
//!
//! Services resolve each setting in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! This module owns tiers 2 and 3; the command line is parsed by each binary.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Contents of a service TOML file
///
/// Every field is optional so callers can tell "not set" from "set to the
/// default" when merging with the other tiers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    /// Pipeline name ("rules" or "assisted")
    pub pipeline: Option<String>,
    /// Directory that receives uploaded photos
    pub upload_dir: Option<PathBuf>,
    pub max_upload_bytes: Option<usize>,
    pub request_timeout_secs: Option<u64>,
    pub logging: LoggingConfig,
    pub gemini: GeminiSection,
    pub shopping: ShoppingSection,
}

/// `[logging]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: Option<String>,
}

/// `[gemini]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiSection {
    pub api_key: Option<String>,
    pub api_base: Option<String>,
    pub model: Option<String>,
}

/// `[shopping]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShoppingSection {
    pub api_key: Option<String>,
    pub api_base: Option<String>,
    pub engine: Option<String>,
    pub max_results: Option<usize>,
}

/// Default TOML path for a module: `<config_dir>/kairos/<module>.toml`
pub fn default_config_path(module_name: &str) -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("kairos").join(format!("{}.toml", module_name)))
}

/// Load a TOML config file
///
/// A missing file is not an error and yields an all-empty config. A file
/// that exists but cannot be read or parsed is.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        debug!("No config file at {}, using defaults", path.display());
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed ({}): {}", path.display(), e)))?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))?;

    info!("Loaded config file: {}", path.display());
    Ok(config)
}

/// Validate a credential or other required string (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// First environment variable among `names` that holds a valid value
pub fn env_value(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|value| is_valid_key(value))
        .map(|value| value.trim().to_string())
}
