//! Configuration resolution for kairos-api
//!
//! Each setting resolves CLI → ENV → TOML → default. Credentials are never
//! compiled in; a missing key only matters once the assisted pipeline needs it.

use kairos_common::config::{env_value, is_valid_key, TomlConfig};
use kairos_common::{Error, Result};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{info, warn};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_UPLOAD_DIR: &str = "data";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_SHOPPING_API_BASE: &str = "https://serpapi.com";
pub const DEFAULT_SHOPPING_ENGINE: &str = "google_shopping";
pub const DEFAULT_SHOPPING_MAX_RESULTS: usize = 3;

const GEMINI_KEY_VARS: &[&str] = &["KAIROS_GEMINI_API_KEY", "GEMINI_API_KEY"];
const SHOPPING_KEY_VARS: &[&str] = &["KAIROS_SERPAPI_API_KEY", "SERPAPI_API_KEY"];

/// Which request pipeline serves `POST /analyze-room`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineMode {
    /// Stub detection + vibe tags + rule table
    #[default]
    Rules,
    /// Stub layout + fixed suggestions + model and shopping calls
    Assisted,
}

impl FromStr for PipelineMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rules" => Ok(PipelineMode::Rules),
            "assisted" => Ok(PipelineMode::Assisted),
            other => Err(Error::Config(format!(
                "Unknown pipeline '{}' (expected 'rules' or 'assisted')",
                other
            ))),
        }
    }
}

impl fmt::Display for PipelineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineMode::Rules => write!(f, "rules"),
            PipelineMode::Assisted => write!(f, "assisted"),
        }
    }
}

/// Multimodal model settings
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub api_base: String,
    pub model: String,
}

/// Shopping search settings
#[derive(Debug, Clone)]
pub struct ShoppingConfig {
    pub api_key: Option<String>,
    pub api_base: String,
    pub engine: String,
    pub max_results: usize,
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub pipeline: PipelineMode,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub request_timeout_secs: u64,
    pub gemini: GeminiConfig,
    pub shopping: ShoppingConfig,
}

/// Values supplied on the command line (tier 1)
///
/// `clap` already folds the `KAIROS_*` env fallbacks for these fields into the
/// parsed arguments.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub pipeline: Option<PipelineMode>,
    pub upload_dir: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            pipeline: PipelineMode::default(),
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            gemini: GeminiConfig {
                api_key: None,
                api_base: DEFAULT_GEMINI_API_BASE.to_string(),
                model: DEFAULT_GEMINI_MODEL.to_string(),
            },
            shopping: ShoppingConfig {
                api_key: None,
                api_base: DEFAULT_SHOPPING_API_BASE.to_string(),
                engine: DEFAULT_SHOPPING_ENGINE.to_string(),
                max_results: DEFAULT_SHOPPING_MAX_RESULTS,
            },
        }
    }
}

impl ServiceConfig {
    /// Merge all tiers into a service configuration
    pub fn resolve(cli: CliOverrides, toml_config: &TomlConfig) -> Result<Self> {
        let defaults = ServiceConfig::default();

        let pipeline = match cli.pipeline {
            Some(mode) => mode,
            None => match toml_config.pipeline.as_deref() {
                Some(name) => name.parse()?,
                None => defaults.pipeline,
            },
        };

        let max_results = toml_config
            .shopping
            .max_results
            .unwrap_or(defaults.shopping.max_results);
        if max_results == 0 {
            return Err(Error::Config(
                "shopping.max_results must be at least 1".to_string(),
            ));
        }

        let request_timeout_secs = toml_config
            .request_timeout_secs
            .unwrap_or(defaults.request_timeout_secs);
        if request_timeout_secs == 0 {
            return Err(Error::Config(
                "request_timeout_secs must be at least 1".to_string(),
            ));
        }

        let config = Self {
            host: cli
                .host
                .or_else(|| toml_config.host.clone())
                .unwrap_or(defaults.host),
            port: cli.port.or(toml_config.port).unwrap_or(defaults.port),
            pipeline,
            upload_dir: cli
                .upload_dir
                .or_else(|| toml_config.upload_dir.clone())
                .unwrap_or(defaults.upload_dir),
            max_upload_bytes: toml_config
                .max_upload_bytes
                .unwrap_or(defaults.max_upload_bytes),
            request_timeout_secs,
            gemini: GeminiConfig {
                api_key: resolve_key("Gemini", GEMINI_KEY_VARS, toml_config.gemini.api_key.as_ref()),
                api_base: non_empty(toml_config.gemini.api_base.as_ref())
                    .unwrap_or(defaults.gemini.api_base),
                model: non_empty(toml_config.gemini.model.as_ref())
                    .unwrap_or(defaults.gemini.model),
            },
            shopping: ShoppingConfig {
                api_key: resolve_key(
                    "Shopping",
                    SHOPPING_KEY_VARS,
                    toml_config.shopping.api_key.as_ref(),
                ),
                api_base: non_empty(toml_config.shopping.api_base.as_ref())
                    .unwrap_or(defaults.shopping.api_base),
                engine: non_empty(toml_config.shopping.engine.as_ref())
                    .unwrap_or(defaults.shopping.engine),
                max_results,
            },
        };

        Ok(config)
    }

    /// Names of the credentials the assisted pipeline lacks
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.gemini.api_key.is_none() {
            missing.push(GEMINI_KEY_VARS[0]);
        }
        if self.shopping.api_key.is_none() {
            missing.push(SHOPPING_KEY_VARS[0]);
        }
        missing
    }

    /// Warn about settings the active pipeline needs but does not have
    pub fn log_missing_credentials(&self) {
        if self.pipeline != PipelineMode::Assisted {
            return;
        }
        if self.gemini.api_key.is_none() {
            warn!(
                "Gemini API key not configured; /analyze-room will fail. Set {} or [gemini] api_key",
                GEMINI_KEY_VARS[0]
            );
        }
        if self.shopping.api_key.is_none() {
            warn!(
                "Shopping API key not configured; /analyze-room will fail. Set {} or [shopping] api_key",
                SHOPPING_KEY_VARS[0]
            );
        }
    }
}

/// Resolve a credential: ENV → TOML
fn resolve_key(service: &str, env_vars: &[&str], toml_key: Option<&String>) -> Option<String> {
    if let Some(key) = env_value(env_vars) {
        if toml_key.is_some_and(|k| is_valid_key(k)) {
            warn!(
                "{} API key found in environment and TOML. Using environment (higher priority).",
                service
            );
        }
        info!("{} API key loaded from environment variable", service);
        return Some(key);
    }

    if let Some(key) = non_empty(toml_key) {
        info!("{} API key loaded from TOML config", service);
        return Some(key);
    }

    None
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value
        .filter(|v| is_valid_key(v))
        .map(|v| v.trim().to_string())
}
