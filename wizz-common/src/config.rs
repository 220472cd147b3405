//! TOML configuration file model and discovery
//!
//! Services resolve each setting in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! This module owns tier 3: locating the file and loading it. A missing or
//! unreadable file never stops a service; it logs a warning and continues
//! with defaults.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Directory name under the platform config directory
pub const CONFIG_DIR_NAME: &str = "wizzlists";

/// File name of the TOML config file
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Logging section of the TOML file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset (e.g., "info", "debug")
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Contents of `config.toml`
///
/// Every field is optional so that partial files are valid.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TomlConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    /// Credential for the generative model provider
    pub openai_api_key: Option<String>,
    pub openai_model: Option<String>,
    pub openai_endpoint: Option<String>,
    /// Structured knowledge source query endpoint
    pub sparql_endpoint: Option<String>,
    /// Per-request timeout for upstream calls
    pub upstream_timeout_secs: Option<u64>,
    /// Directory of static assets served for unmatched paths
    pub static_dir: Option<PathBuf>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Default config file location for the platform
///
/// `~/.config/wizzlists/config.toml` on Linux, the platform equivalent
/// elsewhere. `None` when the platform has no config directory.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Load and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))
}

/// Load the config file, degrading to defaults on any problem
///
/// `explicit` takes priority over the platform default location.
pub fn load_or_default(explicit: Option<&Path>) -> TomlConfig {
    let path = match explicit.map(Path::to_path_buf).or_else(default_config_path) {
        Some(path) => path,
        None => {
            warn!("No config directory on this platform, using defaults");
            return TomlConfig::default();
        }
    };

    if !path.exists() {
        if explicit.is_some() {
            warn!("Config file not found: {} (using defaults)", path.display());
        } else {
            info!("No config file at {} (using defaults)", path.display());
        }
        return TomlConfig::default();
    }

    match load_toml_config(&path) {
        Ok(config) => {
            info!("Loaded config file: {}", path.display());
            config
        }
        Err(e) => {
            warn!("Ignoring config file {}: {}", path.display(), e);
            TomlConfig::default()
        }
    }
}
