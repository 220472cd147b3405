//! Configuration resolution for wizz-lists
//!
//! Each setting resolves in priority order: command line → environment →
//! TOML file → compiled default. clap covers the first two tiers for most
//! settings; the model credential is resolved by hand so that a blank value
//! in a higher tier falls through and duplicate sources are reported.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use wizz_common::config::TomlConfig;
use wizz_common::text::non_blank;

use crate::error::UpstreamError;
use crate::services::generative::{DEFAULT_OPENAI_ENDPOINT, DEFAULT_OPENAI_MODEL};
use crate::services::knowledge_source::WIKIDATA_SPARQL_URL;
use crate::services::{OpenAiClient, StructuredSource, TextModel, WikidataClient};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 20;

/// Environment variable holding the model credential
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Command-line arguments for wizz-lists
#[derive(Parser, Debug, Default, Clone)]
#[command(name = "wizz-lists")]
#[command(about = "Ranked list generation service for WizzLists")]
#[command(version)]
pub struct Args {
    /// Path to the TOML config file
    #[arg(short, long, env = "WIZZ_CONFIG")]
    pub config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Address to bind
    #[arg(long, env = "WIZZ_HOST")]
    pub host: Option<String>,

    /// Generative model credential (also read from OPENAI_API_KEY)
    #[arg(long)]
    pub openai_api_key: Option<String>,

    /// Generative model name
    #[arg(long, env = "OPENAI_MODEL")]
    pub openai_model: Option<String>,

    /// Chat completions endpoint
    #[arg(long, env = "OPENAI_ENDPOINT")]
    pub openai_endpoint: Option<String>,

    /// Structured knowledge source endpoint
    #[arg(long, env = "WIZZ_SPARQL_ENDPOINT")]
    pub sparql_endpoint: Option<String>,

    /// Per-request timeout for upstream calls, in seconds
    #[arg(long, env = "WIZZ_UPSTREAM_TIMEOUT_SECS")]
    pub upstream_timeout_secs: Option<u64>,

    /// Directory of static assets served for unmatched paths
    #[arg(long, env = "WIZZ_STATIC_DIR")]
    pub static_dir: Option<PathBuf>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_endpoint: String,
    pub sparql_endpoint: String,
    pub upstream_timeout: Duration,
    pub static_dir: Option<PathBuf>,
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::resolve(&Args::default(), &TomlConfig::default())
    }
}

impl ServiceConfig {
    /// Merge command line (already merged with environment by clap) over the
    /// TOML file over defaults
    pub fn resolve(args: &Args, toml: &TomlConfig) -> Self {
        // Zero is unusable at any tier and defers to the next one
        let upstream_timeout_secs = args
            .upstream_timeout_secs
            .filter(|secs| *secs > 0)
            .or(toml.upstream_timeout_secs.filter(|secs| *secs > 0))
            .unwrap_or(DEFAULT_UPSTREAM_TIMEOUT_SECS);

        Self {
            host: non_blank(args.host.clone())
                .or_else(|| non_blank(toml.host.clone()))
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: args.port.or(toml.port).unwrap_or(DEFAULT_PORT),
            openai_api_key: resolve_openai_api_key(args.openai_api_key.as_deref(), toml),
            openai_model: non_blank(args.openai_model.clone())
                .or_else(|| non_blank(toml.openai_model.clone()))
                .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            openai_endpoint: non_blank(args.openai_endpoint.clone())
                .or_else(|| non_blank(toml.openai_endpoint.clone()))
                .unwrap_or_else(|| DEFAULT_OPENAI_ENDPOINT.to_string()),
            sparql_endpoint: non_blank(args.sparql_endpoint.clone())
                .or_else(|| non_blank(toml.sparql_endpoint.clone()))
                .unwrap_or_else(|| WIKIDATA_SPARQL_URL.to_string()),
            upstream_timeout: Duration::from_secs(upstream_timeout_secs),
            static_dir: args.static_dir.clone().or_else(|| toml.static_dir.clone()),
            log_level: toml.logging.level.clone(),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Structured knowledge source client
    pub fn structured_source(&self) -> Result<Arc<dyn StructuredSource>, UpstreamError> {
        let source: Arc<dyn StructuredSource> = Arc::new(WikidataClient::new(
            self.sparql_endpoint.clone(),
            self.upstream_timeout,
        )?);
        Ok(source)
    }

    /// Generative model client, `None` without a credential
    pub fn text_model(&self) -> Result<Option<Arc<dyn TextModel>>, UpstreamError> {
        let Some(api_key) = self.openai_api_key.as_deref() else {
            return Ok(None);
        };

        let model: Arc<dyn TextModel> = Arc::new(OpenAiClient::new(
            api_key,
            self.openai_model.clone(),
            self.openai_endpoint.clone(),
            self.upstream_timeout,
        )?);
        Ok(Some(model))
    }
}

/// Resolve the model credential
///
/// **Priority:** command line → `OPENAI_API_KEY` → TOML. Blank values are
/// treated as absent. `None` means the generative stage is disabled.
pub fn resolve_openai_api_key(cli_key: Option<&str>, toml: &TomlConfig) -> Option<String> {
    let env_key = std::env::var(OPENAI_API_KEY_ENV).ok();
    let toml_key = toml.openai_api_key.as_deref();

    let candidates = [
        ("command line", cli_key),
        ("environment", env_key.as_deref()),
        ("TOML", toml_key),
    ];

    let sources: Vec<&str> = candidates
        .iter()
        .filter(|(_, key)| key.is_some_and(is_valid_key))
        .map(|(source, _)| *source)
        .collect();

    if sources.len() > 1 {
        warn!(
            "Model API key found in multiple sources: {}. Using {} (highest priority).",
            sources.join(", "),
            sources[0]
        );
    }

    let resolved = candidates
        .iter()
        .find_map(|(source, key)| key.filter(|k| is_valid_key(k)).map(|k| (*source, k)));

    match resolved {
        Some((source, key)) => {
            info!("Model API key loaded from {}", source);
            Some(key.trim().to_string())
        }
        None => {
            info!("No model API key configured, generative stage disabled");
            None
        }
    }
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn toml_with_key(key: Option<&str>) -> TomlConfig {
        TomlConfig {
            openai_api_key: key.map(str::to_string),
            ..TomlConfig::default()
        }
    }

    #[test]
    fn test_is_valid_key() {
        assert!(is_valid_key("sk-abc"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("   "));
    }

    #[test]
    #[serial]
    fn test_key_priority_cli_over_env_over_toml() {
        std::env::set_var(OPENAI_API_KEY_ENV, "env-key");
        let toml = toml_with_key(Some("toml-key"));

        assert_eq!(resolve_openai_api_key(Some("cli-key"), &toml).as_deref(), Some("cli-key"));
        assert_eq!(resolve_openai_api_key(None, &toml).as_deref(), Some("env-key"));
        assert_eq!(resolve_openai_api_key(Some("  "), &toml).as_deref(), Some("env-key"));

        std::env::remove_var(OPENAI_API_KEY_ENV);
        assert_eq!(resolve_openai_api_key(None, &toml).as_deref(), Some("toml-key"));
    }

    #[test]
    #[serial]
    fn test_blank_key_everywhere_disables_model() {
        std::env::set_var(OPENAI_API_KEY_ENV, "");
        let config = ServiceConfig::resolve(&Args::default(), &toml_with_key(Some(" ")));
        std::env::remove_var(OPENAI_API_KEY_ENV);

        assert!(config.openai_api_key.is_none());
        assert!(config.text_model().unwrap().is_none());
    }

    #[test]
    #[serial]
    fn test_defaults() {
        std::env::remove_var(OPENAI_API_KEY_ENV);
        let config = ServiceConfig::default();

        assert_eq!(config.port, 3000);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.openai_model, "gpt-4o-mini");
        assert_eq!(config.sparql_endpoint, WIKIDATA_SPARQL_URL);
        assert_eq!(config.upstream_timeout, Duration::from_secs(20));
        assert_eq!(config.log_level, "info");
        assert!(config.static_dir.is_none());
        assert_eq!(config.bind_addr(), "127.0.0.1:3000");
    }

    #[test]
    #[serial]
    fn test_cli_overrides_toml() {
        std::env::remove_var(OPENAI_API_KEY_ENV);
        let toml = TomlConfig {
            port: Some(8080),
            host: Some("0.0.0.0".into()),
            openai_model: Some("toml-model".into()),
            upstream_timeout_secs: Some(5),
            ..TomlConfig::default()
        };
        let args = Args {
            port: Some(9090),
            upstream_timeout_secs: Some(0),
            ..Args::default()
        };

        let config = ServiceConfig::resolve(&args, &toml);

        assert_eq!(config.port, 9090);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.openai_model, "toml-model");
        // zero on the command line defers to the TOML value
        assert_eq!(config.upstream_timeout, Duration::from_secs(5));
    }

    #[test]
    #[serial]
    fn test_zero_timeout_at_every_tier_uses_default() {
        std::env::remove_var(OPENAI_API_KEY_ENV);
        let toml = TomlConfig {
            upstream_timeout_secs: Some(0),
            ..TomlConfig::default()
        };

        let zero = Args {
            upstream_timeout_secs: Some(0),
            ..Args::default()
        };
        let config = ServiceConfig::resolve(&zero, &toml);
        assert_eq!(config.upstream_timeout, Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS));

        let seven = Args {
            upstream_timeout_secs: Some(7),
            ..Args::default()
        };
        let config = ServiceConfig::resolve(&seven, &toml);
        assert_eq!(config.upstream_timeout, Duration::from_secs(7));
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "wizz-lists",
            "--port",
            "4000",
            "--openai-api-key",
            "sk-test",
            "--static-dir",
            "public",
        ])
        .unwrap();

        assert_eq!(args.port, Some(4000));
        assert_eq!(args.openai_api_key.as_deref(), Some("sk-test"));
        assert_eq!(args.static_dir, Some(PathBuf::from("public")));
    }
}
