use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::Path;
use thiserror::Error;
use tracing::{error, info, warn};
use validator::{Validate, ValidationError};

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_AIRTABLE_API_URL: &str = "https://api.airtable.com/v0";
const DEFAULT_ENV_FILE: &str = ".env";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const CONFIG_DIR: &str = "config";

/// Environment variable holding the Airtable personal access token
pub const API_KEY_VAR: &str = "AIRTABLE_API_KEY";
/// Environment variable holding the Airtable base id
pub const BASE_ID_VAR: &str = "AIRTABLE_BASE_ID";
/// Table every request is addressed to
pub const TABLE_NAME: &str = "Inventory";

/// Server configuration with validation
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Application environment
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    #[validate(custom = "validate_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Root of the Airtable REST API, without a trailing base id
    #[serde(default = "default_airtable_api_url")]
    #[validate(custom = "validate_api_url")]
    pub airtable_api_url: String,

    /// Optional key=value file consulted for credentials missing from the environment
    #[serde(default = "default_env_file")]
    pub env_file: String,

    /// Outbound request timeout (seconds)
    #[serde(default = "default_request_timeout_secs")]
    #[validate(range(min = 1, max = 300))]
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: default_environment(),
            log_level: default_log_level(),
            log_json: false,
            airtable_api_url: default_airtable_api_url(),
            env_file: default_env_file(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl AppConfig {
    /// Gets log level reference
    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    /// Outbound request timeout as a Duration
    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs)
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Configuration loading failed: {0}")]
    Load(#[from] ConfigError),

    #[error("Configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_environment() -> String {
    DEFAULT_ENV.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_airtable_api_url() -> String {
    DEFAULT_AIRTABLE_API_URL.to_string()
}

fn default_env_file() -> String {
    DEFAULT_ENV_FILE.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

/// Validates log level values
fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if valid_levels.contains(&level.to_lowercase().as_str()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("log_level");
        err.message = Some("Must be one of: trace, debug, info, warn, error".into());
        Err(err)
    }
}

fn validate_api_url(url: &str) -> Result<(), ValidationError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        let mut err = ValidationError::new("airtable_api_url");
        err.message = Some("airtable_api_url must be an http:// or https:// URL".into());
        Err(err)
    }
}

/// Initializes tracing using the provided log level as the default filter
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_directive = format!("inventory_gateway={},tower_http=debug", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    if json {
        let _ = fmt()
            .with_env_filter(EnvFilter::new(filter_directive))
            .json()
            .try_init();
    } else {
        let _ = fmt()
            .with_env_filter(EnvFilter::new(filter_directive))
            .try_init();
    }
}

/// Loads application configuration
///
/// Layers configuration sources in this order:
/// 1. Built-in defaults
/// 2. Default config (config/default.toml)
/// 3. Environment-specific config (config/{env}.toml)
/// 4. Environment variables (APP__*)
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !Path::new(CONFIG_DIR).exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            CONFIG_DIR
        );
    }

    let config = Config::builder()
        .set_default("host", DEFAULT_HOST)?
        .set_default("port", i64::from(DEFAULT_PORT))?
        .set_default("environment", run_env.as_str())?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
        .add_source(File::with_name(&format!("{}/{}", CONFIG_DIR, run_env)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;

    app_config.validate().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    info!("Configuration loaded successfully");
    Ok(app_config)
}

/// Airtable credentials resolved once at startup.
///
/// Values come from the process environment first and fall back to the override file.
/// Blank values are treated as absent.
#[derive(Clone, Default)]
pub struct Credentials {
    api_key: Option<String>,
    base_id: Option<String>,
    env_file_found: bool,
}

impl Credentials {
    pub fn new(api_key: Option<String>, base_id: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|v| !v.trim().is_empty()),
            base_id: base_id.filter(|v| !v.trim().is_empty()),
            env_file_found: false,
        }
    }

    /// Resolves credentials from the process environment and the override file at `env_file`.
    pub fn load(env_file: impl AsRef<Path>) -> Self {
        let overrides = read_override_file(env_file.as_ref());
        Self::resolve(|key| env::var(key).ok(), overrides)
    }

    /// Resolves credentials from an arbitrary lookup, using `overrides` for keys the lookup
    /// does not provide. `None` for `overrides` means the override file was not found.
    pub fn resolve<F>(lookup: F, overrides: Option<HashMap<String, String>>) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_file_found = overrides.is_some();
        let overrides = overrides.unwrap_or_default();
        let pick = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .or_else(|| overrides.get(key).cloned())
        };

        let mut credentials = Self::new(pick(API_KEY_VAR), pick(BASE_ID_VAR));
        credentials.env_file_found = env_file_found;
        credentials
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn base_id(&self) -> Option<&str> {
        self.base_id.as_deref()
    }

    pub fn env_file_found(&self) -> bool {
        self.env_file_found
    }

    /// True when both the API key and the base id are present
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some() && self.base_id.is_some()
    }

    /// Names of the environment variables that still need a value
    pub fn missing_vars(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.api_key.is_none() {
            missing.push(API_KEY_VAR);
        }
        if self.base_id.is_none() {
            missing.push(BASE_ID_VAR);
        }
        missing
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key_set", &self.api_key.is_some())
            .field("api_key_length", &self.api_key.as_ref().map_or(0, String::len))
            .field("base_id_set", &self.base_id.is_some())
            .field("base_id_length", &self.base_id.as_ref().map_or(0, String::len))
            .field("env_file_found", &self.env_file_found)
            .finish()
    }
}

/// Reads the override file, returning `None` when it does not exist or cannot be opened.
fn read_override_file(path: &Path) -> Option<HashMap<String, String>> {
    let iter = match dotenvy::from_path_iter(path) {
        Ok(iter) => iter,
        Err(err) if err.not_found() => {
            info!(path = %path.display(), "No override file found");
            return None;
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "Override file could not be read");
            return None;
        }
    };

    let mut values = HashMap::new();
    for item in iter {
        match item {
            // First occurrence wins, like a sequential setenv-if-unset loader
            Ok((key, value)) => {
                values.entry(key).or_insert(value);
            }
            Err(err) => warn!(path = %path.display(), error = %err, "Skipping malformed override line"),
        }
    }
    info!(path = %path.display(), entries = values.len(), "Loaded override file");
    Some(values)
}
