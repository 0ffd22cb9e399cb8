//! Bootstrap configuration loading
//!
//! Settings come from, in priority order:
//! 1. Command-line arguments
//! 2. Environment variables (`VOICEDECK_PORT`, `GEMINI_API_KEY`)
//! 3. TOML configuration file
//! 4. Built-in defaults (code constants)
//!
//! A missing configuration file is not an error: a warning is logged and the
//! built-in defaults apply. An explicitly requested file must exist.

use crate::voices::{find_voice, DEFAULT_VOICE_ID};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable holding the speech service API key
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Bootstrap configuration loaded from TOML file
///
/// These settings cannot change during runtime.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TomlConfig {
    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Speech service API key (prefer the environment variable)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Speech model name
    #[serde(default = "default_model")]
    pub model: String,

    /// Speech service base URL (no trailing slash)
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Voice selected on startup
    #[serde(default = "default_voice")]
    pub default_voice: String,

    /// Per-request timeout for synthesis calls
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_port() -> u16 {
    5760
}

fn default_model() -> String {
    "gemini-2.5-flash-preview-tts".to_string()
}

fn default_api_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_voice() -> String {
    DEFAULT_VOICE_ID.to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            api_key: None,
            model: default_model(),
            api_base_url: default_api_base_url(),
            default_voice: default_voice(),
            request_timeout_secs: default_request_timeout_secs(),
            logging: LoggingConfig::default(),
        }
    }
}

impl TomlConfig {
    /// Parse and validate TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints the deserializer cannot express
    pub fn validate(&self) -> Result<()> {
        if find_voice(&self.default_voice).is_none() {
            return Err(Error::Config(format!(
                "Unknown default_voice '{}'",
                self.default_voice
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(Error::Config(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.model.trim().is_empty() {
            return Err(Error::Config("model must not be empty".to_string()));
        }
        Ok(())
    }

    /// Load configuration and log where it came from.
    ///
    /// With an explicit `path` the file must exist and parse. Without one,
    /// the platform default location is tried and built-in defaults are used
    /// if no file is there.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (config, source) = Self::locate(path)?;
        source.log();
        Ok(config)
    }

    /// Same as [`TomlConfig::load`] but without logging, for callers that
    /// load before a tracing subscriber is installed. Log the returned
    /// [`ConfigSource`] once one is.
    pub fn locate(path: Option<&Path>) -> Result<(Self, ConfigSource)> {
        if let Some(path) = path {
            let config = Self::load_file(path)?;
            return Ok((config, ConfigSource::File(path.to_path_buf())));
        }

        match default_config_path() {
            Some(path) if path.exists() => {
                let config = Self::load_file(&path)?;
                Ok((config, ConfigSource::File(path)))
            }
            Some(path) => Ok((Self::default(), ConfigSource::Defaults { missing: Some(path) })),
            None => Ok((Self::default(), ConfigSource::Defaults { missing: None })),
        }
    }

    fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Resolve the API key: CLI argument, then environment, then TOML.
    ///
    /// Blank values at any level are skipped.
    pub fn resolve_api_key(&self, cli_arg: Option<&str>) -> Option<String> {
        if let Some(key) = cli_arg.filter(|k| !k.trim().is_empty()) {
            debug!("Using API key from command line");
            return Some(key.to_string());
        }

        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                debug!("Using API key from {}", API_KEY_ENV);
                return Some(key);
            }
        }

        self.api_key
            .as_ref()
            .filter(|k| !k.trim().is_empty())
            .cloned()
    }
}

/// Where a loaded configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    /// Built-in defaults; `missing` is the default path that had no file
    Defaults { missing: Option<PathBuf> },
}

impl ConfigSource {
    pub fn log(&self) {
        match self {
            ConfigSource::File(path) => info!("Loaded configuration from {}", path.display()),
            ConfigSource::Defaults { missing: Some(path) } => warn!(
                "Config file not found at {}, using built-in defaults",
                path.display()
            ),
            ConfigSource::Defaults { missing: None } => {
                warn!("Could not determine config directory, using built-in defaults")
            }
        }
    }
}

/// Platform configuration file location (`<config dir>/voicedeck/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("voicedeck").join("config.toml"))
}
