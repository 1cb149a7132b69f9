//! Configuration management for Salt Courier
//!
//! The configuration is a single TOML file. Top-level keys hold global
//! settings; every other table is a named connection profile:
//!
//! ```toml
//! debug = false
//! timeout = 30
//!
//! [logging]
//! level = "warn"
//!
//! [netapi]
//! url = "https://salt:8000"
//! username = "salt"
//! password = "secret"
//! auth = "pam"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::app::ClientConfig;
use crate::constants::{config as config_constants, http, polling};
use crate::errors::{ConfigError, ConfigResult};
use crate::output::OutputKind;

/// Unified application configuration for TOML serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Print full error chains on failure
    #[serde(default)]
    pub debug: bool,
    /// Output kind forced for every final render
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputKind>,
    /// Poll budget: lookups before the final iteration is forced
    #[serde(default = "default_timeout")]
    pub timeout: u32,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// HTTP client settings
    #[serde(default)]
    pub client: ClientConfigToml,
    /// Connection profiles keyed by name
    #[serde(flatten)]
    pub profiles: BTreeMap<String, ProfileConfig>,
}

fn default_timeout() -> u32 {
    polling::DEFAULT_POLL_BUDGET
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            debug: false,
            output: None,
            timeout: default_timeout(),
            logging: LoggingConfig::default(),
            client: ClientConfigToml::default(),
            profiles: BTreeMap::new(),
        }
    }
}

/// One salt-api endpoint and the account used on it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Base URL of salt-api, http or https
    pub url: String,
    pub username: Option<String>,
    /// May be omitted and supplied by environment or prompt
    pub password: Option<String>,
    /// eauth backend, `pam` when omitted
    pub auth: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log level for the application
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

/// TOML-friendly client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfigToml {
    /// Request timeout in seconds
    pub request_timeout_secs: u64,
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
    /// Accept self-signed certificates
    pub accept_invalid_certs: bool,
}

impl Default for ClientConfigToml {
    fn default() -> Self {
        Self {
            request_timeout_secs: http::DEFAULT_TIMEOUT.as_secs(),
            connect_timeout_secs: http::CONNECT_TIMEOUT.as_secs(),
            accept_invalid_certs: false,
        }
    }
}

impl ClientConfigToml {
    /// Convert to runtime ClientConfig
    pub fn to_runtime_config(&self) -> ClientConfig {
        ClientConfig {
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            accept_invalid_certs: self.accept_invalid_certs,
            ..ClientConfig::default()
        }
    }
}

impl AppConfig {
    /// Load configuration from the given path, or the default location
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing, is not a regular file,
    /// cannot be read or does not parse.
    pub async fn load(config_file_override: Option<PathBuf>) -> ConfigResult<Self> {
        let path = match config_file_override {
            Some(path) => path,
            None => Self::default_config_path()?,
        };

        if !path.exists() {
            return Err(ConfigError::NotFound { path });
        }
        if !path.is_file() {
            return Err(ConfigError::NotAFile { path });
        }

        debug!("Loading config from: {}", path.display());
        Self::load_from_file(&path).await
    }

    /// Get the default config file path for the current user
    pub fn default_config_path() -> ConfigResult<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::MissingField {
            field: "user config directory".to_string(),
        })?;

        Ok(config_dir
            .join(config_constants::APP_DIR)
            .join(config_constants::FILE_NAME))
    }

    /// Load configuration from a TOML file
    async fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let config = Self::parse(&content)?;
        info!("Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Parse configuration text
    pub fn parse(content: &str) -> ConfigResult<Self> {
        let config: AppConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Look up a connection profile by name
    pub fn profile(&self, name: &str) -> ConfigResult<&ProfileConfig> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::MissingProfile {
                profile: name.to_string(),
            })
    }

    /// Example configuration shown when no config file exists
    pub fn example_content() -> String {
        format!(
            r#"# Salt Courier configuration
debug = false
timeout = {}

[logging]
level = "warn"  # error, warn, info, debug, trace

[client]
request_timeout_secs = {}
connect_timeout_secs = {}

[{}]
url = "https://salt:8000"
username = "salt"
# password = "secret"  # or set SALT_COURIER_PASSWORD
auth = "pam"
"#,
            polling::DEFAULT_POLL_BUDGET,
            http::DEFAULT_TIMEOUT.as_secs(),
            http::CONNECT_TIMEOUT.as_secs(),
            config_constants::DEFAULT_PROFILE,
        )
    }
}
