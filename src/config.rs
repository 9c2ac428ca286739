//! Application configuration: backend location, user identity, map token.
//!
//! Settings load from a TOML file under the app directory, with environment
//! overrides applied on top. The backend base URL is resolved exactly once at
//! startup into a [`BackendConfig`] that both network operations receive; no
//! code derives URLs from ambient state after that point.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::app_dirs;

/// Filename used to store the app configuration.
pub const CONFIG_FILE_NAME: &str = "config.toml";

const DEFAULT_SERVER_PORT: u16 = 5000;
const DEFAULT_USER: &str = "demo";

/// Errors that may occur while loading, saving, or resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to create the config directory.
    #[error("Unable to create config directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to read the config file.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to write the config file.
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to parse the TOML config.
    #[error("Invalid config at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// Failed to serialize config to TOML.
    #[error("Failed to serialize config to TOML at {path}: {source}")]
    Serialize {
        path: PathBuf,
        source: toml::ser::Error,
    },
    /// No usable config directory found.
    #[error("No suitable config directory found")]
    NoConfigDir,
    /// A configured base URL failed to parse.
    #[error("Invalid backend base URL '{value}': {source}")]
    InvalidBaseUrl {
        value: String,
        source: url::ParseError,
    },
}

/// Settings as stored in `config.toml`. All fields have defaults so a missing
/// file yields a working demo setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Explicit backend base URL. When set it wins over the legacy
    /// origin-derived convention.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Page origin of the legacy web client, kept for the origin-derived
    /// fallback (e.g. `http://localhost:8080`).
    #[serde(default)]
    pub client_origin: Option<String>,
    /// Backend port used by the legacy origin-derived convention.
    #[serde(default = "default_server_port")]
    pub server_port: u16,
    /// Backend user identifier for the samples endpoint.
    #[serde(default = "default_user")]
    pub user: String,
    /// Map access token handed to the external visualization component.
    #[serde(default)]
    pub map_token: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            client_origin: None,
            server_port: DEFAULT_SERVER_PORT,
            user: DEFAULT_USER.to_string(),
            map_token: None,
        }
    }
}

fn default_server_port() -> u16 {
    DEFAULT_SERVER_PORT
}

fn default_user() -> String {
    DEFAULT_USER.to_string()
}

/// Backend endpoints and identity, resolved once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendConfig {
    /// Base URL every API path is joined onto.
    pub base_url: Url,
    /// User segment of the samples endpoint.
    pub user: String,
    /// Optional map access token (unused by the exchanges themselves).
    pub map_token: Option<String>,
}

impl AppConfig {
    /// Resolve the backend base URL, preferring the explicit value and falling
    /// back to the legacy origin convention, then to localhost.
    pub fn resolve_backend(&self) -> Result<BackendConfig, ConfigError> {
        let raw = match (&self.base_url, &self.client_origin) {
            (Some(explicit), _) => explicit.clone(),
            (None, Some(origin)) => derive_server_url(origin, self.server_port),
            (None, None) => format!("http://localhost:{}", self.server_port),
        };
        let base_url = Url::parse(&raw).map_err(|source| ConfigError::InvalidBaseUrl {
            value: raw,
            source,
        })?;
        Ok(BackendConfig {
            base_url,
            user: self.user.clone(),
            map_token: self.map_token.clone(),
        })
    }

    /// Apply environment overrides on top of the file contents.
    ///
    /// Recognized variables: `MAPSTASH_BASE_URL`, `MAPSTASH_USER`, and
    /// `MAPSTASH_MAP_TOKEN` or the legacy `MapboxAccessToken`.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(value) = var("MAPSTASH_BASE_URL") {
            self.base_url = Some(value);
        }
        if let Some(value) = var("MAPSTASH_USER") {
            self.user = value;
        }
        if let Some(value) = var("MAPSTASH_MAP_TOKEN").or_else(|| var("MapboxAccessToken")) {
            self.map_token = Some(value);
        }
    }
}

/// Derive the backend URL from a page origin the way the original web client
/// did: drop the last 4 characters (a 4-digit port) and append the configured
/// port. `http://localhost:8080` with port 5000 becomes
/// `http://localhost:5000`.
pub fn derive_server_url(origin: &str, server_port: u16) -> String {
    let cut = origin
        .char_indices()
        .rev()
        .nth(3)
        .map(|(idx, _)| idx)
        .unwrap_or(0);
    format!("{}{}", &origin[..cut], server_port)
}

/// Resolve the configuration file path inside the app directory.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    let dir = app_dirs::app_root_dir().map_err(map_app_dir_error)?;
    Ok(dir.join(CONFIG_FILE_NAME))
}

/// Load configuration from the default location, returning defaults if the
/// file is missing. Environment overrides are applied on top.
pub fn load_or_default() -> Result<AppConfig, ConfigError> {
    let mut config = load_from_path(&config_path()?)?;
    config.apply_env_overrides();
    Ok(config)
}

/// Load configuration from a specific path; a missing file yields defaults.
pub fn load_from_path(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Save configuration to a specific path, creating parent directories.
pub fn save_to_path(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let text = toml::to_string_pretty(config).map_err(|source| ConfigError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, text).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn map_app_dir_error(error: app_dirs::AppDirError) -> ConfigError {
    match error {
        app_dirs::AppDirError::NoBaseDir => ConfigError::NoConfigDir,
        app_dirs::AppDirError::CreateDir { path, source } => ConfigError::CreateDir { path, source },
    }
}
