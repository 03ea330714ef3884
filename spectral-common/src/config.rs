//! Configuration loading
//!
//! Resolution priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Command-line arguments and environment variables arrive together as
//! [`ConfigOverrides`]; the binary fills them from clap with `env` fallbacks.

use crate::{Error, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Compiled defaults used when no other source provides a value
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub bind_address: SocketAddr,
    pub database_path: PathBuf,
    pub kernel_origin: String,
    pub session_ttl_days: i64,
    pub log_level: String,
    pub samples_dir: PathBuf,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 5173)),
            database_path: default_data_folder().join("spectral.db"),
            kernel_origin: "http://127.0.0.1:8000/".to_string(),
            session_ttl_days: 30,
            log_level: "info".to_string(),
            samples_dir: PathBuf::from("./static/samples/torgo-dataset"),
        }
    }
}

/// OS-dependent data folder
fn default_data_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("spectral"))
        .unwrap_or_else(|| PathBuf::from("./spectral_data"))
}

/// Default location of the TOML config file (`<config dir>/spectral/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("spectral").join("config.toml"))
}

/// Longest accepted login session lifetime, in days
pub const MAX_SESSION_TTL_DAYS: i64 = 3650;

/// Contents of the TOML config file. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub bind_address: Option<SocketAddr>,
    pub database_path: Option<PathBuf>,
    pub kernel_origin: Option<String>,
    pub secure_cookies: Option<bool>,
    pub session_ttl_days: Option<i64>,
    pub admin_enabled: Option<bool>,
    pub log_level: Option<String>,
    pub samples_dir: Option<PathBuf>,
}

impl TomlConfig {
    /// Load a TOML config file.
    ///
    /// Runs before logging is set up, so nothing is logged here. A missing
    /// file yields `None`; a file that exists but cannot be parsed is an error.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;

        Ok(Some(config))
    }
}

/// Values given on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub bind_address: Option<SocketAddr>,
    pub database_path: Option<PathBuf>,
    pub kernel_origin: Option<String>,
    pub secure_cookies: Option<bool>,
    pub session_ttl_days: Option<i64>,
    pub admin_enabled: Option<bool>,
    pub log_level: Option<String>,
    pub samples_dir: Option<PathBuf>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_path: PathBuf,
    /// Base URL of the analysis kernel
    pub kernel_origin: String,
    /// Mark session cookies `Secure`
    pub secure_cookies: bool,
    pub session_ttl_days: i64,
    /// Expose the admin seeding routes
    pub admin_enabled: bool,
    pub log_level: String,
    /// Folder holding the sample recordings used for seeding
    pub samples_dir: PathBuf,
}

impl Config {
    pub fn resolve(overrides: ConfigOverrides, toml: TomlConfig) -> Result<Self> {
        let defaults = CompiledDefaults::for_current_platform();

        let config = Self {
            bind_address: overrides
                .bind_address
                .or(toml.bind_address)
                .unwrap_or(defaults.bind_address),
            database_path: overrides
                .database_path
                .or(toml.database_path)
                .unwrap_or(defaults.database_path),
            kernel_origin: overrides
                .kernel_origin
                .or(toml.kernel_origin)
                .unwrap_or(defaults.kernel_origin),
            secure_cookies: overrides
                .secure_cookies
                .or(toml.secure_cookies)
                .unwrap_or(false),
            session_ttl_days: overrides
                .session_ttl_days
                .or(toml.session_ttl_days)
                .unwrap_or(defaults.session_ttl_days),
            admin_enabled: overrides
                .admin_enabled
                .or(toml.admin_enabled)
                .unwrap_or(false),
            log_level: overrides
                .log_level
                .or(toml.log_level)
                .unwrap_or(defaults.log_level),
            samples_dir: overrides
                .samples_dir
                .or(toml.samples_dir)
                .unwrap_or(defaults.samples_dir),
        };

        if !(1..=MAX_SESSION_TTL_DAYS).contains(&config.session_ttl_days) {
            return Err(Error::Config(format!(
                "session_ttl_days must be between 1 and {}, got {}",
                MAX_SESSION_TTL_DAYS, config.session_ttl_days
            )));
        }

        Ok(config)
    }

    /// Configuration for tests: in-process defaults with the given database
    pub fn for_database(database_path: impl Into<PathBuf>) -> Self {
        let defaults = CompiledDefaults::for_current_platform();
        Self {
            bind_address: defaults.bind_address,
            database_path: database_path.into(),
            kernel_origin: defaults.kernel_origin,
            secure_cookies: false,
            session_ttl_days: defaults.session_ttl_days,
            admin_enabled: false,
            log_level: defaults.log_level,
            samples_dir: defaults.samples_dir,
        }
    }
}
