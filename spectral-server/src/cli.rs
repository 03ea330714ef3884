//! Command-line arguments
//!
//! Every option falls back to a `SPECTRAL_*` environment variable. Options
//! given neither way are left to the TOML file and compiled defaults.

use clap::Parser;
use spectral_common::config::ConfigOverrides;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "spectral-server")]
#[command(about = "Spectral speech analysis server")]
#[command(version)]
pub struct Args {
    /// TOML config file (default: <config dir>/spectral/config.toml)
    #[arg(short, long, env = "SPECTRAL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to listen on
    #[arg(short, long, env = "SPECTRAL_BIND_ADDRESS")]
    pub bind_address: Option<SocketAddr>,

    /// SQLite database file
    #[arg(long, env = "SPECTRAL_DATABASE_PATH")]
    pub database_path: Option<PathBuf>,

    /// Base URL of the analysis kernel
    #[arg(long, env = "SPECTRAL_KERNEL_ORIGIN")]
    pub kernel_origin: Option<String>,

    /// Mark session cookies Secure
    #[arg(long, env = "SPECTRAL_SECURE_COOKIES")]
    pub secure_cookies: Option<bool>,

    /// Lifetime of a login session, in days
    #[arg(long, env = "SPECTRAL_SESSION_TTL_DAYS")]
    pub session_ttl_days: Option<i64>,

    /// Mount the admin routes
    #[arg(long, env = "SPECTRAL_ADMIN_ENABLED")]
    pub admin_enabled: Option<bool>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, env = "SPECTRAL_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Folder holding the sample recordings
    #[arg(long, env = "SPECTRAL_SAMPLES_DIR")]
    pub samples_dir: Option<PathBuf>,
}

impl Args {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            bind_address: self.bind_address,
            database_path: self.database_path.clone(),
            kernel_origin: self.kernel_origin.clone(),
            secure_cookies: self.secure_cookies,
            session_ttl_days: self.session_ttl_days,
            admin_enabled: self.admin_enabled,
            log_level: self.log_level.clone(),
            samples_dir: self.samples_dir.clone(),
        }
    }
}
