//! Console configuration
//!
//! Each setting resolves through the same priority order: command-line
//! flag, then environment variable (via clap's env attributes), then the
//! TOML config file, then the compiled default.

use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Deserialize;

use vigil_common::{Error, Result};

pub const DEFAULT_PORT: u16 = 5810;
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5001/api";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 5000;

/// Command-line arguments for vigil-ui
#[derive(Parser, Debug, Default)]
#[command(name = "vigil-ui")]
#[command(about = "Operator console for the VIGIL content-safety pipeline")]
#[command(version)]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, env = "VIGIL_UI_PORT")]
    pub port: Option<u16>,

    /// Base URL of the analysis backend API (including the /api prefix)
    #[arg(short, long, env = "VIGIL_BACKEND_URL")]
    pub backend_url: Option<String>,

    /// Task poll interval in milliseconds
    #[arg(long, env = "VIGIL_POLL_INTERVAL_MS")]
    pub poll_interval_ms: Option<u64>,

    /// Path to a TOML config file
    #[arg(long, value_name = "FILE", env = "VIGIL_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Optional settings from the TOML config file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    pub port: Option<u16>,
    pub backend_url: Option<String>,
    pub poll_interval_ms: Option<u64>,
}

/// Fully resolved console configuration
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    pub port: u16,
    pub backend_url: String,
    pub poll_interval_ms: u64,
}

impl ConsoleConfig {
    /// Resolve configuration from arguments, config file, and defaults
    pub fn resolve(args: &Args) -> Result<Self> {
        let file = load_file_config(args.config.as_deref())?;

        Ok(Self {
            port: args.port.or(file.port).unwrap_or(DEFAULT_PORT),
            backend_url: args
                .backend_url
                .clone()
                .or(file.backend_url)
                .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string()),
            poll_interval_ms: args
                .poll_interval_ms
                .or(file.poll_interval_ms)
                .unwrap_or(DEFAULT_POLL_INTERVAL_MS),
        })
    }
}

/// Load the config file. An explicitly given path must exist and parse;
/// the default platform path is optional and silently skipped when absent.
fn load_file_config(path: Option<&Path>) -> Result<FileConfig> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(FileConfig::default()),
        },
    };

    let content = std::fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("Cannot read {}: {}", path.display(), e)))?;

    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Cannot parse {}: {}", path.display(), e)))
}

/// Platform config file location (e.g. ~/.config/vigil/config.toml)
fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("vigil").join("config.toml"))
}
