use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

pub mod credentials;

pub use credentials::{CredentialSource, EnvCredentials, StaticCredentials, GEMINI_API_KEY_VAR};

pub const DEFAULT_OLLAMA_COMMAND: &str = "ollama";
pub const DEFAULT_OLLAMA_MODEL: &str = "tinyllama";
pub const DEFAULT_OLLAMA_TIMEOUT_SECONDS: u64 = 60;
pub const DEFAULT_GEMINI_MODEL: &str = "models/gemini-flash-latest";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub max_file_size_mb: usize,
    /// Where uploads are staged during extraction. `None` means the system temp dir.
    pub upload_dir: Option<PathBuf>,
    pub ollama_command: String,
    pub ollama_model: String,
    pub ollama_timeout_seconds: u64,
    pub gemini_model: String,
    pub gemini_base_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build a config from an arbitrary variable lookup. `from_env` passes the
    /// process environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Config {
            server_host: Self::string_var(&lookup, "SERVER_HOST", "0.0.0.0"),
            server_port: Self::parse_var(&lookup, "SERVER_PORT", 8080)
                .context("Failed to parse SERVER_PORT")?,
            max_file_size_mb: Self::parse_var(&lookup, "MAX_FILE_SIZE_MB", 10)
                .context("Failed to parse MAX_FILE_SIZE_MB")?,
            upload_dir: lookup("UPLOAD_DIR")
                .map(|dir| dir.trim().to_string())
                .filter(|dir| !dir.is_empty())
                .map(PathBuf::from),
            ollama_command: Self::string_var(&lookup, "OLLAMA_COMMAND", DEFAULT_OLLAMA_COMMAND),
            ollama_model: Self::string_var(&lookup, "OLLAMA_MODEL", DEFAULT_OLLAMA_MODEL),
            ollama_timeout_seconds: Self::parse_var(
                &lookup,
                "OLLAMA_TIMEOUT_SECONDS",
                DEFAULT_OLLAMA_TIMEOUT_SECONDS,
            )
            .context("Failed to parse OLLAMA_TIMEOUT_SECONDS")?,
            gemini_model: Self::string_var(&lookup, "GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
            gemini_base_url: Self::string_var(&lookup, "GEMINI_BASE_URL", DEFAULT_GEMINI_BASE_URL),
        };

        config.validate()?;

        info!("Configuration loaded successfully: {:?}", config);
        Ok(config)
    }

    fn string_var<F>(lookup: &F, var_name: &str, default: &str) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(var_name).filter(|val| !val.trim().is_empty()) {
            Some(val) => val.trim().to_string(),
            None => {
                info!("{} not set, using default: {}", var_name, default);
                default.to_string()
            }
        }
    }

    fn parse_var<F, T>(lookup: &F, var_name: &str, default: T) -> Result<T>
    where
        F: Fn(&str) -> Option<String>,
        T: std::str::FromStr + Copy + std::fmt::Debug,
        T::Err: std::fmt::Display,
    {
        match lookup(var_name) {
            Some(val) => match val.trim().parse() {
                Ok(parsed) => Ok(parsed),
                Err(e) => {
                    warn!("Failed to parse {}: {} (using default: {:?})", var_name, e, default);
                    Ok(default)
                }
            },
            None => {
                info!("{} not set, using default: {:?}", var_name, default);
                Ok(default)
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.server_port == 0 {
            return Err(anyhow::anyhow!("SERVER_PORT must be greater than 0"));
        }
        if self.max_file_size_mb == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be greater than 0"));
        }
        if self.ollama_timeout_seconds == 0 {
            return Err(anyhow::anyhow!("OLLAMA_TIMEOUT_SECONDS must be greater than 0"));
        }
        Ok(())
    }

    pub fn max_file_size_bytes(&self) -> usize {
        self.max_file_size_mb * 1024 * 1024
    }

    pub fn ollama_timeout(&self) -> Duration {
        Duration::from_secs(self.ollama_timeout_seconds)
    }
}
