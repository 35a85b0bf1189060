//! Configuration management for the mini FTP server
//!
//! Settings are layered: built-in defaults, then an optional `config.toml`,
//! then `MINI_FTPD_*` environment variables. The control port given on the
//! command line always wins over all three.

use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::transfer::DEFAULT_CHUNK_SIZE;

/// Prefix for environment overrides, e.g. `MINI_FTPD_SERVER_ROOT`.
const ENV_PREFIX: &str = "MINI_FTPD";

/// Default config file basename, resolved by the `config` crate (`config.toml`).
pub const DEFAULT_CONFIG_FILE: &str = "config";

/// How LIST produces its listing bytes.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ListBackend {
    /// Spawn `list_program -l [path]` and stream its standard output.
    Process,
    /// Format directory entries in-process.
    Native,
}

/// Complete server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// IP address to bind the control listener
    pub bind_address: String,

    /// Port for the control connection
    pub control_port: u16,

    /// Directory every client path resolves against
    pub server_root: String,

    /// Chunk size for data-channel transfers
    pub buffer_size: usize,

    /// Maximum control line length; longer lines are truncated
    pub max_command_length: usize,

    /// Connect timeout for outbound data channels, 0 disables it
    pub connect_timeout_secs: u64,

    /// Maximum concurrent control connections
    pub max_clients: usize,

    pub list_backend: ListBackend,

    /// Executable used by the process list backend
    pub list_program: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            control_port: 2121,
            server_root: ".".to_string(),
            buffer_size: DEFAULT_CHUNK_SIZE,
            max_command_length: 512,
            connect_timeout_secs: 10,
            max_clients: 10,
            list_backend: ListBackend::Process,
            list_program: "ls".to_string(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from `<config_file>.toml` (optional) with environment overrides
    pub fn load(config_file: &str) -> Result<Self, config::ConfigError> {
        let defaults = Self::default();

        let settings = Config::builder()
            .set_default("bind_address", defaults.bind_address)?
            .set_default("control_port", i64::from(defaults.control_port))?
            .set_default("server_root", defaults.server_root)?
            .set_default("buffer_size", defaults.buffer_size as i64)?
            .set_default("max_command_length", defaults.max_command_length as i64)?
            .set_default("connect_timeout_secs", defaults.connect_timeout_secs as i64)?
            .set_default("max_clients", defaults.max_clients as i64)?
            .set_default("list_backend", "process")?
            .set_default("list_program", defaults.list_program)?
            .add_source(File::with_name(config_file).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.buffer_size == 0 {
            return Err(config::ConfigError::Message(
                "buffer_size must be greater than 0".into(),
            ));
        }

        if self.max_command_length < 100 {
            return Err(config::ConfigError::Message(
                "max_command_length must be at least 100 bytes".into(),
            ));
        }

        if self.max_clients == 0 {
            return Err(config::ConfigError::Message(
                "max_clients must be greater than 0".into(),
            ));
        }

        if self.server_root.is_empty() {
            return Err(config::ConfigError::Message(
                "server_root cannot be empty".into(),
            ));
        }

        if self.list_program.is_empty() {
            return Err(config::ConfigError::Message(
                "list_program cannot be empty".into(),
            ));
        }

        Ok(())
    }

    /// Get bind address and control port as socket address string
    pub fn control_socket(&self) -> String {
        format!("{}:{}", self.bind_address, self.control_port)
    }

    /// Get server root as PathBuf
    pub fn server_root_path(&self) -> PathBuf {
        PathBuf::from(&self.server_root)
    }

    /// Data-channel connect timeout, if one is configured
    pub fn connect_timeout(&self) -> Option<Duration> {
        match self.connect_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}
