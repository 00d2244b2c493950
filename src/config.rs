//! Configuration management for the RAX chat server
//!
//! Values come from built-in defaults, an optional `config.toml` in the
//! working directory, and `RAX_CHAT_*` environment variables (highest priority).

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Port the reference chat service listens on.
pub const DEFAULT_PORT: u16 = 9999;

/// Address the listener binds to when nothing else is configured.
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";

/// Network settings shared by the server and the client binary.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ServerConfig {
    /// IP address or hostname to bind (server) or connect to (client)
    /// Environment: RAX_CHAT_BIND_ADDRESS
    pub bind_address: String,

    /// TCP port of the chat service
    /// Environment: RAX_CHAT_PORT
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    /// Load configuration from `config.toml` (optional) with environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration using `path` as the file source (extension optional)
    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("bind_address", DEFAULT_BIND_ADDRESS)?
            .set_default("port", i64::from(DEFAULT_PORT))?
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("RAX_CHAT"))
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for loaded configuration values
    fn validate(&self) -> Result<(), ConfigError> {
        if self.bind_address.trim().is_empty() {
            return Err(ConfigError::Message(
                "bind_address cannot be empty".into(),
            ));
        }

        if self.port == 0 {
            return Err(ConfigError::Message("port cannot be 0".into()));
        }

        Ok(())
    }

    /// Get bind address and port as a `host:port` string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}
