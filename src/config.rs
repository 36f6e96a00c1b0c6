//! # Server configuration
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then `LINEHTTP_*` environment
//! variables.
//!
//! ```toml
//! host = "0.0.0.0"
//! port = 8080
//! max_connections = 256
//! request_timeout_secs = 30
//! log_filter = "linehttp=debug"
//! ```
//!
//! The file defaults to `linehttp.toml` in the working directory, `LINEHTTP_CONFIG` points elsewhere.

use std::time::Duration;

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_VAR: &str = "LINEHTTP_CONFIG";
/// Prefix of environment variables overriding single keys.
pub const ENV_PREFIX: &str = "LINEHTTP";
const DEFAULT_CONFIG_FILE: &str = "linehttp.toml";

/// Runtime settings of the server binary.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the listener binds to.
    pub host: String,
    /// Port the listener binds to, `0` picks a free one.
    pub port: u16,
    /// Upper bound of concurrently handled connections, unbounded if unset.
    pub max_connections: Option<usize>,
    /// Seconds allowed for reading one request, `0` disables the limit.
    pub request_timeout_secs: u64,
    /// Default `tracing` filter, `RUST_LOG` takes precedence.
    pub log_filter: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            max_connections: None,
            request_timeout_secs: 120,
            log_filter: "info".to_string(),
        }
    }
}

impl ServerConfig {
    /// Loads the configuration from the file named by `LINEHTTP_CONFIG` (or `linehttp.toml`) and the
    /// environment. Missing files are fine, every key has a default.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if a source cannot be read or a value has the wrong type.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Config::builder()
            .add_source(File::with_name(&path).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Parses a TOML document on top of the defaults.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the document is not valid TOML or a value has the wrong type.
    pub fn from_toml(document: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from_str(document, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    /// The `host:port` pair to bind to.
    #[must_use]
    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }

    /// The per-request read limit, if any.
    #[must_use]
    pub const fn request_timeout(&self) -> Option<Duration> {
        if self.request_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.request_timeout_secs))
        }
    }
}
