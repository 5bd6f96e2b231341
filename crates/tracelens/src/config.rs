//! Configuration file support for tracelens.
//!
//! Loads `tracelens.toml` from an explicit path, the working directory, or
//! the user config directory, in that order. Command-line flags override
//! whatever the file sets.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use tracelens_logging::LogFormat;
use tracelens_sessions::DEFAULT_EVENT_BUFFER;

/// The config file name
pub const CONFIG_FILE_NAME: &str = "tracelens.toml";

/// Server configuration loaded from `tracelens.toml`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Address to bind the HTTP server to
    pub host: String,
    /// Port to bind the HTTP server to
    pub port: u16,
    /// Idle interval between keep-alive comments on live streams
    #[serde(with = "humantime_serde")]
    pub keepalive: Duration,
    /// Undelivered events a live observer may fall behind before it is
    /// resynchronized with a fresh snapshot
    pub event_buffer: usize,
    /// Largest accepted ingestion body
    pub max_payload_bytes: usize,
    /// Open the viewer in a browser once the server is up
    pub open_browser: bool,
    pub log: LogConfig,
}

/// Logging section
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    pub level: String,
    pub format: LogFormat,
    pub file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            keepalive: Duration::from_secs(15),
            event_buffer: DEFAULT_EVENT_BUFFER,
            max_payload_bytes: 16 * 1024 * 1024,
            open_browser: false,
            log: LogConfig::default(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            file: None,
        }
    }
}

/// Values given on the command line for `serve`.
#[derive(Debug, Default, Clone)]
pub struct ServeOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub keepalive: Option<Duration>,
    pub open: bool,
}

impl Config {
    /// Resolve and load the configuration.
    ///
    /// Returns:
    /// - the parsed file from `explicit` (hard error if missing or invalid)
    /// - otherwise the first of `<working_dir>/tracelens.toml` and
    ///   `<config_dir>/tracelens/tracelens.toml` that exists
    /// - otherwise defaults, with `None` as the source path
    pub fn load(explicit: Option<&Path>, working_dir: &Path) -> Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            return Ok((Self::load_file(path)?, Some(path.to_path_buf())));
        }

        let candidates = std::iter::once(working_dir.join(CONFIG_FILE_NAME))
            .chain(default_config_path());

        for path in candidates {
            if path.exists() {
                return Ok((Self::load_file(&path)?, Some(path)));
            }
        }

        Ok((Self::default(), None))
    }

    pub fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Apply command-line overrides on top of the file values.
    pub fn apply(&mut self, overrides: ServeOverrides) {
        if let Some(host) = overrides.host {
            self.host = host;
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(keepalive) = overrides.keepalive {
            self.keepalive = keepalive;
        }
        if overrides.open {
            self.open_browser = true;
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tracelens").join(CONFIG_FILE_NAME))
}
