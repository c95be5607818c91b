//! Session configuration.
//!
//! This module provides TOML-based configuration file loading and saving.
//! The default configuration path is `~/.config/ttylink/config.toml`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use protocol::Credentials;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("host must not be empty")]
    EmptyHost,

    #[error("port must be non-zero")]
    InvalidPort,

    #[error("terminal size must be non-zero, got {rows}x{columns}")]
    InvalidTerminalSize { rows: u16, columns: u16 },

    #[error("silence_timeout_secs must be between 1 and 120, got {0}")]
    InvalidSilenceTimeout(f64),

    #[error("drain_silence_secs must be between 0.1 and 60, got {0}")]
    InvalidDrainSilence(f64),

    #[error("log_level must be one of: trace, debug, info, warn, error; got {0}")]
    InvalidLogLevel(String),
}

/// Valid log level values for tracing configuration.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// The kind of program running on the far side of the tunnel.
///
/// Drives which classification ruleset the session uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerminalType {
    /// A plain shell with shell-integration prompt markers.
    #[default]
    Shell,
    /// An interactive AI command-line assistant.
    Assistant,
}

impl TerminalType {
    /// Tag used in chunk metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            TerminalType::Shell => "shell",
            TerminalType::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for TerminalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for a terminal session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Server hostname.
    pub host: String,

    /// Server port.
    pub port: u16,

    /// Basic-auth username.
    pub username: String,

    /// Basic-auth password.
    pub password: String,

    /// Use wss instead of ws.
    pub use_tls: bool,

    /// Kind of remote program, selects the classification ruleset.
    pub terminal_type: TerminalType,

    /// Terminal height in rows.
    pub rows: u16,

    /// Terminal width in columns.
    pub columns: u16,

    /// Default per-command silence timeout in seconds.
    pub silence_timeout_secs: f64,

    /// Silence window that ends the post-connect banner drain, in seconds.
    pub drain_silence_secs: f64,

    /// Logging level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 7681,
            username: String::new(),
            password: String::new(),
            use_tls: false,
            terminal_type: TerminalType::default(),
            rows: 24,
            columns: 80,
            silence_timeout_secs: 30.0,
            drain_silence_secs: 3.0,
            log_level: "info".to_string(),
        }
    }
}

/// Returns the default configuration file path.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ttylink")
        .join("config.toml")
}

impl SessionConfig {
    /// Creates a new configuration for the given endpoint.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Sets the basic-auth credentials.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    /// Sets whether to use wss.
    pub fn with_tls(mut self, use_tls: bool) -> Self {
        self.use_tls = use_tls;
        self
    }

    /// Sets the remote program kind.
    pub fn with_terminal_type(mut self, terminal_type: TerminalType) -> Self {
        self.terminal_type = terminal_type;
        self
    }

    /// Sets the terminal geometry.
    pub fn with_terminal_size(mut self, rows: u16, columns: u16) -> Self {
        self.rows = rows;
        self.columns = columns;
        self
    }

    /// Sets the default per-command silence timeout.
    pub fn with_silence_timeout(mut self, timeout: Duration) -> Self {
        self.silence_timeout_secs = timeout.as_secs_f64();
        self
    }

    /// Sets the banner-drain silence window.
    pub fn with_drain_silence(mut self, window: Duration) -> Self {
        self.drain_silence_secs = window.as_secs_f64();
        self
    }

    /// The WebSocket endpoint URL.
    pub fn endpoint_url(&self) -> String {
        let scheme = if self.use_tls { "wss" } else { "ws" };
        format!("{}://{}:{}/ws", scheme, self.host, self.port)
    }

    /// Credentials for the double authentication handshake.
    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.username.clone(), self.password.clone())
    }

    /// The default per-command silence timeout.
    pub fn silence_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.silence_timeout_secs)
    }

    /// The banner-drain silence window.
    pub fn drain_silence(&self) -> Duration {
        Duration::from_secs_f64(self.drain_silence_secs)
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Environment variables take precedence over config file values.
    /// Supported variables:
    /// - TTYLINK_HOST: Override server hostname
    /// - TTYLINK_PORT: Override server port
    /// - TTYLINK_LOG_LEVEL: Override log level (trace, debug, info, warn, error)
    pub fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("TTYLINK_HOST") {
            if !host.is_empty() {
                tracing::info!("Overriding host from environment: {}", host);
                self.host = host;
            }
        }

        if let Ok(port) = std::env::var("TTYLINK_PORT") {
            if !port.is_empty() {
                match port.parse::<u16>() {
                    Ok(port) => {
                        tracing::info!("Overriding port from environment: {}", port);
                        self.port = port;
                    }
                    Err(_) => {
                        tracing::warn!("Ignoring invalid TTYLINK_PORT value: {}", port);
                    }
                }
            }
        }

        if let Ok(level) = std::env::var("TTYLINK_LOG_LEVEL") {
            if !level.is_empty() {
                tracing::info!("Overriding log_level from environment: {}", level);
                self.log_level = level;
            }
        }
    }

    /// Validate the configuration values.
    ///
    /// Returns an error if any configuration value is outside the valid range.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::EmptyHost);
        }

        if self.port == 0 {
            return Err(ConfigError::InvalidPort);
        }

        if self.rows == 0 || self.columns == 0 {
            return Err(ConfigError::InvalidTerminalSize {
                rows: self.rows,
                columns: self.columns,
            });
        }

        // Silence timeout cannot exceed the executor's hard ceiling
        if !(1.0..=120.0).contains(&self.silence_timeout_secs) {
            return Err(ConfigError::InvalidSilenceTimeout(
                self.silence_timeout_secs,
            ));
        }

        if !(0.1..=60.0).contains(&self.drain_silence_secs) {
            return Err(ConfigError::InvalidDrainSilence(self.drain_silence_secs));
        }

        let level = self.log_level.to_lowercase();
        if !VALID_LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(self.log_level.clone()));
        }

        Ok(())
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Load configuration from the default path, falling back to defaults
    /// if the file does not exist.
    pub fn load_or_default() -> Result<Self> {
        let path = default_config_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create config directory: {}", parent.display())
            })?;
        }
        let contents = toml::to_string_pretty(self).context("failed to serialize config")?;
        fs::write(path, contents)
            .with_context(|| format!("failed to write config file: {}", path.display()))?;
        Ok(())
    }
}
