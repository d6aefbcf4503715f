//! # CLI Error Types
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       rasoi-bill Error Categories                        │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  ConfigError    │  │   CliError      │  │  rasoi-core             │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Io / Parse     │  │  ReadTicket     │  │  ValidationError        │ │
//! │  │  InvalidValue   │  │  Json           │  │  CoreError              │ │
//! │  │  MissingRequired│  │  InvalidLine    │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  main() wraps everything in anyhow::Error with context.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use rasoi_core::{CoreError, ValidationError};
use thiserror::Error;

/// Result type alias for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type alias for command operations.
pub type CliResult<T> = Result<T, CliError>;

/// Outlet configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read or written.
    #[error("Config file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML for `OutletConfig`.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A setting has a value the billing engine cannot use.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// A setting needed for this command is missing.
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    /// No explicit path and no platform config directory.
    #[error("No config path available")]
    NoConfigPath,
}

/// Errors raised while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Failed to read order ticket {path}: {source}")]
    ReadTicket {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Ticket or output JSON failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A ticket line failed validation.
    #[error("Line {line} ({name}): {source}")]
    InvalidLine {
        line: usize,
        name: String,
        #[source]
        source: ValidationError,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
