//! Error types for Salt Courier
//!
//! Each stage of a run has its own error enum so failures carry the context
//! of where they happened. `AppError` wraps them all for the CLI layer, which
//! maps any of them to a non-zero exit code.
//!
//! A rejected login is deliberately absent: it is an expected outcome and is
//! modelled as [`crate::app::client::LoginOutcome::Rejected`].

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Path exists but is not a regular file
    #[error("Configuration path is not a file: {path}")]
    NotAFile { path: PathBuf },

    /// Configuration file could not be read
    #[error("Failed to read configuration file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration format
    #[error("Invalid configuration format")]
    InvalidFormat(#[from] toml::de::Error),

    /// Requested profile is not defined in the configuration
    #[error("Profile '{profile}' not found in configuration")]
    MissingProfile { profile: String },

    /// Missing required configuration field
    #[error("Missing required configuration field: {field}")]
    MissingField { field: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for {field}: {value}. {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Errors raised while translating command tokens into a call payload
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// First token is not a known salt protocol
    #[error("Unknown salt protocol: {protocol}")]
    UnknownProtocol { protocol: String },

    /// Target type flag is not in the abbreviation table
    #[error("Unknown target type: {flag}")]
    UnknownTargetType { flag: String },

    /// Command ended before a required token
    #[error("Incomplete command: missing {expected}")]
    MissingToken { expected: &'static str },
}

/// Network and HTTP errors from the session client
#[derive(Error, Debug)]
pub enum TransportError {
    /// HTTP request error
    #[error("HTTP request failed")]
    Http(#[from] reqwest::Error),

    /// Request exceeded the per-call timeout
    #[error("Request to {url} timed out after {seconds} seconds")]
    Timeout { url: String, seconds: u64 },

    /// Server returned an unexpected status
    #[error("Server error: HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// Response body was not valid JSON
    #[error("Could not decode response from {url}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Client was used after `close`
    #[error("Session client is closed")]
    Closed,
}

/// Errors raised by output renderers
#[derive(Error, Debug)]
pub enum RenderError {
    /// Required field absent from the job response
    #[error("Job response is missing field: {field}")]
    MissingField { field: String },

    /// Field present but not of the expected JSON type
    #[error("Unexpected shape for {field}: expected {expected}")]
    UnexpectedShape {
        field: String,
        expected: &'static str,
    },

    /// Highstate identifier without four `_|-` separated parts
    #[error("Malformed state identifier: {id}")]
    MalformedStateId { id: String },

    /// YAML serialization failed
    #[error("YAML serialization failed")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization failed
    #[error("JSON serialization failed")]
    Json(#[from] serde_json::Error),

    /// Terminal output error
    #[error("Terminal output error")]
    Io(#[from] std::io::Error),
}

/// Top-level application error that can represent any error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Command translation error
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Transport error
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Render error
    #[error(transparent)]
    Render(#[from] RenderError),

    /// The other actor failed and this one stopped at a suspension point
    #[error("Job cancelled")]
    Cancelled,

    /// User interrupted the run
    #[error("Interrupted")]
    Interrupted,

    /// Generic I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// True for the secondary error an actor returns when its sibling failed
    pub fn is_cancellation(&self) -> bool {
        matches!(self, AppError::Cancelled)
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Config(_) => "config",
            AppError::Command(_) => "command",
            AppError::Transport(_) => "transport",
            AppError::Render(_) => "render",
            AppError::Cancelled => "cancelled",
            AppError::Interrupted => "interrupted",
            AppError::Io(_) => "io",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// Configuration result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Command translation result type alias
pub type CommandResult<T> = std::result::Result<T, CommandError>;

/// Transport result type alias
pub type TransportResult<T> = std::result::Result<T, TransportError>;

/// Render result type alias
pub type RenderResult<T> = std::result::Result<T, RenderError>;
