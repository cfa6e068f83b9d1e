//! Error types for the ede-core library.

use thiserror::Error;

/// Result type alias for ede operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring or running the port watcher.
///
/// Probe failures are deliberately absent: "nothing is listening" is a normal
/// sampled state and surfaces as [`ProbeOutcome::Closed`](crate::domain::ProbeOutcome).
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid configuration. Fatal at startup.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Failed to execute a system command.
    #[error("Command execution failed: {0}")]
    CommandFailed(String),

    /// Failed to parse command output.
    #[error("Failed to parse output: {0}")]
    ParseError(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Platform not supported.
    #[error("Platform not supported: {0}")]
    UnsupportedPlatform(String),
}

/// A defect in the startup configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// A port list item is not a number.
    #[error("invalid port '{0}'")]
    InvalidPort(String),

    /// A port number outside 1..=65535.
    #[error("port {0} is out of range (1-65535)")]
    PortOutOfRange(u64),

    /// A range whose start is greater than its end.
    #[error("invalid port range {start}-{end}")]
    InvalidRange { start: u16, end: u16 },

    /// The port list yielded no ports.
    #[error("no ports to watch")]
    EmptyWatchSet,

    /// The URI template cannot be rendered into a valid URI.
    #[error("malformed URI template '{template}': {reason}")]
    MalformedTemplate { template: String, reason: String },

    /// A duration or capacity setting that must be positive.
    #[error("{name} must be greater than zero")]
    NotPositive { name: &'static str },

    /// A setting with an unknown value.
    #[error("invalid value '{value}' for {name}")]
    InvalidValue { name: &'static str, value: String },

    /// The configuration file could not be read or parsed.
    #[error("failed to load configuration: {0}")]
    Load(String),

    /// The configuration directory could not be determined.
    #[error("could not determine home directory")]
    NoHomeDirectory,
}
