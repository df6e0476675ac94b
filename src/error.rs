//! Error types for the guided flow.

use std::time::Duration;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Advisory error: {0}")]
    Advisory(#[from] AdvisoryError),

    #[error("Flow error: {0}")]
    Flow(#[from] FlowError),

    #[error("Share error: {0}")]
    Share(#[from] ShareError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Advisory text provider errors.
///
/// None of these ever reach the visitor; the generator turns every one of
/// them into a canned fallback line.
#[derive(Debug, thiserror::Error)]
pub enum AdvisoryError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Provider {provider} returned HTTP {status}")]
    Status { provider: String, status: u16 },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Provider {provider} timed out after {timeout:?}")]
    Timeout { provider: String, timeout: Duration },

    #[error("No advisory provider configured")]
    NotConfigured,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised when parsing flow input (step names, choices, commands).
///
/// Navigation itself never fails; these only come from text input.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FlowError {
    #[error("Unknown step: {0}")]
    UnknownStep(String),

    #[error("Unknown choice: {0}")]
    UnknownChoice(String),

    #[error("Unknown feature: {0}")]
    UnknownFeature(String),

    #[error("Invalid command: {0}")]
    InvalidCommand(String),
}

/// Platform share/clipboard errors.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ShareError {
    #[error("Share was cancelled by the user")]
    Cancelled,

    #[error("Capability {0} is not available on this platform")]
    Unavailable(String),

    #[error("Share failed: {0}")]
    Failed(String),
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
