//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Temperature must be between 0 and 2")]
    InvalidTemperature,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("At least one LLM attempt is required")]
    InvalidRetries,

    #[error("max_output_tokens must be positive")]
    InvalidTokenLimit,

    #[error("max_concurrent_themes must be positive")]
    InvalidConcurrency,

    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),
}
