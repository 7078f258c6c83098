//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `GROUNDED_CODER` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use grounded_coder::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Writing results to {}", config.output.output_dir.display());
//! ```

mod error;
mod llm;
mod log;
mod output;
mod pipeline;

pub use error::{ConfigError, ValidationError};
pub use llm::LlmConfig;
pub use log::LogConfig;
pub use output::OutputConfig;
pub use pipeline::{PipelineConfig, ResponseMode};

use serde::Deserialize;

use crate::adapters::llm::RetryPolicy;
use crate::application::handlers::AnalysisSettings;

/// Root application configuration
///
/// Every section has defaults; only the LLM API key must be supplied.
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// LLM provider configuration (Gemini)
    #[serde(default)]
    pub llm: LlmConfig,

    /// Pipeline mode and concurrency
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Export and codebook locations
    #[serde(default)]
    pub output: OutputConfig,

    /// Log format and level
    #[serde(default)]
    pub log: LogConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `GROUNDED_CODER` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `GROUNDED_CODER__LLM__API_KEY=...` -> `llm.api_key = ...`
    /// - `GROUNDED_CODER__PIPELINE__RESPONSE_MODE=text` -> `pipeline.response_mode = text`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("GROUNDED_CODER")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.llm.validate()?;
        self.pipeline.validate()?;
        self.log.validate()?;
        Ok(())
    }

    /// Retry policy for LLM calls
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.llm.max_retries, self.llm.base_delay())
    }

    /// Handler settings derived from the LLM and pipeline sections
    pub fn analysis_settings(&self) -> AnalysisSettings {
        AnalysisSettings {
            temperature: self.llm.temperature,
            max_output_tokens: self.llm.max_output_tokens,
            max_concurrent_themes: self.pipeline.max_concurrent_themes,
            extract_quotes: self.pipeline.extract_quotes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;
    use std::time::Duration;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: [&str; 6] = [
        "GROUNDED_CODER__LLM__API_KEY",
        "GROUNDED_CODER__LLM__TEMPERATURE",
        "GROUNDED_CODER__LLM__MAX_RETRIES",
        "GROUNDED_CODER__PIPELINE__RESPONSE_MODE",
        "GROUNDED_CODER__PIPELINE__EXTRACT_QUOTES",
        "GROUNDED_CODER__LOG__JSON",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("GROUNDED_CODER__LLM__API_KEY", "test-key");
        env::set_var("GROUNDED_CODER__LLM__TEMPERATURE", "0.7");
        env::set_var("GROUNDED_CODER__PIPELINE__RESPONSE_MODE", "text");
        env::set_var("GROUNDED_CODER__PIPELINE__EXTRACT_QUOTES", "false");
        env::set_var("GROUNDED_CODER__LOG__JSON", "true");
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.llm.api_key(), Some("test-key"));
        assert_eq!(config.llm.temperature, 0.7);
        assert_eq!(config.pipeline.response_mode, ResponseMode::Text);
        assert!(!config.pipeline.extract_quotes);
        assert!(config.log.json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_without_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let config = AppConfig::load().unwrap();

        assert_eq!(config.llm.model, "gemini-2.5-pro");
        assert_eq!(config.pipeline.max_concurrent_themes, 5);
        assert_eq!(config.output.codebook_path.to_str(), Some("output/evolving_codebook.json"));
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_missing_key_fails_validation() {
        let config = AppConfig::default();
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("LLM__API_KEY"))
        );
    }

    #[test]
    fn test_derived_settings() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("GROUNDED_CODER__LLM__MAX_RETRIES", "5");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        let policy = config.retry_policy();
        assert_eq!(policy.max_retries, 5);
        assert_eq!(policy.base_delay, Duration::from_millis(1000));

        let settings = config.analysis_settings();
        assert_eq!(settings.max_output_tokens, 65_536);
        assert_eq!(settings.max_concurrent_themes, 5);
    }
}
